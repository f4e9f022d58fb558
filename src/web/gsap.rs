//! Optional GSAP + ScrollTrigger capability, looked up on the global object.

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};

use crate::scrub::ScrubOptions;

/// Handle to `gsap.to` with the ScrollTrigger plugin registered.
pub struct ScrollCapability {
    gsap: JsValue,
    to: Function,
}

impl ScrollCapability {
    /// Look up `gsap` and `ScrollTrigger`. Returns `None` when either is
    /// missing.
    pub fn detect() -> Option<Self> {
        let global = js_sys::global();
        let gsap = lookup(&global, "gsap")?;
        let scroll_trigger = lookup(&global, "ScrollTrigger")?;

        if let Some(register) = lookup(&gsap, "registerPlugin").and_then(|f| f.dyn_into::<Function>().ok()) {
            let _ = register.call1(&gsap, &scroll_trigger);
        }
        let to = lookup(&gsap, "to")?.dyn_into::<Function>().ok()?;
        Some(Self { gsap, to })
    }

    /// Start a tween of `target` towards `vars`.
    pub fn tween(&self, target: &JsValue, vars: &Object) -> Result<JsValue, JsValue> {
        self.to.call2(&self.gsap, target, vars)
    }
}

fn lookup(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

/// Set a property on a plain object.
pub(crate) fn set(obj: &Object, key: &str, value: impl Into<JsValue>) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), &value.into());
}

/// Build a `scrollTrigger` vars object.
pub(crate) fn scroll_trigger_vars(trigger: &str, start: &str, end: &str, lag: f64) -> Object {
    let vars = Object::new();
    set(&vars, "trigger", trigger);
    set(&vars, "start", start);
    set(&vars, "end", end);
    set(&vars, "scrub", lag);
    vars
}

/// `scrollTrigger` vars for the pinned frame sequence.
pub(crate) fn sequence_trigger_vars(options: &ScrubOptions) -> Object {
    let vars = scroll_trigger_vars(&options.trigger, &options.start, &options.end, options.lag);
    set(&vars, "pin", options.pin);
    set(&vars, "anticipatePin", options.anticipate_pin);
    vars
}
