//! Browser host for the sequence player.
//!
//! Mounting reads the container markup, creates the canvas context, and
//! wires preload futures, the page-load and timeout triggers, debounced
//! resizing, and the optional ScrollTrigger binding. Every callback feeds
//! the [`SequencePlayer`] and applies the effects it returns.

mod gsap;
mod hero;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use js_sys::{Function, Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, HtmlImageElement, Window};

use crate::config::{ConfigError, FrameSet, PlayerSettings};
use crate::geometry::LayoutBox;
use crate::player::{Effect, SequencePlayer};
use crate::render::web::{apply_geometry, context_2d, draw_frame, FrameImages, RenderError};
use crate::scrub::ScrubOptions;

pub use gsap::ScrollCapability;

/// Marks a container that already carries a mounted sequence.
pub const MOUNTED_ATTR: &str = "data-seq-mounted";

/// Error raised while mounting the player.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("no window available")]
    NoWindow,
    #[error("no document available")]
    NoDocument,
    #[error("container `{0}` not found")]
    MissingContainer(String),
    #[error("canvas not found inside the sequence container")]
    MissingCanvas,
    #[error("container `{0}` already has a mounted sequence")]
    AlreadyMounted(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

/// Install the console subscriber for `tracing`, and the panic hook when
/// the `console_error` feature is on. Safe to call more than once.
pub fn init_logging() {
    #[cfg(feature = "console_error")]
    console_error_panic_hook::set_once();
    let _ = tracing_wasm::try_set_as_global_default();
}

struct Inner {
    player: SequencePlayer,
    window: Window,
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    images: FrameImages,
    resize_timer: Option<Timeout>,
    start_timer: Option<Timeout>,
}

impl Inner {
    fn measure(&self) -> (Option<LayoutBox>, f64) {
        let rect = self.container.get_bounding_client_rect();
        let layout = LayoutBox::new(rect.width(), rect.height());
        let layout = (!layout.is_empty()).then_some(layout);
        (layout, self.window.device_pixel_ratio())
    }
}

/// A mounted hero sequence.
#[wasm_bindgen]
pub struct HeroSequence {
    inner: Rc<RefCell<Inner>>,
}

impl HeroSequence {
    /// Find the container, read its configuration, and prepare the canvas.
    ///
    /// Nothing is fetched or bound until [`HeroSequence::init`].
    pub fn mount(settings: PlayerSettings) -> Result<Self, WebError> {
        let window = web_sys::window().ok_or(WebError::NoWindow)?;
        let document = window.document().ok_or(WebError::NoDocument)?;

        let container = document
            .query_selector(&settings.container_selector)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| WebError::MissingContainer(settings.container_selector.clone()))?;
        if container.has_attribute(MOUNTED_ATTR) {
            return Err(WebError::AlreadyMounted(settings.container_selector.clone()));
        }
        let canvas = container
            .query_selector("canvas")
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or(WebError::MissingCanvas)?;

        let frames = FrameSet::from_attributes(|name| container.get_attribute(name))?;
        let ctx = context_2d(&canvas)?;
        let images = FrameImages::with_frame_count(frames.count);
        let player = SequencePlayer::new(frames, settings);
        let _ = container.set_attribute(MOUNTED_ATTR, "");

        Ok(Self {
            inner: Rc::new(RefCell::new(Inner {
                player,
                window,
                container,
                canvas,
                ctx,
                images,
                resize_timer: None,
                start_timer: None,
            })),
        })
    }

    /// Size the canvas, start preloading, and arm the start triggers.
    /// Later calls do nothing.
    pub fn init(&self) {
        let effects = {
            let mut s = self.inner.borrow_mut();
            if s.player.is_initialized() {
                return;
            }
            let (layout, dpr) = s.measure();
            s.player.initialize(layout, dpr)
        };
        apply_effects(&self.inner, effects);

        self.preload();
        self.arm_start_triggers();
        self.listen_for_resize();
    }

    fn preload(&self) {
        let frames = self.inner.borrow().player.frames().clone();
        tracing::debug!(count = frames.count, "preloading frames");

        for (index, src) in frames.sources().enumerate() {
            let image = match HtmlImageElement::new() {
                Ok(image) => image,
                Err(_) => {
                    let effects = self.inner.borrow_mut().player.frame_failed(index);
                    apply_effects(&self.inner, effects);
                    continue;
                }
            };
            let _ = image.set_attribute("decoding", "async");
            self.inner.borrow_mut().images.store(index, image.clone());

            let inner = Rc::clone(&self.inner);
            spawn_local(async move {
                let result = load_image(&image, &src).await;
                let effects = {
                    let mut s = inner.borrow_mut();
                    match result {
                        Ok(()) => s.player.frame_loaded(index, image.natural_width(), image.natural_height()),
                        Err(_) => s.player.frame_failed(index),
                    }
                };
                apply_effects(&inner, effects);
            });
        }
    }

    fn arm_start_triggers(&self) {
        let (window, timeout_ms) = {
            let s = self.inner.borrow();
            (s.window.clone(), s.player.settings().start_timeout_ms)
        };

        let page_complete = window
            .document()
            .map(|d| d.ready_state() == "complete")
            .unwrap_or(false);
        if page_complete {
            let effects = self.inner.borrow_mut().player.page_loaded();
            apply_effects(&self.inner, effects);
        } else {
            let inner = Rc::clone(&self.inner);
            let on_load = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
                let effects = inner.borrow_mut().player.page_loaded();
                apply_effects(&inner, effects);
            });
            let _ = window.add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref());
            on_load.forget();
        }

        let inner = Rc::clone(&self.inner);
        let timer = Timeout::new(timeout_ms, move || {
            let effects = inner.borrow_mut().player.start_timeout_elapsed();
            apply_effects(&inner, effects);
        });
        self.inner.borrow_mut().start_timer = Some(timer);
    }

    fn listen_for_resize(&self) {
        let (window, debounce_ms) = {
            let s = self.inner.borrow();
            (s.window.clone(), s.player.settings().resize_debounce_ms)
        };

        let inner = Rc::clone(&self.inner);
        let on_resize = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            let target = Rc::clone(&inner);
            // Replacing the pending timeout drops, and so cancels, the old one.
            inner.borrow_mut().resize_timer = Some(Timeout::new(debounce_ms, move || {
                apply_effects(&target, vec![Effect::Measure]);
            }));
        });
        let _ = window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
        on_resize.forget();
    }
}

#[wasm_bindgen]
impl HeroSequence {
    /// Index of the frame selected by the last scroll update.
    #[wasm_bindgen(js_name = currentFrame)]
    pub fn current_frame(&self) -> usize {
        self.inner.borrow().player.current_frame()
    }

    /// Frame resolution percentage (0-100).
    #[wasm_bindgen(js_name = loadPercent)]
    pub fn load_percent(&self) -> u8 {
        self.inner.borrow().player.progress().percent()
    }

    /// Whether the scroll capability was found and bound.
    #[wasm_bindgen(js_name = isScrollBound)]
    pub fn is_scroll_bound(&self) -> bool {
        self.inner.borrow().player.bind_state() == crate::scrub::BindState::Bound
    }

    /// Whether playback has started.
    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.inner.borrow().player.is_ready()
    }
}

/// Mount the hero with default settings.
///
/// The text fade, pointer parallax, and scroll indicator are installed
/// first and work even when the sequence itself cannot be configured.
#[wasm_bindgen(js_name = mountHeroSequence)]
pub fn mount_hero_sequence() -> Result<HeroSequence, JsValue> {
    mount_with_settings(PlayerSettings::default()).map_err(JsValue::from)
}

/// Mount the hero with settings parsed from TOML.
#[cfg(feature = "toml")]
#[wasm_bindgen(js_name = mountHeroSequenceWithSettings)]
pub fn mount_hero_sequence_with_settings(settings: &str) -> Result<HeroSequence, JsValue> {
    let settings = PlayerSettings::from_toml_str(settings)
        .map_err(|e| JsValue::from(js_sys::Error::new(&e.to_string())))?;
    mount_with_settings(settings).map_err(JsValue::from)
}

/// Install the hero effects and mount the sequence.
///
/// A container can be mounted once; a second call returns
/// [`WebError::AlreadyMounted`] and binds nothing.
pub fn mount_with_settings(settings: PlayerSettings) -> Result<HeroSequence, WebError> {
    init_logging();
    hero::install(&settings);

    let sequence = HeroSequence::mount(settings).map_err(|e| {
        match &e {
            WebError::AlreadyMounted(_) => tracing::warn!(error = %e, "mount skipped"),
            _ => tracing::error!(error = %e, "hero sequence disabled"),
        }
        e
    })?;
    sequence.init();
    Ok(sequence)
}

/// Wait for an image to decode. Handlers are attached before `src` is set.
async fn load_image(image: &HtmlImageElement, src: &str) -> Result<(), JsValue> {
    let promise = Promise::new(&mut |resolve: Function, reject: Function| {
        image.set_onload(Some(&resolve));
        image.set_onerror(Some(&reject));
        image.set_src(src);
    });
    let result = JsFuture::from(promise).await.map(|_| ());
    image.set_onload(None);
    image.set_onerror(None);
    result
}

/// Apply player effects in order. No borrow is held across host calls
/// that may re-enter the player.
fn apply_effects(inner: &Rc<RefCell<Inner>>, effects: Vec<Effect>) {
    let mut queue: VecDeque<Effect> = effects.into();
    while let Some(effect) = queue.pop_front() {
        match effect {
            Effect::ApplyGeometry(geometry) => {
                let s = inner.borrow();
                if let Err(err) = apply_geometry(&s.canvas, &s.ctx, &geometry) {
                    tracing::warn!(error = %err, "failed to resize canvas");
                }
            }
            Effect::Draw(cmd) => {
                let s = inner.borrow();
                match draw_frame(&s.ctx, &s.images, &cmd) {
                    Ok(true) => {}
                    Ok(false) => tracing::trace!(index = cmd.index, "frame not decoded, skipping draw"),
                    Err(err) => tracing::warn!(error = %err, "draw failed"),
                }
            }
            Effect::Measure => {
                let more = {
                    let mut s = inner.borrow_mut();
                    let (layout, dpr) = s.measure();
                    s.player.resize(layout, dpr)
                };
                queue.extend(more);
            }
            Effect::BindScroll(options) => {
                let bound = bind_scroll(inner, &options);
                inner.borrow_mut().player.scroll_bound(bound);
            }
        }
    }
}

/// Tween a proxy cursor from 0 to the last frame over the pinned region
/// and feed every update back into the player.
fn bind_scroll(inner: &Rc<RefCell<Inner>>, options: &ScrubOptions) -> bool {
    let Some(capability) = ScrollCapability::detect() else {
        return false;
    };
    tracing::info!(trigger = %options.trigger, lag = options.lag, "binding frame sequence to scroll");

    let last = inner.borrow().player.frames().last_index() as f64;
    let cursor = Object::new();
    gsap::set(&cursor, "frame", 0.0);

    let vars = Object::new();
    gsap::set(&vars, "frame", last);
    gsap::set(&vars, "ease", "none");
    gsap::set(&vars, "scrollTrigger", gsap::sequence_trigger_vars(options));

    let target = Rc::clone(inner);
    let proxy = cursor.clone();
    let on_update = Closure::<dyn FnMut()>::new(move || {
        let Some(value) = Reflect::get(&proxy, &JsValue::from_str("frame"))
            .ok()
            .and_then(|v| v.as_f64())
        else {
            return;
        };
        let effects = target.borrow_mut().player.scrub_update(value);
        apply_effects(&target, effects);
    });
    gsap::set(&vars, "onUpdate", on_update.as_ref().clone());
    on_update.forget();

    match capability.tween(&cursor, &vars) {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(error = ?err, "scroll binding failed");
            false
        }
    }
}
