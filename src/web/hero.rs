//! Hero effects around the sequence: scroll fade and pointer parallax of the
//! text block, and the scroll indicator.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Object;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, MouseEvent, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, Window};

use super::gsap::{self, ScrollCapability};
use crate::config::PlayerSettings;
use crate::parallax::Parallax;

/// Marks the document once the hero effects are installed.
pub const INSTALLED_ATTR: &str = "data-hero-effects";

/// Install every hero effect whose elements are present. Later calls do
/// nothing.
pub(super) fn install(settings: &PlayerSettings) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    let Some(root) = document.document_element() else {
        return;
    };
    if root.has_attribute(INSTALLED_ATTR) {
        tracing::debug!("hero effects already installed");
        return;
    }
    let _ = root.set_attribute(INSTALLED_ATTR, "");

    bind_content_fade(&document, settings);
    start_parallax(&window, &document, settings);
    bind_scroll_indicator(&document, settings);
}

fn query_html(document: &Document, selector: &str) -> Option<HtmlElement> {
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

fn bind_content_fade(document: &Document, settings: &PlayerSettings) {
    let fade = &settings.content_fade;
    if !fade.enabled {
        return;
    }
    let Some(content) = query_html(document, &settings.content_selector) else {
        return;
    };
    let Some(capability) = ScrollCapability::detect() else {
        return;
    };

    let scrub = &settings.scrub;
    let vars = Object::new();
    gsap::set(
        &vars,
        "scrollTrigger",
        gsap::scroll_trigger_vars(
            scrub.trigger_or(&settings.container_selector),
            &scrub.start,
            &scrub.end,
            fade.lag,
        ),
    );
    gsap::set(&vars, "y", fade.offset_y);
    gsap::set(&vars, "opacity", fade.opacity);
    gsap::set(&vars, "ease", fade.ease.as_str());

    if let Err(err) = capability.tween(&content, &vars) {
        tracing::warn!(error = ?err, "content fade binding failed");
    }
}

fn prefers_reduced_motion(window: &Window) -> bool {
    window
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .map(|mql| mql.matches())
        .unwrap_or(false)
}

fn viewport_size(window: &Window) -> (f64, f64) {
    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (width, height)
}

fn start_parallax(window: &Window, document: &Document, settings: &PlayerSettings) {
    let (width, _) = viewport_size(window);
    if !settings.parallax.applies(width, prefers_reduced_motion(window)) {
        tracing::debug!(width, "pointer parallax disabled");
        return;
    }
    let Some(content) = query_html(document, &settings.content_selector) else {
        return;
    };

    let parallax = Rc::new(RefCell::new(Parallax::new(settings.parallax.clone())));

    let state = Rc::clone(&parallax);
    let view = window.clone();
    let on_move = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
        let (w, h) = viewport_size(&view);
        state
            .borrow_mut()
            .pointer_moved(event.client_x() as f64, event.client_y() as f64, w, h);
    });
    let _ = document.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref());
    on_move.forget();

    // Self-rescheduling animation frame loop.
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let handle = Rc::clone(&tick);
    let frame_window = window.clone();
    *tick.borrow_mut() = Some(Closure::<dyn FnMut()>::new(move || {
        let transform = {
            let mut p = parallax.borrow_mut();
            p.step();
            p.css_transform()
        };
        let _ = content.style().set_property("transform", &transform);

        if let Some(cb) = handle.borrow().as_ref() {
            let _ = frame_window.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }));
    let first = tick.borrow();
    if let Some(cb) = first.as_ref() {
        let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

fn bind_scroll_indicator(document: &Document, settings: &PlayerSettings) {
    let Some(indicator) = query_html(document, &settings.indicator_selector) else {
        return;
    };

    let target_selector = settings.scroll_indicator_target.clone();
    let doc = document.clone();
    let on_click = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
        let Some(section) = doc.query_selector(&target_selector).ok().flatten() else {
            return;
        };
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        section.scroll_into_view_with_scroll_into_view_options(&options);
    });
    let _ = indicator.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
    on_click.forget();
}
