//! Frame rendering.

use crate::geometry::{cover_fit, DrawRect, ViewportGeometry};
use crate::preload::LoadState;

/// A single frame draw, fully resolved in CSS coordinates.
///
/// This is a platform-agnostic representation of what needs to be drawn.
/// Each host interprets it for its rendering backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    /// Frame to draw
    pub index: usize,
    /// Area to clear before drawing, in CSS pixels
    pub clear_width: f64,
    /// Area to clear before drawing, in CSS pixels
    pub clear_height: f64,
    /// Destination of the frame
    pub rect: DrawRect,
}

/// Plan the draw of frame `index`.
///
/// Returns `None` when the frame is out of range, not decoded yet, failed,
/// or the canvas has no geometry. Skipping leaves the previous frame on
/// screen; a blank or partial frame is never produced.
///
/// ## Example
///
/// ```rust
/// use hero_sequence::{LayoutBox, LoadState, ViewportGeometry};
/// use hero_sequence::render::plan_draw;
///
/// let geometry = ViewportGeometry::from_layout(LayoutBox::new(800.0, 400.0), 2.0);
/// let mut load = LoadState::new(24, 10, 3);
/// assert!(plan_draw(0, &load, geometry.as_ref()).is_none());
///
/// load.record_loaded(0, 1600, 800);
/// let cmd = plan_draw(0, &load, geometry.as_ref()).unwrap();
/// assert_eq!((cmd.rect.width, cmd.rect.height), (800.0, 400.0));
/// assert!(plan_draw(24, &load, geometry.as_ref()).is_none());
/// ```
pub fn plan_draw(index: usize, load: &LoadState, geometry: Option<&ViewportGeometry>) -> Option<DrawCommand> {
    let geometry = geometry?;
    let (width, height) = load.drawable_size(index)?;
    let rect = cover_fit(width, height, geometry)?;
    Some(DrawCommand {
        index,
        clear_width: geometry.css_width,
        clear_height: geometry.css_height,
        rect,
    })
}

/// Web-specific rendering implementation.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

    /// Error raised by canvas operations.
    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    pub enum RenderError {
        #[error("failed to get 2d context")]
        Context,
        #[error("no 2d context available")]
        NoContext,
        #[error("failed to set transform")]
        Transform,
        #[error("failed to draw frame {0}")]
        Draw(usize),
    }

    /// Images of the sequence, indexed by frame.
    ///
    /// An entry exists as soon as its fetch is issued; whether it can be
    /// drawn is checked at draw time.
    #[derive(Clone, Debug, Default)]
    pub struct FrameImages {
        images: Vec<Option<HtmlImageElement>>,
    }

    impl FrameImages {
        /// Create an empty store sized for `frame_count` entries.
        pub fn with_frame_count(frame_count: usize) -> Self {
            Self {
                images: vec![None; frame_count],
            }
        }

        /// Store the image element of a frame.
        pub fn store(&mut self, frame_index: usize, image: HtmlImageElement) {
            if let Some(slot) = self.images.get_mut(frame_index) {
                *slot = Some(image);
            }
        }

        /// Get the image element of a frame.
        pub fn get(&self, frame_index: usize) -> Option<&HtmlImageElement> {
            self.images.get(frame_index).and_then(|i| i.as_ref())
        }

        /// Returns `true` when the frame is fully decoded.
        pub fn is_complete(&self, frame_index: usize) -> bool {
            self.get(frame_index)
                .map(|img| img.complete() && img.natural_width() > 0)
                .unwrap_or(false)
        }
    }

    /// Get the opaque 2D context of a canvas.
    pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, RenderError> {
        let options = js_sys::Object::new();
        // An opaque canvas lets the browser skip alpha compositing.
        let _ = js_sys::Reflect::set(&options, &JsValue::from_str("alpha"), &JsValue::FALSE);

        canvas
            .get_context_with_context_options("2d", &options)
            .map_err(|_| RenderError::Context)?
            .ok_or(RenderError::NoContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::Context)
    }

    /// Size the backing store, the CSS box, and the context transform.
    ///
    /// Resizing a canvas resets its context state, so the transform and
    /// smoothing flags are applied afterwards every time.
    pub fn apply_geometry(canvas: &HtmlCanvasElement, ctx: &CanvasRenderingContext2d, geometry: &ViewportGeometry) -> Result<(), RenderError> {
        canvas.set_width(geometry.pixel_width);
        canvas.set_height(geometry.pixel_height);

        let style = canvas.style();
        let _ = style.set_property("width", &format!("{}px", geometry.css_width));
        let _ = style.set_property("height", &format!("{}px", geometry.css_height));

        let [a, b, c, d, e, f] = geometry.transform();
        ctx.set_transform(a, b, c, d, e, f)
            .map_err(|_| RenderError::Transform)?;
        ctx.set_image_smoothing_enabled(true);
        let _ = js_sys::Reflect::set(
            ctx,
            &JsValue::from_str("imageSmoothingQuality"),
            &JsValue::from_str("high"),
        );
        Ok(())
    }

    /// Draw a planned frame.
    ///
    /// Returns `Ok(false)` without touching the canvas when the image is not
    /// fully decoded yet.
    pub fn draw_frame(ctx: &CanvasRenderingContext2d, images: &FrameImages, cmd: &DrawCommand) -> Result<bool, RenderError> {
        if !images.is_complete(cmd.index) {
            return Ok(false);
        }
        let Some(image) = images.get(cmd.index) else {
            return Ok(false);
        };

        ctx.clear_rect(0.0, 0.0, cmd.clear_width, cmd.clear_height);
        ctx.draw_image_with_html_image_element_and_dw_and_dh(
            image,
            cmd.rect.x,
            cmd.rect.y,
            cmd.rect.width,
            cmd.rect.height,
        )
        .map_err(|_| RenderError::Draw(cmd.index))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LayoutBox;

    fn geometry(w: f64, h: f64, dpr: f64) -> ViewportGeometry {
        ViewportGeometry::from_layout(LayoutBox::new(w, h), dpr).unwrap()
    }

    #[test]
    fn plan_uses_css_space() {
        let mut load = LoadState::new(4, 4, 3);
        load.record_loaded(2, 1000, 500);
        let g = geometry(500.0, 500.0, 3.0);

        let cmd = plan_draw(2, &load, Some(&g)).unwrap();
        assert_eq!(cmd.index, 2);
        assert_eq!((cmd.clear_width, cmd.clear_height), (500.0, 500.0));
        assert_eq!(cmd.rect.height, 500.0);
        assert_eq!(cmd.rect.width, 1000.0);
        assert_eq!(cmd.rect.x, -250.0);
    }

    #[test]
    fn skips_frames_that_cannot_be_drawn() {
        let mut load = LoadState::new(3, 3, 3);
        load.record_failed(0);
        load.record_loaded(1, 10, 10);
        let g = geometry(100.0, 100.0, 1.0);

        assert!(plan_draw(0, &load, Some(&g)).is_none()); // failed
        assert!(plan_draw(2, &load, Some(&g)).is_none()); // pending
        assert!(plan_draw(3, &load, Some(&g)).is_none()); // out of range
        assert!(plan_draw(1, &load, None).is_none()); // no geometry
        assert!(plan_draw(1, &load, Some(&g)).is_some());
    }

    #[test]
    fn same_frame_replans_after_resize() {
        let mut load = LoadState::new(1, 1, 3);
        load.record_loaded(0, 200, 100);

        let small = plan_draw(0, &load, Some(&geometry(200.0, 100.0, 1.0))).unwrap();
        let large = plan_draw(0, &load, Some(&geometry(400.0, 200.0, 2.0))).unwrap();
        assert_eq!(small.rect.width, 200.0);
        assert_eq!(large.rect.width, 400.0);
        assert_eq!(large.clear_width, 400.0);
    }
}
