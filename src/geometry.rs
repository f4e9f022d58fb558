//! Canvas geometry: backing-store sizing and cover fitting.

/// Layout box of the canvas container in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutBox {
    pub width: f64,
    pub height: f64,
}

impl LayoutBox {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A box with no area cannot size the canvas.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// Canvas dimensions in both coordinate spaces.
///
/// Drawing happens in CSS space; the backing store is `css * dpr` physical
/// pixels and the context carries a `dpr` scale transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportGeometry {
    /// Width in CSS pixels
    pub css_width: f64,
    /// Height in CSS pixels
    pub css_height: f64,
    /// Device pixel ratio used for the backing store
    pub dpr: f64,
    /// Backing-store width in physical pixels
    pub pixel_width: u32,
    /// Backing-store height in physical pixels
    pub pixel_height: u32,
}

impl ViewportGeometry {
    /// Derive geometry from a layout box and the current device pixel ratio.
    ///
    /// Returns `None` for an empty layout box.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use hero_sequence::{LayoutBox, ViewportGeometry};
    ///
    /// let geometry = ViewportGeometry::from_layout(LayoutBox::new(375.0, 667.0), 2.0).unwrap();
    /// assert_eq!((geometry.pixel_width, geometry.pixel_height), (750, 1334));
    /// assert_eq!(geometry.transform(), [2.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
    /// ```
    pub fn from_layout(layout: LayoutBox, dpr: f64) -> Option<Self> {
        if layout.is_empty() {
            return None;
        }
        let dpr = normalize_dpr(dpr);
        Some(Self {
            css_width: layout.width,
            css_height: layout.height,
            dpr,
            pixel_width: (layout.width * dpr).round() as u32,
            pixel_height: (layout.height * dpr).round() as u32,
        })
    }

    /// Context transform mapping CSS coordinates to physical pixels,
    /// as `[a, b, c, d, e, f]`.
    #[inline]
    pub fn transform(&self) -> [f64; 6] {
        [self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0]
    }
}

/// Fall back to 1 for a missing or nonsensical device pixel ratio.
#[inline]
pub fn normalize_dpr(dpr: f64) -> f64 {
    if dpr.is_finite() && dpr > 0.0 {
        dpr
    } else {
        1.0
    }
}

/// Destination rectangle in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Scale an image so it covers the whole canvas, centered, keeping its
/// aspect ratio. Overflow is left for the canvas to clip.
///
/// Returns `None` when either side has no area.
pub fn cover_fit(image_width: u32, image_height: u32, geometry: &ViewportGeometry) -> Option<DrawRect> {
    if image_width == 0 || image_height == 0 {
        return None;
    }
    let (cw, ch) = (geometry.css_width, geometry.css_height);
    if !(cw > 0.0 && ch > 0.0) {
        return None;
    }

    let iw = image_width as f64;
    let ih = image_height as f64;
    let scale = (cw / iw).max(ch / ih);
    let width = iw * scale;
    let height = ih * scale;

    Some(DrawRect {
        x: (cw - width) / 2.0,
        y: (ch - height) / 2.0,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(w: f64, h: f64) -> ViewportGeometry {
        ViewportGeometry::from_layout(LayoutBox::new(w, h), 1.0).unwrap()
    }

    #[test]
    fn backing_store_follows_dpr() {
        let g = ViewportGeometry::from_layout(LayoutBox::new(100.5, 50.0), 1.5).unwrap();
        assert_eq!(g.pixel_width, 151); // 150.75 rounds up
        assert_eq!(g.pixel_height, 75);
        assert_eq!(g.css_width, 100.5);
    }

    #[test]
    fn invalid_dpr_falls_back_to_one() {
        let g = ViewportGeometry::from_layout(LayoutBox::new(10.0, 10.0), 0.0).unwrap();
        assert_eq!(g.dpr, 1.0);
        let g = ViewportGeometry::from_layout(LayoutBox::new(10.0, 10.0), f64::NAN).unwrap();
        assert_eq!(g.dpr, 1.0);
    }

    #[test]
    fn empty_layout_has_no_geometry() {
        assert!(ViewportGeometry::from_layout(LayoutBox::new(0.0, 300.0), 2.0).is_none());
        assert!(ViewportGeometry::from_layout(LayoutBox::new(300.0, -1.0), 2.0).is_none());
    }

    #[test]
    fn cover_fit_wide_image_in_tall_canvas() {
        // 1920x1080 into 400x800: height bound, scale = 800/1080
        let rect = cover_fit(1920, 1080, &geometry(400.0, 800.0)).unwrap();
        assert!((rect.height - 800.0).abs() < 1e-9);
        assert!((rect.width - 1920.0 * 800.0 / 1080.0).abs() < 1e-9);
        assert!((rect.x - (400.0 - rect.width) / 2.0).abs() < 1e-9);
        assert!(rect.x < 0.0);
        assert!(rect.y.abs() < 1e-9);
    }

    #[test]
    fn cover_fit_tall_image_in_wide_canvas() {
        let rect = cover_fit(500, 1000, &geometry(1000.0, 500.0)).unwrap();
        assert_eq!(rect.width, 1000.0);
        assert_eq!(rect.height, 2000.0);
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, -750.0);
    }

    #[test]
    fn cover_fit_same_aspect_fills_exactly() {
        let rect = cover_fit(160, 90, &geometry(1280.0, 720.0)).unwrap();
        assert_eq!(rect, DrawRect { x: 0.0, y: 0.0, width: 1280.0, height: 720.0 });
    }

    #[test]
    fn cover_fit_ignores_empty_images() {
        assert!(cover_fit(0, 100, &geometry(10.0, 10.0)).is_none());
    }
}
