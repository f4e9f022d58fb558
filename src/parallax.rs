//! Pointer parallax for the hero text block.

/// Parallax tunables.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParallaxSettings {
    /// Disable to skip the effect entirely
    pub enabled: bool,
    /// Total travel across the viewport in CSS pixels
    pub strength: f64,
    /// Fraction of the remaining distance covered per animation frame
    pub smoothing: f64,
    /// Viewports at or below this width get no parallax
    pub min_viewport_width: f64,
}

impl Default for ParallaxSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            strength: 20.0,
            smoothing: 0.1,
            min_viewport_width: 768.0,
        }
    }
}

impl ParallaxSettings {
    /// Check whether the effect should run for this viewport.
    pub fn applies(&self, viewport_width: f64, reduced_motion: bool) -> bool {
        self.enabled && !reduced_motion && viewport_width > self.min_viewport_width
    }
}

/// Eased pointer-follow offset.
///
/// ## Example
///
/// ```rust
/// use hero_sequence::{Parallax, ParallaxSettings};
///
/// let mut parallax = Parallax::new(ParallaxSettings::default());
/// parallax.pointer_moved(1000.0, 500.0, 1000.0, 1000.0);
/// assert_eq!(parallax.target(), (10.0, 0.0));
///
/// let (x, _) = parallax.step();
/// assert!((x - 1.0).abs() < 1e-9);
/// ```
#[derive(Clone, Debug)]
pub struct Parallax {
    settings: ParallaxSettings,
    target: (f64, f64),
    current: (f64, f64),
}

impl Parallax {
    pub fn new(settings: ParallaxSettings) -> Self {
        Self {
            settings,
            target: (0.0, 0.0),
            current: (0.0, 0.0),
        }
    }

    /// Retarget from a pointer position in viewport coordinates.
    pub fn pointer_moved(&mut self, x: f64, y: f64, viewport_width: f64, viewport_height: f64) {
        if viewport_width <= 0.0 || viewport_height <= 0.0 {
            return;
        }
        let strength = self.settings.strength;
        self.target = (
            (x / viewport_width - 0.5) * strength,
            (y / viewport_height - 0.5) * strength,
        );
    }

    /// Advance one animation frame and return the new offset.
    pub fn step(&mut self) -> (f64, f64) {
        let k = self.settings.smoothing.clamp(0.0, 1.0);
        self.current.0 += (self.target.0 - self.current.0) * k;
        self.current.1 += (self.target.1 - self.current.1) * k;
        self.current
    }

    #[inline]
    pub fn target(&self) -> (f64, f64) {
        self.target
    }

    #[inline]
    pub fn current(&self) -> (f64, f64) {
        self.current
    }

    /// CSS transform for the current offset.
    pub fn css_transform(&self) -> String {
        format!("translate({}px, {}px)", self.current.0, self.current.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_on_target() {
        let mut parallax = Parallax::new(ParallaxSettings::default());
        parallax.pointer_moved(0.0, 0.0, 800.0, 600.0);
        assert_eq!(parallax.target(), (-10.0, -10.0));
        for _ in 0..200 {
            parallax.step();
        }
        let (x, y) = parallax.current();
        assert!((x + 10.0).abs() < 1e-6);
        assert!((y + 10.0).abs() < 1e-6);
    }

    #[test]
    fn centered_pointer_has_no_offset() {
        let mut parallax = Parallax::new(ParallaxSettings::default());
        parallax.pointer_moved(400.0, 300.0, 800.0, 600.0);
        assert_eq!(parallax.step(), (0.0, 0.0));
        assert_eq!(parallax.css_transform(), "translate(0px, 0px)");
    }

    #[test]
    fn degenerate_viewport_keeps_target() {
        let mut parallax = Parallax::new(ParallaxSettings::default());
        parallax.pointer_moved(10.0, 10.0, 0.0, 600.0);
        assert_eq!(parallax.target(), (0.0, 0.0));
    }

    #[test]
    fn applies_only_on_wide_viewports_without_reduced_motion() {
        let settings = ParallaxSettings::default();
        assert!(settings.applies(1024.0, false));
        assert!(!settings.applies(768.0, false));
        assert!(!settings.applies(1024.0, true));

        let off = ParallaxSettings { enabled: false, ..Default::default() };
        assert!(!off.applies(1920.0, false));
    }
}
