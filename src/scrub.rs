//! Scroll binding: maps scroll progress through the hero region to a
//! frame cursor.
//!
//! The scroll-trigger capability itself (pinning, start/end markers, scrub
//! smoothing) belongs to the host. This module decides when binding is
//! requested, which options are passed, and how cursor updates become
//! frame indices.

/// Continuous playback position in `[0, N-1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackCursor(pub f64);

impl PlaybackCursor {
    /// Frame to display: `round(cursor)` clamped to `[0, count-1]`.
    ///
    /// Returns `None` for an empty sequence or a non-finite cursor.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use hero_sequence::PlaybackCursor;
    ///
    /// assert_eq!(PlaybackCursor(4.5).frame_index(24), Some(5));
    /// assert_eq!(PlaybackCursor(4.49).frame_index(24), Some(4));
    /// assert_eq!(PlaybackCursor(31.0).frame_index(24), Some(23));
    /// assert_eq!(PlaybackCursor(-2.0).frame_index(24), Some(0));
    /// ```
    pub fn frame_index(&self, count: usize) -> Option<usize> {
        if count == 0 || !self.0.is_finite() {
            return None;
        }
        let max = (count - 1) as f64;
        Some(self.0.round().clamp(0.0, max) as usize)
    }

    /// Position as a fraction of the sequence (0.0 - 1.0).
    pub fn progress(&self, count: usize) -> f64 {
        if count < 2 || !self.0.is_finite() {
            return 0.0;
        }
        (self.0 / (count - 1) as f64).clamp(0.0, 1.0)
    }
}

/// Options handed to the host's scroll-trigger capability.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScrubOptions {
    /// Selector of the region that drives playback
    pub trigger: String,
    /// Start marker ("<element edge> <viewport edge>")
    pub start: String,
    /// End marker
    pub end: String,
    /// Seconds the cursor takes to catch up with the scroll position
    pub lag: f64,
    /// Keep the region fixed while it is active
    pub pin: bool,
    /// Pin anticipation factor
    pub anticipate_pin: f64,
}

impl ScrubOptions {
    /// Trigger selector, or `fallback` when none is configured.
    pub fn trigger_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        let trigger = self.trigger.trim();
        if trigger.is_empty() {
            fallback
        } else {
            trigger
        }
    }
}

impl Default for ScrubOptions {
    fn default() -> Self {
        Self {
            trigger: ".hero".to_string(),
            start: "top top".to_string(),
            end: "bottom top".to_string(),
            lag: 0.5,
            pin: true,
            anticipate_pin: 1.0,
        }
    }
}

/// Scroll-driven fade of the hero text block.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContentFadeOptions {
    /// Disable to leave the text block static
    pub enabled: bool,
    /// Vertical travel in CSS pixels at the end of the region
    pub offset_y: f64,
    /// Opacity at the end of the region
    pub opacity: f64,
    /// Easing name understood by the animation host
    pub ease: String,
    /// Scrub lag in seconds
    pub lag: f64,
}

impl Default for ContentFadeOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            offset_y: 200.0,
            opacity: 0.0,
            ease: "power4.out".to_string(),
            lag: 1.0,
        }
    }
}

/// Binding state of the scroll capability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BindState {
    /// Nothing requested yet
    #[default]
    Unbound,
    /// Options handed to the host, awaiting its answer
    Requested,
    /// Scroll updates are flowing
    Bound,
    /// The host has no scroll capability; the first frame stays static
    Unavailable,
}

/// Owns the bind-once guarantee and the current cursor.
///
/// ## Example
///
/// ```rust
/// use hero_sequence::{BindState, ScrollBinder, ScrubOptions};
///
/// let mut binder = ScrollBinder::new(ScrubOptions::default());
/// assert!(binder.request().is_some());
/// assert!(binder.request().is_none());
///
/// binder.confirm(true);
/// assert_eq!(binder.state(), BindState::Bound);
/// assert_eq!(binder.update(11.6, 24), Some(12));
/// ```
#[derive(Clone, Debug)]
pub struct ScrollBinder {
    options: ScrubOptions,
    state: BindState,
    cursor: PlaybackCursor,
}

impl ScrollBinder {
    pub fn new(options: ScrubOptions) -> Self {
        Self {
            options,
            state: BindState::Unbound,
            cursor: PlaybackCursor::default(),
        }
    }

    /// Hand out the bind options, once per binder.
    pub fn request(&mut self) -> Option<ScrubOptions> {
        if self.state != BindState::Unbound {
            return None;
        }
        self.state = BindState::Requested;
        Some(self.options.clone())
    }

    /// Record the host's answer to a bind request.
    pub fn confirm(&mut self, bound: bool) {
        if self.state == BindState::Requested {
            self.state = if bound {
                BindState::Bound
            } else {
                BindState::Unavailable
            };
        }
    }

    /// Move the cursor and return the frame to draw.
    ///
    /// Updates are ignored unless the binding is live.
    pub fn update(&mut self, cursor: f64, count: usize) -> Option<usize> {
        if self.state != BindState::Bound {
            return None;
        }
        self.cursor = PlaybackCursor(cursor);
        self.cursor.frame_index(count)
    }

    #[inline]
    pub fn state(&self) -> BindState {
        self.state
    }

    #[inline]
    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    #[inline]
    pub fn options(&self) -> &ScrubOptions {
        &self.options
    }
}
