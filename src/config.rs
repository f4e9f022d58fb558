//! Frame set description and player tunables.

use crate::parallax::ParallaxSettings;
use crate::scrub::{ContentFadeOptions, ScrubOptions};

/// Markup attribute holding the path prefix of every frame.
pub const ATTR_BASE: &str = "data-seq-base";
/// Markup attribute holding the number of frames.
pub const ATTR_COUNT: &str = "data-seq-count";
/// Markup attribute holding the zero-padding width of the frame number.
pub const ATTR_PAD: &str = "data-seq-pad";
/// Markup attribute holding the file extension.
pub const ATTR_EXT: &str = "data-seq-ext";

/// Largest accepted frame count.
pub const MAX_FRAME_COUNT: usize = 10_000;
/// Largest accepted zero-padding width.
pub const MAX_PAD: usize = 16;

/// Error raised when a frame sequence cannot be configured.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required attribute is absent or blank
    #[error("missing required attribute `{0}`")]
    MissingAttribute(&'static str),
    /// A numeric attribute could not be parsed
    #[error("attribute `{attribute}` is not a valid number: {value:?}")]
    InvalidNumber { attribute: &'static str, value: String },
    /// The sequence has no frames
    #[error("frame count must be greater than zero")]
    EmptySequence,
    /// A numeric attribute exceeds its limit
    #[error("attribute `{attribute}` is {value}, above the limit of {max}")]
    TooLarge {
        attribute: &'static str,
        value: usize,
        max: usize,
    },
}

/// Ordered set of still images making up the sequence.
///
/// Frame `i` lives at `base + zero_pad(i, pad) + "." + ext`.
///
/// ## Example
///
/// ```rust
/// use hero_sequence::FrameSet;
///
/// let frames = FrameSet::new("/img/hero/frame_", 24, 3, "webp").unwrap();
/// assert_eq!(frames.frame_src(0).as_deref(), Some("/img/hero/frame_000.webp"));
/// assert_eq!(frames.frame_src(23).as_deref(), Some("/img/hero/frame_023.webp"));
/// assert_eq!(frames.frame_src(24), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameSet {
    /// Path prefix placed before the frame number
    pub base: String,
    /// Number of frames
    pub count: usize,
    /// Minimum digit count of the frame number
    pub pad: usize,
    /// File extension, without the leading dot
    pub ext: String,
}

impl FrameSet {
    /// Create a frame set, normalizing the extension.
    pub fn new(base: impl Into<String>, count: usize, pad: usize, ext: &str) -> Result<Self, ConfigError> {
        let base = base.into();
        if base.trim().is_empty() {
            return Err(ConfigError::MissingAttribute(ATTR_BASE));
        }
        if count == 0 {
            return Err(ConfigError::EmptySequence);
        }
        if count > MAX_FRAME_COUNT {
            return Err(ConfigError::TooLarge {
                attribute: ATTR_COUNT,
                value: count,
                max: MAX_FRAME_COUNT,
            });
        }
        if pad > MAX_PAD {
            return Err(ConfigError::TooLarge {
                attribute: ATTR_PAD,
                value: pad,
                max: MAX_PAD,
            });
        }
        let ext = ext.trim().trim_start_matches('.');
        if ext.is_empty() {
            return Err(ConfigError::MissingAttribute(ATTR_EXT));
        }
        Ok(Self {
            base,
            count,
            pad,
            ext: ext.to_string(),
        })
    }

    /// Read a frame set from markup attributes.
    ///
    /// `lookup` returns the raw value of an attribute such as `data-seq-base`.
    /// All four attributes are required.
    pub fn from_attributes<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = required(&lookup, ATTR_BASE)?;
        let count = parse_number(ATTR_COUNT, &required(&lookup, ATTR_COUNT)?)?;
        let pad = parse_number(ATTR_PAD, &required(&lookup, ATTR_PAD)?)?;
        let ext = required(&lookup, ATTR_EXT)?;
        Self::new(base, count, pad, &ext)
    }

    /// Resource path of frame `index`, or `None` when out of range.
    pub fn frame_src(&self, index: usize) -> Option<String> {
        if index >= self.count {
            return None;
        }
        Some(format!(
            "{}{:0width$}.{}",
            self.base,
            index,
            self.ext,
            width = self.pad
        ))
    }

    /// Iterate over every frame path in order.
    pub fn sources(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.count).filter_map(move |i| self.frame_src(i))
    }

    /// Index of the last frame.
    #[inline]
    pub fn last_index(&self) -> usize {
        self.count.saturating_sub(1)
    }
}

fn required<F>(lookup: &F, attribute: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(attribute) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::MissingAttribute(attribute)),
    }
}

fn parse_number(attribute: &'static str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidNumber {
        attribute,
        value: value.to_string(),
    })
}

/// Tunables for the player and its surrounding hero effects.
///
/// Every field has a default, so a settings file only needs the values
/// it changes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlayerSettings {
    /// Upper bound of the frames that must resolve before playback starts
    pub min_ready_cap: usize,
    /// Playback starts after this delay even if frames are still pending
    pub start_timeout_ms: u32,
    /// Quiet period before a resize is applied
    pub resize_debounce_ms: u32,
    /// Number of frame failures that are logged
    pub failure_log_limit: usize,
    /// Selector of the element holding the canvas and `data-seq-*` attributes
    pub container_selector: String,
    /// Selector of the hero text block
    pub content_selector: String,
    /// Selector of the scroll indicator
    pub indicator_selector: String,
    /// Selector of the section the scroll indicator jumps to
    pub scroll_indicator_target: String,
    /// Scroll binding of the frame sequence
    pub scrub: ScrubOptions,
    /// Scroll binding of the hero text fade
    pub content_fade: ContentFadeOptions,
    /// Pointer parallax of the hero text
    pub parallax: ParallaxSettings,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            min_ready_cap: 10,
            start_timeout_ms: 2000,
            resize_debounce_ms: 150,
            failure_log_limit: 3,
            container_selector: ".hero-sequence".to_string(),
            content_selector: ".hero-content".to_string(),
            indicator_selector: ".scroll-indicator".to_string(),
            scroll_indicator_target: "#servicos".to_string(),
            scrub: ScrubOptions::default(),
            content_fade: ContentFadeOptions::default(),
            parallax: ParallaxSettings::default(),
        }
    }
}

impl PlayerSettings {
    /// Parse settings from a TOML string.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Number of resolved frames required before playback may start.
    #[inline]
    pub fn min_ready(&self, frame_count: usize) -> usize {
        self.min_ready_cap.min(frame_count)
    }
}
