//! # hero-sequence
//!
//! Scroll-scrubbed image sequence player for canvas hero sections.
//!
//! A precomputed series of still frames plays like a video whose playhead is
//! the page's scroll position. This crate provides platform-agnostic logic for:
//! - Describing the frame set and building frame paths
//! - Tracking preload progress and the one-shot start of playback
//! - Mapping a scroll-driven cursor to a frame index
//! - Sizing a high-DPI canvas and cover-fitting frames into it
//! - Rendering to a browser canvas (with optional web support)
//!
//! ## Features
//!
//! - `serde` - Enable serialization/deserialization for configuration types
//! - `toml` - Read [`PlayerSettings`] from TOML
//! - `web` - Enable browser canvas rendering and DOM wiring
//! - `console_error` - Forward panics to the browser console
//!
//! ## Example
//!
//! ```rust,ignore
//! use hero_sequence::{FrameSet, PlayerSettings, SequencePlayer};
//!
//! let frames = FrameSet::from_attributes(|name| container.get_attribute(name))?;
//! let mut player = SequencePlayer::new(frames, PlayerSettings::default());
//!
//! let effects = player.initialize(Some(layout), device_pixel_ratio);
//! host.apply(effects);
//!
//! // From the frame load callbacks:
//! host.apply(player.frame_loaded(0, width, height));
//!
//! // From the scroll binding:
//! host.apply(player.scrub_update(cursor));
//! ```

mod config;
pub mod geometry;
mod parallax;
mod player;
mod preload;
mod ready;
pub mod render;
mod scrub;

#[cfg(feature = "web")]
pub mod web;

pub use config::{
    ConfigError, FrameSet, PlayerSettings, ATTR_BASE, ATTR_COUNT, ATTR_EXT, ATTR_PAD, MAX_FRAME_COUNT, MAX_PAD,
};
pub use geometry::{cover_fit, DrawRect, LayoutBox, ViewportGeometry};
pub use parallax::{Parallax, ParallaxSettings};
pub use player::{Effect, SequencePlayer};
pub use preload::{FrameStatus, LoadOutcome, LoadState, LoadingProgress};
pub use ready::{ReadyGate, ReadyTrigger};
pub use render::DrawCommand;
pub use scrub::{BindState, ContentFadeOptions, PlaybackCursor, ScrollBinder, ScrubOptions};

#[cfg(feature = "web")]
pub use web::{mount_hero_sequence, HeroSequence};
