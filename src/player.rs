//! Sequence player: ties preload, readiness, scroll binding, and rendering
//! together.
//!
//! The player never touches the host. Each entry point returns the
//! [`Effect`]s the host must apply, in order.

use crate::config::{FrameSet, PlayerSettings};
use crate::geometry::{LayoutBox, ViewportGeometry};
use crate::preload::{LoadState, LoadingProgress};
use crate::ready::{ReadyGate, ReadyTrigger};
use crate::render::{plan_draw, DrawCommand};
use crate::scrub::{BindState, ScrollBinder, ScrubOptions};

/// Work the host performs on behalf of the player.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Resize the canvas backing store and reapply the transform
    ApplyGeometry(ViewportGeometry),
    /// Draw one frame
    Draw(DrawCommand),
    /// Measure the container and call [`SequencePlayer::resize`]
    Measure,
    /// Bind the scroll capability, then call [`SequencePlayer::scroll_bound`]
    BindScroll(ScrubOptions),
}

/// Scroll-scrubbed frame sequence player.
///
/// ## Example
///
/// ```rust
/// use hero_sequence::{Effect, FrameSet, LayoutBox, PlayerSettings, SequencePlayer};
///
/// let frames = FrameSet::new("/hero/", 24, 3, "png").unwrap();
/// let mut player = SequencePlayer::new(frames, PlayerSettings::default());
///
/// // Geometry is applied even though nothing has loaded yet.
/// let effects = player.initialize(Some(LayoutBox::new(1280.0, 720.0)), 2.0);
/// assert!(matches!(effects.as_slice(), [Effect::ApplyGeometry(_)]));
///
/// // Frame 0 is drawn as soon as it arrives.
/// let effects = player.frame_loaded(0, 1920, 1080);
/// assert!(matches!(effects.as_slice(), [Effect::Draw(cmd)] if cmd.index == 0));
///
/// // A forced start measures, then asks for the scroll binding.
/// let effects = player.page_loaded();
/// assert!(matches!(effects.as_slice(), [Effect::Measure, Effect::BindScroll(_)]));
/// ```
#[derive(Clone, Debug)]
pub struct SequencePlayer {
    frames: FrameSet,
    settings: PlayerSettings,
    load: LoadState,
    gate: ReadyGate,
    binder: ScrollBinder,
    geometry: Option<ViewportGeometry>,
    current_frame: usize,
    initialized: bool,
}

impl SequencePlayer {
    /// Create a player for a frame set.
    pub fn new(frames: FrameSet, settings: PlayerSettings) -> Self {
        let load = LoadState::new(
            frames.count,
            settings.min_ready(frames.count),
            settings.failure_log_limit,
        );
        let binder = ScrollBinder::new(settings.scrub.clone());
        Self {
            frames,
            settings,
            load,
            gate: ReadyGate::new(),
            binder,
            geometry: None,
            current_frame: 0,
            initialized: false,
        }
    }

    /// One-time setup: size the canvas and show frame 0 if it is already
    /// decoded. Later calls do nothing.
    #[tracing::instrument(level = "debug", skip(self), fields(count = self.frames.count))]
    pub fn initialize(&mut self, layout: Option<LayoutBox>, dpr: f64) -> Vec<Effect> {
        if self.initialized {
            tracing::debug!("sequence already initialized");
            return Vec::new();
        }
        self.initialized = true;
        tracing::info!(
            base = %self.frames.base,
            count = self.frames.count,
            pad = self.frames.pad,
            ext = %self.frames.ext,
            "frame sequence configured"
        );

        let mut effects = self.resize(layout, dpr);
        if !effects.iter().any(|e| matches!(e, Effect::Draw(_))) {
            effects.extend(self.draw(0));
        }
        effects
    }

    /// Recompute geometry from the container and redraw the active frame.
    ///
    /// An empty layout box leaves the previous geometry in place.
    pub fn resize(&mut self, layout: Option<LayoutBox>, dpr: f64) -> Vec<Effect> {
        let Some(geometry) = layout.and_then(|l| ViewportGeometry::from_layout(l, dpr)) else {
            tracing::debug!(?layout, "container has no layout box, skipping resize");
            return Vec::new();
        };
        self.geometry = Some(geometry);

        let mut effects = vec![Effect::ApplyGeometry(geometry)];
        effects.extend(self.draw(self.current_frame));
        effects
    }

    /// Report a decoded frame.
    pub fn frame_loaded(&mut self, index: usize, width: u32, height: u32) -> Vec<Effect> {
        let outcome = self.load.record_loaded(index, width, height);
        if !outcome.counted {
            return Vec::new();
        }

        let mut effects = Vec::new();
        if index == 0 {
            tracing::debug!("first frame decoded, drawing");
            effects.extend(self.draw(0));
        }
        if outcome.threshold_reached {
            effects.extend(self.ready(ReadyTrigger::Threshold));
        }
        effects
    }

    /// Report a frame that failed to load.
    pub fn frame_failed(&mut self, index: usize) -> Vec<Effect> {
        let outcome = self.load.record_failed(index);
        if !outcome.counted {
            return Vec::new();
        }
        if outcome.log_failure {
            tracing::error!(
                index,
                src = self.frames.frame_src(index).as_deref().unwrap_or_default(),
                "failed to load frame"
            );
        }
        if outcome.threshold_reached {
            return self.ready(ReadyTrigger::Threshold);
        }
        Vec::new()
    }

    /// The page finished loading.
    pub fn page_loaded(&mut self) -> Vec<Effect> {
        self.ready(ReadyTrigger::PageLoad)
    }

    /// The start timeout elapsed.
    pub fn start_timeout_elapsed(&mut self) -> Vec<Effect> {
        if !self.gate.is_fired() {
            tracing::warn!(
                timeout_ms = self.settings.start_timeout_ms,
                resolved = self.load.progress().resolved(),
                "start timeout reached, forcing playback"
            );
        }
        self.ready(ReadyTrigger::Timeout)
    }

    /// Record whether the host managed to bind the scroll capability.
    pub fn scroll_bound(&mut self, bound: bool) {
        if !bound && self.binder.state() == BindState::Requested {
            tracing::warn!("scroll capability unavailable, keeping a static first frame");
        }
        self.binder.confirm(bound);
    }

    /// New cursor value from the scroll binding.
    pub fn scrub_update(&mut self, cursor: f64) -> Vec<Effect> {
        let Some(index) = self.binder.update(cursor, self.frames.count) else {
            return Vec::new();
        };
        self.current_frame = index;
        self.draw(index).into_iter().collect()
    }

    fn ready(&mut self, trigger: ReadyTrigger) -> Vec<Effect> {
        if !self.gate.trigger(trigger) {
            return Vec::new();
        }
        tracing::info!(
            ?trigger,
            resolved = self.load.progress().resolved(),
            min_ready = self.load.min_ready(),
            "sequence ready"
        );

        let mut effects = vec![Effect::Measure];
        effects.extend(self.binder.request().map(|mut options| {
            options.trigger = options.trigger_or(&self.settings.container_selector).to_string();
            Effect::BindScroll(options)
        }));
        effects
    }

    fn draw(&self, index: usize) -> Option<Effect> {
        plan_draw(index, &self.load, self.geometry.as_ref()).map(Effect::Draw)
    }

    /// The frame set being played.
    #[inline]
    pub fn frames(&self) -> &FrameSet {
        &self.frames
    }

    #[inline]
    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    /// Index of the frame selected by the last cursor update.
    #[inline]
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    #[inline]
    pub fn geometry(&self) -> Option<&ViewportGeometry> {
        self.geometry.as_ref()
    }

    #[inline]
    pub fn progress(&self) -> LoadingProgress {
        self.load.progress()
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.gate.is_fired()
    }

    #[inline]
    pub fn ready_trigger(&self) -> Option<ReadyTrigger> {
        self.gate.fired_by()
    }

    #[inline]
    pub fn bind_state(&self) -> BindState {
        self.binder.state()
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(count: usize) -> SequencePlayer {
        let frames = FrameSet::new("/seq/", count, 3, "png").unwrap();
        SequencePlayer::new(frames, PlayerSettings::default())
    }

    fn layout() -> Option<LayoutBox> {
        Some(LayoutBox::new(800.0, 600.0))
    }

    fn draws(effects: &[Effect]) -> Vec<usize> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Draw(cmd) => Some(cmd.index),
                _ => None,
            })
            .collect()
    }

    fn bind_requests(effects: &[Effect]) -> usize {
        effects
            .iter()
            .filter(|e| matches!(e, Effect::BindScroll(_)))
            .count()
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut p = player(24);
        let first = p.initialize(layout(), 1.0);
        assert_eq!(first.len(), 1);
        assert!(p.initialize(layout(), 1.0).is_empty());
        assert!(p.is_initialized());
    }

    #[test]
    fn resize_before_any_frame_sizes_canvas() {
        let mut p = player(24);
        let effects = p.initialize(layout(), 2.0);
        match effects.as_slice() {
            [Effect::ApplyGeometry(g)] => {
                assert_eq!((g.pixel_width, g.pixel_height), (1600, 1200));
                assert_eq!(g.dpr, 2.0);
            }
            other => panic!("unexpected effects {other:?}"),
        }
        assert!(draws(&effects).is_empty());
    }

    #[test]
    fn initialize_without_layout_does_not_fail() {
        let mut p = player(24);
        assert!(p.initialize(None, 1.0).is_empty());
        assert!(p.geometry().is_none());
        // Frame 0 arriving without geometry cannot draw yet
        assert!(draws(&p.frame_loaded(0, 100, 100)).is_empty());
        // The later measure picks it up
        let effects = p.resize(layout(), 1.0);
        assert_eq!(draws(&effects), vec![0]);
    }

    #[test]
    fn frame_zero_draws_before_readiness() {
        let mut p = player(24);
        p.initialize(layout(), 1.0);
        let effects = p.frame_loaded(0, 1920, 1080);
        assert_eq!(draws(&effects), vec![0]);
        assert!(!p.is_ready());
    }

    #[test]
    fn other_frames_do_not_draw_on_load() {
        let mut p = player(24);
        p.initialize(layout(), 1.0);
        assert!(p.frame_loaded(3, 1920, 1080).is_empty());
    }

    #[test]
    fn failed_frame_zero_keeps_canvas_untouched() {
        let mut p = player(24);
        p.initialize(layout(), 1.0);
        assert!(p.frame_failed(0).is_empty());
        assert!(p.frame_loaded(1, 640, 480).is_empty());
        // Nothing drawable at index 0, resize draws nothing
        let effects = p.resize(layout(), 1.0);
        assert!(draws(&effects).is_empty());
    }

    #[test]
    fn threshold_starts_playback_once() {
        let mut p = player(24);
        p.initialize(layout(), 1.0);
        let mut requests = 0;
        for i in 0..9 {
            let effects = p.frame_loaded(i, 100, 100);
            requests += bind_requests(&effects);
        }
        assert!(!p.is_ready());
        let effects = p.frame_failed(9);
        assert_eq!(effects.first(), Some(&Effect::Measure));
        requests += bind_requests(&effects);
        for i in 10..24 {
            requests += bind_requests(&p.frame_loaded(i, 100, 100));
        }
        requests += bind_requests(&p.page_loaded());
        requests += bind_requests(&p.start_timeout_elapsed());
        assert_eq!(requests, 1);
        assert_eq!(p.ready_trigger(), Some(ReadyTrigger::Threshold));
    }

    #[test]
    fn timeout_forces_start_when_frames_stall() {
        let mut p = player(24);
        p.initialize(layout(), 1.0);
        p.frame_loaded(0, 100, 100);
        let effects = p.start_timeout_elapsed();
        assert_eq!(bind_requests(&effects), 1);
        assert_eq!(p.ready_trigger(), Some(ReadyTrigger::Timeout));
        assert!(p.page_loaded().is_empty());
    }

    #[test]
    fn scrub_updates_draw_rounded_clamped_frame() {
        let mut p = player(24);
        p.initialize(layout(), 1.0);
        for i in 0..24 {
            p.frame_loaded(i, 100, 100);
        }
        p.scroll_bound(true);
        assert_eq!(draws(&p.scrub_update(6.5)), vec![7]);
        assert_eq!(p.current_frame(), 7);
        assert_eq!(draws(&p.scrub_update(30.0)), vec![23]);
        assert_eq!(draws(&p.scrub_update(-1.0)), vec![0]);
    }

    #[test]
    fn scrub_to_missing_frame_keeps_previous() {
        let mut p = player(4);
        p.initialize(layout(), 1.0);
        p.frame_loaded(0, 100, 100);
        p.frame_failed(1);
        p.frame_loaded(2, 100, 100);
        p.frame_loaded(3, 100, 100);
        p.scroll_bound(true);
        assert!(p.scrub_update(1.2).is_empty());
        assert_eq!(draws(&p.scrub_update(2.0)), vec![2]);
    }

    #[test]
    fn resize_redraws_active_frame() {
        let mut p = player(4);
        p.initialize(layout(), 1.0);
        for i in 0..4 {
            p.frame_loaded(i, 100, 100);
        }
        p.scroll_bound(true);
        p.scrub_update(2.0);

        let effects = p.resize(Some(LayoutBox::new(400.0, 300.0)), 3.0);
        assert_eq!(effects.len(), 2);
        assert_eq!(draws(&effects), vec![2]);
        match &effects[1] {
            Effect::Draw(cmd) => assert_eq!(cmd.clear_width, 400.0),
            other => panic!("unexpected effect {other:?}"),
        }
    }

    #[test]
    fn missing_capability_keeps_first_frame_static() {
        let mut p = player(24);
        p.initialize(layout(), 1.0);
        p.frame_loaded(0, 100, 100);
        p.frame_loaded(5, 100, 100);
        p.page_loaded();
        p.scroll_bound(false);
        assert_eq!(p.bind_state(), BindState::Unavailable);
        assert!(p.scrub_update(5.0).is_empty());
        assert_eq!(p.current_frame(), 0);
    }

    #[test]
    fn empty_trigger_binds_to_container() {
        let frames = FrameSet::new("/seq/", 4, 3, "png").unwrap();
        let mut settings = PlayerSettings::default();
        settings.scrub.trigger = "  ".into();
        let mut p = SequencePlayer::new(frames, settings);
        match p.page_loaded().as_slice() {
            [Effect::Measure, Effect::BindScroll(options)] => assert_eq!(options.trigger, ".hero-sequence"),
            other => panic!("unexpected effects {other:?}"),
        }
    }

    #[test]
    fn progress_reflects_reports() {
        let mut p = player(4);
        p.frame_loaded(0, 1, 1);
        p.frame_failed(1);
        let progress = p.progress();
        assert_eq!(progress.loaded, 1);
        assert_eq!(progress.failed, 1);
        assert_eq!(progress.total, 4);
    }
}
