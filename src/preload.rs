//! Frame preload bookkeeping.
//!
//! The host issues one fetch per frame, all at once, and reports each
//! completion here. Failures count toward readiness just like successes so
//! a broken frame can never hold playback back.

/// Resolution state of a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    /// Fetch still in flight
    Pending,
    /// Decoded with the given natural size in pixels
    Loaded { width: u32, height: u32 },
    /// Fetch or decode failed
    Failed,
}

impl FrameStatus {
    /// Natural size of the frame when it can be drawn.
    #[inline]
    pub fn drawable_size(&self) -> Option<(u32, u32)> {
        match *self {
            FrameStatus::Loaded { width, height } if width > 0 && height > 0 => Some((width, height)),
            _ => None,
        }
    }

    /// Check whether the frame has resolved either way.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        !matches!(self, FrameStatus::Pending)
    }
}

/// What a single completion report changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadOutcome {
    /// The report resolved a pending frame
    pub counted: bool,
    /// The failure falls within the logging budget
    pub log_failure: bool,
    /// The minimum-ready threshold is reached
    pub threshold_reached: bool,
}

/// Progress counters for a preload session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadingProgress {
    /// Frames decoded successfully
    pub loaded: usize,
    /// Frames that failed
    pub failed: usize,
    /// Frames in the sequence
    pub total: usize,
}

impl LoadingProgress {
    /// Frames resolved either way.
    #[inline]
    pub fn resolved(&self) -> usize {
        self.loaded + self.failed
    }

    /// Resolution percentage (0-100).
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            0
        } else {
            ((self.resolved() as f32 / self.total as f32) * 100.0) as u8
        }
    }

    /// Check whether every frame has resolved.
    pub fn complete(&self) -> bool {
        self.total > 0 && self.resolved() >= self.total
    }

    /// Format a short progress message.
    pub fn message(&self) -> String {
        format!(
            "Loading frames... {} / {} ({}%)",
            self.resolved(),
            self.total,
            self.percent()
        )
    }
}

/// Per-frame load state plus the aggregate readiness counter.
///
/// ## Example
///
/// ```rust
/// use hero_sequence::LoadState;
///
/// let mut state = LoadState::new(3, 2, 3);
/// assert!(!state.record_loaded(0, 1920, 1080).threshold_reached);
/// let outcome = state.record_failed(1);
/// assert!(outcome.threshold_reached);
/// assert!(outcome.log_failure);
/// assert!(state.is_drawable(0));
/// assert!(!state.is_drawable(1));
/// ```
#[derive(Clone, Debug)]
pub struct LoadState {
    frames: Vec<FrameStatus>,
    progress: LoadingProgress,
    min_ready: usize,
    failure_log_limit: usize,
}

impl LoadState {
    /// Create a state for `count` pending frames.
    pub fn new(count: usize, min_ready: usize, failure_log_limit: usize) -> Self {
        Self {
            frames: vec![FrameStatus::Pending; count],
            progress: LoadingProgress {
                total: count,
                ..LoadingProgress::default()
            },
            min_ready: min_ready.min(count),
            failure_log_limit,
        }
    }

    /// Record a successful decode.
    pub fn record_loaded(&mut self, index: usize, width: u32, height: u32) -> LoadOutcome {
        self.record(index, FrameStatus::Loaded { width, height })
    }

    /// Record a failed fetch or decode.
    pub fn record_failed(&mut self, index: usize) -> LoadOutcome {
        self.record(index, FrameStatus::Failed)
    }

    fn record(&mut self, index: usize, status: FrameStatus) -> LoadOutcome {
        let Some(slot) = self.frames.get_mut(index) else {
            return LoadOutcome::default();
        };
        if slot.is_resolved() || !status.is_resolved() {
            return LoadOutcome::default();
        }
        *slot = status;

        let mut outcome = LoadOutcome {
            counted: true,
            ..LoadOutcome::default()
        };
        match status {
            FrameStatus::Failed => {
                self.progress.failed += 1;
                outcome.log_failure = self.progress.failed <= self.failure_log_limit;
            }
            _ => self.progress.loaded += 1,
        }
        outcome.threshold_reached = self.threshold_reached();
        outcome
    }

    /// Check whether enough frames resolved to start playback.
    #[inline]
    pub fn threshold_reached(&self) -> bool {
        self.progress.resolved() >= self.min_ready
    }

    /// Status of frame `index`, `None` when out of range.
    #[inline]
    pub fn status(&self, index: usize) -> Option<FrameStatus> {
        self.frames.get(index).copied()
    }

    /// Check whether frame `index` can be drawn right now.
    #[inline]
    pub fn is_drawable(&self, index: usize) -> bool {
        self.drawable_size(index).is_some()
    }

    /// Natural size of frame `index` if it can be drawn.
    #[inline]
    pub fn drawable_size(&self, index: usize) -> Option<(u32, u32)> {
        self.status(index).and_then(|s| s.drawable_size())
    }

    /// Current progress counters.
    #[inline]
    pub fn progress(&self) -> LoadingProgress {
        self.progress
    }

    /// Number of frames in the sequence.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frames that must resolve before playback may start.
    #[inline]
    pub fn min_ready(&self) -> usize {
        self.min_ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_count_toward_readiness() {
        let mut state = LoadState::new(24, 10, 3);
        for i in 0..9 {
            assert!(!state.record_failed(i).threshold_reached);
        }
        assert!(state.record_loaded(9, 800, 600).threshold_reached);
        assert_eq!(state.progress().failed, 9);
        assert_eq!(state.progress().loaded, 1);
    }

    #[test]
    fn failure_logging_is_bounded() {
        let mut state = LoadState::new(10, 10, 3);
        let logged: Vec<bool> = (0..6).map(|i| state.record_failed(i).log_failure).collect();
        assert_eq!(logged, vec![true, true, true, false, false, false]);
    }

    #[test]
    fn duplicate_and_out_of_range_reports_are_ignored() {
        let mut state = LoadState::new(2, 2, 3);
        assert!(state.record_loaded(0, 10, 10).counted);
        assert!(!state.record_loaded(0, 10, 10).counted);
        assert!(!state.record_failed(0).counted);
        assert!(!state.record_loaded(5, 10, 10).counted);
        assert_eq!(state.progress().resolved(), 1);
        assert_eq!(state.status(0), Some(FrameStatus::Loaded { width: 10, height: 10 }));
        assert_eq!(state.status(5), None);
    }

    #[test]
    fn zero_sized_frames_are_not_drawable() {
        let mut state = LoadState::new(2, 2, 3);
        state.record_loaded(0, 0, 0);
        state.record_loaded(1, 640, 360);
        assert!(!state.is_drawable(0));
        assert_eq!(state.drawable_size(1), Some((640, 360)));
    }

    #[test]
    fn min_ready_never_exceeds_count() {
        let mut state = LoadState::new(3, 10, 3);
        assert_eq!(state.min_ready(), 3);
        state.record_loaded(0, 1, 1);
        state.record_loaded(1, 1, 1);
        assert!(state.record_failed(2).threshold_reached);
    }

    #[test]
    fn progress_percent_and_message() {
        let mut state = LoadState::new(4, 4, 3);
        assert_eq!(state.progress().percent(), 0);
        state.record_loaded(0, 1, 1);
        state.record_failed(1);
        let progress = state.progress();
        assert_eq!(progress.percent(), 50);
        assert!(!progress.complete());
        assert_eq!(progress.message(), "Loading frames... 2 / 4 (50%)");
        state.record_loaded(2, 1, 1);
        state.record_loaded(3, 1, 1);
        assert!(state.progress().complete());
    }
}
