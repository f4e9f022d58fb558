//! One-shot readiness latch.

/// Event that can start playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadyTrigger {
    /// Enough frames resolved
    Threshold,
    /// The page finished loading
    PageLoad,
    /// The start timeout elapsed
    Timeout,
}

impl ReadyTrigger {
    /// Whether this trigger starts playback regardless of frame progress.
    #[inline]
    pub fn is_forced(&self) -> bool {
        !matches!(self, ReadyTrigger::Threshold)
    }
}

/// Latch satisfied by whichever trigger arrives first.
///
/// ## Example
///
/// ```rust
/// use hero_sequence::{ReadyGate, ReadyTrigger};
///
/// let mut gate = ReadyGate::new();
/// assert!(gate.trigger(ReadyTrigger::PageLoad));
/// assert!(!gate.trigger(ReadyTrigger::Timeout));
/// assert_eq!(gate.fired_by(), Some(ReadyTrigger::PageLoad));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadyGate {
    fired_by: Option<ReadyTrigger>,
}

impl ReadyGate {
    /// Create an open gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a trigger. Returns `true` only for the first one.
    pub fn trigger(&mut self, trigger: ReadyTrigger) -> bool {
        if self.fired_by.is_some() {
            return false;
        }
        self.fired_by = Some(trigger);
        true
    }

    /// Check whether the gate has fired.
    #[inline]
    pub fn is_fired(&self) -> bool {
        self.fired_by.is_some()
    }

    /// The trigger that fired the gate.
    #[inline]
    pub fn fired_by(&self) -> Option<ReadyTrigger> {
        self.fired_by
    }
}
