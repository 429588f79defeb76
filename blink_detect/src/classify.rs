//! Blink state machine: open → closed → open, one event per blink.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DetectorConfig;

/// A completed blink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlinkEvent {
    /// `true` for a dash, `false` for a dot.
    pub is_long:     bool,
    /// How long the eye stayed closed (ms).  Zero for manual triggers.
    pub duration_ms: u64,
}

impl BlinkEvent {
    /// A blink triggered without a camera (keyboard, button, test harness).
    pub fn manual(is_long: bool) -> Self {
        BlinkEvent { is_long, duration_ms: 0 }
    }

    pub fn short() -> Self {
        Self::manual(false)
    }

    pub fn long() -> Self {
        Self::manual(true)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EyeState {
    Open,
    /// Eye closed since `since_ms`.
    Closed { since_ms: u64 },
}

/// Classifies closures against a calibrated baseline.
///
/// An eye counts as closed when *either* its EAR falls below
/// `closed_ratio × baseline` *or* it sits more than `absolute_drop` under
/// the baseline, so both proportional and absolute dips are caught.
#[derive(Debug, Clone)]
pub struct BlinkClassifier {
    state:         EyeState,
    closed_ratio:  f32,
    absolute_drop: f32,
    long_blink_ms: u64,
    blinks:        u64,
}

impl BlinkClassifier {
    pub fn new(cfg: &DetectorConfig) -> Self {
        BlinkClassifier {
            state:         EyeState::Open,
            closed_ratio:  cfg.closed_ratio,
            absolute_drop: cfg.absolute_drop,
            long_blink_ms: cfg.long_blink_ms,
            blinks:        0,
        }
    }

    /// Whether `ear` reads as a closed eye against `baseline`.
    pub fn is_closed(&self, ear: f32, baseline: f32) -> bool {
        let ratio_closed = baseline > 0.0 && ear / baseline < self.closed_ratio;
        let drop_closed  = baseline - ear > self.absolute_drop;
        ratio_closed || drop_closed
    }

    /// Feed one frame.  Returns an event only on the closed → open edge.
    pub fn update(&mut self, ear: f32, baseline: f32, now_ms: u64) -> Option<BlinkEvent> {
        let closed = self.is_closed(ear, baseline);
        match (self.state, closed) {
            (EyeState::Open, true) => {
                self.state = EyeState::Closed { since_ms: now_ms };
                debug!(ear, baseline, "blink start at {}ms", now_ms);
                None
            }
            (EyeState::Closed { since_ms }, false) => {
                self.state = EyeState::Open;
                let event = self.classify(now_ms.saturating_sub(since_ms));
                self.blinks += 1;
                debug!(
                    duration_ms = event.duration_ms,
                    "blink end: {}",
                    if event.is_long { "dash" } else { "dot" }
                );
                Some(event)
            }
            _ => None,
        }
    }

    /// Dot or dash for a closure of `duration_ms`.  Long is inclusive.
    pub fn classify(&self, duration_ms: u64) -> BlinkEvent {
        BlinkEvent {
            is_long: duration_ms >= self.long_blink_ms,
            duration_ms,
        }
    }

    /// Inject a blink without video input.
    pub fn trigger(&mut self, is_long: bool) -> BlinkEvent {
        self.blinks += 1;
        BlinkEvent::manual(is_long)
    }

    /// Back to open, discarding any blink in progress.
    pub fn reset(&mut self) {
        self.state = EyeState::Open;
    }

    pub fn state(&self) -> EyeState {
        self.state
    }

    pub fn blink_count(&self) -> u64 {
        self.blinks
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: f32 = 0.30;

    fn classifier() -> BlinkClassifier {
        BlinkClassifier::new(&DetectorConfig::default())
    }

    fn blink(c: &mut BlinkClassifier, start: u64, duration: u64) -> Option<BlinkEvent> {
        assert_eq!(c.update(0.05, BASE, start), None);
        c.update(0.30, BASE, start + duration)
    }

    #[test]
    fn boundary_is_inclusive_on_long_side() {
        let mut c = classifier();
        let e = blink(&mut c, 1_000, 399).unwrap();
        assert!(!e.is_long);
        assert_eq!(e.duration_ms, 399);

        let e = blink(&mut c, 5_000, 400).unwrap();
        assert!(e.is_long);
        assert_eq!(e.duration_ms, 400);
    }

    #[test]
    fn stays_silent_while_closed() {
        let mut c = classifier();
        assert_eq!(c.update(0.05, BASE, 0), None);
        for t in 1..20 {
            assert_eq!(c.update(0.04, BASE, t * 33), None);
        }
        assert!(matches!(c.state(), EyeState::Closed { since_ms: 0 }));
        assert!(c.update(0.31, BASE, 700).unwrap().is_long);
        assert_eq!(c.update(0.31, BASE, 733), None);
        assert_eq!(c.blink_count(), 1);
    }

    #[test]
    fn ratio_rule_closes() {
        let c = classifier();
        // 0.11 / 0.30 ≈ 0.37 < 0.4; drop 0.19 > 0.12 as well
        assert!(c.is_closed(0.11, BASE));
        // High baseline: ratio 0.5 is above 0.4, but the drop of 0.25 closes it.
        assert!(c.is_closed(0.25, 0.50));
    }

    #[test]
    fn absolute_rule_closes_when_ratio_does_not() {
        let c = classifier();
        // 0.17 / 0.30 ≈ 0.57, but drop 0.13 > 0.12
        assert!(c.is_closed(0.17, BASE));
        assert!(!c.is_closed(0.19, BASE));
    }

    #[test]
    fn zero_ear_reads_as_closed() {
        let c = classifier();
        assert!(c.is_closed(0.0, BASE));
    }

    #[test]
    fn zero_baseline_relies_on_absolute_rule() {
        let c = classifier();
        assert!(!c.is_closed(0.0, 0.0));
    }

    #[test]
    fn reset_discards_blink_in_progress() {
        let mut c = classifier();
        c.update(0.05, BASE, 0);
        c.reset();
        assert_eq!(c.update(0.30, BASE, 500), None);
    }

    #[test]
    fn manual_trigger_matches_event_shape() {
        let mut c = classifier();
        assert_eq!(c.trigger(true), BlinkEvent { is_long: true, duration_ms: 0 });
        assert_eq!(c.trigger(false), BlinkEvent::short());
        assert_eq!(BlinkEvent::long(), BlinkEvent::manual(true));
        assert_eq!(c.blink_count(), 2);
    }
}
