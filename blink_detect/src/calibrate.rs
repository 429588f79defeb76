//! Open-eye baseline calibration.
//!
//! The first few seconds of a session are spent learning what "open" looks
//! like for this face, camera and lighting.  Calibration finishes when
//! either enough samples have arrived or the timeout elapses, whichever
//! comes first, so a session that rarely sees a face still gets a baseline.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::config::DetectorConfig;

/// Why calibration finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    SampleTarget,
    Timeout,
}

/// Collects EAR samples and derives the baseline once.
#[derive(Debug, Clone)]
pub struct Calibrator {
    window:      VecDeque<f32>,
    capacity:    usize,
    target:      usize,
    min_robust:  usize,
    timeout_ms:  u64,
    fallback:    f32,

    /// Total samples seen since the last reset (not capped by the window).
    seen:        usize,
    started_at:  Option<u64>,
    baseline:    Option<f32>,
    completion:  Option<Completion>,
}

impl Calibrator {
    pub fn new(cfg: &DetectorConfig) -> Self {
        let capacity = cfg.calibration_window.max(1);
        Calibrator {
            window:     VecDeque::with_capacity(capacity),
            capacity,
            target:     cfg.calibration_samples.max(1),
            min_robust: cfg.min_robust_samples,
            timeout_ms: cfg.calibration_timeout_ms,
            fallback:   cfg.fallback_baseline,
            seen:       0,
            started_at: None,
            baseline:   None,
            completion: None,
        }
    }

    /// Feed one EAR sample.  Ignored once calibrated.
    pub fn observe(&mut self, ear: f32, now_ms: u64) {
        if self.is_ready() {
            return;
        }
        self.started_at.get_or_insert(now_ms);

        if self.window.len() >= self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(ear);
        self.seen += 1;

        if self.seen >= self.target {
            self.finish(Completion::SampleTarget);
        } else {
            self.poll(now_ms);
        }
    }

    /// Check the timeout without a new sample.  Returns `true` once ready.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if self.is_ready() {
            return true;
        }
        let started = *self.started_at.get_or_insert(now_ms);
        if now_ms.saturating_sub(started) >= self.timeout_ms {
            self.finish(Completion::Timeout);
        }
        self.is_ready()
    }

    pub fn is_ready(&self) -> bool {
        self.baseline.is_some()
    }

    /// The calibrated open-eye EAR, once ready.
    pub fn baseline(&self) -> Option<f32> {
        self.baseline
    }

    pub fn completion(&self) -> Option<Completion> {
        self.completion
    }

    /// Fraction of the sample target collected so far (1.0 when ready).
    pub fn progress(&self) -> f32 {
        if self.is_ready() {
            return 1.0;
        }
        (self.seen.min(self.target) as f32) / self.target as f32
    }

    /// Forget everything and calibrate again from the next sample.
    pub fn reset(&mut self) {
        self.window.clear();
        self.seen = 0;
        self.started_at = None;
        self.baseline = None;
        self.completion = None;
        debug!("calibration reset");
    }

    fn finish(&mut self, completion: Completion) {
        let samples: Vec<f32> = self.window.iter().copied().collect();
        let baseline = robust_baseline(&samples, self.min_robust, self.fallback);

        if samples.is_empty() {
            warn!(baseline, "calibration timed out with no face; using fallback baseline");
        } else if samples.len() < self.min_robust {
            warn!(samples = samples.len(), baseline, "calibration timed out with few samples; using plain mean");
        } else {
            info!(samples = samples.len(), baseline, ?completion, "calibration complete");
        }

        self.baseline = Some(baseline);
        self.completion = Some(completion);
    }
}

/// Interquartile mean of `samples`.
///
/// * no samples → `fallback`
/// * fewer than `min_robust` → plain mean
/// * otherwise → mean of the middle half after sorting, or the median if
///   that slice is empty
pub fn robust_baseline(samples: &[f32], min_robust: usize, fallback: f32) -> f32 {
    if samples.is_empty() {
        return fallback;
    }
    if samples.len() < min_robust {
        return mean(samples);
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let quarter = n / 4;
    let middle = &sorted[quarter..n - quarter];
    if middle.is_empty() {
        median(&sorted)
    } else {
        mean(middle)
    }
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

fn median(sorted: &[f32]) -> f32 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn calibrator() -> Calibrator {
        Calibrator::new(&DetectorConfig::default())
    }

    #[test]
    fn completes_on_sample_target() {
        let mut cal = calibrator();
        for i in 0..29 {
            cal.observe(0.3, i * 66);
            assert!(!cal.is_ready());
        }
        cal.observe(0.3, 29 * 66);
        assert!(cal.is_ready());
        assert_eq!(cal.completion(), Some(Completion::SampleTarget));
        assert!((cal.baseline().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn completes_on_timeout_with_sparse_samples() {
        let mut cal = calibrator();
        for i in 0..10 {
            cal.observe(0.28, i * 400);
        }
        assert!(!cal.is_ready());
        assert!(cal.poll(5_000));
        assert_eq!(cal.completion(), Some(Completion::Timeout));
        assert!((cal.baseline().unwrap() - 0.28).abs() < 1e-6);
    }

    #[test]
    fn timeout_without_any_face_uses_fallback() {
        let mut cal = calibrator();
        assert!(!cal.poll(1_000));
        assert!(!cal.poll(5_999));
        assert!(cal.poll(6_000));
        assert_eq!(cal.baseline(), Some(0.30));
    }

    #[test]
    fn few_samples_use_plain_mean() {
        assert!((robust_baseline(&[0.2, 0.4], 5, 0.3) - 0.3).abs() < 1e-6);
        assert!((robust_baseline(&[0.1, 0.2, 0.3, 0.4], 5, 0.3) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn interquartile_mean_drops_extremes() {
        // 8 samples: quarter = 2, middle = [0.3, 0.3, 0.3, 0.3]
        let s = [0.01, 0.3, 0.3, 0.99, 0.3, 0.02, 0.3, 0.95];
        assert!((robust_baseline(&s, 5, 0.0) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn two_outliers_in_thirty_two_do_not_move_the_baseline() {
        let steady: Vec<f32> = (0..30).map(|i| [0.24, 0.25, 0.26][i % 3]).collect();
        let clean = robust_baseline(&steady, 5, 0.0);

        let mut noisy = steady.clone();
        noisy.insert(7, 0.01);
        noisy.insert(19, 0.99);
        let with_outliers = robust_baseline(&noisy, 5, 0.0);

        assert!((clean - 0.25).abs() < 1e-3);
        assert!((with_outliers - 0.25).abs() < 1e-3);
        assert!((with_outliers - clean).abs() < 1e-3);

        // Same samples through the calibrator window.
        let cfg = DetectorConfig { calibration_samples: 32, ..DetectorConfig::default() };
        let mut cal = Calibrator::new(&cfg);
        for (i, &ear) in noisy.iter().enumerate() {
            cal.observe(ear, i as u64 * 66);
        }
        assert_eq!(cal.completion(), Some(Completion::SampleTarget));
        assert!((cal.baseline().unwrap() - with_outliers).abs() < 1e-6);
    }

    #[test]
    fn median_of_even_and_odd() {
        assert_eq!(median(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn baseline_is_frozen_until_reset() {
        let mut cal = calibrator();
        for i in 0..30 {
            cal.observe(0.3, i);
        }
        let b = cal.baseline();
        for i in 0..100 {
            cal.observe(0.05, 100 + i);
        }
        assert_eq!(cal.baseline(), b);

        cal.reset();
        assert!(!cal.is_ready());
        assert_eq!(cal.progress(), 0.0);
        for i in 0..30 {
            cal.observe(0.2, 1_000 + i);
        }
        assert!((cal.baseline().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn timeout_restarts_after_reset() {
        let mut cal = calibrator();
        cal.poll(0);
        cal.reset();
        // Clock restarts at the first poll after reset.
        assert!(!cal.poll(9_000));
        assert!(cal.poll(14_000));
    }

    #[test]
    fn progress_tracks_sample_target() {
        let mut cal = calibrator();
        for i in 0..15 {
            cal.observe(0.3, i);
        }
        assert!((cal.progress() - 0.5).abs() < 1e-6);
    }
}
