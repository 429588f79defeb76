//! Detection tuning.

use serde::{Deserialize, Serialize};

use crate::source::CameraRequest;

/// Every threshold and window used by the detection pipeline.
///
/// All fields have defaults, so a tuning file only needs to name the
/// values it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Reference resolution that normalised mesh coordinates are scaled to.
    pub reference_width:  f32,
    pub reference_height: f32,

    /// Samples needed to finish calibration early.
    pub calibration_samples: usize,
    /// Most recent samples kept while calibrating.
    pub calibration_window: usize,
    /// Calibration finishes after this long even with few samples (ms).
    pub calibration_timeout_ms: u64,
    /// Below this many samples the interquartile rule is skipped and the
    /// plain mean is used.
    pub min_robust_samples: usize,
    /// Baseline used when calibration saw no face at all.
    pub fallback_baseline: f32,

    /// Closed when `ear / baseline` drops below this.
    pub closed_ratio: f32,
    /// Closed when `baseline - ear` exceeds this.
    pub absolute_drop: f32,
    /// Closures at least this long are dashes (ms).
    pub long_blink_ms: u64,

    pub camera: CameraRequest,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            reference_width:        320.0,
            reference_height:       240.0,
            calibration_samples:    30,
            calibration_window:     50,
            calibration_timeout_ms: 5_000,
            min_robust_samples:     5,
            fallback_baseline:      0.30,
            closed_ratio:           0.40,
            absolute_drop:          0.12,
            long_blink_ms:          400,
            camera:                 CameraRequest::default(),
        }
    }
}
