//! One camera, one provider, one calibration.

use tracing::{debug, info, warn};

use crate::calibrate::Calibrator;
use crate::classify::{BlinkClassifier, BlinkEvent};
use crate::config::DetectorConfig;
use crate::ear::frame_ear;
use crate::error::DetectError;
use crate::landmarks::LandmarkProvider;
use crate::source::{CameraOpener, FrameSource};

/// Coarse session phase, for status displays.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionStatus {
    Calibrating { progress: f32 },
    Detecting { baseline: f32 },
    /// The landmark provider could not run; the camera has been released.
    Unavailable(String),
    Released,
}

/// A blink and the frame time that completed it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimedBlink {
    pub at_ms: u64,
    pub blink: BlinkEvent,
}

/// Drives frames through landmarks → EAR → calibration → classification.
///
/// The session exclusively owns its frame source; [`release`](Self::release)
/// (or drop) stops it exactly once.
pub struct DetectionSession {
    source:     Option<Box<dyn FrameSource>>,
    provider:   Box<dyn LandmarkProvider>,
    calibrator: Calibrator,
    classifier: BlinkClassifier,
    last_ear:   Option<f32>,
    frames:     u64,
    failure:    Option<String>,
}

impl DetectionSession {
    pub fn open(
        source:   Box<dyn FrameSource>,
        provider: Box<dyn LandmarkProvider>,
        cfg:      &DetectorConfig,
    ) -> Self {
        info!(
            width = cfg.camera.width,
            height = cfg.camera.height,
            fps = cfg.camera.fps,
            "detection session opened"
        );
        DetectionSession {
            source:     Some(source),
            provider,
            calibrator: Calibrator::new(cfg),
            classifier: BlinkClassifier::new(cfg),
            last_ear:   None,
            frames:     0,
            failure:    None,
        }
    }

    /// Open the camera through `camera` and start a session on it.
    pub fn acquire(
        camera:   &dyn CameraOpener,
        provider: Box<dyn LandmarkProvider>,
        cfg:      &DetectorConfig,
    ) -> Result<Self, DetectError> {
        let source = camera.open(&cfg.camera).map_err(|e| {
            warn!("camera unavailable: {}", e);
            e
        })?;
        Ok(Self::open(source, provider, cfg))
    }

    /// Drain every frame delivered by `now_ms` and return the blinks they
    /// completed, in order, each stamped with its frame time.
    ///
    /// A provider that reports itself unavailable ends the session: the
    /// source is released and [`status`](Self::status) says why.
    pub fn poll(&mut self, now_ms: u64) -> Vec<TimedBlink> {
        let frames: Vec<_> = match self.source.as_mut() {
            Some(src) => std::iter::from_fn(|| src.next_frame(now_ms)).collect(),
            None => return Vec::new(),
        };

        let mut events = Vec::new();
        for frame in frames {
            self.frames += 1;
            let face = match self.provider.detect(&frame) {
                Ok(Some(face)) => face,
                Ok(None) => continue,
                Err(DetectError::ProviderUnavailable(reason)) => {
                    warn!(frame = frame.sequence, "landmark provider unavailable: {}", reason);
                    self.failure = Some(reason);
                    self.release();
                    return events;
                }
                Err(e) => {
                    warn!(frame = frame.sequence, "skipping frame: {}", e);
                    continue;
                }
            };
            let ear = frame_ear(&face);
            if let Some(blink) = self.process_ear(ear, frame.timestamp_ms) {
                events.push(TimedBlink { at_ms: frame.timestamp_ms, blink });
            }
        }

        self.calibrator.poll(now_ms);
        events
    }

    /// Feed one EAR reading directly, bypassing source and provider.
    pub fn process_ear(&mut self, ear: f32, at_ms: u64) -> Option<BlinkEvent> {
        self.last_ear = Some(ear);
        match self.calibrator.baseline() {
            Some(baseline) => self.classifier.update(ear, baseline, at_ms),
            None => {
                self.calibrator.observe(ear, at_ms);
                None
            }
        }
    }

    /// Throw away the baseline and learn a new one.
    pub fn recalibrate(&mut self) {
        debug!("recalibrating");
        self.calibrator.reset();
        self.classifier.reset();
    }

    /// Stop the source.  Safe to call repeatedly.
    pub fn release(&mut self) {
        if let Some(mut src) = self.source.take() {
            src.stop();
            info!(frames = self.frames, blinks = self.classifier.blink_count(), "detection session released");
        }
    }

    pub fn is_active(&self) -> bool {
        self.source.as_ref().map_or(false, |s| s.is_live())
    }

    pub fn status(&self) -> SessionStatus {
        if let Some(reason) = &self.failure {
            return SessionStatus::Unavailable(reason.clone());
        }
        if self.source.is_none() {
            return SessionStatus::Released;
        }
        match self.calibrator.baseline() {
            Some(baseline) => SessionStatus::Detecting { baseline },
            None => SessionStatus::Calibrating { progress: self.calibrator.progress() },
        }
    }

    pub fn baseline(&self) -> Option<f32> {
        self.calibrator.baseline()
    }

    /// EAR of the most recent frame with a face.
    pub fn last_ear(&self) -> Option<f32> {
        self.last_ear
    }

    pub fn blink_count(&self) -> u64 {
        self.classifier.blink_count()
    }
}

impl Drop for DetectionSession {
    fn drop(&mut self) {
        self.release();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
