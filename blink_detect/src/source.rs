//! Video frame sources.
//!
//! The camera is an external collaborator: the core only needs frames in
//! arrival order and a way to shut the device off.  A real webcam binding
//! and the recorded-trace player in [`crate::trace`] both sit behind
//! [`FrameSource`].

use serde::{Deserialize, Serialize};

use crate::error::CameraError;

/// One delivered video frame.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoFrame {
    /// Delivery order within the session, starting at 0.
    pub sequence:     u64,
    /// Session clock at delivery (ms).
    pub timestamp_ms: u64,
    pub width:        u32,
    pub height:       u32,
    /// Raw pixel payload; empty for sources that carry landmarks out of band.
    pub pixels:       Vec<u8>,
}

/// What to ask the camera for.  Small and slow is plenty for EAR.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraRequest {
    pub width:  u32,
    pub height: u32,
    pub fps:    u32,
}

impl Default for CameraRequest {
    fn default() -> Self {
        CameraRequest { width: 320, height: 240, fps: 15 }
    }
}

impl CameraRequest {
    /// Nominal gap between frames (ms).
    pub fn frame_interval_ms(&self) -> u64 {
        1_000 / u64::from(self.fps.max(1))
    }
}

/// A camera-like producer of frames.
///
/// `next_frame` never blocks: it returns a frame only if one has been
/// delivered by `now_ms`.  `stop` must release every underlying track and
/// be safe to call more than once.
pub trait FrameSource {
    fn next_frame(&mut self, now_ms: u64) -> Option<VideoFrame>;
    fn stop(&mut self);
    fn is_live(&self) -> bool;
}

/// Acquires a camera.  Fails when the device is missing, busy, or the user
/// refuses access.
pub trait CameraOpener {
    fn open(&self, req: &CameraRequest) -> Result<Box<dyn FrameSource>, CameraError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_is_small_and_slow() {
        let req = CameraRequest::default();
        assert_eq!((req.width, req.height, req.fps), (320, 240, 15));
        assert_eq!(req.frame_interval_ms(), 66);
    }

    #[test]
    fn zero_fps_does_not_divide_by_zero() {
        let req = CameraRequest { fps: 0, ..CameraRequest::default() };
        assert_eq!(req.frame_interval_ms(), 1_000);
    }
}
