//! # blink_detect
//!
//! Turns a stream of facial landmarks into short/long blink events.
//!
//! ## Pipeline
//!
//! ```text
//! FrameSource ─▶ LandmarkProvider ─▶ EAR ─▶ Calibrator (once) ─▶ BlinkClassifier ─▶ BlinkEvent
//! ```
//!
//! | Stage | Module | Output |
//! |---|---|---|
//! | Camera / recorded trace | [`source`], [`trace`] | [`VideoFrame`] |
//! | Face landmarks | [`landmarks`] | zero or one [`FaceLandmarks`] |
//! | Eye aspect ratio | [`ear`] | one `f32` per frame with a face |
//! | Open-eye baseline | [`calibrate`] | baseline EAR |
//! | Blink state machine | [`classify`] | [`BlinkEvent`] (dot / dash) |
//!
//! [`DetectionSession`] owns one source and one provider and wires the
//! stages together.  All timing is explicit: callers pass a monotonic
//! millisecond clock, so the whole pipeline is deterministic under test.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use blink_detect::{trace, DetectionSession, DetectorConfig};
//!
//! let records = trace::load_trace("blinks.jsonl".as_ref()).unwrap();
//! let (source, provider) = trace::replay(records, &DetectorConfig::default());
//! let mut session = DetectionSession::open(
//!     Box::new(source),
//!     Box::new(provider),
//!     &DetectorConfig::default(),
//! );
//! for event in session.poll(10_000) {
//!     println!("{} ms: {}", event.at_ms, if event.blink.is_long { "-" } else { "." });
//! }
//! ```

pub mod calibrate;
pub mod classify;
pub mod config;
pub mod ear;
pub mod error;
pub mod landmarks;
pub mod session;
pub mod source;
pub mod trace;

pub use calibrate::Calibrator;
pub use classify::{BlinkClassifier, BlinkEvent, EyeState};
pub use config::DetectorConfig;
pub use ear::{compute_ear, frame_ear, EyeLandmarks, Point2};
pub use error::{CameraError, DetectError};
pub use landmarks::{FaceLandmarks, LandmarkProvider};
pub use session::{DetectionSession, SessionStatus, TimedBlink};
pub use source::{CameraOpener, CameraRequest, FrameSource, VideoFrame};
