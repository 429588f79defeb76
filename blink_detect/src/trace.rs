//! Recorded landmark traces.
//!
//! A trace is JSON lines, one record per captured frame:
//!
//! ```text
//! # comment lines and blank lines are ignored
//! {"t": 0,   "face": {"left": [...6 points...], "right": [...]}}
//! {"t": 66}                      ← frame with no face
//! ```
//!
//! [`replay`] turns a trace into a paced [`FrameSource`] plus a matching
//! [`LandmarkProvider`], so recorded sessions run through exactly the same
//! path as a live camera.  [`TraceCamera`] does the same behind
//! [`CameraOpener`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DetectorConfig;
use crate::error::{CameraError, DetectError};
use crate::landmarks::{FaceLandmarks, LandmarkProvider};
use crate::source::{CameraOpener, CameraRequest, FrameSource, VideoFrame};

/// One captured frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Capture time relative to the start of the recording (ms).
    pub t:    u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face: Option<FaceLandmarks>,
}

impl TraceRecord {
    /// A record whose face has the given EAR in both eyes.
    pub fn with_ear(t: u64, ear: f32) -> Self {
        TraceRecord { t, face: Some(FaceLandmarks::with_ear(ear)) }
    }

    pub fn no_face(t: u64) -> Self {
        TraceRecord { t, face: None }
    }
}

pub fn parse_trace<R: BufRead>(reader: R) -> Result<Vec<TraceRecord>, DetectError> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record = serde_json::from_str(trimmed)
            .map_err(|source| DetectError::Trace { line: idx + 1, source })?;
        records.push(record);
    }
    debug!(records = records.len(), "trace parsed");
    Ok(records)
}

pub fn load_trace(path: &Path) -> Result<Vec<TraceRecord>, DetectError> {
    parse_trace(BufReader::new(File::open(path)?))
}

/// Serialise records back to JSON lines.
pub fn write_trace<W: std::io::Write>(mut out: W, records: &[TraceRecord]) -> Result<(), DetectError> {
    for r in records {
        let line = serde_json::to_string(r).map_err(|source| DetectError::Trace { line: 0, source })?;
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// Split a trace into a paced source and its provider.
pub fn replay(records: Vec<TraceRecord>, cfg: &DetectorConfig) -> (TraceSource, TraceLandmarks) {
    (TraceSource::new(&records, &cfg.camera), TraceLandmarks::new(&records))
}

// ════════════════════════════════════════════════════════════════════════════
// TraceCamera
// ════════════════════════════════════════════════════════════════════════════

/// A recording standing in for a webcam.  Every `open` starts the replay
/// from the first record; an empty recording has no device behind it.
#[derive(Clone, Debug)]
pub struct TraceCamera {
    records: Vec<TraceRecord>,
}

impl TraceCamera {
    pub fn new(records: Vec<TraceRecord>) -> Self {
        TraceCamera { records }
    }

    /// Provider for the frames this camera delivers.
    pub fn landmarks(&self) -> TraceLandmarks {
        TraceLandmarks::new(&self.records)
    }
}

impl CameraOpener for TraceCamera {
    fn open(&self, req: &CameraRequest) -> Result<Box<dyn FrameSource>, CameraError> {
        if self.records.is_empty() {
            return Err(CameraError::NotFound);
        }
        Ok(Box::new(TraceSource::new(&self.records, req)))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TraceSource
// ════════════════════════════════════════════════════════════════════════════

/// Replays recorded capture times against the caller's clock.
///
/// The first `next_frame` call anchors the recording: a record at `t` is
/// delivered once `now >= anchor + (t - t0)`.
#[derive(Debug)]
pub struct TraceSource {
    times:   Vec<u64>,
    next:    usize,
    origin:  Option<(u64, u64)>,
    width:   u32,
    height:  u32,
    running: bool,
}

impl TraceSource {
    fn new(records: &[TraceRecord], req: &CameraRequest) -> Self {
        TraceSource {
            times:   records.iter().map(|r| r.t).collect(),
            next:    0,
            origin:  None,
            width:   req.width,
            height:  req.height,
            running: true,
        }
    }

    pub fn remaining(&self) -> usize {
        self.times.len() - self.next
    }
}

impl FrameSource for TraceSource {
    fn next_frame(&mut self, now_ms: u64) -> Option<VideoFrame> {
        if !self.running {
            return None;
        }
        let t = *self.times.get(self.next)?;
        let (anchor, t0) = *self.origin.get_or_insert((now_ms, t));
        let due = anchor + t.saturating_sub(t0);
        if due > now_ms {
            return None;
        }
        let sequence = self.next as u64;
        self.next += 1;
        Some(VideoFrame {
            sequence,
            timestamp_ms: due,
            width:        self.width,
            height:       self.height,
            pixels:       Vec::new(),
        })
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            debug!(remaining = self.remaining(), "trace source stopped");
        }
    }

    fn is_live(&self) -> bool {
        self.running && self.next < self.times.len()
    }
}

/// Looks up the recorded face for each replayed frame.
#[derive(Debug)]
pub struct TraceLandmarks {
    faces: Vec<Option<FaceLandmarks>>,
}

impl TraceLandmarks {
    fn new(records: &[TraceRecord]) -> Self {
        TraceLandmarks { faces: records.iter().map(|r| r.face).collect() }
    }
}

impl LandmarkProvider for TraceLandmarks {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Option<FaceLandmarks>, DetectError> {
        self.faces
            .get(frame.sequence as usize)
            .copied()
            .ok_or_else(|| DetectError::Provider {
                frame:   frame.sequence,
                message: "frame is not part of the trace".into(),
            })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
