//! Eye aspect ratio (EAR).
//!
//! EAR is the ratio of the two vertical eyelid distances to the horizontal
//! eye width.  It sits around 0.25–0.35 for an open eye and collapses
//! toward zero as the lids close.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Point2
// ════════════════════════════════════════════════════════════════════════════

/// A 2-D landmark position in pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Point2 { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn dist(self, other: Point2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// EyeLandmarks
// ════════════════════════════════════════════════════════════════════════════

/// The six landmarks of one eye, in anatomical order:
///
/// ```text
///        p1   p2
///   p0 ─────────── p3
///        p5   p4
/// ```
///
/// `p0`/`p3` are the horizontal corners, `(p1, p5)` and `(p2, p4)` are the
/// two vertical lid pairs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EyeLandmarks(pub [Point2; 6]);

impl EyeLandmarks {
    /// Synthetic eye of the given `width` whose EAR is exactly `ear`.
    ///
    /// Handy for fixtures and for replaying EAR-only recordings through the
    /// landmark path.
    pub fn with_ear(ear: f32, width: f32) -> Self {
        let half_gap = ear.max(0.0) * width / 2.0;
        EyeLandmarks([
            Point2::new(0.0, 0.0),
            Point2::new(width / 3.0, -half_gap),
            Point2::new(2.0 * width / 3.0, -half_gap),
            Point2::new(width, 0.0),
            Point2::new(2.0 * width / 3.0, half_gap),
            Point2::new(width / 3.0, half_gap),
        ])
    }

    /// Translate every point by `(dx, dy)`.
    pub fn offset(mut self, dx: f32, dy: f32) -> Self {
        for p in &mut self.0 {
            p.x += dx;
            p.y += dy;
        }
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════
// EAR
// ════════════════════════════════════════════════════════════════════════════

/// EAR of a single eye: `(|p1-p5| + |p2-p4|) / (2 |p0-p3|)`.
///
/// Degenerate geometry (zero eye width) yields exactly `0.0`.
pub fn compute_ear(eye: &EyeLandmarks) -> f32 {
    let p = &eye.0;
    let v1 = p[1].dist(p[5]);
    let v2 = p[2].dist(p[4]);
    let h = p[0].dist(p[3]);
    if h == 0.0 {
        return 0.0;
    }
    (v1 + v2) / (2.0 * h)
}

/// Per-frame signal: the mean of left and right EAR.
pub fn frame_ear(face: &crate::landmarks::FaceLandmarks) -> f32 {
    (compute_ear(&face.left) + compute_ear(&face.right)) / 2.0
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
