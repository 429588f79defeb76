//! Face landmarks and the provider seam.
//!
//! Any face-tracking library is an adapter behind [`LandmarkProvider`]; the
//! rest of the pipeline only ever sees a typed, fixed-size [`FaceLandmarks`].

use serde::{Deserialize, Serialize};

use crate::ear::{EyeLandmarks, Point2};
use crate::error::DetectError;
use crate::source::VideoFrame;

/// Face-mesh indices of the left eye, in [`EyeLandmarks`] order.
pub const LEFT_EYE_MESH:  [usize; 6] = [33, 160, 158, 133, 153, 144];
/// Face-mesh indices of the right eye, in [`EyeLandmarks`] order.
pub const RIGHT_EYE_MESH: [usize; 6] = [362, 385, 387, 263, 373, 380];
/// Minimum number of points in a full face mesh.
pub const MESH_POINTS: usize = 468;

/// Both eyes of one detected face, in pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    pub left:  EyeLandmarks,
    pub right: EyeLandmarks,
}

impl FaceLandmarks {
    /// Pick both eyes out of a normalised (0..1) face mesh and scale them to
    /// `width × height` pixels.  Short meshes are treated as "no face".
    pub fn from_mesh(mesh: &[Point2], width: f32, height: f32) -> Option<Self> {
        if mesh.len() < MESH_POINTS {
            return None;
        }
        let pick = |indices: [usize; 6]| {
            EyeLandmarks(indices.map(|i| Point2::new(mesh[i].x * width, mesh[i].y * height)))
        };
        Some(FaceLandmarks {
            left:  pick(LEFT_EYE_MESH),
            right: pick(RIGHT_EYE_MESH),
        })
    }

    /// Both eyes with the same synthetic EAR.
    pub fn with_ear(ear: f32) -> Self {
        FaceLandmarks {
            left:  EyeLandmarks::with_ear(ear, 30.0).offset(110.0, 100.0),
            right: EyeLandmarks::with_ear(ear, 30.0).offset(180.0, 100.0),
        }
    }
}

/// Produces zero or one face per frame.
///
/// `Ok(None)` means no face in this frame, which is not an error.  `Err` is
/// a per-frame failure; the session logs it and skips the frame.
pub trait LandmarkProvider {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Option<FaceLandmarks>, DetectError>;
}
