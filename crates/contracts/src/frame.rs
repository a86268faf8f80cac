//! SensorFrame - front end output
//!
//! One canonical stereo frame per synchronized event.

use serde::{Deserialize, Serialize};

use crate::{CameraIntrinsics, FrameId, NormalizedImage, RigidTransform, Timestamp};

/// Canonical stereo geometry of one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StereoCalibration {
    /// Left camera intrinsics (reference camera)
    pub left: CameraIntrinsics,

    /// Optical centre separation in metres
    pub baseline: f64,

    /// Mounting pose of the left camera in the reference frame
    pub local_transform: RigidTransform,

    /// Right <- left transform when images still need rectification
    #[serde(default)]
    pub extrinsics: Option<RigidTransform>,

    /// Images are already rectified
    pub rectified: bool,
}

impl StereoCalibration {
    pub fn rectified(left: CameraIntrinsics, baseline: f64, local_transform: RigidTransform) -> Self {
        Self {
            left,
            baseline,
            local_transform,
            extrinsics: None,
            rectified: true,
        }
    }

    pub fn unrectified(
        left: CameraIntrinsics,
        baseline: f64,
        local_transform: RigidTransform,
        extrinsics: RigidTransform,
    ) -> Self {
        Self {
            left,
            baseline,
            local_transform,
            extrinsics: Some(extrinsics),
            rectified: false,
        }
    }

    /// Same geometry with a replaced baseline
    pub fn with_baseline(&self, baseline: f64) -> Self {
        Self {
            baseline,
            ..self.clone()
        }
    }

    /// Offset term a rectified right camera would carry (`-fx * baseline`)
    pub fn right_tx(&self) -> f64 {
        -self.left.fx * self.baseline
    }
}

/// Stereo frame handed to the pose estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorFrame {
    /// Emission sequence number (monotonically increasing)
    pub seq: u64,

    /// Resolved event stamp: the later of the two image stamps
    pub stamp: Timestamp,

    /// Configured reference frame
    pub frame_id: FrameId,

    /// Frame the images were reported in
    pub sensor_frame_id: FrameId,

    pub left: NormalizedImage,

    pub right: NormalizedImage,

    pub calibration: StereoCalibration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_baseline_keeps_geometry() {
        let left = CameraIntrinsics::new(500.0, 500.0, 320.0, 240.0, 640, 480);
        let calib = StereoCalibration::rectified(left, 0.0, RigidTransform::identity());
        let fixed = calib.with_baseline(0.12);
        assert_eq!(fixed.left, left);
        assert_eq!(fixed.baseline, 0.12);
        assert!(fixed.rectified);
        assert!((fixed.right_tx() + 60.0).abs() < 1e-9);
    }
}
