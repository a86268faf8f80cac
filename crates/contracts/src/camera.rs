//! Camera calibration records

use serde::{Deserialize, Serialize};

use crate::Header;

/// Pinhole intrinsics of one camera, read from its projection matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    pub width: u32,
    pub height: u32,
    /// Horizontal offset term `P(0,3)` (`-fx * baseline` on a right camera)
    #[serde(default)]
    pub tx: f64,
}

impl CameraIntrinsics {
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64, width: u32, height: u32) -> Self {
        Self {
            fx,
            fy,
            cx,
            cy,
            width,
            height,
            tx: 0.0,
        }
    }

    pub fn with_tx(mut self, tx: f64) -> Self {
        self.tx = tx;
        self
    }

    /// Read from a row-major 3x4 projection matrix
    pub fn from_projection(p: &[f64; 12], width: u32, height: u32) -> Self {
        Self {
            fx: p[0],
            fy: p[5],
            cx: p[2],
            cy: p[6],
            width,
            height,
            tx: p[3],
        }
    }

    /// Offset term divided by focal length (`tx / fx`), zero if fx is zero
    pub fn normalized_offset(&self) -> f64 {
        if self.fx != 0.0 {
            self.tx / self.fx
        } else {
            0.0
        }
    }
}

/// Calibration message accompanying each image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraInfo {
    pub header: Header,
    pub intrinsics: CameraIntrinsics,
}

impl CameraInfo {
    pub fn new(header: Header, intrinsics: CameraIntrinsics) -> Self {
        Self { header, intrinsics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_projection() {
        let p = [
            500.0, 0.0, 320.0, -50.0, //
            0.0, 505.0, 240.0, 0.0, //
            0.0, 0.0, 1.0, 0.0,
        ];
        let k = CameraIntrinsics::from_projection(&p, 640, 480);
        assert_eq!(k.fx, 500.0);
        assert_eq!(k.fy, 505.0);
        assert_eq!(k.cy, 240.0);
        assert_eq!(k.tx, -50.0);
        assert!((k.normalized_offset() + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_zero_focal_offset() {
        let k = CameraIntrinsics::default().with_tx(-10.0);
        assert_eq!(k.normalized_offset(), 0.0);
    }
}
