//! # Calibration
//!
//! Stereo geometry resolution.
//!
//! - [`StereoCalibrationResolver`]: intrinsics pair (+ optional camera
//!   extrinsic) to a canonical [`StereoCalibration`], with baseline recovery
//!   through a transform lookup
//! - [`OneShotWarning`]: per-instance "print once" flags
//! - [`StaticTransformTree`]: [`TransformResolver`] over static
//!   parent/child transforms

mod resolver;
mod tree;
mod warning;

pub use resolver::{LARGE_BASELINE_M, StereoCalibrationResolver};
pub use tree::StaticTransformTree;
pub use warning::OneShotWarning;

pub use contracts::{FrameError, StereoCalibration, TransformResolver};
