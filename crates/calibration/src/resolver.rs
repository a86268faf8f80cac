//! Stereo calibration resolution.
//!
//! Turns the two per-camera calibration records of one event into a
//! [`StereoCalibration`]. Rectified input reads the baseline from the
//! projection offset terms; unrectified input needs the camera-to-camera
//! transform and carries it along for downstream rectification.

use contracts::{CameraInfo, FrameError, RigidTransform, StereoCalibration, TransformResolver};
use tracing::{debug, instrument, warn};

use crate::warning::OneShotWarning;

/// Baselines above this (metres) are accepted but reported
pub const LARGE_BASELINE_M: f64 = 10.0;

/// Resolves stereo geometry for each event.
///
/// The only state is the two one-shot warnings, so a resolver can be reused
/// across any number of events.
#[derive(Debug, Default)]
pub struct StereoCalibrationResolver {
    fallback_warning: OneShotWarning,
    large_baseline_warning: OneShotWarning,
}

impl StereoCalibrationResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the calibration of one event.
    ///
    /// `local_transform` is the mounting pose of the left camera in the
    /// reference frame. Lookups use the left calibration stamp.
    ///
    /// # Errors
    /// - `MissingExtrinsicTransform` / `DegenerateExtrinsicTransform` when
    ///   the images are not rectified and the camera transform is unusable
    /// - `NonPositiveBaseline` when rectified and no positive baseline could
    ///   be derived
    #[instrument(
        level = "debug",
        name = "calibration_resolve",
        skip_all,
        fields(
            left = %left_info.header.frame_id,
            right = %right_info.header.frame_id,
            rectified = already_rectified
        )
    )]
    pub fn resolve<R: TransformResolver + ?Sized>(
        &mut self,
        left_info: &CameraInfo,
        right_info: &CameraInfo,
        local_transform: RigidTransform,
        already_rectified: bool,
        transforms: &R,
    ) -> Result<StereoCalibration, FrameError> {
        let left_frame = &left_info.header.frame_id;
        let right_frame = &right_info.header.frame_id;
        let stamp = left_info.header.stamp;

        let mut calibration = if already_rectified {
            let baseline = left_info.intrinsics.normalized_offset()
                - right_info.intrinsics.normalized_offset();
            StereoCalibration::rectified(left_info.intrinsics, baseline, local_transform)
        } else {
            let extrinsics = transforms
                .lookup(right_frame, left_frame, stamp)
                .ok_or_else(|| FrameError::MissingExtrinsicTransform {
                    left_frame: left_frame.clone(),
                    right_frame: right_frame.clone(),
                })?;
            if extrinsics.is_identity() {
                return Err(FrameError::DegenerateExtrinsicTransform {
                    left_frame: left_frame.clone(),
                    right_frame: right_frame.clone(),
                });
            }
            StereoCalibration::unrectified(
                left_info.intrinsics,
                extrinsic_baseline(&extrinsics),
                local_transform,
                extrinsics,
            )
        };

        if already_rectified && calibration.baseline == 0.0 {
            if let Some(direct) = transforms
                .lookup(left_frame, right_frame, stamp)
                .filter(|t| t.x() > 0.0)
            {
                if self.fallback_warning.trigger() {
                    warn!(
                        left = %left_frame,
                        right = %right_frame,
                        baseline = direct.x(),
                        "right camera info has no Tx but images are marked rectified; \
                         baseline taken from the camera transform (printed once)"
                    );
                }
                observability::record_calibration_warning("baseline_fallback");
                calibration = calibration.with_baseline(direct.x());
            }
        }

        if already_rectified && (calibration.baseline.is_nan() || calibration.baseline <= 0.0) {
            return Err(FrameError::NonPositiveBaseline {
                baseline: calibration.baseline,
            });
        }

        if calibration.baseline > LARGE_BASELINE_M {
            if self.large_baseline_warning.trigger() {
                warn!(
                    baseline = calibration.baseline,
                    "detected baseline is quite large, check P(0,3) of the right camera info \
                     (baseline = -P(0,3)/P(0,0), printed once)"
                );
            }
            observability::record_calibration_warning("large_baseline");
        }

        debug!(baseline = calibration.baseline, "calibration resolved");
        Ok(calibration)
    }

    /// Baseline recovered from the camera transform
    pub fn fallback_warning(&self) -> &OneShotWarning {
        &self.fallback_warning
    }

    /// Baseline above [`LARGE_BASELINE_M`]
    pub fn large_baseline_warning(&self) -> &OneShotWarning {
        &self.large_baseline_warning
    }
}

/// Distance between the optical centres; negative when the left camera sits
/// on the positive x side of the right one.
fn extrinsic_baseline(extrinsics: &RigidTransform) -> f64 {
    let distance = extrinsics.translation().norm();
    if extrinsics.x() > 0.0 {
        -distance
    } else {
        distance
    }
}
