//! Non-fatal configuration checks shared by `validate`, `info` and dry runs.
//!
//! Each warning names a setup that loads fine but would make the front end
//! drop every event (or warn on every start).

use calibration::{StaticTransformTree, LARGE_BASELINE_M};
use contracts::{
    IngestBlueprint, Timestamp, TransformResolver, REG_STRATEGY_KEY, REG_STRATEGY_VISUAL,
};
use imaging::EncodingValidator;

/// Collect configuration warnings
pub fn config_warnings(blueprint: &IngestBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let frontend = &blueprint.frontend;
    let source = &blueprint.source;
    let tree = StaticTransformTree::from_configs(&blueprint.transforms);

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - emitted frames will only be counted".to_string());
    }

    if EncodingValidator::new()
        .validate(&source.encoding)
        .accepted()
        .is_none()
    {
        warnings.push(format!(
            "source.encoding '{}' is not supported - every event will be rejected",
            source.encoding
        ));
    }

    let camera_frame = &source.left_frame;
    if tree
        .lookup(&frontend.frame_id, camera_frame, Timestamp::ZERO)
        .is_none()
    {
        warnings.push(format!(
            "No transform from '{}' to '{}' - every event will be dropped",
            frontend.frame_id, camera_frame
        ));
    }

    if !frontend.already_rectified
        && tree
            .lookup(&source.right_frame, &source.left_frame, Timestamp::ZERO)
            .is_none()
    {
        warnings.push(format!(
            "Images are not rectified but no transform links '{}' and '{}'",
            source.left_frame, source.right_frame
        ));
    }

    if frontend.already_rectified && source.baseline_m <= 0.0 {
        warnings.push(format!(
            "source.baseline_m is {} - rectified events need a positive baseline",
            source.baseline_m
        ));
    } else if source.baseline_m > LARGE_BASELINE_M {
        warnings.push(format!(
            "source.baseline_m {} is unusually large (> {LARGE_BASELINE_M} m)",
            source.baseline_m
        ));
    }

    if !frontend.approx_sync && !frontend.subscribe_rgbd && source.jitter_ms > 0.0 {
        warnings.push(format!(
            "source.jitter_ms is {} but approx_sync is off - exact matching needs identical stamps",
            source.jitter_ms
        ));
    }

    if let Some(value) = frontend
        .odometry_parameters
        .get(REG_STRATEGY_KEY)
        .filter(|v| v.as_str() != REG_STRATEGY_VISUAL)
    {
        warnings.push(format!(
            "odometry_parameters.{REG_STRATEGY_KEY}={value} will be replaced by {REG_STRATEGY_VISUAL}"
        ));
    }

    warnings
}
