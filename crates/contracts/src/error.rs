//! Layered error definitions
//!
//! `FrameError` is local to one event: the event is dropped and the next one
//! is processed independently. `ContractError` covers config / sink / io.

use thiserror::Error;

use crate::{FrameId, Timestamp};

/// Reason a single stereo event was dropped
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error(
        "input type must be image=mono8,mono16,rgb8,bgr8,rgba8,bgra8 (mono8 recommended), \
         received types are {left} (left) and {right} (right)"
    )]
    UnsupportedEncoding { left: String, right: String },

    #[error(
        "images are not rectified but no transform is available between the two cameras \
         (between frames {right_frame} and {left_frame})"
    )]
    MissingExtrinsicTransform {
        left_frame: FrameId,
        right_frame: FrameId,
    },

    #[error(
        "images are not rectified but the transform between the two cameras is identity \
         (between frames {right_frame} and {left_frame}), cannot derive a baseline"
    )]
    DegenerateExtrinsicTransform {
        left_frame: FrameId,
        right_frame: FrameId,
    },

    #[error(
        "the stereo baseline ({baseline}) should be positive (baseline=-Tx/fx), a horizontal \
         left/right setup has a negative Tx in the right camera info"
    )]
    NonPositiveBaseline { baseline: f64 },

    #[error("input images empty (left={left_bytes} bytes, right={right_bytes} bytes)")]
    EmptyImagePayload { left_bytes: usize, right_bytes: usize },

    #[error("no transform from '{reference_frame}' to '{camera_frame}' at {stamp}")]
    MissingReferenceTransform {
        reference_frame: FrameId,
        camera_frame: FrameId,
        stamp: Timestamp,
    },
}

impl FrameError {
    /// Short label used for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            FrameError::UnsupportedEncoding { .. } => "unsupported_encoding",
            FrameError::MissingExtrinsicTransform { .. } => "missing_extrinsic_transform",
            FrameError::DegenerateExtrinsicTransform { .. } => "degenerate_extrinsic_transform",
            FrameError::NonPositiveBaseline { .. } => "non_positive_baseline",
            FrameError::EmptyImagePayload { .. } => "empty_image_payload",
            FrameError::MissingReferenceTransform { .. } => "missing_reference_transform",
        }
    }
}

/// Unified error type for configuration and output surfaces
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Sink connection error
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_error_names_both_sides() {
        let err = FrameError::UnsupportedEncoding {
            left: "bayer_rggb8".into(),
            right: "mono8".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("bayer_rggb8 (left)"));
        assert!(msg.contains("mono8 (right)"));
        assert_eq!(err.reason(), "unsupported_encoding");
    }

    #[test]
    fn test_baseline_error_reports_value() {
        let err = FrameError::NonPositiveBaseline { baseline: -0.05 };
        assert!(err.to_string().contains("-0.05"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ContractError::config_validation("frontend.queue_size", "must be >= 1");
        assert_eq!(
            err.to_string(),
            "config validation error at 'frontend.queue_size': must be >= 1"
        );
    }
}
