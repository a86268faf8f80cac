//! Imaging error types

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImagingError {
    /// Buffer shorter than `step * height`, or rows shorter than a pixel row
    #[error("image buffer too small: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("unsupported encoding: {0}")]
    Unsupported(String),
}
