//! Encoding and payload validation

use contracts::{FrameError, ImageEncoding, RawImageMessage};
use tracing::trace;

/// Result of checking one declared encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingCheck {
    Accepted(ImageEncoding),
    Rejected,
}

impl EncodingCheck {
    pub fn accepted(self) -> Option<ImageEncoding> {
        match self {
            EncodingCheck::Accepted(encoding) => Some(encoding),
            EncodingCheck::Rejected => None,
        }
    }
}

/// Checks images against the supported encodings
/// (`8UC1`, `mono8`, `mono16`, `bgr8`, `rgb8`, `bgra8`, `rgba8`).
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingValidator;

impl EncodingValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, encoding: &str) -> EncodingCheck {
        match ImageEncoding::from_name(encoding) {
            Some(encoding) => EncodingCheck::Accepted(encoding),
            None => EncodingCheck::Rejected,
        }
    }

    /// Both images must pass independently
    ///
    /// # Errors
    /// `UnsupportedEncoding` naming both declared encodings
    pub fn validate_pair(
        &self,
        left: &RawImageMessage,
        right: &RawImageMessage,
    ) -> Result<(ImageEncoding, ImageEncoding), FrameError> {
        let checked = (
            self.validate(&left.encoding).accepted(),
            self.validate(&right.encoding).accepted(),
        );
        match checked {
            (Some(left_encoding), Some(right_encoding)) => {
                trace!(left = %left_encoding, right = %right_encoding, "encodings accepted");
                Ok((left_encoding, right_encoding))
            }
            _ => Err(FrameError::UnsupportedEncoding {
                left: left.encoding.clone(),
                right: right.encoding.clone(),
            }),
        }
    }

    /// Both buffers must hold `step * height` bytes with rows wide enough
    /// for their pixels. Truncated buffers count as empty.
    ///
    /// # Errors
    /// `EmptyImagePayload` with both buffer sizes
    pub fn check_payload(
        &self,
        left: (&RawImageMessage, ImageEncoding),
        right: (&RawImageMessage, ImageEncoding),
    ) -> Result<(), FrameError> {
        if payload_complete(left.0, left.1) && payload_complete(right.0, right.1) {
            Ok(())
        } else {
            Err(FrameError::EmptyImagePayload {
                left_bytes: left.0.data.len(),
                right_bytes: right.0.data.len(),
            })
        }
    }
}

/// Non-empty buffer covering every declared row
pub(crate) fn payload_complete(image: &RawImageMessage, encoding: ImageEncoding) -> bool {
    if image.is_empty() {
        return false;
    }
    let row_len = image.width as usize * encoding.bytes_per_pixel() as usize;
    let step = image.step as usize;
    step >= row_len && image.data.len() >= step * image.height as usize
}
