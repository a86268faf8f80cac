//! # Imaging
//!
//! Pixel format checks and conversion to the downstream representation.
//!
//! - [`EncodingValidator`]: declared encoding against the supported set,
//!   payload size checks
//! - [`ImageNormalizer`]: raw buffers to tightly packed mono8 / bgr8

mod error;
mod normalize;
mod validate;

pub use error::ImagingError;
pub use normalize::ImageNormalizer;
pub use validate::{EncodingCheck, EncodingValidator};
