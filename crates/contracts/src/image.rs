//! Image messages
//!
//! Raw images as delivered by the transport and the normalized images the
//! front end hands downstream.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Header;

/// Pixel encodings accepted by the stereo front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageEncoding {
    /// `mono8`
    Mono8,
    /// `8UC1`, same layout as mono8
    Type8Uc1,
    /// `mono16`
    Mono16,
    /// `bgr8`
    Bgr8,
    /// `rgb8`
    Rgb8,
    /// `bgra8`
    Bgra8,
    /// `rgba8`
    Rgba8,
}

impl ImageEncoding {
    pub const ALL: [ImageEncoding; 7] = [
        ImageEncoding::Type8Uc1,
        ImageEncoding::Mono8,
        ImageEncoding::Mono16,
        ImageEncoding::Bgr8,
        ImageEncoding::Rgb8,
        ImageEncoding::Bgra8,
        ImageEncoding::Rgba8,
    ];

    /// Encoding name as it appears in image messages
    pub const fn as_str(self) -> &'static str {
        match self {
            ImageEncoding::Mono8 => "mono8",
            ImageEncoding::Type8Uc1 => "8UC1",
            ImageEncoding::Mono16 => "mono16",
            ImageEncoding::Bgr8 => "bgr8",
            ImageEncoding::Rgb8 => "rgb8",
            ImageEncoding::Bgra8 => "bgra8",
            ImageEncoding::Rgba8 => "rgba8",
        }
    }

    /// Look up a declared encoding name (case sensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|encoding| encoding.as_str() == name)
    }

    pub const fn channels(self) -> u32 {
        match self {
            ImageEncoding::Mono8 | ImageEncoding::Type8Uc1 | ImageEncoding::Mono16 => 1,
            ImageEncoding::Bgr8 | ImageEncoding::Rgb8 => 3,
            ImageEncoding::Bgra8 | ImageEncoding::Rgba8 => 4,
        }
    }

    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            ImageEncoding::Mono16 => 2,
            other => other.channels(),
        }
    }

    /// Single channel 8 bit under either name
    pub const fn is_mono8(self) -> bool {
        matches!(self, ImageEncoding::Mono8 | ImageEncoding::Type8Uc1)
    }

    pub const fn is_mono16(self) -> bool {
        matches!(self, ImageEncoding::Mono16)
    }
}

impl fmt::Display for ImageEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image as received from the transport. Never mutated after receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImageMessage {
    pub header: Header,

    pub width: u32,

    pub height: u32,

    /// Declared encoding, validated later
    pub encoding: String,

    /// Byte order of multi-byte pixels
    #[serde(default)]
    pub is_bigendian: bool,

    /// Row length in bytes (may include padding)
    pub step: u32,

    /// Pixel buffer
    pub data: Bytes,
}

impl RawImageMessage {
    /// Build a tightly packed image (`step = width * bytes_per_pixel`)
    pub fn packed(
        header: Header,
        encoding: ImageEncoding,
        width: u32,
        height: u32,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            header,
            width,
            height,
            encoding: encoding.as_str().to_string(),
            is_bigendian: false,
            step: width * encoding.bytes_per_pixel(),
            data: data.into(),
        }
    }

    /// No pixels to work with
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() || self.width == 0 || self.height == 0
    }
}

/// Output pixel representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizedEncoding {
    Mono8,
    Bgr8,
}

impl NormalizedEncoding {
    pub const fn channels(self) -> u32 {
        match self {
            NormalizedEncoding::Mono8 => 1,
            NormalizedEncoding::Bgr8 => 3,
        }
    }
}

/// Image in the representation consumed downstream: tightly packed rows,
/// 8 bits per channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedImage {
    pub width: u32,
    pub height: u32,
    pub encoding: NormalizedEncoding,
    pub data: Bytes,
}

impl NormalizedImage {
    /// Row length in bytes
    pub fn step(&self) -> usize {
        (self.width * self.encoding.channels()) as usize
    }
}
