//! Conversion to the downstream pixel representation.
//!
//! Output rows are tightly packed with 8 bits per channel. mono8 input is
//! handed through without touching the pixels.

use bytes::Bytes;
use contracts::{ImageEncoding, NormalizedEncoding, NormalizedImage, RawImageMessage};
use image::{DynamicImage, ImageBuffer, Rgb, Rgba};
use tracing::trace;

use crate::error::ImagingError;
use crate::validate::payload_complete;

/// Converts raw images, keeping color on the left image when configured
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageNormalizer {
    keep_color: bool,
}

impl ImageNormalizer {
    pub fn new(keep_color: bool) -> Self {
        Self { keep_color }
    }

    pub fn keep_color(&self) -> bool {
        self.keep_color
    }

    /// Left (reference) image: bgr8 when color is kept, mono8 otherwise
    pub fn normalize_left(
        &self,
        image: &RawImageMessage,
        encoding: ImageEncoding,
    ) -> Result<NormalizedImage, ImagingError> {
        self.normalize(image, encoding, self.keep_color)
    }

    /// Right image: always mono8
    pub fn normalize_right(
        &self,
        image: &RawImageMessage,
        encoding: ImageEncoding,
    ) -> Result<NormalizedImage, ImagingError> {
        self.normalize(image, encoding, false)
    }

    /// Output encoding chosen for an input encoding
    pub fn target(encoding: ImageEncoding, keep_color: bool) -> NormalizedEncoding {
        if keep_color && !encoding.is_mono8() && !encoding.is_mono16() {
            NormalizedEncoding::Bgr8
        } else {
            NormalizedEncoding::Mono8
        }
    }

    /// Convert one image.
    ///
    /// # Errors
    /// `Truncated` if the buffer does not cover `step * height` bytes
    pub fn normalize(
        &self,
        image: &RawImageMessage,
        encoding: ImageEncoding,
        keep_color: bool,
    ) -> Result<NormalizedImage, ImagingError> {
        let bpp = encoding.bytes_per_pixel() as usize;
        if !payload_complete(image, encoding) {
            return Err(ImagingError::Truncated {
                expected: (image.step as usize).max(image.width as usize * bpp)
                    * image.height as usize,
                actual: image.data.len(),
            });
        }

        let target = Self::target(encoding, keep_color);
        let pixels = packed_rows(image, bpp);
        let (width, height) = (image.width, image.height);

        let data = match (encoding, target) {
            (e, _) if e.is_mono8() => pixels,
            (ImageEncoding::Mono16, _) => mono16_to_mono8(&pixels, image.is_bigendian),
            (e, NormalizedEncoding::Mono8) => {
                rgb_to_mono8(&color_image(e, width, height, &pixels)?.to_rgb8().into_raw())
            }
            (ImageEncoding::Bgr8, NormalizedEncoding::Bgr8) => pixels,
            (e, NormalizedEncoding::Bgr8) => {
                let mut rgb = color_image(e, width, height, &pixels)?.to_rgb8().into_raw();
                swap_red_blue(&mut rgb, 3);
                Bytes::from(rgb)
            }
        };

        trace!(
            from = %encoding,
            to = ?target,
            width,
            height,
            "image normalized"
        );
        Ok(NormalizedImage {
            width,
            height,
            encoding: target,
            data,
        })
    }
}

/// Pixel rows without padding; shares the buffer when already tight
fn packed_rows(image: &RawImageMessage, bpp: usize) -> Bytes {
    let row_len = image.width as usize * bpp;
    let step = image.step as usize;
    let height = image.height as usize;

    if step == row_len {
        return image.data.slice(..row_len * height);
    }

    let mut packed = Vec::with_capacity(row_len * height);
    for row in image.data.chunks(step).take(height) {
        packed.extend_from_slice(&row[..row_len]);
    }
    Bytes::from(packed)
}

/// Keep the most significant byte of each sample
fn mono16_to_mono8(pixels: &[u8], big_endian: bool) -> Bytes {
    let high = usize::from(!big_endian);
    pixels.chunks_exact(2).map(|px| px[high]).collect()
}

/// Wrap 3/4 channel pixels (BGR orders swapped to RGB) for conversion
fn color_image(
    encoding: ImageEncoding,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<DynamicImage, ImagingError> {
    let channels = encoding.channels() as usize;
    let mut buf = pixels.to_vec();
    if matches!(encoding, ImageEncoding::Bgr8 | ImageEncoding::Bgra8) {
        swap_red_blue(&mut buf, channels);
    }
    let actual = buf.len();
    let truncated = || ImagingError::Truncated {
        expected: width as usize * height as usize * channels,
        actual,
    };

    match encoding {
        ImageEncoding::Bgr8 | ImageEncoding::Rgb8 => {
            ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buf)
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(truncated)
        }
        ImageEncoding::Bgra8 | ImageEncoding::Rgba8 => {
            ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, buf)
                .map(DynamicImage::ImageRgba8)
                .ok_or_else(truncated)
        }
        other => Err(ImagingError::Unsupported(other.as_str().to_string())),
    }
}

/// BT.601 luma in 14-bit fixed point, rounding like OpenCV's RGB2GRAY
fn rgb_to_mono8(rgb: &[u8]) -> Bytes {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    rgb.chunks_exact(3)
        .map(|px| {
            let y = R * u32::from(px[0]) + G * u32::from(px[1]) + B * u32::from(px[2]);
            ((y + (1 << 13)) >> 14) as u8
        })
        .collect()
}

fn swap_red_blue(buf: &mut [u8], channels: usize) {
    for px in buf.chunks_exact_mut(channels) {
        px.swap(0, 2);
    }
}
