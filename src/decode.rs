//! # Decoder
//!
//! Turns an opaque byte sequence into an RGBA8 [`PixelBuffer`].
//!
//! The format is sniffed from the leading magic bytes only; file names and
//! declared content types are never consulted. Dispatch is over a closed set
//! of formats ([`SourceFormat`]) so every failure mode is enumerable.
//!
//! Allocation is bounded before any pixel work: the input length is checked
//! first, then the header dimensions are probed and rejected when the RGBA8
//! result would exceed [`DecodeLimits::max_decoded_bytes`]. The codec itself
//! also runs under an allocation cap so a lying header cannot get past the
//! probe.
//!
//! GIF input decodes to its first frame.

use std::fmt;
use std::io::Cursor;

use canvas_scale::PixelBuffer;
use image::error::{ParameterError, ParameterErrorKind};
use image::{ImageFormat, ImageReader};

use crate::error::DecodeError;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const GIF87_MAGIC: &[u8] = b"GIF87a";
const GIF89_MAGIC: &[u8] = b"GIF89a";

/// Default cap on encoded input size: 64 MiB.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 64 * 1024 * 1024;
/// Default cap on decoded RGBA8 size: 256 MiB (e.g. 8192×8192).
pub const DEFAULT_MAX_DECODED_BYTES: u64 = 256 * 1024 * 1024;

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Jpeg,
    Png,
    Gif,
}

impl SourceFormat {
    /// Identify the format from leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(PNG_MAGIC) {
            Some(Self::Png)
        } else if bytes.starts_with(JPEG_MAGIC) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(GIF87_MAGIC) || bytes.starts_with(GIF89_MAGIC) {
            Some(Self::Gif)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Gif => ImageFormat::Gif,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource limits applied before and during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Largest accepted encoded input, in bytes.
    pub max_input_bytes: usize,
    /// Largest accepted `width * height * 4`.
    pub max_decoded_bytes: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_decoded_bytes: DEFAULT_MAX_DECODED_BYTES,
        }
    }
}

impl DecodeLimits {
    /// Reject dimensions whose RGBA8 footprint exceeds the cap.
    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<(), DecodeError> {
        let bytes = u64::from(width) * u64::from(height) * 4;
        if bytes > self.max_decoded_bytes {
            return Err(DecodeError::DimensionsTooLarge {
                width,
                height,
                limit: self.max_decoded_bytes,
            });
        }
        Ok(())
    }
}

/// Decode with [`DecodeLimits::default`].
pub fn decode(bytes: &[u8]) -> Result<(PixelBuffer, SourceFormat), DecodeError> {
    decode_with_limits(bytes, &DecodeLimits::default())
}

/// Decode `bytes` into an RGBA8 buffer, reporting the sniffed format.
pub fn decode_with_limits(
    bytes: &[u8],
    limits: &DecodeLimits,
) -> Result<(PixelBuffer, SourceFormat), DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    if bytes.len() > limits.max_input_bytes {
        return Err(DecodeError::InputTooLarge {
            len: bytes.len(),
            limit: limits.max_input_bytes,
        });
    }
    let format = SourceFormat::sniff(bytes).ok_or_else(|| DecodeError::UnknownFormat {
        signature: bytes[..bytes.len().min(8)].to_vec(),
    })?;
    let malformed = |source: image::ImageError| DecodeError::Malformed { format, source };

    let (width, height) = ImageReader::with_format(Cursor::new(bytes), format.image_format())
        .into_dimensions()
        .map_err(malformed)?;
    limits.check_dimensions(width, height)?;

    let mut reader = ImageReader::with_format(Cursor::new(bytes), format.image_format());
    let mut codec_limits = image::Limits::default();
    // 16-bit PNG decodes at up to 8 bytes per pixel before conversion
    codec_limits.max_alloc = Some(limits.max_decoded_bytes.saturating_mul(2));
    reader.limits(codec_limits);
    let rgba = reader.decode().map_err(malformed)?.into_rgba8();

    let (w, h) = rgba.dimensions();
    let buffer = PixelBuffer::from_raw(w, h, rgba.into_raw()).map_err(|_| {
        malformed(image::ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::DimensionMismatch,
        )))
    })?;
    Ok((buffer, format))
}
