//! # Encoder
//!
//! Serializes RGBA8 buffers to baseline JPEG at a caller-chosen quality.
//!
//! JPEG has no alpha channel, so pixels are flattened over black before
//! encoding (`c * a / 255`). Opaque canvases are unaffected.
//!
//! [`encode_to_path`] owns its destination handle for the duration of the call
//! only: the file is created, written through a buffered writer, flushed, and
//! closed on every exit path, including a failure halfway through encoding.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use canvas_scale::PixelBuffer;
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;

use crate::error::EncodeError;

/// Quality used when the caller does not override it.
pub const DEFAULT_QUALITY: u8 = 70;

/// Largest side a baseline JPEG can carry.
pub const JPEG_MAX_SIDE: u32 = u16::MAX as u32;

/// Encode a buffer to JPEG bytes.
pub fn encode(buffer: &PixelBuffer, quality: u8) -> Result<Vec<u8>, EncodeError> {
    encode_rgba(buffer.width(), buffer.height(), buffer.as_bytes(), quality)
}

/// Encode raw RGBA8 bytes with declared dimensions.
pub fn encode_rgba(width: u32, height: u32, pixels: &[u8], quality: u8) -> Result<Vec<u8>, EncodeError> {
    validate(width, height, pixels.len(), quality)?;
    let mut out = Vec::new();
    write_jpeg(&mut out, width, height, pixels, quality)?;
    Ok(out)
}

/// Encode a buffer straight into a file at `path`, creating or truncating it.
///
/// Returns the path written. Input is validated before the file is touched,
/// so a bad quality or unencodable buffer leaves no file behind.
pub fn encode_to_path(buffer: &PixelBuffer, quality: u8, path: impl AsRef<Path>) -> Result<PathBuf, EncodeError> {
    let path = path.as_ref();
    validate(buffer.width(), buffer.height(), buffer.as_bytes().len(), quality)?;

    let io_err = |source: std::io::Error| EncodeError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    write_jpeg(&mut writer, buffer.width(), buffer.height(), buffer.as_bytes(), quality)?;
    writer.flush().map_err(io_err)?;

    Ok(path.to_path_buf())
}

fn validate(width: u32, height: u32, len: usize, quality: u8) -> Result<(), EncodeError> {
    if !(1..=100).contains(&quality) {
        return Err(EncodeError::InvalidQuality(quality));
    }
    let expected = PixelBuffer::byte_len(width, height);
    if len != expected {
        return Err(EncodeError::BufferMismatch {
            width,
            height,
            expected,
            actual: len,
        });
    }
    if width == 0 || height == 0 || width > JPEG_MAX_SIDE || height > JPEG_MAX_SIDE {
        return Err(EncodeError::UnencodableDimensions { width, height });
    }
    Ok(())
}

fn write_jpeg<W: Write>(writer: W, width: u32, height: u32, rgba: &[u8], quality: u8) -> Result<(), EncodeError> {
    let rgb = flatten_over_black(rgba);
    let mut encoder = JpegEncoder::new_with_quality(writer, quality);
    encoder.encode(&rgb, width, height, ExtendedColorType::Rgb8)?;
    Ok(())
}

/// RGBA8 → RGB8, compositing over opaque black.
fn flatten_over_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        match px[3] {
            255 => rgb.extend_from_slice(&px[..3]),
            a => {
                let a = u32::from(a);
                for &c in &px[..3] {
                    rgb.push(((u32::from(c) * a + 127) / 255) as u8);
                }
            }
        }
    }
    rgb
}
