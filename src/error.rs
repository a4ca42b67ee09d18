//! # Error Taxonomy
//!
//! Every failure in the normalizer is deterministic for a given input, so no
//! error here is retried internally and none carries retry metadata. Errors
//! are returned to the immediate caller with enough detail (stage plus the
//! underlying cause) to log them or map them to a transport status.
//!
//! - [`DecodeError`]: malformed, unsupported or oversized input. Always
//!   caller-fixable.
//! - [`EncodeError`]: bad quality, an unencodable buffer, or an unwritable
//!   destination.
//! - [`PipelineError`]: the first failing stage of a pipeline run, tagged with
//!   its [`Stage`].
//!
//! Degenerate-but-valid inputs (zero-area sources, zero canvas sides) are not
//! errors anywhere in this crate.
//!
//! ## Usage
//!
//! ```rust
//! use canvas_normalize::{normalize, Stage, TargetSpec};
//!
//! let err = normalize(&[0x13, 0x37, 0x42], &TargetSpec::vertical_canvas()).unwrap_err();
//! assert_eq!(err.stage(), Stage::Decode);
//! assert_eq!(err.category(), "decode");
//! ```

use std::{error::Error as StdError, fmt, io, path::PathBuf};

use canvas_scale::cpu::ScaleError;

use crate::decode::SourceFormat;

/// Decoder failures.
#[derive(Debug)]
pub enum DecodeError {
    /// Zero input bytes.
    Empty,
    /// The leading bytes match none of the supported signatures.
    UnknownFormat {
        /// Up to the first 8 bytes of input, for diagnostics.
        signature: Vec<u8>,
    },
    /// Input byte length exceeds the configured limit.
    InputTooLarge { len: usize, limit: usize },
    /// Header dimensions would decode to more RGBA bytes than allowed.
    DimensionsTooLarge { width: u32, height: u32, limit: u64 },
    /// Signature matched but the codec rejected the stream (truncated,
    /// corrupt, or an unsupported variant of the format).
    Malformed {
        format: SourceFormat,
        source: image::ImageError,
    },
}

impl DecodeError {
    pub fn category(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::UnknownFormat { .. } => "unknown_format",
            Self::InputTooLarge { .. } => "input_too_large",
            Self::DimensionsTooLarge { .. } => "dimensions_too_large",
            Self::Malformed { .. } => "malformed",
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Empty => write!(f, "Input is empty"),
            DecodeError::UnknownFormat { signature } => {
                write!(f, "Unrecognized image signature: ")?;
                for b in signature {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            DecodeError::InputTooLarge { len, limit } => {
                write!(f, "Input of {} bytes exceeds limit of {} bytes", len, limit)
            }
            DecodeError::DimensionsTooLarge {
                width,
                height,
                limit,
            } => write!(
                f,
                "Image {}x{} exceeds decoded size limit of {} bytes",
                width, height, limit
            ),
            DecodeError::Malformed { format, source } => {
                write!(f, "Malformed {} data: {}", format, source)
            }
        }
    }
}

impl StdError for DecodeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            DecodeError::Malformed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Encoder failures.
#[derive(Debug)]
pub enum EncodeError {
    /// Quality outside `1..=100`.
    InvalidQuality(u8),
    /// Declared dimensions disagree with the pixel byte count.
    BufferMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    /// Dimensions JPEG cannot represent (zero or above 65535 on a side).
    UnencodableDimensions { width: u32, height: u32 },
    /// Destination could not be created or written.
    Io { path: PathBuf, source: io::Error },
    /// The JPEG codec itself failed.
    Codec(image::ImageError),
}

impl EncodeError {
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidQuality(_) => "invalid_quality",
            Self::BufferMismatch { .. } => "buffer_mismatch",
            Self::UnencodableDimensions { .. } => "unencodable_dimensions",
            Self::Io { .. } => "io",
            Self::Codec(_) => "codec",
        }
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::InvalidQuality(q) => {
                write!(f, "JPEG quality {} is outside 1..=100", q)
            }
            EncodeError::BufferMismatch {
                width,
                height,
                expected,
                actual,
            } => write!(
                f,
                "Buffer declared {}x{} needs {} bytes, has {}",
                width, height, expected, actual
            ),
            EncodeError::UnencodableDimensions { width, height } => {
                write!(f, "JPEG cannot encode a {}x{} image", width, height)
            }
            EncodeError::Io { path, source } => {
                write!(f, "Cannot write '{}': {}", path.display(), source)
            }
            EncodeError::Codec(e) => write!(f, "JPEG encoder error: {}", e),
        }
    }
}

impl StdError for EncodeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            EncodeError::Io { source, .. } => Some(source),
            EncodeError::Codec(e) => Some(e),
            _ => None,
        }
    }
}

impl From<image::ImageError> for EncodeError {
    fn from(error: image::ImageError) -> Self {
        Self::Codec(error)
    }
}

/// Pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Decode,
    Scale,
    /// Compositing cannot fail; present so logs and reports can name it.
    Composite,
    Encode,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Decode => "decode",
            Stage::Scale => "scale",
            Stage::Composite => "composite",
            Stage::Encode => "encode",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First failure of a pipeline run, tagged with the stage that produced it.
#[derive(Debug)]
pub enum PipelineError {
    Decode(DecodeError),
    Scale(ScaleError),
    Encode(EncodeError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Decode(_) => Stage::Decode,
            PipelineError::Scale(_) => Stage::Scale,
            PipelineError::Encode(_) => Stage::Encode,
        }
    }

    /// Stage name, for mapping to transport-level status codes.
    pub fn category(&self) -> &'static str {
        self.stage().as_str()
    }

    /// Fine-grained cause name within the stage.
    pub fn cause_category(&self) -> &'static str {
        match self {
            PipelineError::Decode(e) => e.category(),
            PipelineError::Scale(ScaleError::NoTarget) => "no_target",
            PipelineError::Scale(ScaleError::Layout(_)) => "scaled_too_large",
            PipelineError::Scale(_) => "resampler",
            PipelineError::Encode(e) => e.category(),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Decode(e) => write!(f, "{} stage failed: {}", Stage::Decode, e),
            PipelineError::Scale(e) => write!(f, "{} stage failed: {}", Stage::Scale, e),
            PipelineError::Encode(e) => write!(f, "{} stage failed: {}", Stage::Encode, e),
        }
    }
}

impl StdError for PipelineError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            PipelineError::Decode(e) => Some(e),
            PipelineError::Scale(e) => Some(e),
            PipelineError::Encode(e) => Some(e),
        }
    }
}

impl From<DecodeError> for PipelineError {
    fn from(error: DecodeError) -> Self {
        Self::Decode(error)
    }
}

impl From<ScaleError> for PipelineError {
    fn from(error: ScaleError) -> Self {
        Self::Scale(error)
    }
}

impl From<EncodeError> for PipelineError {
    fn from(error: EncodeError) -> Self {
        Self::Encode(error)
    }
}
