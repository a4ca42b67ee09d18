//! # Configuration
//!
//! [`NormalizeConfig`] is the common interface between the CLI and the
//! library. It carries every caller-visible knob, validates them, and converts
//! into the per-invocation values the pipeline consumes ([`TargetSpec`],
//! [`DecodeLimits`], JPEG quality).
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Range | Default |
//! |-----------|------|-------|---------|
//! | `target_width` | `u32` | 0-65535 | 800 |
//! | `target_height` | `u32` | 0-65535 | 1200 |
//! | `quality` | `u8` | 1-100 | 70 |
//! | `strategy` | `Strategy` | letterbox, cover-crop | letterbox |
//! | `background` | `Color` | RGBA | opaque black |
//! | `max_input_bytes` | `usize` | > 0 | 64 MiB |
//! | `max_decoded_bytes` | `u64` | > 0 | 256 MiB |
//!
//! Zero canvas sides are accepted: they produce an empty canvas, which is a
//! valid (if useless) result rather than a configuration error. Sides above
//! 65535 are rejected up front since no JPEG can carry them.
//!
//! ## Examples
//!
//! ```rust
//! use canvas_normalize::config::NormalizeConfig;
//! use canvas_normalize::Strategy;
//!
//! let mut config = NormalizeConfig::default();
//! config.strategy = Strategy::CoverCrop;
//! assert!(config.validate().is_ok());
//!
//! let spec = config.to_target_spec();
//! assert_eq!((spec.width, spec.height), (800, 1200));
//! ```

use canvas_scale::{Color, Strategy};

use crate::decode::{DEFAULT_MAX_DECODED_BYTES, DEFAULT_MAX_INPUT_BYTES, DecodeLimits};
use crate::encode::{DEFAULT_QUALITY, JPEG_MAX_SIDE};
use crate::pipeline::TargetSpec;

/// Width of the vertical upload canvas.
pub const DEFAULT_WIDTH: u32 = 800;
/// Height of the vertical upload canvas.
pub const DEFAULT_HEIGHT: u32 = 1200;

/// All caller-visible settings for a normalization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeConfig {
    /// Canvas width in pixels.
    pub target_width: u32,
    /// Canvas height in pixels.
    pub target_height: u32,
    /// JPEG quality, 1-100. Higher trades file size for fidelity.
    pub quality: u8,
    pub strategy: Strategy,
    /// Color of canvas area the source does not cover.
    pub background: Color,
    /// Largest encoded input accepted, in bytes.
    pub max_input_bytes: usize,
    /// Largest decoded RGBA8 footprint accepted, in bytes.
    pub max_decoded_bytes: u64,
}

impl Default for NormalizeConfig {
    /// The vertical upload canvas: 800×1200, letterboxed on black, quality 70.
    fn default() -> Self {
        Self {
            target_width: DEFAULT_WIDTH,
            target_height: DEFAULT_HEIGHT,
            quality: DEFAULT_QUALITY,
            strategy: Strategy::Letterbox,
            background: Color::BLACK,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_decoded_bytes: DEFAULT_MAX_DECODED_BYTES,
        }
    }
}

impl NormalizeConfig {
    /// Creates a configuration with default resource limits.
    pub fn new(
        target_width: u32,
        target_height: u32,
        quality: u8,
        strategy: Strategy,
        background: Color,
    ) -> Self {
        Self {
            target_width,
            target_height,
            quality,
            strategy,
            background,
            ..Self::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=100).contains(&self.quality) {
            return Err("Quality must be between 1 and 100".to_string());
        }
        if self.target_width > JPEG_MAX_SIDE || self.target_height > JPEG_MAX_SIDE {
            return Err(format!(
                "Canvas {}x{} exceeds the JPEG limit of {} pixels per side",
                self.target_width, self.target_height, JPEG_MAX_SIDE
            ));
        }
        if self.max_input_bytes == 0 {
            return Err("Maximum input size must be greater than 0".to_string());
        }
        if self.max_decoded_bytes == 0 {
            return Err("Maximum decoded size must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn to_target_spec(&self) -> TargetSpec {
        TargetSpec::new(self.target_width, self.target_height, self.strategy)
            .with_background(self.background)
    }

    pub fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_input_bytes: self.max_input_bytes,
            max_decoded_bytes: self.max_decoded_bytes,
        }
    }
}
