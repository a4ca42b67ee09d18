//! # Canvas Normalizer
//!
//! Turns an uploaded image of arbitrary size and format into a JPEG on a
//! fixed-size canvas, so everything downstream can rely on one geometry.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `decode`: Magic-byte sniffing and bounded decoding of JPEG, PNG and GIF
//! - `pipeline`: Decode → plan → scale → composite, plus fused JPEG output
//! - `encode`: Baseline JPEG output to memory or to a file
//! - `error`: Stage-tagged error taxonomy
//! - `config`: Configuration management and validation
//! - `batch`: Concurrent file-to-file driver used by the `canvasnorm` binary
//!
//! Pixel geometry (layout strategies, Lanczos3 resampling, compositing) lives
//! in the `canvas-scale` workspace crate and is re-exported here.
//!
//! ## Features
//!
//! - **Two strategies**: letterbox (fit width, pad with background) and
//!   cover-crop (fill both axes, crop centered overflow)
//! - **Exact output size**: every successful run yields exactly the requested
//!   canvas, including degenerate sources
//! - **Bounded resources**: input and decoded sizes are capped before any
//!   large allocation
//! - **Stateless**: no shared state between invocations, safe to run in
//!   parallel
//!
//! ## Example
//!
//! ```rust
//! use canvas_normalize::{normalize_buffer, Color, PixelBuffer, TargetSpec};
//!
//! let photo = PixelBuffer::filled(1600, 800, Color::WHITE);
//! let canvas = normalize_buffer(&photo, &TargetSpec::vertical_canvas())?;
//!
//! assert_eq!((canvas.width(), canvas.height()), (800, 1200));
//! assert_eq!(canvas.pixel(0, 0), Some(Color::BLACK));
//! # Ok::<(), canvas_normalize::PipelineError>(())
//! ```

pub mod batch;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod pipeline;

/// Re-export error types for convenience
pub use error::{DecodeError, EncodeError, PipelineError, Stage};

pub use config::NormalizeConfig;
pub use decode::{DecodeLimits, SourceFormat, decode, decode_with_limits};
pub use encode::{DEFAULT_QUALITY, encode, encode_rgba, encode_to_path};
pub use pipeline::{
    TargetSpec, normalize, normalize_buffer, normalize_to_jpeg, normalize_to_path, normalize_with_limits,
};

/// Re-export the pixel geometry crate and its core types
pub use canvas_scale;
pub use canvas_scale::cpu::ScaleError;
pub use canvas_scale::{Color, PixelBuffer, Placement, Rect, ScalePlan, Size, Strategy};
