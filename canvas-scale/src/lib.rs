// SPDX-License-Identifier: MIT
//! # canvas-scale: Fixed-Canvas Scaling for RGBA8 Buffers
//!
//! This crate holds the pixel-geometry core of the canvas normalizer: it turns
//! an arbitrarily sized RGBA8 raster into one of exactly the requested canvas
//! size, using one of two deterministic strategies.
//!
//! ## Key Components
//!
//! - [`buffer`]: [`PixelBuffer`] (owned RGBA8 raster) and [`Color`]
//! - [`layout`]: Letterbox and CoverCrop geometry, [`ScalePlan`] computation
//! - [`cpu`]: Lanczos3 resampling using fast_image_resize (SIMD)
//! - [`canvas`]: Background fill plus clipped source-over compositing
//!
//! ## Usage Example
//!
//! ```rust
//! use canvas_scale::{
//!     buffer::{Color, PixelBuffer},
//!     canvas::composite_plan,
//!     cpu::resize,
//!     layout::{build_plan, Size, Strategy},
//! };
//!
//! let src = PixelBuffer::filled(1600, 800, Color::WHITE);
//! let plan = build_plan(src.size(), Size::new(800, 1200), Strategy::Letterbox)?;
//! let scaled = resize(&src, Some(plan.scaled.w), Some(plan.scaled.h))?;
//! let canvas = composite_plan(&plan, Color::BLACK, &scaled);
//!
//! assert_eq!(canvas.size(), Size::new(800, 1200));
//! # Ok::<(), canvas_scale::cpu::ScaleError>(())
//! ```

pub mod buffer;
pub mod canvas;
pub mod cpu;
pub mod layout;

pub use buffer::{Color, PixelBuffer};
pub use layout::{LayoutError, Placement, Rect, ScalePlan, Size, Strategy};
