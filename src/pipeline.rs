//! # Normalization Pipeline
//!
//! `decode → plan → scale → composite → encode`, run to completion on the
//! calling thread. Every invocation owns its buffers and its resampler, so
//! concurrent calls share nothing and need no locking.
//!
//! The first failing stage aborts the run and is reported through
//! [`PipelineError`]. Compositing cannot fail.
//!
//! ## Large intermediates
//!
//! A very elongated source can ask for an enormous scaled image (a 1×10000
//! strip covering an 800×1200 canvas scales to 800×8000000). When the full
//! scaled image would exceed [`MAX_SCALED_BYTES`], only the part of it that
//! lands on the canvas is resampled, straight from the matching source
//! region. The canvas geometry is the same either way. A source whose scaled
//! side would not fit in `u32` at all fails in the scale stage.

use std::path::{Path, PathBuf};

use canvas_scale::canvas::{composite, composite_plan};
use canvas_scale::cpu::{ScaleError, SourceRegion, scale_region_rgba_cpu, scale_rgba_cpu};
use canvas_scale::layout::{LayoutError, build_plan};
use canvas_scale::{Color, PixelBuffer, Placement, ScalePlan, Size, Strategy};
use fast_image_resize::Resizer;

use crate::decode::{DEFAULT_MAX_DECODED_BYTES, DecodeLimits, decode_with_limits};
use crate::encode::{encode, encode_to_path};
use crate::error::PipelineError;

/// Largest full scaled intermediate materialised before switching to
/// windowed resampling.
pub const MAX_SCALED_BYTES: u64 = DEFAULT_MAX_DECODED_BYTES;

/// Canvas request for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSpec {
    pub width: u32,
    pub height: u32,
    pub strategy: Strategy,
    pub background: Color,
}

impl TargetSpec {
    /// Canvas of `width`×`height` on an opaque black background.
    pub fn new(width: u32, height: u32, strategy: Strategy) -> Self {
        Self {
            width,
            height,
            strategy,
            background: Color::BLACK,
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    /// The 800×1200 letterboxed upload canvas.
    pub fn vertical_canvas() -> Self {
        Self::new(800, 1200, Strategy::Letterbox)
    }

    pub fn canvas(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Geometry for a source of `input` size.
    pub fn plan(&self, input: Size) -> Result<ScalePlan, LayoutError> {
        build_plan(input, self.canvas(), self.strategy)
    }
}

impl Default for TargetSpec {
    fn default() -> Self {
        Self::vertical_canvas()
    }
}

/// Decode `bytes` and build the canvas, with default decode limits.
pub fn normalize(bytes: &[u8], spec: &TargetSpec) -> Result<PixelBuffer, PipelineError> {
    normalize_with_limits(bytes, spec, &DecodeLimits::default())
}

pub fn normalize_with_limits(
    bytes: &[u8],
    spec: &TargetSpec,
    limits: &DecodeLimits,
) -> Result<PixelBuffer, PipelineError> {
    let (source, _) = decode_with_limits(bytes, limits)?;
    normalize_buffer(&source, spec)
}

/// Build the canvas from an already decoded buffer.
///
/// The result is always exactly `spec.width`×`spec.height`. A zero-area
/// source yields a background-only canvas.
pub fn normalize_buffer(source: &PixelBuffer, spec: &TargetSpec) -> Result<PixelBuffer, PipelineError> {
    let plan = spec.plan(source.size()).map_err(ScaleError::from)?;

    if plan.is_background_only() {
        return Ok(PixelBuffer::filled(plan.canvas.w, plan.canvas.h, spec.background));
    }

    let mut resizer = Resizer::new();
    let scaled_bytes = plan.scaled.area() * 4;
    if scaled_bytes > MAX_SCALED_BYTES {
        return render_visible_window(&mut resizer, source, &plan, spec.background);
    }

    let scaled = match plan.strategy {
        Strategy::Letterbox => scale_rgba_cpu(&mut resizer, source, Some(plan.scaled.w), None)?,
        Strategy::CoverCrop => {
            scale_rgba_cpu(&mut resizer, source, Some(plan.scaled.w), Some(plan.scaled.h))?
        }
    };
    Ok(composite_plan(&plan, spec.background, &scaled))
}

/// Resample only the on-canvas part of the scaled image.
fn render_visible_window(
    resizer: &mut Resizer,
    source: &PixelBuffer,
    plan: &ScalePlan,
    background: Color,
) -> Result<PixelBuffer, PipelineError> {
    let Some((window, x, y)) = plan.visible_window() else {
        return Ok(PixelBuffer::filled(plan.canvas.w, plan.canvas.h, background));
    };
    let sx = f64::from(plan.input.w) / f64::from(plan.scaled.w);
    let sy = f64::from(plan.input.h) / f64::from(plan.scaled.h);
    let region = SourceRegion {
        left: f64::from(window.min_x) * sx,
        top: f64::from(window.min_y) * sy,
        width: f64::from(window.width()) * sx,
        height: f64::from(window.height()) * sy,
    };

    let visible = scale_region_rgba_cpu(resizer, source, region, window.size())?;
    let placement = Placement::Offset {
        x: i64::from(x),
        y: i64::from(y),
    };
    Ok(composite(plan.canvas, background, &visible, placement))
}

/// Normalize and encode to JPEG bytes.
pub fn normalize_to_jpeg(bytes: &[u8], spec: &TargetSpec, quality: u8) -> Result<Vec<u8>, PipelineError> {
    let canvas = normalize(bytes, spec)?;
    Ok(encode(&canvas, quality)?)
}

/// Normalize and write a JPEG to `path`. Returns the path written.
pub fn normalize_to_path(
    bytes: &[u8],
    spec: &TargetSpec,
    quality: u8,
    path: impl AsRef<Path>,
) -> Result<PathBuf, PipelineError> {
    let canvas = normalize(bytes, spec)?;
    Ok(encode_to_path(&canvas, quality, path)?)
}
