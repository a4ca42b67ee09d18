// SPDX-License-Identifier: MIT
// CPU scaler built on fast_image_resize (SIMD-accelerated).
// RGBA8 in → freshly allocated RGBA8 out, Lanczos3 convolution on both axes.

use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::U8x4;
use fir::{FilterType, ResizeAlg, ResizeOptions, Resizer};

use crate::buffer::{BufferSizeError, Color, PixelBuffer};
use crate::layout::{LayoutError, Size, height_for_width, width_for_height};

#[derive(Debug)]
pub enum ScaleError {
    /// Both target dimensions were omitted.
    NoTarget,
    Layout(LayoutError),
    Fir(fir::ResizeError),
    ImageBuf(fir::ImageBufferError),
    Buffer(BufferSizeError),
}

impl From<LayoutError> for ScaleError { fn from(e: LayoutError) -> Self { Self::Layout(e) } }
impl From<fir::ResizeError> for ScaleError { fn from(e: fir::ResizeError) -> Self { Self::Fir(e) } }
impl From<fir::ImageBufferError> for ScaleError { fn from(e: fir::ImageBufferError) -> Self { Self::ImageBuf(e) } }
impl From<BufferSizeError> for ScaleError { fn from(e: BufferSizeError) -> Self { Self::Buffer(e) } }

impl std::fmt::Display for ScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleError::NoTarget => write!(f, "At least one of target width or height is required"),
            ScaleError::Layout(e) => write!(f, "Layout error: {}", e),
            ScaleError::Fir(e) => write!(f, "Fast image resize error: {}", e),
            ScaleError::ImageBuf(e) => write!(f, "Image buffer error: {}", e),
            ScaleError::Buffer(e) => write!(f, "Pixel buffer error: {}", e),
        }
    }
}

impl std::error::Error for ScaleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScaleError::Layout(e) => Some(e),
            ScaleError::Fir(e) => Some(e),
            ScaleError::ImageBuf(e) => Some(e),
            ScaleError::Buffer(e) => Some(e),
            _ => None,
        }
    }
}

/// Sub-rectangle of the source in (possibly fractional) source pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceRegion {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Resolve the output size for a resize request.
///
/// One omitted side is derived from the source aspect ratio. A zero-area
/// source yields zero for the derived side.
pub fn target_size(src: Size, width: Option<u32>, height: Option<u32>) -> Result<Size, ScaleError> {
    let too_large = |target| ScaleError::Layout(LayoutError::ScaledTooLarge { input: src, target });
    match (width, height) {
        (Some(w), Some(h)) => Ok(Size::new(w, h)),
        (Some(w), None) => {
            let h = height_for_width(src, w).ok_or_else(|| too_large(Size::new(w, 0)))?;
            Ok(Size::new(w, h))
        }
        (None, Some(h)) => {
            let w = width_for_height(src, h).ok_or_else(|| too_large(Size::new(0, h)))?;
            Ok(Size::new(w, h))
        }
        (None, None) => Err(ScaleError::NoTarget),
    }
}

fn lanczos3() -> ResizeOptions {
    ResizeOptions::new()
        .resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3))
        // premultiply so transparent edges do not bleed dark fringes
        .use_alpha(true)
}

/// Resize `src` to the requested dimensions. Never mutates `src`.
///
/// - Both sides given: scaled to exactly that size, aspect ratio may change.
/// - One side given: the other follows the source aspect ratio.
/// - Zero-area source: a transparent buffer of the requested size.
/// - Same size as source: an exact copy.
pub fn scale_rgba_cpu(
    resizer: &mut Resizer,
    src: &PixelBuffer,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<PixelBuffer, ScaleError> {
    let out = target_size(src.size(), width, height)?;

    if src.is_empty() || out.is_empty() {
        return Ok(PixelBuffer::filled(out.w, out.h, Color::TRANSPARENT));
    }
    if out == src.size() {
        return Ok(src.clone());
    }

    let src_view = TypedImageRef::<U8x4>::from_buffer(src.width(), src.height(), src.as_bytes())?;
    let mut dst = vec![0u8; PixelBuffer::byte_len(out.w, out.h)];
    {
        let mut dst_image = TypedImage::<U8x4>::from_buffer(out.w, out.h, &mut dst)?;
        resizer.resize_typed::<U8x4>(&src_view, &mut dst_image, &lanczos3())?;
    }

    Ok(PixelBuffer::from_raw(out.w, out.h, dst)?)
}

/// Resize only `region` of `src` into an `out` sized buffer.
///
/// Produces the same pixels as scaling the whole source and cropping the
/// matching window, without materialising the full scaled image.
pub fn scale_region_rgba_cpu(
    resizer: &mut Resizer,
    src: &PixelBuffer,
    region: SourceRegion,
    out: Size,
) -> Result<PixelBuffer, ScaleError> {
    if src.is_empty() || out.is_empty() || region.width <= 0.0 || region.height <= 0.0 {
        return Ok(PixelBuffer::filled(out.w, out.h, Color::TRANSPARENT));
    }

    let src_view = TypedImageRef::<U8x4>::from_buffer(src.width(), src.height(), src.as_bytes())?;
    let mut dst = vec![0u8; PixelBuffer::byte_len(out.w, out.h)];
    let opts = lanczos3().crop(region.left, region.top, region.width, region.height);
    {
        let mut dst_image = TypedImage::<U8x4>::from_buffer(out.w, out.h, &mut dst)?;
        resizer.resize_typed::<U8x4>(&src_view, &mut dst_image, &opts)?;
    }

    Ok(PixelBuffer::from_raw(out.w, out.h, dst)?)
}

/// One-shot resize with a throwaway [`Resizer`].
pub fn resize(src: &PixelBuffer, width: Option<u32>, height: Option<u32>) -> Result<PixelBuffer, ScaleError> {
    let mut resizer = Resizer::new();
    scale_rgba_cpu(&mut resizer, src, width, height)
}
