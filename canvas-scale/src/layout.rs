// SPDX-License-Identifier: MIT
//! # Canvas Layout Strategies
//!
//! Pure geometry for placing an arbitrarily sized source onto a fixed canvas.
//! Nothing here touches pixels or allocates beyond the returned structs.
//!
//! Two strategies are supported:
//! 1. **Letterbox**: scale to the canvas width, center vertically, pad the
//!    rest with background. Height is not constrained; overflow is clipped by
//!    the compositor.
//! 2. **CoverCrop**: scale until both canvas axes are covered, then take the
//!    centered `target` sized window out of the scaled image.
//!
//! All offsets use floor division, so an odd leftover pixel goes to the
//! bottom/right band.
//!
//! Zero-area sources are a boundary input, not an error: both strategies
//! return an empty placement and the canvas stays background-only. A source
//! so elongated that a scaled side would not fit in `u32` is rejected with
//! [`LayoutError::ScaledTooLarge`].

use std::fmt;

/// A 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub const ZERO: Size = Size { w: 0, h: 0 };

    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    pub fn is_empty(self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn area(self) -> u64 {
        u64::from(self.w) * u64::from(self.h)
    }
}

/// Integer axis-aligned rectangle, half-open: `[min_x, max_x) × [min_y, max_y)`.
///
/// Invariant: `max_x >= min_x` and `max_y >= min_y`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl Rect {
    pub const EMPTY: Rect = Rect {
        min_x: 0,
        min_y: 0,
        max_x: 0,
        max_y: 0,
    };

    /// Rectangle from origin and extent. Saturates instead of overflowing.
    pub fn from_xywh(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x.saturating_add(w),
            max_y: y.saturating_add(h),
        }
    }

    /// The full bounds of a `size` raster.
    pub fn from_size(size: Size) -> Self {
        Self::from_xywh(0, 0, size.w, size.h)
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Overlap of two rectangles. Disjoint inputs give a zero-extent rect.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let min_x = self.min_x.max(other.min_x);
        let min_y = self.min_y.max(other.min_y);
        let max_x = self.max_x.min(other.max_x).max(min_x);
        let max_y = self.max_y.min(other.max_y).max(min_y);
        Rect {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// True when `self` lies entirely inside `bounds`.
    pub fn within(&self, bounds: &Rect) -> bool {
        self.min_x >= bounds.min_x
            && self.min_y >= bounds.min_y
            && self.max_x <= bounds.max_x
            && self.max_y <= bounds.max_y
    }
}

/// Canvas strategy selected per invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Strategy {
    /// Fit the canvas width, center vertically, pad with background.
    #[default]
    #[value(name = "letterbox")]
    Letterbox,
    /// Cover both canvas axes and crop the centered overflow.
    #[value(name = "cover-crop")]
    CoverCrop,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Letterbox => "letterbox",
            Strategy::CoverCrop => "cover-crop",
        }
    }
}

/// How a scaled source lands on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Draw the whole source with its top-left corner at `(x, y)` in canvas
    /// space. Offsets may be negative; the compositor clips to the canvas.
    Offset { x: i64, y: i64 },
    /// Draw the `crop` window of the source at the canvas origin.
    Crop(Rect),
    /// Draw nothing.
    Nothing,
}

/// Geometry that cannot be represented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// A scaled side would exceed `u32::MAX` pixels.
    ScaledTooLarge { input: Size, target: Size },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::ScaledTooLarge { input, target } => write!(
                f,
                "Scaling {}x{} onto {}x{} needs a side larger than {} pixels",
                input.w,
                input.h,
                target.w,
                target.h,
                u32::MAX
            ),
        }
    }
}

impl std::error::Error for LayoutError {}

/// Result of [`letterbox`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LetterboxLayout {
    pub scaled: Size,
    pub offset_x: i64,
    pub offset_y: i64,
}

/// Result of [`cover_crop`]. Offsets are always zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoverCropLayout {
    pub scaled: Size,
    pub crop: Rect,
}

fn scaled_side(exact: f64) -> Option<u32> {
    let side = exact.round();
    (side <= f64::from(u32::MAX)).then_some(side as u32)
}

/// Height of `input` after scaling its width to `width`, aspect preserved.
///
/// Rounds to nearest. Zero-area input yields zero. `None` when the result
/// does not fit in `u32`.
pub fn height_for_width(input: Size, width: u32) -> Option<u32> {
    if input.is_empty() {
        return Some(0);
    }
    scaled_side(f64::from(input.h) * f64::from(width) / f64::from(input.w))
}

/// Width of `input` after scaling its height to `height`, aspect preserved.
pub fn width_for_height(input: Size, height: u32) -> Option<u32> {
    if input.is_empty() {
        return Some(0);
    }
    scaled_side(f64::from(input.w) * f64::from(height) / f64::from(input.h))
}

/// Fit-width letterbox.
///
/// The scaled width always equals `target.w`. The vertical offset is
/// `floor((target.h - scaled.h) / 2)` and goes negative when the scaled
/// height overflows the canvas.
pub fn letterbox(input: Size, target: Size) -> Result<LetterboxLayout, LayoutError> {
    if input.is_empty() {
        return Ok(LetterboxLayout {
            scaled: Size::ZERO,
            offset_x: 0,
            offset_y: 0,
        });
    }
    let h = height_for_width(input, target.w).ok_or(LayoutError::ScaledTooLarge { input, target })?;
    let scaled = Size::new(target.w, h);
    let offset_y = (i64::from(target.h) - i64::from(scaled.h)).div_euclid(2);
    Ok(LetterboxLayout {
        scaled,
        offset_x: 0,
        offset_y,
    })
}

/// Scale-to-cover with a centered crop window.
///
/// The scale factor is the larger of the two axis ratios, and each scaled
/// side is raised to at least the target side so rounding can never leave
/// the crop short. The crop window is clamped to the scaled bounds.
pub fn cover_crop(input: Size, target: Size) -> Result<CoverCropLayout, LayoutError> {
    if input.is_empty() {
        return Ok(CoverCropLayout {
            scaled: Size::ZERO,
            crop: Rect::EMPTY,
        });
    }
    let (w, h) = (f64::from(input.w), f64::from(input.h));
    let scale = (f64::from(target.w) / w).max(f64::from(target.h) / h);
    let too_large = LayoutError::ScaledTooLarge { input, target };
    let scaled = Size::new(
        scaled_side(w * scale).ok_or(too_large)?.max(target.w),
        scaled_side(h * scale).ok_or(too_large)?.max(target.h),
    );
    let crop = Rect::from_xywh(
        (scaled.w - target.w) / 2,
        (scaled.h - target.h) / 2,
        target.w,
        target.h,
    )
    .intersect(&Rect::from_size(scaled));
    Ok(CoverCropLayout { scaled, crop })
}

/// Intersect a source placed at `(x, y)` with the canvas.
///
/// Returns the visible source window and where its top-left lands.
pub fn clip_offset(canvas: Size, source: Size, x: i64, y: i64) -> Option<(Rect, u32, u32)> {
    let left = x.max(0);
    let top = y.max(0);
    let right = (x + i64::from(source.w)).min(i64::from(canvas.w));
    let bottom = (y + i64::from(source.h)).min(i64::from(canvas.h));
    if right <= left || bottom <= top {
        return None;
    }
    let src = Rect::from_xywh(
        (left - x) as u32,
        (top - y) as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    );
    Some((src, left as u32, top as u32))
}

/// Complete plan for one canvas build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScalePlan {
    /// Source dimensions.
    pub input: Size,
    /// Canvas dimensions.
    pub canvas: Size,
    pub strategy: Strategy,
    /// Dimensions the source is resized to before compositing.
    pub scaled: Size,
    pub placement: Placement,
}

impl ScalePlan {
    /// True when there is nothing to draw and the canvas is background only.
    pub fn is_background_only(&self) -> bool {
        self.scaled.is_empty() || self.canvas.is_empty() || self.placement == Placement::Nothing
    }

    /// Part of the scaled image that lands on the canvas, in scaled-image
    /// coordinates, together with the canvas position of its top-left corner.
    ///
    /// `None` when nothing of the source is visible.
    pub fn visible_window(&self) -> Option<(Rect, u32, u32)> {
        if self.is_background_only() {
            return None;
        }
        let scaled = Rect::from_size(self.scaled);
        let (window, x, y) = match self.placement {
            Placement::Nothing => return None,
            Placement::Crop(crop) => {
                let crop = crop.intersect(&scaled);
                let w = crop.width().min(self.canvas.w);
                let h = crop.height().min(self.canvas.h);
                (Rect::from_xywh(crop.min_x, crop.min_y, w, h), 0, 0)
            }
            Placement::Offset { x, y } => clip_offset(self.canvas, self.scaled, x, y)?,
        };
        (!window.is_empty()).then_some((window, x, y))
    }
}

/// Compute the plan for `strategy`.
pub fn build_plan(input: Size, canvas: Size, strategy: Strategy) -> Result<ScalePlan, LayoutError> {
    let (scaled, placement) = match strategy {
        Strategy::Letterbox => {
            let l = letterbox(input, canvas)?;
            let placement = if l.scaled.is_empty() {
                Placement::Nothing
            } else {
                Placement::Offset {
                    x: l.offset_x,
                    y: l.offset_y,
                }
            };
            (l.scaled, placement)
        }
        Strategy::CoverCrop => {
            let c = cover_crop(input, canvas)?;
            let placement = if c.crop.is_empty() {
                Placement::Nothing
            } else {
                Placement::Crop(c.crop)
            };
            (c.scaled, placement)
        }
    };
    Ok(ScalePlan {
        input,
        canvas,
        strategy,
        scaled,
        placement,
    })
}
