// SPDX-License-Identifier: MIT
// Canvas compositor: background fill ("src") followed by a clipped "over" draw.
// Output is always exactly the requested canvas size.

use crate::buffer::{BYTES_PER_PIXEL, Color, PixelBuffer};
use crate::layout::{Placement, Rect, ScalePlan, Size, clip_offset};

/// Allocate a `canvas` sized buffer filled with `background`, then draw
/// `source` at `placement` with source-over blending.
///
/// Never fails. Out-of-canvas parts of the source are clipped; a zero-area
/// source or canvas leaves a background-only result.
pub fn composite(canvas: Size, background: Color, source: &PixelBuffer, placement: Placement) -> PixelBuffer {
    let mut out = PixelBuffer::filled(canvas.w, canvas.h, background);
    draw_over(&mut out, source, placement);
    out
}

/// [`composite`] driven by a [`ScalePlan`]; `scaled` must be the source
/// already resized to `plan.scaled`.
pub fn composite_plan(plan: &ScalePlan, background: Color, scaled: &PixelBuffer) -> PixelBuffer {
    if plan.is_background_only() {
        return PixelBuffer::filled(plan.canvas.w, plan.canvas.h, background);
    }
    composite(plan.canvas, background, scaled, plan.placement)
}

/// Draw `source` onto `dst` in place. Pixels outside the drawn region keep
/// their value.
pub fn draw_over(dst: &mut PixelBuffer, source: &PixelBuffer, placement: Placement) {
    if dst.is_empty() || source.is_empty() {
        return;
    }
    let (src_rect, dst_x, dst_y) = match placement {
        Placement::Nothing => return,
        Placement::Offset { x, y } => match clip_offset(dst.size(), source.size(), x, y) {
            Some(v) => v,
            None => return,
        },
        Placement::Crop(crop) => {
            let crop = crop.intersect(&Rect::from_size(source.size()));
            let w = crop.width().min(dst.width());
            let h = crop.height().min(dst.height());
            (Rect::from_xywh(crop.min_x, crop.min_y, w, h), 0, 0)
        }
    };
    if src_rect.is_empty() {
        return;
    }

    let x0 = src_rect.min_x as usize * BYTES_PER_PIXEL;
    let x1 = src_rect.max_x as usize * BYTES_PER_PIXEL;
    let dx0 = dst_x as usize * BYTES_PER_PIXEL;
    for row in 0..src_rect.height() {
        let src_row = &source.row(src_rect.min_y + row)[x0..x1];
        let dst_row = &mut dst.row_mut(dst_y + row)[dx0..dx0 + (x1 - x0)];
        blend_row_over(dst_row, src_row);
    }
}

#[inline]
fn blend_row_over(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst
        .chunks_exact_mut(BYTES_PER_PIXEL)
        .zip(src.chunks_exact(BYTES_PER_PIXEL))
    {
        match s[3] {
            255 => d.copy_from_slice(s),
            0 => {}
            _ => blend_px(d, s),
        }
    }
}

/// Non-premultiplied source-over for one pixel, integer math scaled by 255.
#[inline]
fn blend_px(d: &mut [u8], s: &[u8]) {
    let sa = u32::from(s[3]);
    let da = u32::from(d[3]);
    let inv = 255 - sa;
    let out_a_255 = sa * 255 + da * inv;
    for c in 0..3 {
        let num = u32::from(s[c]) * sa * 255 + u32::from(d[c]) * da * inv;
        d[c] = ((num + out_a_255 / 2) / out_a_255) as u8;
    }
    d[3] = ((out_a_255 + 127) / 255) as u8;
}
