use canvas_scale::buffer::{Color, PixelBuffer};
use canvas_scale::canvas::composite_plan;
use canvas_scale::cpu::scale_rgba_cpu;
use canvas_scale::layout::{build_plan, Size, Strategy};
use fast_image_resize::Resizer;

fn main() -> anyhow::Result<()> {
    // Fake 1920x1080 RGBA frame
    let src_w = 1920u32;
    let src_h = 1080u32;
    let mut data = vec![0u8; PixelBuffer::byte_len(src_w, src_h)];
    // draw a simple gradient
    for (i, px) in data.chunks_exact_mut(4).enumerate() {
        let x = i % src_w as usize;
        let y = i / src_w as usize;
        px[0] = (x % 256) as u8; // R
        px[1] = (y % 256) as u8; // G
        px[2] = ((x + y) % 256) as u8; // B
        px[3] = 255; // A
    }
    let src = PixelBuffer::from_raw(src_w, src_h, data)?;

    let canvas = Size::new(800, 1200);
    let mut resizer = Resizer::new();
    for strategy in [Strategy::Letterbox, Strategy::CoverCrop] {
        let plan = build_plan(src.size(), canvas, strategy)?;
        let scaled = scale_rgba_cpu(&mut resizer, &src, Some(plan.scaled.w), Some(plan.scaled.h))?;
        let out = composite_plan(&plan, Color::BLACK, &scaled);
        println!(
            "{}: scaled {}x{}, placement {:?}, canvas {}x{}",
            strategy.as_str(),
            plan.scaled.w,
            plan.scaled.h,
            plan.placement,
            out.width(),
            out.height()
        );
    }

    Ok(())
}
