//! End-to-end tests for the normalization pipeline
//!
//! These drive encoded bytes through decode, layout, scaling, compositing and
//! JPEG output, and check the canvas-level guarantees callers rely on.

mod common;

use canvas_normalize::canvas_scale::cpu::resize;
use canvas_normalize::canvas_scale::layout::{cover_crop, letterbox};
use canvas_normalize::{
    Color, DecodeLimits, EncodeError, PipelineError, Rect, Size, Stage, Strategy, TargetSpec, decode, encode,
    encode_to_path, normalize, normalize_buffer, normalize_to_jpeg, normalize_to_path, normalize_with_limits,
};
use common::assertions::{assert_near, assert_rows_are, assert_rows_avoid, max_channel_diff};
use common::fixtures;

const SIZES: &[(u32, u32)] = &[(1, 1), (3, 7), (64, 64), (333, 101), (101, 333), (1600, 800), (800, 1200)];

#[test]
fn test_canvas_size_is_always_the_target() {
    let targets = [(800, 1200), (1, 1), (640, 480), (0, 100), (100, 0), (0, 0)];
    for &(sw, sh) in SIZES {
        let source = fixtures::gradient(sw, sh);
        for &(tw, th) in &targets {
            for strategy in [Strategy::Letterbox, Strategy::CoverCrop] {
                let spec = TargetSpec::new(tw, th, strategy);
                let canvas = normalize_buffer(&source, &spec).unwrap();
                assert_eq!(canvas.size(), Size::new(tw, th), "{sw}x{sh} -> {tw}x{th} {strategy:?}");
            }
        }
    }
}

#[test]
fn test_encoded_sources_reach_target_size() {
    let source = fixtures::gradient(120, 90);
    for bytes in [fixtures::png(&source), fixtures::jpeg(&source), fixtures::gif(&source)] {
        for strategy in [Strategy::Letterbox, Strategy::CoverCrop] {
            let canvas = normalize(&bytes, &TargetSpec::new(300, 200, strategy)).unwrap();
            assert_eq!(canvas.size(), Size::new(300, 200));
        }
    }
}

#[test]
fn test_identity_resize() {
    for &(w, h) in SIZES {
        let source = fixtures::gradient(w, h);
        let same = resize(&source, Some(w), Some(h)).unwrap();
        assert!(max_channel_diff(&source, &same) <= 1, "{w}x{h}");
    }

    // a canvas matching the source is the source
    let source = fixtures::noise(80, 120, 7);
    let canvas = normalize_buffer(&source, &TargetSpec::new(80, 120, Strategy::Letterbox)).unwrap();
    assert!(max_channel_diff(&source, &canvas) <= 1);
}

#[test]
fn test_letterbox_offset_non_negative_when_source_fits_height() {
    let target = Size::new(800, 1200);
    // sources at least as wide as the canvas aspect
    for &(w, h) in &[(800, 1200), (1600, 800), (1000, 1000), (333, 101), (2, 3), (4000, 10)] {
        let layout = letterbox(Size::new(w, h), target).unwrap();
        assert_eq!(layout.scaled.w, target.w);
        assert_eq!(layout.offset_x, 0);
        assert_eq!(
            layout.offset_y,
            (i64::from(target.h) - i64::from(layout.scaled.h)).div_euclid(2)
        );
        assert!(layout.offset_y >= 0, "{w}x{h}");
    }
}

#[test]
fn test_letterbox_overflow_is_clipped_not_rejected() {
    let color = Color::rgb(20, 140, 220);
    let source = fixtures::solid(100, 300, color);
    let canvas = normalize_buffer(&source, &TargetSpec::vertical_canvas()).unwrap();

    assert_eq!(canvas.size(), Size::new(800, 1200));
    assert!(letterbox(source.size(), canvas.size()).unwrap().offset_y < 0);
    for y in [0, 600, 1199] {
        assert_near(canvas.pixel(400, y).unwrap(), color, 2);
    }
}

#[test]
fn test_cover_crop_window_is_target_sized_and_in_bounds() {
    let targets = [(800, 1200), (640, 480), (1, 1), (333, 101), (7, 3)];
    for &(sw, sh) in SIZES.iter().chain(&[(1, 10_000), (10_000, 1), (2, 3)]) {
        for &(tw, th) in &targets {
            let layout = cover_crop(Size::new(sw, sh), Size::new(tw, th)).unwrap();
            assert_eq!(layout.crop.size(), Size::new(tw, th), "{sw}x{sh} -> {tw}x{th}");
            assert!(layout.crop.within(&Rect::from_size(layout.scaled)));
        }
    }
}

#[test]
fn test_degenerate_source_gives_background_canvas() {
    let background = Color::rgb(200, 30, 90);
    for strategy in [Strategy::Letterbox, Strategy::CoverCrop] {
        let spec = TargetSpec::new(800, 1200, strategy).with_background(background);
        for (w, h) in [(0, 600), (600, 0), (0, 0)] {
            let canvas = normalize_buffer(&fixtures::solid(w, h, Color::WHITE), &spec).unwrap();
            assert_eq!(canvas.size(), Size::new(800, 1200));
            assert_rows_are(&canvas, 0..1200, background);
        }
    }
}

#[test]
fn test_cover_crop_fills_every_row() {
    let source = fixtures::solid(1600, 2400, Color::rgb(40, 90, 160));
    let bytes = fixtures::png(&source);
    let spec = TargetSpec::new(800, 1200, Strategy::CoverCrop);

    let canvas = normalize(&bytes, &spec).unwrap();
    assert_eq!(canvas.size(), Size::new(800, 1200));
    assert_rows_avoid(&canvas, 0..1200, spec.background);
    assert_rows_avoid(&canvas, 0..1200, Color::TRANSPARENT);
}

#[test]
fn test_wide_source_letterbox_bands() {
    let source = fixtures::solid(1600, 800, Color::WHITE);
    let bytes = fixtures::png(&source);
    let spec = TargetSpec::new(800, 1200, Strategy::Letterbox);

    let layout = letterbox(source.size(), spec.canvas()).unwrap();
    assert_eq!(layout.scaled, Size::new(800, 400));
    assert_eq!(layout.offset_y, 400);

    let canvas = normalize(&bytes, &spec).unwrap();
    assert_rows_are(&canvas, 0..400, Color::BLACK);
    assert_rows_avoid(&canvas, 400..800, Color::BLACK);
    assert_rows_are(&canvas, 800..1200, Color::BLACK);
}

#[test]
fn test_transparent_source_shows_background() {
    let background = Color::rgb(0, 128, 255);
    let source = fixtures::solid(100, 50, Color::TRANSPARENT);
    let bytes = fixtures::png(&source);
    let spec = TargetSpec::new(200, 300, Strategy::Letterbox).with_background(background);

    let canvas = normalize(&bytes, &spec).unwrap();
    assert_rows_are(&canvas, 0..300, background);
}

#[test]
fn test_higher_quality_is_never_smaller() {
    for source in [fixtures::noise(256, 256, 42), fixtures::gradient(320, 240), fixtures::checkerboard(200, 200, 3)] {
        let high = encode(&source, 90).unwrap();
        let low = encode(&source, 30).unwrap();
        assert!(high.len() >= low.len(), "q90 {} < q30 {}", high.len(), low.len());
    }
}

#[test]
fn test_garbage_bytes_fail_in_decode_stage() {
    for bytes in [[0x13, 0x37, 0x42], [0x00, 0x00, 0x00], [0xFF, 0xD8, 0x00], [b'G', b'I', b'F']] {
        let err = normalize(&bytes, &TargetSpec::vertical_canvas()).unwrap_err();
        assert_eq!(err.stage(), Stage::Decode);
        assert!(matches!(err, PipelineError::Decode(_)));
    }
}

#[test]
fn test_truncated_jpeg_header_is_decode_error() {
    let bytes = fixtures::jpeg(&fixtures::gradient(64, 64));
    // signature and part of the first segment, no frame header
    let err = normalize(&bytes[..10], &TargetSpec::vertical_canvas()).unwrap_err();
    assert_eq!(err.stage(), Stage::Decode);
    assert_eq!(err.cause_category(), "malformed");
}

#[test]
fn test_decoded_size_limit() {
    let bytes = fixtures::png(&fixtures::solid(500, 500, Color::WHITE));
    let limits = DecodeLimits {
        max_decoded_bytes: 500 * 500 * 4 - 1,
        ..DecodeLimits::default()
    };
    let err = normalize_with_limits(&bytes, &TargetSpec::vertical_canvas(), &limits).unwrap_err();
    assert_eq!(err.stage(), Stage::Decode);
    assert_eq!(err.cause_category(), "dimensions_too_large");
}

#[test]
fn test_gif_source_decodes() {
    let source = fixtures::checkerboard(30, 20, 5);
    let (decoded, _) = decode(&fixtures::gif(&source)).unwrap();
    assert_eq!(decoded.size(), Size::new(30, 20));
    // palette quantization may shift colors slightly
    assert_near(decoded.pixel(0, 0).unwrap(), Color::WHITE, 16);
    assert_near(decoded.pixel(5, 0).unwrap(), Color::BLACK, 16);
}

#[test]
fn test_animated_gif_uses_first_frame() {
    let red = fixtures::solid(12, 12, Color::rgb(255, 0, 0));
    let blue = fixtures::solid(12, 12, Color::rgb(0, 0, 255));
    let bytes = fixtures::animated_gif(&[&red, &blue]);

    let (decoded, format) = decode(&bytes).unwrap();
    assert_eq!(format.as_str(), "gif");
    assert_near(decoded.pixel(6, 6).unwrap(), Color::rgb(255, 0, 0), 16);
}

#[test]
fn test_normalize_to_jpeg_round_trip_dimensions() {
    let bytes = fixtures::png(&fixtures::gradient(300, 100));
    let jpeg = normalize_to_jpeg(&bytes, &TargetSpec::vertical_canvas(), 70).unwrap();
    let (decoded, format) = decode(&jpeg).unwrap();
    assert_eq!(format.as_str(), "jpeg");
    assert_eq!(decoded.size(), Size::new(800, 1200));
}

#[test]
fn test_normalize_to_path_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("canvas.jpg");
    let bytes = fixtures::jpeg(&fixtures::gradient(160, 90));

    let written = normalize_to_path(&bytes, &TargetSpec::vertical_canvas(), 70, &path).unwrap();
    assert_eq!(written, path);
    assert_eq!(image::image_dimensions(&path).unwrap(), (800, 1200));

    // overwrite in place
    let again = normalize_to_path(&bytes, &TargetSpec::new(10, 10, Strategy::CoverCrop), 70, &path).unwrap();
    assert_eq!(image::image_dimensions(&again).unwrap(), (10, 10));
}

#[test]
fn test_unwritable_destination_is_encode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("canvas.jpg");

    let err = encode_to_path(&fixtures::gradient(8, 8), 70, &path).unwrap_err();
    match err {
        EncodeError::Io { path: p, .. } => assert_eq!(p, path),
        other => panic!("unexpected {other:?}"),
    }

    let bytes = fixtures::png(&fixtures::gradient(8, 8));
    let err = normalize_to_path(&bytes, &TargetSpec::vertical_canvas(), 70, &path).unwrap_err();
    assert_eq!(err.stage(), Stage::Encode);
    assert!(!path.exists());
}

#[test]
fn test_concurrent_invocations_are_independent() {
    let bytes = fixtures::png(&fixtures::gradient(200, 150));
    let expected = normalize(&bytes, &TargetSpec::vertical_canvas()).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| normalize(&bytes, &TargetSpec::vertical_canvas()).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
