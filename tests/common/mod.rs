//! Common test utilities and helpers for the canvas normalizer tests
//!
//! This module provides synthetic source images (as pixel buffers and as
//! encoded JPEG/PNG/GIF bytes) and pixel assertions shared by the
//! integration tests.

#![allow(dead_code)]

/// Synthetic source images
pub mod fixtures {
    use std::io::Cursor;

    use canvas_normalize::{Color, PixelBuffer};
    use image::codecs::gif::GifEncoder;
    use image::{DynamicImage, Frame, ImageFormat, RgbaImage};

    /// Single-color buffer
    pub fn solid(width: u32, height: u32, color: Color) -> PixelBuffer {
        PixelBuffer::filled(width, height, color)
    }

    /// Smooth horizontal red ramp and vertical green ramp, opaque
    pub fn gradient(width: u32, height: u32) -> PixelBuffer {
        let ramp = |v: u32, len: u32| if len <= 1 { 0 } else { (v * 255 / (len - 1)) as u8 };
        let mut data = Vec::with_capacity(PixelBuffer::byte_len(width, height));
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[ramp(x, width), ramp(y, height), 128, 255]);
            }
        }
        PixelBuffer::from_raw(width, height, data).unwrap()
    }

    /// Black/white checkerboard with square cells of `cell` pixels
    pub fn checkerboard(width: u32, height: u32, cell: u32) -> PixelBuffer {
        let mut data = Vec::with_capacity(PixelBuffer::byte_len(width, height));
        for y in 0..height {
            for x in 0..width {
                let on = ((x / cell) + (y / cell)) % 2 == 0;
                let c = if on { Color::WHITE } else { Color::BLACK };
                data.extend_from_slice(&c.to_array());
            }
        }
        PixelBuffer::from_raw(width, height, data).unwrap()
    }

    /// Deterministic pseudo-random opaque noise
    pub fn noise(width: u32, height: u32, seed: u32) -> PixelBuffer {
        let mut state = seed.max(1);
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        };
        let mut data = Vec::with_capacity(PixelBuffer::byte_len(width, height));
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&[next(), next(), next(), 255]);
        }
        PixelBuffer::from_raw(width, height, data).unwrap()
    }

    /// Encode `buffer` with the `image` crate's own codecs
    pub fn encode_as(buffer: &PixelBuffer, format: ImageFormat) -> Vec<u8> {
        let img = RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.as_bytes().to_vec()).unwrap();
        let img = match format {
            // JPEG carries no alpha
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
            _ => DynamicImage::ImageRgba8(img),
        };
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    pub fn png(buffer: &PixelBuffer) -> Vec<u8> {
        encode_as(buffer, ImageFormat::Png)
    }

    pub fn jpeg(buffer: &PixelBuffer) -> Vec<u8> {
        encode_as(buffer, ImageFormat::Jpeg)
    }

    pub fn gif(buffer: &PixelBuffer) -> Vec<u8> {
        encode_as(buffer, ImageFormat::Gif)
    }

    /// Multi-frame GIF, one frame per buffer
    pub fn animated_gif(frames: &[&PixelBuffer]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut out);
            let frames = frames.iter().map(|b| {
                Frame::new(RgbaImage::from_raw(b.width(), b.height(), b.as_bytes().to_vec()).unwrap())
            });
            encoder.encode_frames(frames).unwrap();
        }
        out
    }
}

/// Pixel-level assertions
pub mod assertions {
    use std::ops::Range;

    use canvas_normalize::{Color, PixelBuffer};

    /// Assert two colors agree per channel within `tolerance`
    pub fn assert_near(actual: Color, expected: Color, tolerance: u8) {
        let diff = [
            actual.r.abs_diff(expected.r),
            actual.g.abs_diff(expected.g),
            actual.b.abs_diff(expected.b),
            actual.a.abs_diff(expected.a),
        ];
        assert!(
            diff.iter().all(|&d| d <= tolerance),
            "expected {expected} ±{tolerance}, got {actual}"
        );
    }

    /// Assert every pixel in `rows` is exactly `color`
    pub fn assert_rows_are(buffer: &PixelBuffer, rows: Range<u32>, color: Color) {
        let expected = color.to_array();
        for y in rows {
            for (x, px) in buffer.row(y).chunks_exact(4).enumerate() {
                assert_eq!(px, expected, "pixel ({x}, {y})");
            }
        }
    }

    /// Assert no row in `rows` consists solely of `color`
    pub fn assert_rows_avoid(buffer: &PixelBuffer, rows: Range<u32>, color: Color) {
        let avoided = color.to_array();
        for y in rows {
            let hits = buffer
                .row(y)
                .chunks_exact(4)
                .filter(|px| *px == avoided)
                .count();
            assert!(hits < buffer.width() as usize, "row {y} is entirely {color}");
        }
    }

    /// Largest per-channel difference between two equally sized buffers
    pub fn max_channel_diff(a: &PixelBuffer, b: &PixelBuffer) -> u8 {
        assert_eq!(a.size(), b.size());
        a.as_bytes()
            .iter()
            .zip(b.as_bytes())
            .map(|(x, y)| x.abs_diff(*y))
            .max()
            .unwrap_or(0)
    }
}
