// SPDX-License-Identifier: MIT
//! # Pixel Buffers and Colors
//!
//! [`PixelBuffer`] is the unit of exchange between every pipeline stage: a
//! tightly packed RGBA8 raster that owns its bytes. Stages never share a
//! buffer mutably; each one either returns a fresh buffer or writes into one
//! it exclusively owns.
//!
//! Zero-area buffers (`width == 0 || height == 0`) are valid values. They carry
//! no pixels and every consumer has to accept them.

use std::fmt;
use std::str::FromStr;

use crate::layout::Size;

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// An RGBA8 color, non-premultiplied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Opaque black, the background of the vertical upload canvas.
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    /// Transparent black. Used as the neutral fill for zero-area sources.
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const fn from_array(px: [u8; 4]) -> Self {
        Self::rgba(px[0], px[1], px[2], px[3])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// Error returned when a color string is not `#rgb`, `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid color '{}': expected #rgb, #rrggbb or #rrggbbaa",
            self.0
        )
    }
}

impl std::error::Error for ColorParseError {}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let err = || ColorParseError(s.to_string());
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        match hex.len() {
            3 => {
                let nib = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| err())
                };
                Ok(Color::rgb(nib(0)?, nib(1)?, nib(2)?))
            }
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(err()),
        }
    }
}

/// Returned by [`PixelBuffer::from_raw`] when the byte count disagrees with
/// the declared dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSizeError {
    pub width: u32,
    pub height: u32,
    pub expected: usize,
    pub actual: usize,
}

impl fmt::Display for BufferSizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pixel buffer {}x{} needs {} bytes, got {}",
            self.width, self.height, self.expected, self.actual
        )
    }
}

impl std::error::Error for BufferSizeError {}

/// Tightly packed RGBA8 raster.
///
/// Invariant: `pixels.len() == width * height * 4`. Constructors enforce it;
/// the fields are private so it cannot be broken afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

impl PixelBuffer {
    /// Byte length of a `width × height` RGBA8 raster.
    pub fn byte_len(width: u32, height: u32) -> usize {
        (width as usize) * (height as usize) * BYTES_PER_PIXEL
    }

    /// Wrap raw RGBA8 bytes, checking the length invariant.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BufferSizeError> {
        let expected = Self::byte_len(width, height);
        if pixels.len() != expected {
            return Err(BufferSizeError {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A buffer with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let px = color.to_array();
        let len = Self::byte_len(width, height);
        let mut pixels = Vec::with_capacity(len);
        for _ in 0..len / BYTES_PER_PIXEL {
            pixels.extend_from_slice(&px);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// A zero-area buffer.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size {
            w: self.width,
            h: self.height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Row length in bytes.
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = &self.pixels[i..i + BYTES_PER_PIXEL];
        Some(Color::from_array([px[0], px[1], px[2], px[3]]))
    }

    /// Byte slice of row `y`. Panics if `y` is out of range.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.pixels[start..start + stride]
    }

    pub(crate) fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &mut self.pixels[start..start + stride]
    }
}
