//! framebuffer.rs - Persistent RGB565 framebuffer with trail fade
//! Content is faded rather than cleared each frame, which leaves trails.
//! Additive drawing clamps each channel at its maximum instead of wrapping.

use alloc::boxed::Box;

use embedded_graphics::{
    pixelcolor::{raw::RawU16, Rgb565},
    prelude::*,
    primitives::Rectangle,
};

use crate::error::{try_alloc, Error, Result};
use crate::sprites::{SizeTier, SpriteSet};

pub const RED_MAX: u16 = 31;
pub const GREEN_MAX: u16 = 63;
pub const BLUE_MAX: u16 = 31;

#[inline]
pub const fn pack(r: u16, g: u16, b: u16) -> u16 {
    ((r & 0x1F) << 11) | ((g & 0x3F) << 5) | (b & 0x1F)
}

#[inline]
pub const fn red(c: u16) -> u16 {
    (c >> 11) & 0x1F
}

#[inline]
pub const fn green(c: u16) -> u16 {
    (c >> 5) & 0x3F
}

#[inline]
pub const fn blue(c: u16) -> u16 {
    c & 0x1F
}

#[inline]
fn raw(color: Rgb565) -> u16 {
    color.into_storage()
}

/// Largest `h` with `h * h <= n`.
fn isqrt(n: i64) -> i64 {
    if n <= 0 {
        return 0;
    }
    let mut h = libm::sqrt(n as f64) as i64;
    while h * h > n {
        h -= 1;
    }
    while (h + 1) * (h + 1) <= n {
        h += 1;
    }
    h
}

/// Adds per-channel contributions, saturating at 31/63/31.
#[inline]
fn add_clamped(existing: u16, r: u16, g: u16, b: u16) -> u16 {
    pack(
        (red(existing) + r).min(RED_MAX),
        (green(existing) + g).min(GREEN_MAX),
        (blue(existing) + b).min(BLUE_MAX),
    )
}

#[inline]
fn scale_channels(color: u16, brightness: u16) -> (u16, u16, u16) {
    (
        (red(color) * brightness) >> 8,
        (green(color) * brightness) >> 8,
        (blue(color) * brightness) >> 8,
    )
}

pub struct Framebuffer {
    width: u16,
    height: u16,
    pixels: Box<[u16]>,
    sprites: SpriteSet,
}

impl Framebuffer {
    /// Allocates a black framebuffer that paints soft particles with `sprites`.
    pub fn new(width: u16, height: u16, sprites: SpriteSet) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }

        let len = width as usize * height as usize;
        let pixels = try_alloc("framebuffer", len, 0u16)?.into_boxed_slice();

        log::info!("framebuffer: {} bytes ({} x {})", len * 2, width, height);

        Ok(Self { width, height, pixels, sprites })
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Raw RGB565 pixels, row-major.
    #[inline]
    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    pub fn sprites(&self) -> &SpriteSet {
        &self.sprites
    }

    pub fn memory_usage(&self) -> usize {
        self.pixels.len() * 2 + self.sprites.memory_usage()
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn clear(&mut self, color: Rgb565) {
        self.pixels.fill(raw(color));
    }

    /// Multiplies every channel by `factor` in `[0, 1]`.
    pub fn fade(&mut self, factor: f32) {
        let factor256 = (factor.clamp(0.0, 1.0) * 256.0) as u16;
        self.fade_fast(factor256);
    }

    /// Integer fade; `factor256` of 256 keeps the buffer unchanged.
    pub fn fade_fast(&mut self, factor256: u16) {
        let factor = factor256.min(256) as u32;

        for px in self.pixels.iter_mut() {
            let c = *px;
            // PERF: black pixels are the common case
            if c == 0 {
                continue;
            }
            let r = (red(c) as u32 * factor) >> 8;
            let g = (green(c) as u32 * factor) >> 8;
            let b = (blue(c) as u32 * factor) >> 8;
            *px = pack(r as u16, g as u16, b as u16);
        }
    }

    /// Black when `(x, y)` is off the buffer.
    pub fn pixel(&self, x: i32, y: i32) -> Rgb565 {
        let value = self.index(x, y).map_or(0, |i| self.pixels[i]);
        Rgb565::from(RawU16::new(value))
    }

    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Rgb565) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = raw(color);
        }
    }

    pub fn draw_pixel_additive(&mut self, x: i32, y: i32, color: Rgb565) {
        if let Some(i) = self.index(x, y) {
            let c = raw(color);
            self.pixels[i] = add_clamped(self.pixels[i], red(c), green(c), blue(c));
        }
    }

    /// Additive pixel with the color scaled by `brightness / 256`.
    pub fn draw_pixel_additive_bright(&mut self, x: i32, y: i32, color: Rgb565, brightness: u8) {
        if let Some(i) = self.index(x, y) {
            let (r, g, b) = scale_channels(raw(color), brightness as u16);
            self.pixels[i] = add_clamped(self.pixels[i], r, g, b);
        }
    }

    // Clipped horizontal span; rows off the buffer are skipped.
    fn span(&mut self, x1: i32, x2: i32, y: i32, mut paint: impl FnMut(&mut u16)) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (lo, hi) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let lo = lo.max(0);
        let hi = hi.min(self.width as i32 - 1);
        if lo > hi {
            return;
        }
        let row = y as usize * self.width as usize;
        for px in &mut self.pixels[row + lo as usize..=row + hi as usize] {
            paint(px);
        }
    }

    /// Paints the disc `dx² + dy² <= r²`, the same pixels a midpoint circle
    /// encloses, as one span per visible row so additive fills never touch a
    /// pixel twice. Squares are taken in `i64`, so any radius is safe.
    fn circle_spans(&mut self, cx: i32, cy: i32, radius: i32, mut paint: impl FnMut(&mut u16)) {
        if radius < 0 {
            return;
        }
        let (cx, cy, r) = (cx as i64, cy as i64, radius as i64);
        let r_sq = r * r;
        let first = (cy - r).max(0);
        let last = (cy + r).min(self.height as i64 - 1);
        // Anything past the buffer edge clips the same way.
        let edge = self.width as i64;

        for y in first..=last {
            let dy = y - cy;
            let half = isqrt(r_sq - dy * dy);
            let lo = (cx - half).clamp(-1, edge);
            let hi = (cx + half).clamp(-1, edge);
            self.span(lo as i32, hi as i32, y as i32, &mut paint);
        }
    }

    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgb565) {
        let c = raw(color);
        self.circle_spans(cx, cy, radius, |px| *px = c);
    }

    pub fn fill_circle_additive(&mut self, cx: i32, cy: i32, radius: i32, color: Rgb565, brightness: u8) {
        let (r, g, b) = scale_channels(raw(color), brightness as u16);
        self.circle_spans(cx, cy, radius, |px| *px = add_clamped(*px, r, g, b));
    }

    /// Blends the `tier` sprite centered on `(cx, cy)`.
    ///
    /// Each texel's alpha is combined with `brightness` (both 0-255) and
    /// scales `color` before the additive blend.
    pub fn draw_soft_particle(&mut self, cx: i32, cy: i32, tier: SizeTier, color: Rgb565, brightness: u8) {
        let sprite = self.sprites.get(tier);
        let size = sprite.diameter() as i32;
        let half = size / 2;
        let c = raw(color);
        let (base_r, base_g, base_b) = (red(c), green(c), blue(c));
        let (width, height) = (self.width as i32, self.height as i32);

        for (sy, row) in sprite.alpha().chunks_exact(size as usize).enumerate() {
            let screen_y = cy - half + sy as i32;
            if screen_y < 0 || screen_y >= height {
                continue;
            }
            let row_start = screen_y as usize * self.width as usize;

            for (sx, &alpha) in row.iter().enumerate() {
                let screen_x = cx - half + sx as i32;
                if screen_x < 0 || screen_x >= width || alpha == 0 {
                    continue;
                }

                let combined = (alpha as u16 * brightness as u16) >> 8;
                if combined == 0 {
                    continue;
                }

                let i = row_start + screen_x as usize;
                self.pixels[i] = add_clamped(
                    self.pixels[i],
                    (base_r * combined) >> 8,
                    (base_g * combined) >> 8,
                    (base_b * combined) >> 8,
                );
            }
        }
    }

    /// Paints the whole buffer to `display` in one rectangle at the origin.
    pub fn push_to_display<D>(&self, display: &mut D) -> core::result::Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let area = Rectangle::new(Point::zero(), Size::new(self.width as u32, self.height as u32));
        display.fill_contiguous(&area, self.pixels.iter().map(|&value| Rgb565::from(RawU16::new(value))))
    }
}
