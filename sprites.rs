//! sprites.rs - Pre-rendered soft particle sprites
//! Gaussian alpha masks generated once at startup; the framebuffer uses
//! them as brushes so rendering needs no per-pixel math beyond a multiply.

use alloc::vec::Vec;

use crate::error::{try_alloc, Result};

/// Width of the linear fade ring at the sprite edge, in pixels.
const EDGE_FADE: f32 = 1.5;

/// Discrete particle size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum SizeTier {
    #[default]
    Small = 0,
    Medium = 1,
    Large = 2,
}

impl SizeTier {
    pub const ALL: [SizeTier; 3] = [SizeTier::Small, SizeTier::Medium, SizeTier::Large];

    pub const fn diameter(self) -> u8 {
        match self {
            SizeTier::Small => 8,
            SizeTier::Medium => 16,
            SizeTier::Large => 24,
        }
    }

    /// Glow tightness; larger tiers are softer.
    pub const fn sigma(self) -> f32 {
        match self {
            SizeTier::Small => 2.5,
            SizeTier::Medium => 4.0,
            SizeTier::Large => 6.0,
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Maps a roll in `0..100` onto the 60/30/10 size split.
    pub const fn from_roll(roll: u32) -> Self {
        if roll < 60 {
            SizeTier::Small
        } else if roll < 90 {
            SizeTier::Medium
        } else {
            SizeTier::Large
        }
    }
}

/// Square greyscale alpha mask, row-major.
pub struct Sprite {
    diameter: u8,
    alpha: Vec<u8>,
}

impl Sprite {
    pub fn generate(tier: SizeTier) -> Result<Self> {
        let diameter = tier.diameter();
        let size = diameter as usize;
        let mut alpha = try_alloc("particle sprite", size * size, 0u8)?;

        let radius = diameter as f32 / 2.0;
        let center = radius - 0.5;
        let two_sigma_sq = 2.0 * tier.sigma() * tier.sigma();

        for (y, row) in alpha.chunks_exact_mut(size).enumerate() {
            let dy = y as f32 - center;
            for (x, texel) in row.iter_mut().enumerate() {
                let dx = x as f32 - center;
                let dist_sq = dx * dx + dy * dy;
                let dist = libm::sqrtf(dist_sq);

                let mut intensity = libm::expf(-dist_sq / two_sigma_sq);

                let edge_dist = radius - dist;
                if edge_dist < 0.0 {
                    intensity = 0.0;
                } else if edge_dist < EDGE_FADE {
                    intensity *= edge_dist / EDGE_FADE;
                }

                *texel = (intensity.clamp(0.0, 1.0) * 255.0) as u8;
            }
        }

        Ok(Self { diameter, alpha })
    }

    #[inline]
    pub fn diameter(&self) -> u8 {
        self.diameter
    }

    #[inline]
    pub fn alpha(&self) -> &[u8] {
        &self.alpha
    }

    /// Alpha at texel `(x, y)`; zero outside the mask.
    pub fn at(&self, x: usize, y: usize) -> u8 {
        let size = self.diameter as usize;
        if x >= size || y >= size {
            return 0;
        }
        self.alpha[y * size + x]
    }
}

/// The three size tiers' masks.
pub struct SpriteSet {
    sprites: [Sprite; 3],
}

impl SpriteSet {
    pub fn generate() -> Result<Self> {
        let sprites = [
            Sprite::generate(SizeTier::Small)?,
            Sprite::generate(SizeTier::Medium)?,
            Sprite::generate(SizeTier::Large)?,
        ];

        for (tier, sprite) in SizeTier::ALL.iter().zip(&sprites) {
            log::info!(
                "sprite {:?}: {}x{} ({} bytes)",
                tier,
                sprite.diameter,
                sprite.diameter,
                sprite.alpha.len()
            );
        }

        let set = Self { sprites };
        log::info!("sprites ready: {} bytes total", set.memory_usage());
        Ok(set)
    }

    #[inline]
    pub fn get(&self, tier: SizeTier) -> &Sprite {
        &self.sprites[tier.index()]
    }

    pub fn memory_usage(&self) -> usize {
        self.sprites.iter().map(|s| s.alpha.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_dimensions() {
        let set = SpriteSet::generate().unwrap();
        for tier in SizeTier::ALL {
            let sprite = set.get(tier);
            let d = tier.diameter() as usize;
            assert_eq!(sprite.diameter() as usize, d);
            assert_eq!(sprite.alpha().len(), d * d);
        }
        assert_eq!(set.memory_usage(), 64 + 256 + 576);
    }

    #[test]
    fn test_center_bright_corners_dark() {
        let set = SpriteSet::generate().unwrap();
        for tier in SizeTier::ALL {
            let sprite = set.get(tier);
            let d = sprite.diameter() as usize;
            let mid = d / 2;
            assert!(sprite.at(mid, mid) > 200, "{:?} center", tier);
            assert_eq!(sprite.at(0, 0), 0);
            assert_eq!(sprite.at(d - 1, d - 1), 0);
            assert_eq!(sprite.at(d, 0), 0);
        }
    }

    #[test]
    fn test_mask_is_symmetric() {
        let sprite = Sprite::generate(SizeTier::Medium).unwrap();
        let d = sprite.diameter() as usize;
        for y in 0..d {
            for x in 0..d {
                let a = sprite.at(x, y);
                assert_eq!(a, sprite.at(d - 1 - x, y));
                assert_eq!(a, sprite.at(x, d - 1 - y));
                assert_eq!(a, sprite.at(y, x));
            }
        }
    }

    #[test]
    fn test_falloff_is_monotonic_from_center() {
        let sprite = Sprite::generate(SizeTier::Large).unwrap();
        let d = sprite.diameter() as usize;
        let row = d / 2;
        for x in d / 2..d - 1 {
            assert!(sprite.at(x, row) >= sprite.at(x + 1, row));
        }
    }

    #[test]
    fn test_size_split() {
        assert_eq!(SizeTier::from_roll(0), SizeTier::Small);
        assert_eq!(SizeTier::from_roll(59), SizeTier::Small);
        assert_eq!(SizeTier::from_roll(60), SizeTier::Medium);
        assert_eq!(SizeTier::from_roll(89), SizeTier::Medium);
        assert_eq!(SizeTier::from_roll(90), SizeTier::Large);
        assert_eq!(SizeTier::from_roll(99), SizeTier::Large);
    }
}
