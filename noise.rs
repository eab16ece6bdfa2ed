//! noise.rs - Simplex noise over 16.16 coordinates
//! Integer lattice hashing through a seeded permutation table.
//! Output is 0..=65535, centered at 32768.

use crate::fixed::Fixed;

const PERM_SIZE: usize = 256;

/// Half-step for the curl finite difference, in fixed-point bits.
pub const CURL_EPSILON: i32 = 1000;

// 2D skew/unskew: F2 = (sqrt(3) - 1) / 2, G2 = (3 - sqrt(3)) / 6
const F2: i64 = 23972;
const G2: i32 = 13853;
// 3D skew/unskew: F3 = 1/3, G3 = 1/6
const F3: i64 = 21845;
const G3: i32 = 10923;

// Kernel radius squared per corner
const R2_2D: i64 = 32768;
const R2_3D: i64 = 39322;

const GRAD2: [[i64; 2]; 8] = [
    [1, 0], [1, 1], [0, 1], [-1, 1],
    [-1, 0], [-1, -1], [0, -1], [1, -1],
];

const GRAD3: [[i64; 3]; 12] = [
    [1, 1, 0], [-1, 1, 0], [1, -1, 0], [-1, -1, 0],
    [1, 0, 1], [-1, 0, 1], [1, 0, -1], [-1, 0, -1],
    [0, 1, 1], [0, -1, 1], [0, 1, -1], [0, -1, -1],
];

/// Divergence-free 2D flow sample.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Curl {
    pub vx: Fixed,
    pub vy: Fixed,
}

/// Seeded simplex noise field.
///
/// The permutation table is shuffled once and doubled so corner hashes
/// never need a wraparound mask.
#[derive(Clone)]
pub struct NoiseField {
    perm: [u8; PERM_SIZE * 2],
}

impl NoiseField {
    /// LCG-driven Fisher-Yates shuffle; deterministic for a given seed.
    pub fn new(seed: u32) -> Self {
        let mut perm = [0u8; PERM_SIZE * 2];
        for (i, slot) in perm.iter_mut().take(PERM_SIZE).enumerate() {
            *slot = i as u8;
        }

        let mut state = seed;
        for i in (1..PERM_SIZE).rev() {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let j = ((state >> 16) as usize) % (i + 1);
            perm.swap(i, j);
        }

        let (low, high) = perm.split_at_mut(PERM_SIZE);
        high.copy_from_slice(low);

        log::debug!("noise field seeded with {:#010x}", seed);
        Self { perm }
    }

    #[inline]
    fn p(&self, index: usize) -> usize {
        self.perm[index] as usize
    }

    /// 2D simplex noise.
    pub fn noise_2d(&self, x: Fixed, y: Fixed) -> u16 {
        let (x, y) = (x.to_bits(), y.to_bits());

        // Skew to the simplex lattice
        let s = (((x as i64 + y as i64) * F2) >> 16) as i32;
        let i = x.wrapping_add(s) >> 16;
        let j = y.wrapping_add(s) >> 16;

        // Unskew the cell origin back to input space
        let t = i.wrapping_add(j).wrapping_mul(G2);
        let x0 = x.wrapping_sub((i << 16).wrapping_sub(t)) as i64;
        let y0 = y.wrapping_sub((j << 16).wrapping_sub(t)) as i64;

        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - (i1 << 16) + G2 as i64;
        let y1 = y0 - (j1 << 16) + G2 as i64;
        let x2 = x0 - Fixed::ONE.to_bits() as i64 + 2 * G2 as i64;
        let y2 = y0 - Fixed::ONE.to_bits() as i64 + 2 * G2 as i64;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let (i1, j1) = (i1 as usize, j1 as usize);

        let n0 = corner_2d(self.p(ii + self.p(jj)) & 7, x0, y0);
        let n1 = corner_2d(self.p(ii + i1 + self.p(jj + j1)) & 7, x1, y1);
        let n2 = corner_2d(self.p(ii + 1 + self.p(jj + 1)) & 7, x2, y2);

        to_unsigned(((n0 + n1 + n2) >> 7) + 32768)
    }

    /// 3D simplex noise; the usual use is animated 2D noise with `z` as time.
    pub fn noise_3d(&self, x: Fixed, y: Fixed, z: Fixed) -> u16 {
        let (x, y, z) = (x.to_bits(), y.to_bits(), z.to_bits());

        let s = (((x as i64 + y as i64 + z as i64) * F3) >> 16) as i32;
        let i = x.wrapping_add(s) >> 16;
        let j = y.wrapping_add(s) >> 16;
        let k = z.wrapping_add(s) >> 16;

        let t = i.wrapping_add(j).wrapping_add(k).wrapping_mul(G3);
        let x0 = x.wrapping_sub((i << 16).wrapping_sub(t)) as i64;
        let y0 = y.wrapping_sub((j << 16).wrapping_sub(t)) as i64;
        let z0 = z.wrapping_sub((k << 16).wrapping_sub(t)) as i64;

        // Which of the six tetrahedra holds the point
        let ((i1, j1, k1), (i2, j2, k2)) = if x0 >= y0 {
            if y0 >= z0 {
                ((1, 0, 0), (1, 1, 0))
            } else if x0 >= z0 {
                ((1, 0, 0), (1, 0, 1))
            } else {
                ((0, 0, 1), (1, 0, 1))
            }
        } else if y0 < z0 {
            ((0, 0, 1), (0, 1, 1))
        } else if x0 < z0 {
            ((0, 1, 0), (0, 1, 1))
        } else {
            ((0, 1, 0), (1, 1, 0))
        };

        let g = G3 as i64;
        let one = Fixed::ONE.to_bits() as i64;
        let (x1, y1, z1) = (x0 - (i1 << 16) + g, y0 - (j1 << 16) + g, z0 - (k1 << 16) + g);
        let (x2, y2, z2) = (
            x0 - (i2 << 16) + 2 * g,
            y0 - (j2 << 16) + 2 * g,
            z0 - (k2 << 16) + 2 * g,
        );
        let (x3, y3, z3) = (x0 - one + 3 * g, y0 - one + 3 * g, z0 - one + 3 * g);

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let kk = (k & 255) as usize;
        let (i1, j1, k1) = (i1 as usize, j1 as usize, k1 as usize);
        let (i2, j2, k2) = (i2 as usize, j2 as usize, k2 as usize);

        let h0 = self.p(ii + self.p(jj + self.p(kk))) % 12;
        let h1 = self.p(ii + i1 + self.p(jj + j1 + self.p(kk + k1))) % 12;
        let h2 = self.p(ii + i2 + self.p(jj + j2 + self.p(kk + k2))) % 12;
        let h3 = self.p(ii + 1 + self.p(jj + 1 + self.p(kk + 1))) % 12;

        let n = corner_3d(h0, x0, y0, z0)
            + corner_3d(h1, x1, y1, z1)
            + corner_3d(h2, x2, y2, z2)
            + corner_3d(h3, x3, y3, z3);

        to_unsigned((n >> 8) + 32768)
    }

    /// 1-4 octaves of 3D noise, persistence 0.5, lacunarity 2, normalized
    /// by the accumulated amplitude.
    pub fn fractal(&self, x: Fixed, y: Fixed, z: Fixed, octaves: u8) -> u16 {
        let octaves = octaves.clamp(1, 4);
        let mut total: i64 = 0;
        let mut max_value: i64 = 0;
        let mut amplitude: i64 = Fixed::ONE.to_bits() as i64;
        let mut frequency: i64 = Fixed::ONE.to_bits() as i64;

        for _ in 0..octaves {
            let sx = Fixed::from_bits(((x.to_bits() as i64 * frequency) >> 16) as i32);
            let sy = Fixed::from_bits(((y.to_bits() as i64 * frequency) >> 16) as i32);
            let sz = Fixed::from_bits(((z.to_bits() as i64 * frequency) >> 16) as i32);

            let sample = self.noise_3d(sx, sy, sz) as i64 - 32768;
            total += (sample * amplitude) >> 16;

            max_value += amplitude;
            amplitude >>= 1;
            frequency <<= 1;
        }

        to_unsigned(((total << 16) / max_value) + 32768)
    }

    /// Signed sample in `-32768..=32767`.
    #[inline]
    pub fn signed(&self, x: Fixed, y: Fixed, z: Fixed) -> i16 {
        (self.noise_3d(x, y, z) as i32 - 32768) as i16
    }

    /// Sample mapped to roughly `-1.0..1.0`.
    #[inline]
    pub fn unit(&self, x: Fixed, y: Fixed, z: Fixed) -> Fixed {
        Fixed::from_bits(self.signed(x, y, z) as i32 * 2)
    }

    /// Curl of the 3D field in the xy plane: `(dN/dy, -dN/dx)`.
    ///
    /// Components are raw central differences, so their scale depends on
    /// `CURL_EPSILON`; callers apply their own strength factor.
    pub fn curl_2d(&self, x: Fixed, y: Fixed, t: Fixed) -> Curl {
        let eps = Fixed::from_bits(CURL_EPSILON);

        let n_px = self.noise_3d(x + eps, y, t) as i32;
        let n_mx = self.noise_3d(x - eps, y, t) as i32;
        let n_py = self.noise_3d(x, y + eps, t) as i32;
        let n_my = self.noise_3d(x, y - eps, t) as i32;

        let dndx = n_px - n_mx;
        let dndy = n_py - n_my;

        Curl {
            vx: Fixed::from_bits(dndy),
            vy: Fixed::from_bits(-dndx),
        }
    }
}

#[inline]
fn to_unsigned(value: i64) -> u16 {
    value.clamp(0, 65535) as u16
}

// Attenuated gradient contribution of one 2D corner. Offsets keep 12
// fractional bits inside the dot product.
#[inline]
fn corner_2d(gi: usize, x: i64, y: i64) -> i64 {
    let mut t = R2_2D - ((x * x + y * y) >> 16);
    if t <= 0 {
        return 0;
    }
    t = (t * t) >> 16;
    t = (t * t) >> 16;
    let g = GRAD2[gi];
    t * (g[0] * (x >> 4) + g[1] * (y >> 4))
}

#[inline]
fn corner_3d(gi: usize, x: i64, y: i64, z: i64) -> i64 {
    let mut t = R2_3D - ((x * x + y * y + z * z) >> 16);
    if t <= 0 {
        return 0;
    }
    t = (t * t) >> 16;
    t = (t * t) >> 16;
    let g = GRAD3[gi];
    t * (g[0] * (x >> 4) + g[1] * (y >> 4) + g[2] * (z >> 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fx(v: f32) -> Fixed {
        Fixed::from_f32(v)
    }

    #[test]
    fn test_permutation_is_a_doubled_shuffle() {
        let field = NoiseField::new(1234);
        let mut seen = [false; PERM_SIZE];
        for i in 0..PERM_SIZE {
            seen[field.perm[i] as usize] = true;
            assert_eq!(field.perm[i], field.perm[i + PERM_SIZE]);
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = NoiseField::new(0xDEAD_BEEF);
        let b = NoiseField::new(0xDEAD_BEEF);
        for step in 0..200 {
            let x = fx(step as f32 * 0.37 - 20.0);
            let y = fx(step as f32 * 0.11 + 3.0);
            let z = fx(step as f32 * 0.05);
            assert_eq!(a.noise_2d(x, y), b.noise_2d(x, y));
            assert_eq!(a.noise_3d(x, y, z), b.noise_3d(x, y, z));
            assert_eq!(a.fractal(x, y, z, 3), b.fractal(x, y, z, 3));
            assert_eq!(a.curl_2d(x, y, z), b.curl_2d(x, y, z));
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = NoiseField::new(1);
        let b = NoiseField::new(2);
        let differs = (0..100).any(|step| {
            let x = fx(step as f32 * 0.61);
            let y = fx(step as f32 * 0.29);
            a.noise_3d(x, y, Fixed::ZERO) != b.noise_3d(x, y, Fixed::ZERO)
        });
        assert!(differs);
    }

    #[test]
    fn test_output_spans_both_sides_of_center() {
        let field = NoiseField::new(99);
        let mut lo_2d = u16::MAX;
        let mut hi_2d = 0;
        let mut lo_3d = u16::MAX;
        let mut hi_3d = 0;
        for a in 0..60 {
            for b in 0..60 {
                let x = fx(a as f32 * 0.173);
                let y = fx(b as f32 * 0.191);
                let n2 = field.noise_2d(x, y);
                let n3 = field.noise_3d(x, y, fx(0.5));
                lo_2d = lo_2d.min(n2);
                hi_2d = hi_2d.max(n2);
                lo_3d = lo_3d.min(n3);
                hi_3d = hi_3d.max(n3);
            }
        }
        assert!(lo_2d < 30_000 && hi_2d > 35_000, "2d range {}..{}", lo_2d, hi_2d);
        assert!(lo_3d < 30_000 && hi_3d > 35_000, "3d range {}..{}", lo_3d, hi_3d);
    }

    #[test]
    fn test_noise_is_continuous() {
        let field = NoiseField::new(5);
        let step = Fixed::from_bits(64);
        let mut x = fx(-3.0);
        let y = fx(1.25);
        let z = fx(0.75);
        let mut last = field.noise_3d(x, y, z) as i32;
        for _ in 0..4000 {
            x += step;
            let next = field.noise_3d(x, y, z) as i32;
            assert!((next - last).abs() < 400);
            last = next;
        }
    }

    #[test]
    fn test_negative_coordinates() {
        let field = NoiseField::new(77);
        // No panics, and the field keeps varying across zero.
        let values: [u16; 3] = [
            field.noise_2d(fx(-0.4), fx(-7.9)),
            field.noise_2d(fx(0.0), fx(0.0)),
            field.noise_2d(fx(3.3), fx(-2.2)),
        ];
        assert!(values.iter().any(|&v| v != 32768));
    }

    #[test]
    fn test_fractal_clamps_octaves() {
        let field = NoiseField::new(3);
        let (x, y, z) = (fx(1.3), fx(2.7), fx(0.2));
        assert_eq!(field.fractal(x, y, z, 0), field.fractal(x, y, z, 1));
        assert_eq!(field.fractal(x, y, z, 9), field.fractal(x, y, z, 4));
        assert_eq!(field.fractal(x, y, z, 1), field.noise_3d(x, y, z));
    }

    #[test]
    fn test_curl_is_divergence_free() {
        let field = NoiseField::new(2024);
        let h = Fixed::from_bits(CURL_EPSILON);
        let mut nonzero = 0;
        for a in 0..40 {
            for b in 0..40 {
                let x = fx(a as f32 * 0.31 + 0.05);
                let y = fx(b as f32 * 0.27 + 0.05);
                let t = fx(1.5);

                let dvx = field.curl_2d(x + h, y, t).vx - field.curl_2d(x - h, y, t).vx;
                let dvy = field.curl_2d(x, y + h, t).vy - field.curl_2d(x, y - h, t).vy;
                assert_eq!(dvx + dvy, Fixed::ZERO);

                if field.curl_2d(x, y, t) != Curl::default() {
                    nonzero += 1;
                }
            }
        }
        assert!(nonzero > 1000);
    }

    #[test]
    fn test_unit_range() {
        let field = NoiseField::new(8);
        for step in 0..500 {
            let v = field.unit(fx(step as f32 * 0.13), fx(1.0), fx(2.0));
            assert!(v >= -Fixed::ONE && v <= Fixed::ONE);
        }
    }
}
