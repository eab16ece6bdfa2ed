//! fixed.rs - 16.16 fixed-point kernel
//! Integer part in the high 16 bits, fraction in the low 16 bits.
//! Range is -32768.0 to +32767.99998, resolution 1/65536.

use core::fmt;
use core::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

pub const FRAC_BITS: u32 = 16;

/// Signed 16.16 fixed-point number.
///
/// Addition and subtraction wrap like the underlying `i32`; multiplication
/// and division widen to 64 bits, and division saturates instead of trapping.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Fixed(i32);

impl Fixed {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1 << FRAC_BITS);
    pub const HALF: Self = Self(1 << (FRAC_BITS - 1));
    pub const QUARTER: Self = Self(16384);
    pub const TENTH: Self = Self(6554);
    pub const PI: Self = Self(205887);
    pub const TWO_PI: Self = Self(411775);
    pub const HALF_PI: Self = Self(102944);
    pub const MAX: Self = Self(i32::MAX);
    pub const MIN: Self = Self(i32::MIN);

    #[inline]
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn to_bits(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn from_int(value: i32) -> Self {
        Self(value.wrapping_shl(FRAC_BITS))
    }

    /// Truncates toward negative infinity.
    #[inline]
    pub const fn to_int(self) -> i32 {
        self.0 >> FRAC_BITS
    }

    #[inline]
    pub const fn to_int_round(self) -> i32 {
        self.0.wrapping_add(Self::HALF.0) >> FRAC_BITS
    }

    // PERF: float conversions are for setup and tuning values, not per-particle math
    #[inline]
    pub fn from_f32(value: f32) -> Self {
        Self((value * 65536.0) as i32)
    }

    #[inline]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / 65536.0
    }

    #[inline]
    pub fn from_f64(value: f64) -> Self {
        Self((value * 65536.0) as i32)
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 65536.0
    }

    #[inline]
    pub const fn abs(self) -> Self {
        Self(self.0.wrapping_abs())
    }

    #[inline]
    const fn mul_bits(a: i32, b: i32) -> i32 {
        ((a as i64 * b as i64) >> FRAC_BITS) as i32
    }

    #[inline]
    const fn div_bits(a: i32, b: i32) -> i32 {
        if b == 0 {
            return if a >= 0 { i32::MAX } else { i32::MIN };
        }
        let q = ((a as i64) << FRAC_BITS) / b as i64;
        if q > i32::MAX as i64 {
            i32::MAX
        } else if q < i32::MIN as i64 {
            i32::MIN
        } else {
            q as i32
        }
    }

    /// `a + (b - a) * t`, with `t` in `[0, 1]`.
    #[inline]
    pub fn lerp(a: Self, b: Self, t: Self) -> Self {
        a + (b - a) * t
    }

    /// Cubic Hermite `3t² - 2t³`; `t` is clamped to `[0, 1]` first.
    pub fn smoothstep(t: Self) -> Self {
        if t <= Self::ZERO {
            return Self::ZERO;
        }
        if t >= Self::ONE {
            return Self::ONE;
        }
        let t2 = t * t;
        let t3 = t2 * t;
        Self::from_int(3) * t2 - Self::from_int(2) * t3
    }

    /// Digit-by-digit square root over the 64-bit widened value.
    ///
    /// Exact for perfect squares, monotonic otherwise. Non-positive input
    /// yields zero.
    pub fn sqrt(self) -> Self {
        if self.0 <= 0 {
            return Self::ZERO;
        }
        let mut val = (self.0 as u64) << FRAC_BITS;
        let mut result: u64 = 0;
        let mut bit: u64 = 1 << 62;

        while bit > val {
            bit >>= 2;
        }

        while bit != 0 {
            if val >= result + bit {
                val -= result + bit;
                result = (result >> 1) + bit;
            } else {
                result >>= 1;
            }
            bit >>= 2;
        }

        Self(result as i32)
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({})", self.to_f64())
    }
}

impl Add for Fixed {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl Sub for Fixed {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl Neg for Fixed {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self(self.0.wrapping_neg())
    }
}

impl Mul for Fixed {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(Self::mul_bits(self.0, rhs.0))
    }
}

impl MulAssign for Fixed {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        self.0 = Self::mul_bits(self.0, rhs.0);
    }
}

impl Mul<i32> for Fixed {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: i32) -> Self {
        Self(self.0.wrapping_mul(rhs))
    }
}

impl Div for Fixed {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Self) -> Self {
        Self(Self::div_bits(self.0, rhs.0))
    }
}

// ============================================
// Trigonometry
// ============================================

const TRIG_TABLE_SIZE: usize = 256;

/// Quarter-wave sine table, `sin(i * π/2 / 256) * 65536` for `i` in `0..=256`.
#[rustfmt::skip]
static SIN_TABLE: [i32; TRIG_TABLE_SIZE + 1] = [
    0, 402, 804, 1206, 1608, 2010, 2412, 2814,
    3216, 3617, 4019, 4420, 4821, 5222, 5623, 6023,
    6424, 6824, 7224, 7623, 8022, 8421, 8820, 9218,
    9616, 10014, 10411, 10808, 11204, 11600, 11996, 12391,
    12785, 13180, 13573, 13966, 14359, 14751, 15143, 15534,
    15924, 16314, 16703, 17091, 17479, 17867, 18253, 18639,
    19024, 19409, 19792, 20175, 20557, 20939, 21320, 21699,
    22078, 22457, 22834, 23210, 23586, 23961, 24335, 24708,
    25080, 25451, 25821, 26190, 26558, 26925, 27291, 27656,
    28020, 28383, 28745, 29106, 29466, 29824, 30182, 30538,
    30893, 31248, 31600, 31952, 32303, 32652, 33000, 33347,
    33692, 34037, 34380, 34721, 35062, 35401, 35738, 36075,
    36410, 36744, 37076, 37407, 37736, 38064, 38391, 38716,
    39040, 39362, 39683, 40002, 40320, 40636, 40951, 41264,
    41576, 41886, 42194, 42501, 42806, 43110, 43412, 43713,
    44011, 44308, 44604, 44898, 45190, 45480, 45769, 46056,
    46341, 46624, 46906, 47186, 47464, 47741, 48015, 48288,
    48559, 48828, 49095, 49361, 49624, 49886, 50146, 50404,
    50660, 50914, 51166, 51417, 51665, 51911, 52156, 52398,
    52639, 52878, 53114, 53349, 53581, 53812, 54040, 54267,
    54491, 54714, 54934, 55152, 55368, 55582, 55794, 56004,
    56212, 56418, 56621, 56823, 57022, 57219, 57414, 57607,
    57798, 57986, 58172, 58356, 58538, 58718, 58896, 59071,
    59244, 59415, 59583, 59750, 59914, 60075, 60235, 60392,
    60547, 60700, 60851, 60999, 61145, 61288, 61429, 61568,
    61705, 61839, 61971, 62101, 62228, 62353, 62476, 62596,
    62714, 62830, 62943, 63054, 63162, 63268, 63372, 63473,
    63572, 63668, 63763, 63854, 63944, 64031, 64115, 64197,
    64277, 64354, 64429, 64501, 64571, 64639, 64704, 64766,
    64827, 64884, 64940, 64993, 65043, 65091, 65137, 65180,
    65220, 65259, 65294, 65328, 65358, 65387, 65413, 65436,
    65457, 65476, 65492, 65505, 65516, 65525, 65531, 65535,
    65536,
];

/// Angle where a full turn is `0x10000`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Angle(pub u16);

impl Angle {
    pub const ZERO: Self = Self(0);
    pub const QUARTER: Self = Self(0x4000);
    pub const HALF: Self = Self(0x8000);

    /// Fraction of a turn as 16.16; only the fractional bits matter.
    #[inline]
    pub const fn from_turns(turns: Fixed) -> Self {
        Self(turns.to_bits() as u16)
    }

    pub fn from_radians(radians: f32) -> Self {
        let turns = radians / (2.0 * core::f32::consts::PI);
        Self::from_turns(Fixed::from_f32(turns - libm::floorf(turns)))
    }

    /// Table lookup on the top bits, mirrored and negated per quadrant.
    pub fn sin(self) -> Fixed {
        let quadrant = self.0 >> 14;
        let index = ((self.0 & 0x3FFF) >> 6) as usize;

        let value = match quadrant {
            0 => SIN_TABLE[index],
            1 => SIN_TABLE[TRIG_TABLE_SIZE - index],
            2 => -SIN_TABLE[index],
            _ => -SIN_TABLE[TRIG_TABLE_SIZE - index],
        };
        Fixed::from_bits(value)
    }

    #[inline]
    pub fn cos(self) -> Fixed {
        (self + Self::QUARTER).sin()
    }
}

impl Add for Angle {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Angle {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

// ============================================
// Vectors
// ============================================

/// Screen-space 2D vector in fixed-point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FixedVec2 {
    pub x: Fixed,
    pub y: Fixed,
}

impl FixedVec2 {
    pub const ZERO: Self = Self { x: Fixed::ZERO, y: Fixed::ZERO };

    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn from_int(x: i32, y: i32) -> Self {
        Self::new(Fixed::from_int(x), Fixed::from_int(y))
    }

    #[inline]
    pub fn scale(self, k: Fixed) -> Self {
        Self::new(self.x * k, self.y * k)
    }

    #[inline]
    pub fn dist_sq(self, other: Self) -> Fixed {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Involves a square root; prefer `dist_sq` for comparisons.
    #[inline]
    pub fn dist(self, other: Self) -> Fixed {
        self.dist_sq(other).sqrt()
    }
}

impl Add for FixedVec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for FixedVec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for FixedVec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}
