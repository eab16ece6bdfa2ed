//! formation.rs - Named target shapes for the swarm
//! Each formation maps particle `i` of `total` to a point on a closed-form
//! curve around the screen center.

use core::f32::consts::PI;

use libm::{cosf, fabsf, fmodf, sinf, sqrtf};

use crate::fixed::{Fixed, FixedVec2};

/// Golden angle in radians, for the snow spiral.
const GOLDEN_ANGLE: f32 = 2.399;
const SUN_CORE_SHARE: f32 = 0.3;
const SUN_RAYS: usize = 8;
const RAIN_COLUMNS: usize = 12;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Formation {
    /// Free wandering, no targets.
    #[default]
    Idle,
    Cloud,
    Sun,
    Rain,
    Snow,
    Heart,
    Thinking,
    Wave,
    Disconnected,
}

impl Formation {
    pub const ALL: [Formation; 9] = [
        Formation::Idle,
        Formation::Cloud,
        Formation::Sun,
        Formation::Rain,
        Formation::Snow,
        Formation::Heart,
        Formation::Thinking,
        Formation::Wave,
        Formation::Disconnected,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Formation::Idle => "idle",
            Formation::Cloud => "cloud",
            Formation::Sun => "sun",
            Formation::Rain => "rain",
            Formation::Snow => "snow",
            Formation::Heart => "heart",
            Formation::Thinking => "thinking",
            Formation::Wave => "wave",
            Formation::Disconnected => "disconnected",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Target for particle `index` of `total`, or `None` for `Idle`.
    pub fn point(self, index: usize, total: usize, geometry: &Geometry) -> Option<FixedVec2> {
        let Geometry { cx, cy, radius: r, width, height } = *geometry;
        let fi = index as f32;
        let t = fi / total.saturating_sub(1).max(1) as f32;

        let (x, y) = match self {
            Formation::Idle => return None,

            Formation::Cloud => {
                let angle = t * 2.0 * PI;
                let cloud_r = r * (0.4 + 0.6 * sinf(angle * 3.0 + fi * 0.1)) * (0.5 + 0.5 * cosf(angle * 2.0));
                (
                    cx + cosf(angle) * cloud_r * 1.3 + sinf(fi * 1.3) * 20.0,
                    cy + sinf(angle) * cloud_r * 0.6 - r * 0.1 + cosf(fi * 1.7) * 15.0,
                )
            }

            Formation::Sun => {
                if fi < total as f32 * SUN_CORE_SHARE {
                    let angle = t * 10.0 * PI;
                    let core_r = t * r * 0.4;
                    (cx + cosf(angle) * core_r, cy + sinf(angle) * core_r)
                } else {
                    let ray_t = (t - SUN_CORE_SHARE) / (1.0 - SUN_CORE_SHARE);
                    let rays = ray_t * SUN_RAYS as f32;
                    let ray = rays as usize % SUN_RAYS;
                    let progress = fmodf(rays, 1.0);
                    let angle = ray as f32 * 2.0 * PI / SUN_RAYS as f32;
                    let ray_r = r * (0.5 + 0.5 * progress);
                    (cx + cosf(angle) * ray_r, cy + sinf(angle) * ray_r)
                }
            }

            Formation::Rain => {
                let column = index % RAIN_COLUMNS;
                let rows = (total / RAIN_COLUMNS).max(1);
                let row_t = (index / RAIN_COLUMNS) as f32 / rows as f32;
                (
                    (column as f32 + 0.5) / RAIN_COLUMNS as f32 * width + sinf(fi * 0.5) * 10.0,
                    row_t * height,
                )
            }

            Formation::Snow => {
                let angle = fi * GOLDEN_ANGLE;
                let snow_r = sqrtf(t) * r * 1.2;
                (cx + cosf(angle) * snow_r, cy + sinf(angle) * snow_r)
            }

            Formation::Heart => {
                let a = t * 2.0 * PI;
                let s = sinf(a);
                let hx = 16.0 * s * s * s;
                let hy = 13.0 * cosf(a) - 5.0 * cosf(2.0 * a) - 2.0 * cosf(3.0 * a) - cosf(4.0 * a);
                let scale = r / 18.0;
                (cx + hx * scale, cy - hy * scale)
            }

            Formation::Thinking => {
                let angle = t * 8.0 * PI;
                let spiral_r = t * r * 0.9;
                (cx + cosf(angle) * spiral_r, cy + sinf(angle) * spiral_r)
            }

            Formation::Wave => (t * width, cy + sinf(t * 4.0 * PI) * r * 0.5),

            Formation::Disconnected => {
                let angle = t * 2.0 * PI;
                let droop = fabsf(cosf(angle)) * r * 0.3;
                (cx + cosf(angle) * r * 0.6, cy + sinf(angle) * r * 0.6 + droop)
            }
        };

        Some(FixedVec2::new(Fixed::from_f32(x), Fixed::from_f32(y)))
    }
}

/// Screen geometry the curves are laid out in.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Geometry {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
    pub width: f32,
    pub height: f32,
}

impl Geometry {
    pub fn new(width: u16, height: u16, radius_factor: f32) -> Self {
        let (w, h) = (width as f32, height as f32);
        Self {
            cx: w / 2.0,
            cy: h / 2.0,
            radius: radius_factor * w.min(h),
            width: w,
            height: h,
        }
    }

    pub fn center(&self) -> FixedVec2 {
        FixedVec2::new(Fixed::from_f32(self.cx), Fixed::from_f32(self.cy))
    }
}
