//! mood.rs - Valence/arousal mood and its display color
//! Valence ramps blue (-1) to cyan (0), then aqua to gold (+1). Arousal
//! scales brightness.

use embedded_graphics::pixelcolor::Rgb565;

/// Emotional state driving the swarm color.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Mood {
    /// -1 (negative) to 1 (positive).
    pub valence: f32,
    /// 0 (calm) to 1 (excited).
    pub arousal: f32,
}

impl Default for Mood {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl Mood {
    pub const NEUTRAL: Self = Self { valence: 0.0, arousal: 0.3 };

    /// Clamps both axes into range.
    pub fn new(valence: f32, arousal: f32) -> Self {
        Self {
            valence: valence.clamp(-1.0, 1.0),
            arousal: arousal.clamp(0.0, 1.0),
        }
    }

    /// Linear step toward `target`; `amount` is clamped to `[0, 1]`.
    pub fn blend_toward(&mut self, target: Mood, amount: f32) {
        let amount = amount.clamp(0.0, 1.0);
        self.valence += (target.valence - self.valence) * amount;
        self.arousal += (target.arousal - self.arousal) * amount;
    }

    pub fn color(&self, disconnected: bool) -> Rgb565 {
        mood_color(*self, disconnected)
    }
}

// Dim blue-gray shown while the link is down.
const DISCONNECTED_RGB: (f32, f32, f32) = (30.0, 40.0, 60.0);

/// Deterministic mood to RGB565 mapping.
pub fn mood_color(mood: Mood, disconnected: bool) -> Rgb565 {
    let (rgb, brightness) = if disconnected {
        (DISCONNECTED_RGB, 0.5)
    } else {
        let v = mood.valence.clamp(-1.0, 1.0);
        let rgb = if v < 0.0 {
            let t = v + 1.0;
            (0.0, 100.0 + 155.0 * t, 255.0)
        } else {
            (255.0 * v, 255.0 - 35.0 * v, 204.0 - 204.0 * v)
        };
        (rgb, 0.5 + 0.5 * mood.arousal.clamp(0.0, 1.0))
    };

    let channel = |c: f32| (c * brightness).clamp(0.0, 255.0) as u8;
    let (r, g, b) = (channel(rgb.0), channel(rgb.1), channel(rgb.2));
    Rgb565::new(r >> 3, g >> 2, b >> 3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::*;

    #[test]
    fn test_disconnected_overrides_mood() {
        let dim = mood_color(Mood::new(1.0, 1.0), true);
        assert_eq!(dim, mood_color(Mood::new(-1.0, 0.0), true));
        assert_eq!((dim.r(), dim.g(), dim.b()), (15 >> 3, 20 >> 2, 30 >> 3));
    }

    #[test]
    fn test_valence_endpoints() {
        let sad = mood_color(Mood::new(-1.0, 1.0), false);
        assert_eq!((sad.r(), sad.g(), sad.b()), (0, 100 >> 2, 31));

        let happy = mood_color(Mood::new(1.0, 1.0), false);
        assert_eq!((happy.r(), happy.g(), happy.b()), (31, 220 >> 2, 0));
    }

    #[test]
    fn test_valence_ramp_meets_at_cyan() {
        let just_below = mood_color(Mood::new(-0.001, 1.0), false);
        assert_eq!(just_below.r(), 0);
        assert!(just_below.g() >= 62 && just_below.b() == 31);

        // Aqua: (0, 255, 204)
        let zero = mood_color(Mood::new(0.0, 1.0), false);
        assert_eq!((zero.r(), zero.g(), zero.b()), (0, 255 >> 2, 204 >> 3));
    }

    #[test]
    fn test_arousal_scales_brightness() {
        let calm = mood_color(Mood::new(0.0, 0.0), false);
        let excited = mood_color(Mood::new(0.0, 1.0), false);
        assert!(excited.g() > calm.g());
        assert!(excited.b() > calm.b());
    }

    #[test]
    fn test_new_clamps() {
        let m = Mood::new(-4.0, 9.0);
        assert_eq!(m, Mood { valence: -1.0, arousal: 1.0 });
    }

    #[test]
    fn test_blend_converges() {
        let mut m = Mood::NEUTRAL;
        let target = Mood::new(1.0, 0.0);
        for _ in 0..200 {
            m.blend_toward(target, 0.1);
        }
        assert!((m.valence - 1.0).abs() < 0.001);
        assert!(m.arousal.abs() < 0.001);

        m.blend_toward(Mood::NEUTRAL, 5.0);
        assert!(m.valence.abs() < 1e-6);
        assert!((m.arousal - Mood::NEUTRAL.arousal).abs() < 1e-6);
    }

    #[test]
    fn test_starts_neutral_and_calm() {
        assert_eq!(Mood::default(), Mood { valence: 0.0, arousal: 0.3 });
    }
}
