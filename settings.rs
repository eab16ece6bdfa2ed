//! settings.rs - Tuning constants for the particle engine
//! Everything the physics, spawning and rendering read lives here so a
//! board can override it in one place.

/// Engine tuning. Defaults match the 466x466 round AMOLED.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Settings {
    // Display bounds
    pub screen_width: u16,
    pub screen_height: u16,

    // Population
    pub default_particle_count: usize,
    pub min_particle_count: usize,
    /// Most spawns or fade-outs started in a single frame.
    pub ramp_per_frame: usize,
    pub spawn_margin: i32,
    /// Initial spawn lands within this many pixels of the center.
    pub initial_jitter: i32,

    // Formations
    pub default_transition_ms: u32,
    /// Fraction of the smaller screen side used as the formation radius.
    pub formation_radius_factor: f32,

    // Noise
    pub noise_seed: u32,
    pub noise_time_speed: f32,
    pub noise_scale: f32,

    // Physics
    pub wander_strength: f32,
    pub spring_k: f32,
    pub formation_tightness: f32,
    pub center_pull: f32,
    /// Center pull multiplier for particles that have a formation target.
    pub center_pull_targeted: f32,
    pub damping: f32,
    pub max_velocity: f32,
    pub wrap_margin: i32,

    // Touch
    pub touch_radius: i32,
    pub touch_strength: f32,

    // Rendering
    pub fade_factor: f32,
    /// Per second.
    pub mood_blend_rate: f32,

    // RNG seed
    pub rng_seed: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_width: 466,
            screen_height: 466,
            default_particle_count: 300,
            min_particle_count: 50,
            ramp_per_frame: 5,
            spawn_margin: 50,
            initial_jitter: 20,
            default_transition_ms: 2000,
            formation_radius_factor: 0.35,
            noise_seed: 0xADA5_EED5,
            noise_time_speed: 0.2,
            noise_scale: 0.01,
            wander_strength: 40.0,
            spring_k: 1.5,
            formation_tightness: 0.8,
            center_pull: 0.05,
            center_pull_targeted: 0.3,
            damping: 0.92,
            max_velocity: 4.0,
            wrap_margin: 30,
            touch_radius: 100,
            touch_strength: 5.0,
            fade_factor: 0.85,
            mood_blend_rate: 2.0,
            rng_seed: 0x1234_5678,
        }
    }
}

impl Settings {
    pub fn center(&self) -> (f32, f32) {
        (self.screen_width as f32 / 2.0, self.screen_height as f32 / 2.0)
    }

    pub fn formation_radius(&self) -> f32 {
        self.formation_radius_factor * self.screen_width.min(self.screen_height) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let settings = Settings::default();
        assert_eq!(settings.center(), (233.0, 233.0));
        assert!((settings.formation_radius() - 163.1).abs() < 0.01);
    }
}
