//! particles - Ambient particle engine for a round AMOLED display
//! Fixed-point physics, curl-noise wander, formations and mood-driven
//! color. no_std; every buffer is allocated once at startup.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod error;
mod fixed;
mod formation;
mod framebuffer;
mod mood;
mod noise;
mod pool;
mod rng;
mod settings;
mod sprites;
mod system;

pub use error::{Error, Result};
pub use fixed::{Angle, Fixed, FixedVec2};
pub use formation::{Formation, Geometry};
pub use framebuffer::Framebuffer;
pub use mood::{mood_color, Mood};
pub use noise::{Curl, NoiseField, CURL_EPSILON};
pub use pool::{LifecycleEvent, Particle, ParticlePool, ParticleState, SpawnArea, FADE_RATE};
pub use rng::Rng;
pub use settings::Settings;
pub use sprites::{SizeTier, Sprite, SpriteSet};
pub use system::{DisplayConfig, ParticleSystem, SystemState};

/// Pool capacity on the device.
pub const MAX_PARTICLES: usize = 400;

/// The engine as the firmware instantiates it.
pub type AdaParticles = ParticleSystem<MAX_PARTICLES>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_system_creation() {
        let system = AdaParticles::new(Settings::default()).unwrap();
        assert_eq!(system.active_particles(), 300);
        assert_eq!(system.pool().capacity(), MAX_PARTICLES);
    }
}
