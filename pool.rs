//! pool.rs - Fixed-capacity particle pool
//! Slots are allocated once; a slot index doubles as the particle's handle.
//! Lifecycle: Inactive -> FadingIn -> Active -> FadingOut -> Inactive.

use alloc::boxed::Box;

use crate::error::{try_alloc, Result};
use crate::fixed::{Fixed, FixedVec2};
use crate::rng::Rng;
use crate::sprites::SizeTier;

/// Fade progress units per second (0 -> 255 in about half a second).
pub const FADE_RATE: f32 = 512.0;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParticleState {
    #[default]
    Inactive,
    Active,
    FadingIn,
    FadingOut,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Spawn,
    FadeInDone,
    BeginFadeOut,
    FadeOutDone,
    Kill,
}

impl ParticleState {
    /// The only place lifecycle transitions are decided. Events that make
    /// no sense for the current state leave it unchanged.
    pub const fn transition(self, event: LifecycleEvent) -> Self {
        use LifecycleEvent::*;
        use ParticleState::*;

        match (self, event) {
            (Inactive, Spawn) => FadingIn,
            (FadingIn, FadeInDone) => Active,
            (Active | FadingIn, BeginFadeOut) => FadingOut,
            (FadingOut, FadeOutDone) => Inactive,
            (_, Kill) => Inactive,
            (state, _) => state,
        }
    }

    #[inline]
    pub const fn is_live(self) -> bool {
        !matches!(self, ParticleState::Inactive)
    }
}

/// One animated point. Fields other than `state` are meaningless while the
/// particle is inactive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Particle {
    pub position: FixedVec2,
    pub velocity: FixedVec2,
    /// Formation attractor, if one is assigned.
    pub target: Option<FixedVec2>,
    pub size: SizeTier,
    pub brightness: u8,
    pub phase: Fixed,
    pub noise_offset: FixedVec2,
    state: ParticleState,
    fade_progress: u8,
}

impl Particle {
    pub const INACTIVE: Self = Self {
        position: FixedVec2::ZERO,
        velocity: FixedVec2::ZERO,
        target: None,
        size: SizeTier::Small,
        brightness: 0,
        phase: Fixed::ZERO,
        noise_offset: FixedVec2::ZERO,
        state: ParticleState::Inactive,
        fade_progress: 0,
    };

    #[inline]
    pub fn state(&self) -> ParticleState {
        self.state
    }

    #[inline]
    pub fn fade_progress(&self) -> u8 {
        self.fade_progress
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.state.is_live()
    }

    #[inline]
    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Brightness scaled by fade progress while fading.
    pub fn render_brightness(&self) -> u8 {
        match self.state {
            ParticleState::FadingIn | ParticleState::FadingOut => {
                ((self.brightness as u16 * self.fade_progress as u16) >> 8) as u8
            }
            ParticleState::Active => self.brightness,
            ParticleState::Inactive => 0,
        }
    }

    fn apply(&mut self, event: LifecycleEvent) -> bool {
        let next = self.state.transition(event);
        let changed = next != self.state;
        self.state = next;
        changed
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::INACTIVE
    }
}

static SENTINEL: Particle = Particle::INACTIVE;

/// Rectangle random spawns land in, inset by `margin` on every side.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpawnArea {
    pub width: i32,
    pub height: i32,
    pub margin: i32,
}

pub struct ParticlePool<const MAX_PARTICLES: usize> {
    particles: Box<[Particle]>,
    active_count: usize,
    rng: Rng,
    area: SpawnArea,
    // Fractional fade units carried between updates.
    fade_remainder: f32,
}

impl<const MAX_PARTICLES: usize> ParticlePool<MAX_PARTICLES> {
    pub fn new(area: SpawnArea, seed: u32) -> Result<Self> {
        let particles = try_alloc("particle pool", MAX_PARTICLES, Particle::INACTIVE)?.into_boxed_slice();

        log::info!(
            "particle pool: {} particles ({} bytes)",
            MAX_PARTICLES,
            MAX_PARTICLES * core::mem::size_of::<Particle>()
        );

        Ok(Self {
            particles,
            active_count: 0,
            rng: Rng::new(seed),
            area,
            fade_remainder: 0.0,
        })
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        MAX_PARTICLES
    }

    /// Number of non-inactive slots, maintained incrementally.
    #[inline]
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Out-of-range indices read as an inactive particle.
    #[inline]
    pub fn get(&self, index: usize) -> &Particle {
        self.particles.get(index).unwrap_or(&SENTINEL)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    /// Live particles with their slot index, in pool order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Particle)> {
        self.particles.iter().enumerate().filter(|(_, p)| p.is_live())
    }

    pub fn iter_live_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut().filter(|p| p.is_live())
    }

    pub fn rng(&mut self) -> &mut Rng {
        &mut self.rng
    }

    pub fn memory_usage(&self) -> usize {
        self.particles.len() * core::mem::size_of::<Particle>()
    }

    /// Activates a particle at a random spot inside the spawn area.
    pub fn activate(&mut self) -> Option<usize> {
        let SpawnArea { width, height, margin } = self.area;
        let x = self.rng.range(margin, width - margin);
        let y = self.rng.range(margin, height - margin);
        self.activate_at(FixedVec2::from_int(x, y))
    }

    /// First free slot wins; a full pool yields `None`.
    pub fn activate_at(&mut self, position: FixedVec2) -> Option<usize> {
        let slot = self.particles.iter().position(|p| !p.is_live())?;

        let size = SizeTier::from_roll(self.rng.below(100));
        let brightness = 180 + self.rng.below(76) as u8;
        let phase = Fixed::from_bits((self.rng.below(1000) as i32 * Fixed::ONE.to_bits()) / 1000);
        let noise_offset = FixedVec2::from_int(self.rng.below(10_000) as i32, self.rng.below(10_000) as i32);

        let p = &mut self.particles[slot];
        *p = Particle {
            position,
            velocity: FixedVec2::ZERO,
            target: None,
            size,
            brightness,
            phase,
            noise_offset,
            state: ParticleState::Inactive,
            fade_progress: 0,
        };
        p.apply(LifecycleEvent::Spawn);

        self.active_count += 1;
        Some(slot)
    }

    /// Clears a particle immediately.
    pub fn deactivate(&mut self, index: usize) {
        let Some(p) = self.particles.get_mut(index) else {
            return;
        };
        if p.is_live() && p.apply(LifecycleEvent::Kill) {
            self.active_count = self.active_count.saturating_sub(1);
        }
    }

    /// Starts fading out an active or fading-in particle. Returns whether
    /// the fade started.
    pub fn start_fade_out(&mut self, index: usize) -> bool {
        let Some(p) = self.particles.get_mut(index) else {
            return false;
        };
        if p.apply(LifecycleEvent::BeginFadeOut) {
            p.fade_progress = 255;
            true
        } else {
            false
        }
    }

    /// Advances every fading particle by `dt` seconds worth of fade.
    /// Only whole units are applied; the fraction carries to the next call.
    /// Returns how many particles finished fading out.
    pub fn update_fades(&mut self, dt: f32) -> usize {
        if dt.is_nan() || dt <= 0.0 {
            return 0;
        }
        let units = self.fade_remainder + dt * FADE_RATE;
        let whole = libm::floorf(units);
        self.fade_remainder = units - whole;
        // A full fade never needs more than 255 units.
        let step = whole.min(255.0) as i32;
        if step == 0 {
            return 0;
        }

        let mut expired = 0;
        for p in self.particles.iter_mut() {
            match p.state {
                ParticleState::FadingIn => {
                    let progress = (p.fade_progress as i32 + step).min(255);
                    p.fade_progress = progress as u8;
                    if progress >= 255 {
                        p.apply(LifecycleEvent::FadeInDone);
                    }
                }
                ParticleState::FadingOut => {
                    let progress = (p.fade_progress as i32 - step).max(0);
                    p.fade_progress = progress as u8;
                    if progress == 0 && p.apply(LifecycleEvent::FadeOutDone) {
                        self.active_count = self.active_count.saturating_sub(1);
                        expired += 1;
                    }
                }
                ParticleState::Active | ParticleState::Inactive => {}
            }
        }
        expired
    }

    pub fn clear(&mut self) {
        for p in self.particles.iter_mut() {
            p.apply(LifecycleEvent::Kill);
        }
        self.active_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA: SpawnArea = SpawnArea { width: 466, height: 466, margin: 50 };

    fn scan_count<const N: usize>(pool: &ParticlePool<N>) -> usize {
        pool.iter().count()
    }

    #[test]
    fn test_transitions() {
        use LifecycleEvent::*;
        use ParticleState::*;

        assert_eq!(Inactive.transition(Spawn), FadingIn);
        assert_eq!(FadingIn.transition(FadeInDone), Active);
        assert_eq!(Active.transition(BeginFadeOut), FadingOut);
        assert_eq!(FadingIn.transition(BeginFadeOut), FadingOut);
        assert_eq!(FadingOut.transition(FadeOutDone), Inactive);
        assert_eq!(Active.transition(Kill), Inactive);

        // Illegal transitions are no-ops.
        assert_eq!(Inactive.transition(BeginFadeOut), Inactive);
        assert_eq!(Active.transition(Spawn), Active);
        assert_eq!(FadingOut.transition(BeginFadeOut), FadingOut);
        assert_eq!(Inactive.transition(FadeOutDone), Inactive);
    }

    #[test]
    fn test_activate_initializes_particle() {
        let mut pool: ParticlePool<8> = ParticlePool::new(AREA, 1).unwrap();
        let slot = pool.activate().unwrap();
        let p = pool.get(slot);

        assert_eq!(p.state(), ParticleState::FadingIn);
        assert_eq!(p.fade_progress(), 0);
        assert!(p.brightness >= 180);
        assert!(!p.has_target());
        assert!(p.position.x >= Fixed::from_int(50) && p.position.x < Fixed::from_int(416));
        assert!(p.position.y >= Fixed::from_int(50) && p.position.y < Fixed::from_int(416));
        assert!(p.phase >= Fixed::ZERO && p.phase < Fixed::ONE);
        assert_eq!(pool.active_count(), 1);
    }

    #[test]
    fn test_full_pool_returns_none() {
        let mut pool: ParticlePool<4> = ParticlePool::new(AREA, 2).unwrap();
        for expected in 0..4 {
            assert_eq!(pool.activate(), Some(expected));
        }
        assert_eq!(pool.activate(), None);
        assert_eq!(pool.active_count(), 4);

        pool.deactivate(2);
        assert_eq!(pool.activate_at(FixedVec2::from_int(10, 10)), Some(2));
    }

    #[test]
    fn test_out_of_range_access_is_safe() {
        let mut pool: ParticlePool<4> = ParticlePool::new(AREA, 3).unwrap();
        assert_eq!(*pool.get(99), Particle::INACTIVE);
        assert!(pool.get_mut(99).is_none());
        pool.deactivate(99);
        assert!(!pool.start_fade_out(99));
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_fade_out_counts_down_to_inactive() {
        let mut pool: ParticlePool<4> = ParticlePool::new(AREA, 4).unwrap();
        let slot = pool.activate().unwrap();
        pool.update_fades(1.0);
        assert_eq!(pool.get(slot).state(), ParticleState::Active);

        assert!(pool.start_fade_out(slot));
        assert_eq!(pool.get(slot).fade_progress(), 255);
        assert!(!pool.start_fade_out(slot));

        pool.update_fades(0.25);
        assert_eq!(pool.get(slot).state(), ParticleState::FadingOut);
        assert_eq!(pool.active_count(), 1);

        assert_eq!(pool.update_fades(0.25), 1);
        assert_eq!(pool.get(slot).state(), ParticleState::Inactive);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_zero_dt_leaves_fades_untouched() {
        let mut pool: ParticlePool<4> = ParticlePool::new(AREA, 8).unwrap();
        let slot = pool.activate().unwrap();
        for _ in 0..10 {
            assert_eq!(pool.update_fades(0.0), 0);
        }
        assert_eq!(pool.get(slot).fade_progress(), 0);
        assert_eq!(pool.get(slot).state(), ParticleState::FadingIn);
    }

    #[test]
    fn test_fade_rate_is_independent_of_frame_rate() {
        let mut pool: ParticlePool<4> = ParticlePool::new(AREA, 9).unwrap();
        let slot = pool.activate().unwrap();

        // 1024 fps: half a unit per frame.
        for _ in 0..256 {
            pool.update_fades(1.0 / 1024.0);
        }
        assert_eq!(pool.get(slot).fade_progress(), 128);
        assert_eq!(pool.get(slot).state(), ParticleState::FadingIn);

        for _ in 0..256 {
            pool.update_fades(1.0 / 1024.0);
        }
        assert_eq!(pool.get(slot).state(), ParticleState::Active);
    }

    #[test]
    fn test_deactivate_twice_counts_once() {
        let mut pool: ParticlePool<4> = ParticlePool::new(AREA, 5).unwrap();
        pool.activate();
        pool.activate();
        pool.deactivate(0);
        pool.deactivate(0);
        assert_eq!(pool.active_count(), 1);
    }

    #[test]
    fn test_render_brightness_follows_fade() {
        let mut pool: ParticlePool<2> = ParticlePool::new(AREA, 6).unwrap();
        let slot = pool.activate().unwrap();
        assert_eq!(pool.get(slot).render_brightness(), 0);
        pool.update_fades(1.0);
        let p = pool.get(slot);
        assert_eq!(p.render_brightness(), p.brightness);
    }

    #[test]
    fn test_active_count_matches_scan_under_random_ops() {
        let mut pool: ParticlePool<64> = ParticlePool::new(AREA, 7).unwrap();
        let mut ops = Rng::new(0xC0FFEE);

        for _ in 0..5000 {
            let index = ops.below(70) as usize;
            match ops.below(5) {
                0 | 1 => {
                    pool.activate();
                }
                2 => pool.deactivate(index),
                3 => {
                    pool.start_fade_out(index);
                }
                _ => {
                    pool.update_fades(ops.below(100) as f32 / 1000.0);
                }
            }
            assert_eq!(pool.active_count(), scan_count(&pool));
        }

        pool.clear();
        assert_eq!(pool.active_count(), 0);
        assert_eq!(scan_count(&pool), 0);
    }
}
