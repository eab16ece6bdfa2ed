//! system.rs - Particle system orchestrator
//! Owns the pool, framebuffer and noise field; runs the per-frame update
//! pipeline and exposes the narrow command surface the firmware talks to.

use core::fmt::Write;

use embedded_graphics::{pixelcolor::Rgb565, prelude::DrawTarget};
use heapless::String;

use crate::error::{Error, Result};
use crate::fixed::{Fixed, FixedVec2};
use crate::formation::{Formation, Geometry};
use crate::framebuffer::Framebuffer;
use crate::mood::{mood_color, Mood};
use crate::noise::NoiseField;
use crate::pool::{ParticlePool, ParticleState, SpawnArea};
use crate::settings::Settings;
use crate::sprites::SpriteSet;

const DISCONNECT_TRANSITION_MS: u32 = 1000;
const RECONNECT_TRANSITION_MS: u32 = 500;

// Absorbs f32 accumulation error so an N ms transition settles after N ms.
const SETTLE_EPSILON: f32 = 1e-3;

// Noise time wraps here so its 16.16 form never saturates.
const NOISE_TIME_WRAP: f32 = 4096.0;

// Image seeding
const IMAGE_LIT_THRESHOLD: u16 = 15;
const IMAGE_SCREEN_SHARE: f32 = 0.85;
const IMAGE_FALLBACK_COUNT: usize = 100;
const IMAGE_FALLBACK_JITTER: i32 = 50;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SystemState {
    /// Initial population still fading in.
    #[default]
    Starting,
    Idle,
    Transitioning,
    Disconnected,
}

impl SystemState {
    pub const fn name(self) -> &'static str {
        match self {
            SystemState::Starting => "starting",
            SystemState::Idle => "idle",
            SystemState::Transitioning => "transitioning",
            SystemState::Disconnected => "disconnected",
        }
    }
}

/// Structured configuration pushed by the host. Absent fields are left
/// alone; present ones are clamped into range. A field of the wrong type
/// reads as absent without spoiling the rest.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisplayConfig {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::number"))]
    pub particle_count: Option<i32>,
    /// Zero commits the formation immediately.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::number"))]
    pub transition_ms: Option<u32>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::number"))]
    pub mood_valence: Option<f32>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::number"))]
    pub mood_arousal: Option<f32>,
    /// Unknown names deserialize as `None`.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::formation"))]
    pub formation: Option<Formation>,
}

/// Per-field deserializers that map a type mismatch to `None`.
#[cfg(feature = "serde")]
mod lenient {
    use core::fmt;
    use core::marker::PhantomData;
    use core::result::Result;

    use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};

    use crate::formation::Formation;

    // Values of the wrong shape are consumed and dropped.
    macro_rules! ignore_mismatches {
        ($de:lifetime) => {
            fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_seq<A: SeqAccess<$de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(None)
            }

            fn visit_map<A: MapAccess<$de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
                Ok(None)
            }
        };
    }

    pub trait FromNumber: Sized {
        fn from_i64(v: i64) -> Self;
        fn from_u64(v: u64) -> Self;
        fn from_f64(v: f64) -> Self;
    }

    impl FromNumber for i32 {
        fn from_i64(v: i64) -> Self {
            v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
        }
        fn from_u64(v: u64) -> Self {
            v.min(i32::MAX as u64) as i32
        }
        fn from_f64(v: f64) -> Self {
            v as i32
        }
    }

    impl FromNumber for u32 {
        fn from_i64(v: i64) -> Self {
            v.clamp(0, u32::MAX as i64) as u32
        }
        fn from_u64(v: u64) -> Self {
            v.min(u32::MAX as u64) as u32
        }
        fn from_f64(v: f64) -> Self {
            v as u32
        }
    }

    impl FromNumber for f32 {
        fn from_i64(v: i64) -> Self {
            v as f32
        }
        fn from_u64(v: u64) -> Self {
            v as f32
        }
        fn from_f64(v: f64) -> Self {
            v as f32
        }
    }

    struct Number<T>(PhantomData<T>);

    impl<'de, T: FromNumber> Visitor<'de> for Number<T> {
        type Value = Option<T>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(T::from_i64(v)))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(T::from_u64(v)))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(T::from_f64(v)))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            log::debug!("config: non-numeric value {:?} ignored", v);
            Ok(None)
        }

        ignore_mismatches!('de);
    }

    pub fn number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromNumber,
    {
        deserializer.deserialize_any(Number(PhantomData))
    }

    struct FormationName;

    impl<'de> Visitor<'de> for FormationName {
        type Value = Option<Formation>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a formation name")
        }

        fn visit_str<E: de::Error>(self, name: &str) -> Result<Self::Value, E> {
            let formation = Formation::from_name(name);
            if formation.is_none() {
                log::debug!("config: unknown formation {:?} ignored", name);
            }
            Ok(formation)
        }

        fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
            Ok(None)
        }

        ignore_mismatches!('de);
    }

    pub fn formation<'de, D>(deserializer: D) -> Result<Option<Formation>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(FormationName)
    }
}

fn is_lit(px: &[u8]) -> bool {
    px[0] as u16 + px[1] as u16 + px[2] as u16 > IMAGE_LIT_THRESHOLD
}

/// Counts by lifecycle state, from one pass over the pool.
#[derive(Copy, Clone, Debug, Default)]
struct Census {
    fading_in: usize,
    fading_out: usize,
}

pub struct ParticleSystem<const MAX_PARTICLES: usize> {
    pool: ParticlePool<MAX_PARTICLES>,
    framebuffer: Framebuffer,
    noise: NoiseField,
    settings: Settings,
    geometry: Geometry,

    // Formation
    current_formation: Formation,
    target_formation: Formation,
    transition_progress: f32,
    transition_speed: f32,
    transitioning: bool,
    transition_ms: u32,
    targets_dirty: bool,

    // Mood
    mood: Mood,
    target_mood: Mood,
    color: Rgb565,

    noise_time: f32,
    target_count: usize,
    disconnected: bool,
    state: SystemState,
    fps: f32,
}

impl<const MAX_PARTICLES: usize> ParticleSystem<MAX_PARTICLES> {
    /// Allocates every buffer and spawns the initial population around the
    /// center. Any allocation failure aborts construction.
    pub fn new(settings: Settings) -> Result<Self> {
        let sprites = SpriteSet::generate()?;
        let framebuffer = Framebuffer::new(settings.screen_width, settings.screen_height, sprites)?;
        let area = SpawnArea {
            width: settings.screen_width as i32,
            height: settings.screen_height as i32,
            margin: settings.spawn_margin,
        };
        let pool = ParticlePool::new(area, settings.rng_seed)?;
        let noise = NoiseField::new(settings.noise_seed);
        let geometry = Geometry::new(settings.screen_width, settings.screen_height, settings.formation_radius_factor);
        let mood = Mood::NEUTRAL;

        let mut system = Self {
            pool,
            framebuffer,
            noise,
            settings,
            geometry,
            current_formation: Formation::Idle,
            target_formation: Formation::Idle,
            transition_progress: 1.0,
            transition_speed: 0.0,
            transitioning: false,
            transition_ms: settings.default_transition_ms,
            targets_dirty: false,
            mood,
            target_mood: mood,
            color: mood_color(mood, false),
            noise_time: 0.0,
            target_count: settings.default_particle_count.min(MAX_PARTICLES),
            disconnected: false,
            state: SystemState::Starting,
            fps: 0.0,
        };

        system.spawn_initial();

        log::info!(
            "particle system ready: {} particles, {} bytes",
            system.pool.active_count(),
            system.memory_usage()
        );
        Ok(system)
    }

    fn spawn_initial(&mut self) {
        let (cx, cy) = (self.geometry.cx as i32, self.geometry.cy as i32);
        let jitter = self.settings.initial_jitter;

        for _ in 0..self.target_count {
            let rng = self.pool.rng();
            let x = cx + rng.range(-jitter, jitter + 1);
            let y = cy + rng.range(-jitter, jitter + 1);
            if self.pool.activate_at(FixedVec2::from_int(x, y)).is_none() {
                break;
            }
        }
    }

    // ============================================
    // Frame pipeline
    // ============================================

    /// Advances the simulation by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.noise_time += dt * self.settings.noise_time_speed;
        if self.noise_time >= NOISE_TIME_WRAP {
            self.noise_time -= NOISE_TIME_WRAP;
        }

        self.mood.blend_toward(self.target_mood, dt * self.settings.mood_blend_rate);
        self.color = mood_color(self.mood, self.disconnected);

        if self.transitioning {
            self.advance_transition(dt);
        }

        if self.ramp_population() {
            self.targets_dirty = true;
        }
        if self.targets_dirty {
            self.update_formation_targets();
        }

        if self.pool.update_fades(dt) > 0 {
            self.targets_dirty = true;
        }
        self.apply_physics(dt);

        if dt > 0.0 {
            let instant = 1.0 / dt;
            self.fps = if self.fps == 0.0 { instant } else { self.fps * 0.9 + instant * 0.1 };
        }

        self.refresh_state();
    }

    fn advance_transition(&mut self, dt: f32) {
        self.transition_progress += self.transition_speed * dt;
        if self.transition_progress >= 1.0 - SETTLE_EPSILON {
            self.transition_progress = 1.0;
            self.transitioning = false;
            self.current_formation = self.target_formation;
            log::info!("formation settled: {}", self.current_formation.name());
        }
        // Targets follow the active set while the swarm morphs.
        self.targets_dirty = true;
    }

    /// Spawns or fades out at most `ramp_per_frame` particles toward the
    /// target count. Returns whether the live set changed.
    fn ramp_population(&mut self) -> bool {
        let census = self.census();
        let committed = self.pool.active_count().saturating_sub(census.fading_out);
        let limit = self.settings.ramp_per_frame;

        if committed < self.target_count {
            let wanted = (self.target_count - committed).min(limit);
            let mut spawned = 0;
            while spawned < wanted && self.pool.activate().is_some() {
                spawned += 1;
            }
            spawned > 0
        } else if committed > self.target_count {
            let wanted = (committed - self.target_count).min(limit);
            let mut started = 0;
            // Newest slots go first.
            for index in (0..MAX_PARTICLES).rev() {
                if started == wanted {
                    break;
                }
                if self.pool.start_fade_out(index) {
                    started += 1;
                }
            }
            started > 0
        } else {
            false
        }
    }

    fn census(&self) -> Census {
        let mut census = Census::default();
        for (_, p) in self.pool.iter() {
            match p.state() {
                ParticleState::FadingIn => census.fading_in += 1,
                ParticleState::FadingOut => census.fading_out += 1,
                ParticleState::Active | ParticleState::Inactive => {}
            }
        }
        census
    }

    /// Assigns formation points to live particles in pool order. Particles
    /// fading out are left out of the count so the survivors cover the whole
    /// curve. `Idle` clears every target.
    fn update_formation_targets(&mut self) {
        let formation = self.target_formation;
        let geometry = self.geometry;
        let total = self
            .pool
            .iter()
            .filter(|(_, p)| p.state() != ParticleState::FadingOut)
            .count();

        let mut i = 0;
        for p in self.pool.iter_live_mut() {
            if p.state() == ParticleState::FadingOut {
                // Leaving particles keep their last point until they expire.
                if formation == Formation::Idle {
                    p.target = None;
                }
                continue;
            }
            p.target = formation.point(i, total, &geometry);
            i += 1;
        }
        self.targets_dirty = false;
    }

    fn apply_physics(&mut self, dt: f32) {
        let s = &self.settings;

        let noise_scale = Fixed::from_f32(s.noise_scale);
        let noise_time = Fixed::from_f32(self.noise_time);
        let wander = Fixed::from_f32(s.wander_strength * dt);
        let spring = Fixed::from_f32(s.spring_k * self.transition_progress * s.formation_tightness * dt);
        let pull = Fixed::from_f32(s.center_pull * dt);
        let pull_targeted = Fixed::from_f32(s.center_pull * s.center_pull_targeted * dt);
        let damping = Fixed::from_f32(s.damping);
        let max_v = Fixed::from_f32(s.max_velocity);

        let center = self.geometry.center();
        let margin = s.wrap_margin;
        let min_x = Fixed::from_int(-margin);
        let min_y = min_x;
        let max_x = Fixed::from_int(s.screen_width as i32 + margin);
        let max_y = Fixed::from_int(s.screen_height as i32 + margin);

        for p in self.pool.iter_live_mut() {
            // Wander
            let sample = (p.position + p.noise_offset).scale(noise_scale);
            let curl = self.noise.curl_2d(sample.x, sample.y, noise_time);
            p.velocity.x += curl.vx * wander;
            p.velocity.y += curl.vy * wander;

            // Formation spring
            if let Some(target) = p.target {
                p.velocity += (target - p.position).scale(spring);
            }

            // Center pull, softened when a formation is holding the particle
            let k = if p.has_target() { pull_targeted } else { pull };
            p.velocity += (center - p.position).scale(k);

            p.velocity = p.velocity.scale(damping);
            p.velocity.x = p.velocity.x.clamp(-max_v, max_v);
            p.velocity.y = p.velocity.y.clamp(-max_v, max_v);

            p.position += p.velocity;

            // Re-enter one pixel inside the far margin
            if p.position.x < min_x {
                p.position.x = max_x - Fixed::ONE;
            } else if p.position.x > max_x {
                p.position.x = min_x + Fixed::ONE;
            }
            if p.position.y < min_y {
                p.position.y = max_y - Fixed::ONE;
            } else if p.position.y > max_y {
                p.position.y = min_y + Fixed::ONE;
            }
        }
    }

    fn refresh_state(&mut self) {
        self.state = if self.disconnected {
            SystemState::Disconnected
        } else if self.transitioning {
            SystemState::Transitioning
        } else if self.state == SystemState::Starting && self.census().fading_in > 0 {
            SystemState::Starting
        } else {
            SystemState::Idle
        };
    }

    // ============================================
    // Rendering
    // ============================================

    /// Fades the trail buffer and paints every live particle into it.
    pub fn compose(&mut self) {
        self.framebuffer.fade(self.settings.fade_factor);

        let color = self.color;
        for (_, p) in self.pool.iter() {
            self.framebuffer.draw_soft_particle(
                p.position.x.to_int_round(),
                p.position.y.to_int_round(),
                p.size,
                color,
                p.render_brightness(),
            );
        }
    }

    /// Composes a frame and pushes it to `display` in one transfer.
    pub fn render<D>(&mut self, display: &mut D) -> core::result::Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        self.compose();
        self.framebuffer.push_to_display(display)
    }

    // ============================================
    // Commands
    // ============================================

    /// Morphs toward `formation` over `transition_ms`; zero commits at once.
    pub fn set_formation(&mut self, formation: Formation, transition_ms: u32) {
        log::info!(
            "formation {} -> {} over {} ms",
            self.current_formation.name(),
            formation.name(),
            transition_ms
        );

        self.target_formation = formation;
        if transition_ms == 0 {
            self.current_formation = formation;
            self.transition_progress = 1.0;
            self.transitioning = false;
        } else {
            self.transition_progress = 0.0;
            self.transition_speed = 1000.0 / transition_ms as f32;
            self.transitioning = true;
        }
        self.update_formation_targets();
        self.refresh_state();
    }

    pub fn clear_formation(&mut self, transition_ms: u32) {
        self.set_formation(Formation::Idle, transition_ms);
    }

    /// Sets the mood the color drifts toward; both axes are clamped.
    pub fn set_mood(&mut self, valence: f32, arousal: f32) {
        if !valence.is_finite() || !arousal.is_finite() {
            log::debug!("mood ({}, {}) ignored", valence, arousal);
            return;
        }
        self.target_mood = Mood::new(valence, arousal);
    }

    pub fn set_disconnected(&mut self, disconnected: bool) {
        if self.disconnected == disconnected {
            return;
        }
        self.disconnected = disconnected;
        log::info!("connection {}", if disconnected { "lost" } else { "restored" });

        if disconnected {
            self.set_formation(Formation::Disconnected, DISCONNECT_TRANSITION_MS);
        } else {
            self.clear_formation(RECONNECT_TRANSITION_MS);
        }
        self.color = mood_color(self.mood, self.disconnected);
    }

    /// Target population, clamped to the configured minimum and the pool
    /// capacity. Reached gradually by `update`.
    pub fn set_particle_count(&mut self, count: usize) {
        let min = self.settings.min_particle_count.min(MAX_PARTICLES);
        self.target_count = count.clamp(min, MAX_PARTICLES);
        log::debug!("target particle count {}", self.target_count);
    }

    /// Pushes an impulse away from `(x, y)` into every particle within the
    /// touch radius, inversely proportional to distance.
    pub fn on_touch(&mut self, x: i32, y: i32) {
        let touch = FixedVec2::from_int(x, y);
        let radius = Fixed::from_int(self.settings.touch_radius);
        let radius_sq = radius * radius;
        let strength = Fixed::from_f32(self.settings.touch_strength);

        for p in self.pool.iter_live_mut() {
            let dx = p.position.x - touch.x;
            let dy = p.position.y - touch.y;
            // Box reject keeps the squared distance inside the 16.16 range
            if dx.abs() >= radius || dy.abs() >= radius {
                continue;
            }

            let dist_sq = dx * dx + dy * dy;
            if dist_sq <= Fixed::ONE || dist_sq >= radius_sq {
                continue;
            }

            let dist = dist_sq.sqrt();
            let force = strength / (dist + Fixed::ONE);
            p.velocity.x += dx / dist * force;
            p.velocity.y += dy / dist * force;
        }
    }

    /// Applies every present field of `config`, clamped into range.
    pub fn apply_config(&mut self, config: &DisplayConfig) {
        if let Some(count) = config.particle_count {
            self.set_particle_count(count.max(0) as usize);
        }

        if let Some(ms) = config.transition_ms {
            self.transition_ms = ms.min(u16::MAX as u32);
        }

        if config.mood_valence.is_some() || config.mood_arousal.is_some() {
            let valence = config.mood_valence.unwrap_or(self.target_mood.valence);
            let arousal = config.mood_arousal.unwrap_or(self.target_mood.arousal);
            self.set_mood(valence, arousal);
        }

        if let Some(formation) = config.formation {
            self.set_formation(formation, self.transition_ms);
        }
    }

    /// Seeds particles from the lit pixels of an RGB888 image, scaled to
    /// 85% of the screen and centered. Spawns at most enough to reach the
    /// target count; an all-dark image spawns a small cluster at the center
    /// instead. Returns how many particles were spawned.
    pub fn spawn_from_image(&mut self, rgb: &[u8], width: u16, height: u16) -> Result<usize> {
        let expected = width as usize * height as usize * 3;
        if rgb.len() < expected {
            return Err(Error::ImageTooSmall { expected, actual: rgb.len() });
        }

        let budget = self.target_count.saturating_sub(self.pool.active_count());
        if budget == 0 || expected == 0 {
            return Ok(0);
        }

        let pixels = &rgb[..expected];
        let lit = pixels.chunks_exact(3).filter(|px| is_lit(px)).count();

        let spawned = if lit == 0 {
            self.spawn_center_cluster(budget.min(IMAGE_FALLBACK_COUNT))
        } else {
            let stride = lit.div_ceil(budget);
            let screen_w = self.settings.screen_width as f32;
            let screen_h = self.settings.screen_height as f32;
            let scale = IMAGE_SCREEN_SHARE * (screen_w / width as f32).min(screen_h / height as f32);
            let offset_x = (screen_w - width as f32 * scale) / 2.0;
            let offset_y = (screen_h - height as f32 * scale) / 2.0;

            let mut spawned = 0;
            let samples = pixels
                .chunks_exact(3)
                .enumerate()
                .filter(|(_, px)| is_lit(px))
                .step_by(stride)
                .take(budget);

            for (index, _) in samples {
                let ix = (index % width as usize) as f32;
                let iy = (index / width as usize) as f32;
                let position = FixedVec2::new(
                    Fixed::from_f32(offset_x + ix * scale),
                    Fixed::from_f32(offset_y + iy * scale),
                );
                if self.pool.activate_at(position).is_none() {
                    break;
                }
                spawned += 1;
            }
            spawned
        };

        log::info!("image {}x{}: {} lit pixels, {} particles spawned", width, height, lit, spawned);
        if spawned > 0 {
            self.targets_dirty = true;
        }
        Ok(spawned)
    }

    fn spawn_center_cluster(&mut self, count: usize) -> usize {
        let (cx, cy) = (self.geometry.cx as i32, self.geometry.cy as i32);
        let mut spawned = 0;
        while spawned < count {
            let rng = self.pool.rng();
            let x = cx + rng.range(-IMAGE_FALLBACK_JITTER, IMAGE_FALLBACK_JITTER + 1);
            let y = cy + rng.range(-IMAGE_FALLBACK_JITTER, IMAGE_FALLBACK_JITTER + 1);
            if self.pool.activate_at(FixedVec2::from_int(x, y)).is_none() {
                break;
            }
            spawned += 1;
        }
        spawned
    }

    // ============================================
    // Queries
    // ============================================

    pub fn current_formation(&self) -> Formation {
        self.current_formation
    }

    pub fn target_formation(&self) -> Formation {
        self.target_formation
    }

    pub fn state(&self) -> SystemState {
        self.state
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn active_particles(&self) -> usize {
        self.pool.active_count()
    }

    pub fn target_particle_count(&self) -> usize {
        self.target_count
    }

    /// 0 at the start of a transition, 1 once settled.
    pub fn transition_progress(&self) -> f32 {
        self.transition_progress
    }

    pub fn color(&self) -> Rgb565 {
        self.color
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn pool(&self) -> &ParticlePool<MAX_PARTICLES> {
        &self.pool
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn memory_usage(&self) -> usize {
        self.pool.memory_usage() + self.framebuffer.memory_usage()
    }

    /// One-line summary, e.g. `heart transitioning 30fps 300/300`.
    pub fn status(&self) -> String<64> {
        let mut line = String::new();
        let _ = write!(
            &mut line,
            "{} {} {:.0}fps {}/{}",
            self.target_formation.name(),
            self.state.name(),
            self.fps,
            self.pool.active_count(),
            self.target_count
        );
        line
    }
}
