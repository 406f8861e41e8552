//! Burst engine
//!
//! A burst is a batch of particles launched from one origin. Particle fields
//! are fixed at spawn; everything visual is derived from the burst age through
//! the closed-form kinematics, so advancing a burst only means advancing one
//! number.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::color::{from_hsl, pick_pastel, to_hsl};
use super::kinematics::{self, KinematicProfile};
use super::pattern::{Pattern, sample_direction};
use super::pool::EffectPool;
use super::rng::{SimRng, chance, rand_index, rand_int, rand_range};
use crate::consts::MIN_POSITIVE;
use crate::settings::BurstSettings;
use crate::{clamp, ease_out_cubic};

/// Secondary bursts always last this long (seconds)
pub const SECONDARY_DURATION: f32 = 1.0;

/// Burst identifier; ids increase with creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BurstId(pub u64);

/// Exponents shaping size and opacity over a particle's life
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifeCurve {
    pub opacity_power: f32,
    pub size_power: f32,
}

impl LifeCurve {
    fn from_settings(settings: &BurstSettings) -> Self {
        Self {
            opacity_power: settings.opacity_life_power,
            size_power: settings.size_life_power,
        }
    }
}

/// Immutable launch fields of one burst particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstParticle {
    initial_velocity: Vec3,
    drag: f32,
    seed: f32,
    spark: bool,
    life_scale: f32,
    color: Vec3,
}

/// Derived per-particle state at some age
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleState {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Remaining life in [0, 1]
    pub life: f32,
    pub size: f32,
    /// Particle opacity (burst fade not applied)
    pub opacity: f32,
    pub spark: bool,
    pub seed: f32,
    pub color: Vec3,
}

impl BurstParticle {
    fn new(
        initial_velocity: Vec3,
        seed: f32,
        life_scale: f32,
        color: Vec3,
        profile: &KinematicProfile,
    ) -> Self {
        Self {
            initial_velocity,
            drag: profile.drag_for(seed),
            seed,
            spark: seed > profile.spark_threshold,
            life_scale,
            color,
        }
    }

    pub fn initial_velocity(&self) -> Vec3 {
        self.initial_velocity
    }

    pub fn drag(&self) -> f32 {
        self.drag
    }

    pub fn seed(&self) -> f32 {
        self.seed
    }

    pub fn is_spark(&self) -> bool {
        self.spark
    }

    pub fn life_scale(&self) -> f32 {
        self.life_scale
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    /// Evaluate this particle at burst age `age`
    pub fn state(
        &self,
        origin: Vec3,
        age: f32,
        profile: &KinematicProfile,
        curve: LifeCurve,
    ) -> ParticleState {
        let t = profile.local_time(age, self.life_scale);
        let v0 = self.initial_velocity;

        let position = origin
            + kinematics::displacement(v0, self.drag, profile.gravity, t)
            + profile.turbulence_offset(t, self.seed);
        let velocity = kinematics::velocity(v0, self.drag, profile.gravity, t);
        let life = kinematics::life_fraction(t, profile.lifetime(self.life_scale));

        // Cooling: particles shrink as drag bleeds off their launch speed
        let initial_speed = v0.length();
        let speed_ratio = initial_speed * (-self.drag * t).exp() / initial_speed.max(0.1);
        let spark_size = if self.spark { 0.5 } else { 1.0 };
        let size = profile.base_size
            * (0.7 + 0.6 * self.seed)
            * spark_size
            * (0.3 + 0.7 * life.powf(curve.size_power))
            * (0.6 + 0.4 * speed_ratio);

        ParticleState {
            position,
            velocity,
            life,
            size,
            opacity: life.powf(curve.opacity_power),
            spark: self.spark,
            seed: self.seed,
            color: self.color,
        }
    }
}

/// One active burst
#[derive(Debug, Clone)]
pub struct Burst {
    id: BurstId,
    origin: Vec3,
    particles: Vec<BurstParticle>,
    age: f32,
    duration: f32,
    pattern: Pattern,
    intensity: f32,
    secondary_spawned: bool,
    is_secondary: bool,
    profile: KinematicProfile,
    curve: LifeCurve,
    fade_start: f32,
}

impl Burst {
    pub fn id(&self) -> BurstId {
        self.id
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn particles(&self) -> &[BurstParticle] {
        &self.particles
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn secondary_spawned(&self) -> bool {
        self.secondary_spawned
    }

    pub fn is_secondary(&self) -> bool {
        self.is_secondary
    }

    pub fn profile(&self) -> &KinematicProfile {
        &self.profile
    }

    /// Age as a fraction of duration
    pub fn progress(&self) -> f32 {
        self.age / self.duration
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.duration
    }

    /// Global burst opacity: full for the first `fade_start` of life, then an
    /// ease-out fade to zero
    pub fn opacity(&self) -> f32 {
        let fade = clamp(
            (self.progress() - self.fade_start) / (1.0 - self.fade_start),
            0.0,
            1.0,
        );
        1.0 - ease_out_cubic(fade)
    }

    /// State of particle `index` at the current age
    pub fn particle_state(&self, index: usize) -> Option<ParticleState> {
        self.state_at(index, self.age)
    }

    /// State of particle `index` at an arbitrary age (replay / lookahead)
    pub fn state_at(&self, index: usize, age: f32) -> Option<ParticleState> {
        self.particles
            .get(index)
            .map(|p| p.state(self.origin, age, &self.profile, self.curve))
    }

    /// All particle states at the current age
    pub fn particle_states(&self) -> impl Iterator<Item = ParticleState> + '_ {
        self.particles
            .iter()
            .map(|p| p.state(self.origin, self.age, &self.profile, self.curve))
    }
}

/// Owns every active burst
#[derive(Debug, Clone)]
pub struct BurstEngine {
    settings: BurstSettings,
    pool: EffectPool<Burst>,
    rng: SimRng,
    next_id: u64,
    spawned_total: u64,
    secondary_total: u64,
}

impl BurstEngine {
    pub fn new(settings: BurstSettings, rng: SimRng) -> Self {
        Self {
            pool: EffectPool::new(settings.max_bursts),
            settings,
            rng,
            next_id: 1,
            spawned_total: 0,
            secondary_total: 0,
        }
    }

    /// Detonate a primary burst. Returns `None` when bursts are configured
    /// with zero particles (nothing is created or evicted).
    pub fn spawn(&mut self, origin: Vec3, intensity: f32, pattern: Pattern) -> Option<BurstId> {
        let count = self.settings.particles_per_burst;
        if count == 0 {
            return None;
        }
        let intensity = sanitize_intensity(intensity);
        let profile = KinematicProfile::PRIMARY;
        let rng = &mut self.rng;

        let base = pick_pastel(rng);
        let accent = pick_pastel(rng);
        let (speed_lo, speed_hi) = pattern.speed_range();
        let (life_lo, life_hi) = pattern.life_scale_range();

        let particles = (0..count)
            .map(|_| {
                let dir = sample_direction(pattern, rng);
                let speed = rand_range(rng, speed_lo, speed_hi);

                // Fast particles lean toward the base color, slow ones toward the accent
                let mix = clamp((speed - 2.5) / 4.5, 0.0, 1.0);
                let (h, s, l) = to_hsl(base.lerp(accent, 1.0 - mix));
                let color = from_hsl(
                    h + rand_range(rng, -0.05, 0.05),
                    clamp(s + rand_range(rng, 0.08, 0.22), 0.55, 0.98),
                    clamp(l + rand_range(rng, -0.02, 0.15), 0.6, 0.92),
                );

                let seed = rng.random::<f32>();
                let life_scale = rand_range(rng, life_lo, life_hi);
                BurstParticle::new(dir * speed * intensity, seed, life_scale, color, &profile)
            })
            .collect();

        let id = self.allocate_id();
        self.spawned_total += 1;
        log::debug!("Burst {} ({pattern}, x{intensity:.2}) at {origin:?}", id.0);
        self.insert(Burst {
            id,
            origin,
            particles,
            age: 0.0,
            duration: pattern.burst_duration().max(MIN_POSITIVE),
            pattern,
            intensity,
            secondary_spawned: false,
            is_secondary: false,
            profile,
            curve: LifeCurve::from_settings(&self.settings),
            fade_start: self.settings.fade_start,
        });
        Some(id)
    }

    /// Small sphere sub-explosion; never spawns further secondaries
    fn spawn_secondary(&mut self, origin: Vec3, intensity: f32) -> Option<BurstId> {
        let count = (self.settings.particles_per_burst as f32
            * self.settings.secondary_particle_fraction)
            .floor() as usize;
        if count == 0 {
            return None;
        }
        let profile = KinematicProfile::SECONDARY;
        let rng = &mut self.rng;
        let base = pick_pastel(rng);
        let (h, s, l) = to_hsl(base);

        let particles = (0..count)
            .map(|_| {
                let dir = sample_direction(Pattern::Sphere, rng);
                let speed = rand_range(rng, 1.5, 3.5) * intensity;
                let color = from_hsl(h, s, clamp(l + rand_range(rng, 0.1, 0.25), 0.7, 0.95));
                let seed = rng.random::<f32>();
                let life_scale = rand_range(rng, 0.6, 0.9);
                BurstParticle::new(dir * speed, seed, life_scale, color, &profile)
            })
            .collect();

        let id = self.allocate_id();
        self.secondary_total += 1;
        self.insert(Burst {
            id,
            origin,
            particles,
            age: 0.0,
            duration: SECONDARY_DURATION,
            pattern: Pattern::Sphere,
            intensity,
            secondary_spawned: true,
            is_secondary: true,
            profile,
            curve: LifeCurve::from_settings(&self.settings),
            fade_start: self.settings.fade_start,
        });
        Some(id)
    }

    fn allocate_id(&mut self) -> BurstId {
        let id = BurstId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert(&mut self, burst: Burst) {
        if let Some(old) = self.pool.insert(burst) {
            log::debug!(
                "Evicted burst {} at {:.0}% of its life (capacity {})",
                old.id.0,
                old.progress() * 100.0,
                self.pool.capacity()
            );
        }
    }

    /// Advance every burst, roll secondaries, retire expired bursts
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        let (window_lo, window_hi) = self.settings.secondary_window;
        let (count_lo, count_hi) = self.settings.secondary_count;
        let mut pending: Vec<(Vec3, f32)> = Vec::new();

        for burst in self.pool.iter_mut() {
            burst.age += dt;
            if burst.secondary_spawned {
                continue;
            }
            let progress = burst.progress();
            if progress < window_lo || progress > window_hi {
                continue;
            }

            // One roll per burst, whatever the outcome
            burst.secondary_spawned = true;
            if burst.particles.is_empty() || !chance(&mut self.rng, self.settings.secondary_chance)
            {
                continue;
            }

            let n = rand_int(&mut self.rng, count_lo, count_hi);
            let intensity = burst.intensity * self.settings.secondary_intensity_scale;
            log::debug!("Burst {} splits into {n} secondaries", burst.id.0);
            for _ in 0..n {
                // Sub-explosions start where a parent particle is right now
                let index = rand_index(&mut self.rng, burst.particles.len());
                if let Some(state) = burst.particle_state(index) {
                    pending.push((state.position, intensity));
                }
            }
        }

        self.pool.retain(|b| !b.is_expired());

        for (origin, intensity) in pending {
            self.spawn_secondary(origin, intensity);
        }
    }

    /// Active bursts, oldest first
    pub fn bursts(&self) -> impl Iterator<Item = &Burst> {
        self.pool.iter()
    }

    pub fn get(&self, id: BurstId) -> Option<&Burst> {
        self.pool.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Primary bursts spawned since creation
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    /// Secondary bursts spawned since creation
    pub fn secondary_total(&self) -> u64 {
        self.secondary_total
    }

    pub fn evicted_total(&self) -> u64 {
        self.pool.evicted_total()
    }

    /// Particles across all active bursts
    pub fn particle_count(&self) -> usize {
        self.pool.iter().map(|b| b.particles.len()).sum()
    }

    pub fn settings(&self) -> &BurstSettings {
        &self.settings
    }

    pub fn clear(&mut self) {
        self.pool.clear();
    }
}

fn sanitize_intensity(intensity: f32) -> f32 {
    if intensity.is_finite() { intensity.max(0.0) } else { 1.0 }
}
