//! Rocket flight
//!
//! Rockets rise from the launch floor to an apex along an eased path, shed
//! exhaust sparks on the way up and detonate into a burst on arrival.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::burst::{BurstEngine, BurstId};
use super::color::from_hsl;
use super::pattern::Pattern;
use super::pool::EffectPool;
use super::rng::{SimRng, chance, rand_range};
use crate::consts::{ARRIVAL_EPSILON, LAUNCH_FLOOR_Y, MIN_POSITIVE, ROCKET_TRAIL_LENGTH};
use crate::settings::RocketSettings;
use crate::{clamp, ease_out_cubic};

/// Rocket identifier; ids increase with launch order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RocketId(pub u64);

/// Emitted when a rocket detonates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurstEvent {
    /// `None` when the burst engine is configured with zero particles
    pub burst: Option<BurstId>,
    pub position: Vec3,
    pub pattern: Pattern,
    pub intensity: f32,
    pub user_triggered: bool,
}

/// One exhaust spark emitted this tick, consumed by the ember emitter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExhaustPuff {
    pub rocket: RocketId,
    pub position: Vec3,
    /// Head color the spark is tinted from
    pub color: Vec3,
}

/// A rocket in flight
#[derive(Debug, Clone)]
pub struct Rocket {
    id: RocketId,
    start: Vec3,
    end: Vec3,
    age: f32,
    duration: f32,
    intensity: f32,
    pattern: Pattern,
    user_triggered: bool,
    color: Vec3,
    wobble_phase: f32,
    exhaust_acc: f32,
    position: Vec3,
    /// Past head positions (newest first)
    trail: Vec<Vec3>,
}

impl Rocket {
    pub fn id(&self) -> RocketId {
        self.id
    }

    pub fn start(&self) -> Vec3 {
        self.start
    }

    pub fn end(&self) -> Vec3 {
        self.end
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    pub fn user_triggered(&self) -> bool {
        self.user_triggered
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    /// Current head position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn trail(&self) -> &[Vec3] {
        &self.trail
    }

    /// Flight progress in [0, 1]
    pub fn progress(&self) -> f32 {
        clamp(self.age / self.duration, 0.0, 1.0)
    }

    pub fn has_arrived(&self) -> bool {
        self.age >= self.duration - ARRIVAL_EPSILON
    }

    /// Head position at `age`; wobble fades out so the apex is hit exactly
    pub fn position_at(&self, age: f32, amplitude: f32, frequency: f32) -> Vec3 {
        let progress = clamp(age / self.duration, 0.0, 1.0);
        let base = self.start.lerp(self.end, ease_out_cubic(progress));
        let phase = age * frequency + self.wobble_phase;
        let wobble = Vec3::new(phase.sin(), 0.0, (phase * 1.3).cos()) * amplitude * (1.0 - progress);
        base + wobble
    }

    fn record_trail(&mut self) {
        self.trail.insert(0, self.position);
        if self.trail.len() > ROCKET_TRAIL_LENGTH {
            self.trail.pop();
        }
    }

    /// Poisson-like puff count: whole puffs from the accumulator plus one
    /// more with probability equal to the remainder.
    ///
    /// The whole part is reset after emitting. A puff taken on the chance is
    /// debited too, so the accumulator can sit in (-1, 0) until the next
    /// ticks pay it back. That keeps the long-run count at `rate` per second
    /// instead of `rate` plus the expected remainders.
    fn exhaust_count(&mut self, rate: f32, dt: f32, rng: &mut SimRng) -> u32 {
        self.exhaust_acc += rate * dt;
        let whole = self.exhaust_acc.floor().max(0.0);
        self.exhaust_acc -= whole;
        let mut count = whole as u32;
        if self.exhaust_acc > 0.0 && chance(rng, self.exhaust_acc) {
            count += 1;
            self.exhaust_acc -= 1.0;
        }
        count
    }
}

/// Owns every rocket in flight
#[derive(Debug, Clone)]
pub struct RocketController {
    settings: RocketSettings,
    pool: EffectPool<Rocket>,
    rng: SimRng,
    next_id: u64,
    launched_total: u64,
    events: Vec<BurstEvent>,
    exhaust: Vec<ExhaustPuff>,
}

impl RocketController {
    pub fn new(settings: RocketSettings, rng: SimRng) -> Self {
        Self {
            pool: EffectPool::new(settings.max_rockets),
            settings,
            rng,
            next_id: 1,
            launched_total: 0,
            events: Vec::new(),
            exhaust: Vec::new(),
        }
    }

    /// Launch a rocket aimed over `target` (world XZ). When the pool is full
    /// the oldest rocket is dropped without detonating.
    pub fn launch(
        &mut self,
        target: Vec2,
        intensity: f32,
        pattern: Pattern,
        user_triggered: bool,
    ) -> RocketId {
        let s = &self.settings;
        let rng = &mut self.rng;
        let target = if target.is_finite() { target } else { Vec2::ZERO };
        let intensity = if intensity.is_finite() { intensity.max(0.0) } else { 1.0 };

        let start = Vec3::new(target.x, LAUNCH_FLOOR_Y, target.y);
        let end = Vec3::new(
            target.x * s.target_pull + rand_range(rng, -s.horizontal_jitter, s.horizontal_jitter),
            rand_range(rng, s.apex_height_range.0, s.apex_height_range.1),
            target.y * s.target_pull + rand_range(rng, -s.horizontal_jitter, s.horizontal_jitter),
        );
        let duration = rand_range(rng, s.duration_range.0, s.duration_range.1).max(MIN_POSITIVE);
        let color = from_hsl(rand_range(rng, 0.06, 0.12), 0.95, rand_range(rng, 0.7, 0.9));
        let wobble_phase = rand_range(rng, 0.0, std::f32::consts::TAU);

        let id = RocketId(self.next_id);
        self.next_id += 1;
        self.launched_total += 1;

        log::debug!(
            "Rocket {} launched toward ({:.2}, {:.2}) [{pattern}, user={user_triggered}]",
            id.0,
            target.x,
            target.y
        );

        let rocket = Rocket {
            id,
            start,
            end,
            age: 0.0,
            duration,
            intensity,
            pattern,
            user_triggered,
            color,
            wobble_phase,
            exhaust_acc: 0.0,
            position: start,
            trail: Vec::with_capacity(ROCKET_TRAIL_LENGTH + 1),
        };
        if let Some(old) = self.pool.insert(rocket) {
            log::debug!(
                "Evicted rocket {} at {:.0}% of its climb",
                old.id.0,
                old.progress() * 100.0
            );
        }
        id
    }

    /// Advance rockets; arrivals detonate into `bursts`
    pub fn tick(&mut self, dt: f32, bursts: &mut BurstEngine) {
        let dt = dt.max(0.0);
        let (amplitude, frequency, rate) = (
            self.settings.wobble_amplitude,
            self.settings.wobble_frequency,
            self.settings.exhaust_rate,
        );
        self.exhaust.clear();

        for rocket in self.pool.iter_mut() {
            rocket.age += dt;
            rocket.position = rocket.position_at(rocket.age, amplitude, frequency);
            rocket.record_trail();
            if rocket.has_arrived() {
                continue;
            }
            for _ in 0..rocket.exhaust_count(rate, dt, &mut self.rng) {
                self.exhaust.push(ExhaustPuff {
                    rocket: rocket.id,
                    position: rocket.position,
                    color: rocket.color,
                });
            }
        }

        let arrived: Vec<Rocket> = {
            let mut arrived = Vec::new();
            self.pool.retain(|r| {
                if r.has_arrived() {
                    arrived.push(r.clone());
                    false
                } else {
                    true
                }
            });
            arrived
        };

        for rocket in arrived {
            let burst = bursts.spawn(rocket.end, rocket.intensity, rocket.pattern);
            self.events.push(BurstEvent {
                burst,
                position: rocket.end,
                pattern: rocket.pattern,
                intensity: rocket.intensity,
                user_triggered: rocket.user_triggered,
            });
        }
    }

    /// Take every burst event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<BurstEvent> {
        std::mem::take(&mut self.events)
    }

    /// Exhaust puffs emitted during the last tick
    pub fn exhaust(&self) -> &[ExhaustPuff] {
        &self.exhaust
    }

    /// Rockets in flight, oldest first
    pub fn rockets(&self) -> impl Iterator<Item = &Rocket> {
        self.pool.iter()
    }

    pub fn get(&self, id: RocketId) -> Option<&Rocket> {
        self.pool.iter().find(|r| r.id == id)
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

    pub fn launched_total(&self) -> u64 {
        self.launched_total
    }

    pub fn evicted_total(&self) -> u64 {
        self.pool.evicted_total()
    }

    pub fn settings(&self) -> &RocketSettings {
        &self.settings
    }

    pub fn clear(&mut self) {
        self.pool.clear();
        self.exhaust.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::BurstSettings;
    use crate::sim::rng::{RngState, streams};
    use proptest::prelude::*;

    fn controller(settings: RocketSettings) -> RocketController {
        RocketController::new(settings, RngState::new(3, streams::ROCKETS).to_rng())
    }

    fn burst_engine() -> BurstEngine {
        let settings = BurstSettings {
            particles_per_burst: 32,
            ..Default::default()
        };
        BurstEngine::new(settings, RngState::new(3, streams::BURSTS).to_rng())
    }

    fn fixed_duration(duration: f32) -> RocketSettings {
        RocketSettings {
            duration_range: (duration, duration),
            ..Default::default()
        }
    }

    #[test]
    fn test_launch_geometry() {
        let mut rockets = controller(RocketSettings::default());
        let id = rockets.launch(Vec2::new(1.0, -2.0), 1.0, Pattern::Sphere, false);
        let r = rockets.get(id).unwrap();
        assert_eq!(r.start(), Vec3::new(1.0, LAUNCH_FLOOR_Y, -2.0));
        assert!((r.end().x - 0.7).abs() <= 0.15 + 1e-5);
        assert!((r.end().z + 1.4).abs() <= 0.15 + 1e-5);
        assert!((2.2..=3.8).contains(&r.end().y));
        assert!((0.7..=1.05).contains(&r.duration()));
        assert_eq!(r.position(), r.start());
    }

    #[test]
    fn test_arrival_after_duration_spawns_one_burst() {
        let mut rockets = controller(fixed_duration(0.8));
        let mut bursts = burst_engine();
        rockets.launch(Vec2::ZERO, 1.0, Pattern::Sphere, true);

        let mut events = Vec::new();
        for _ in 0..16 {
            rockets.tick(0.05, &mut bursts);
            events.extend(rockets.drain_events());
        }

        assert_eq!(bursts.spawned_total(), 1);
        assert_eq!(events.len(), 1);
        assert!(events[0].user_triggered);
        assert_eq!(events[0].pattern, Pattern::Sphere);
        assert!(events[0].burst.is_some());
        assert!(rockets.is_empty());
    }

    #[test]
    fn test_no_burst_before_arrival() {
        let mut rockets = controller(fixed_duration(0.8));
        let mut bursts = burst_engine();
        rockets.launch(Vec2::ZERO, 1.0, Pattern::Ring, false);
        for _ in 0..15 {
            rockets.tick(0.05, &mut bursts);
        }
        assert_eq!(bursts.spawned_total(), 0);
        assert!(rockets.drain_events().is_empty());
        assert_eq!(rockets.len(), 1);
    }

    #[test]
    fn test_head_reaches_apex_and_climbs() {
        let mut rockets = controller(fixed_duration(1.0));
        let id = rockets.launch(Vec2::new(0.5, 0.5), 1.0, Pattern::Sphere, false);
        let r = rockets.get(id).unwrap().clone();
        let mut last_y = r.start().y;
        for i in 1..=10 {
            let p = r.position_at(i as f32 * 0.1, 0.03, 18.0);
            assert!(p.y >= last_y - 1e-4, "head dropped at step {i}");
            last_y = p.y;
        }
        assert!((r.position_at(1.0, 0.03, 18.0) - r.end()).length() < 1e-5);
    }

    #[test]
    fn test_evicts_oldest_rocket_silently() {
        let mut rockets = controller(RocketSettings {
            max_rockets: 2,
            ..Default::default()
        });
        let first = rockets.launch(Vec2::ZERO, 1.0, Pattern::Sphere, false);
        let second = rockets.launch(Vec2::X, 1.0, Pattern::Sphere, false);
        let third = rockets.launch(Vec2::Y, 1.0, Pattern::Sphere, false);
        assert!(rockets.get(first).is_none());
        assert!(rockets.get(second).is_some());
        assert!(rockets.get(third).is_some());
        assert!(rockets.drain_events().is_empty());
        assert_eq!(rockets.evicted_total(), 1);
    }

    #[test]
    fn test_exhaust_rate_averages_out() {
        let mut rockets = controller(fixed_duration(100.0));
        let mut bursts = burst_engine();
        rockets.launch(Vec2::ZERO, 1.0, Pattern::Sphere, false);
        let mut total = 0;
        for _ in 0..600 {
            rockets.tick(1.0 / 60.0, &mut bursts);
            total += rockets.exhaust().len();
        }
        // 10 seconds at 80/s
        assert!((700..=900).contains(&total), "emitted {total}");
    }

    #[test]
    fn test_exhaust_accumulator_stays_within_one_puff() {
        let mut rockets = controller(fixed_duration(100.0));
        let mut bursts = burst_engine();
        let id = rockets.launch(Vec2::ZERO, 1.0, Pattern::Sphere, false);
        let mut went_negative = false;
        for _ in 0..600 {
            rockets.tick(1.0 / 60.0, &mut bursts);
            let acc = rockets.get(id).unwrap().exhaust_acc;
            assert!(acc > -1.0 && acc < 1.0, "accumulator {acc}");
            went_negative |= acc < 0.0;
        }
        assert!(went_negative);
    }

    #[test]
    fn test_trail_is_bounded() {
        let mut rockets = controller(fixed_duration(5.0));
        let mut bursts = burst_engine();
        let id = rockets.launch(Vec2::ZERO, 1.0, Pattern::Heart, false);
        for _ in 0..50 {
            rockets.tick(0.02, &mut bursts);
        }
        let r = rockets.get(id).unwrap();
        assert_eq!(r.trail().len(), ROCKET_TRAIL_LENGTH);
        assert_eq!(r.trail()[0], r.position());
    }

    proptest! {
        #[test]
        fn prop_rockets_within_capacity(
            seed in any::<u64>(),
            capacity in 1usize..8,
            ops in proptest::collection::vec((any::<bool>(), 0.0f32..0.05), 1..120),
        ) {
            let settings = RocketSettings { max_rockets: capacity, ..Default::default() };
            let mut rockets = RocketController::new(settings, RngState::new(seed, streams::ROCKETS).to_rng());
            let mut bursts = burst_engine();
            let mut launched = Vec::new();
            for (launch, dt) in ops {
                if launch {
                    launched.push(rockets.launch(Vec2::ZERO, 1.0, Pattern::Sphere, false));
                }
                rockets.tick(dt, &mut bursts);
                prop_assert!(rockets.len() <= capacity);
                // Active rockets are always the newest launches, in order
                let ids: Vec<RocketId> = rockets.rockets().map(|r| r.id()).collect();
                prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
            }
            prop_assert!(launched.len() as u64 == rockets.launched_total());
        }
    }
}
