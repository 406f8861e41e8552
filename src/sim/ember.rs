//! Ember trails
//!
//! Embers are short-lived sparks that do keep mutable state: they are seeded
//! from burst particles and rocket exhaust, then integrated step by step.
//! Each kind lives in a fixed-size ring allocated once at startup.

use std::f32::consts::TAU;

use glam::Vec3;

use super::burst::{Burst, BurstEngine, ParticleState};
use super::color::{from_hsl, to_hsl};
use super::rng::{SimRng, rand_index, rand_range};
use super::rocket::{ExhaustPuff, RocketController};
use crate::clamp;
use crate::consts::EMBER_TAIL_LENGTH;
use crate::settings::EmberSettings;

/// Integration constants for one ember ring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmberPhysics {
    pub gravity: f32,
    pub drag: f32,
    /// Width of the per-tick horizontal velocity kick
    pub jitter: f32,
    /// Drag a tail of past positions behind the head
    pub streak: bool,
}

impl EmberPhysics {
    pub const RESIDUE: EmberPhysics = EmberPhysics {
        gravity: 3.8,
        drag: 2.5,
        jitter: 0.02,
        streak: false,
    };

    pub const EXHAUST: EmberPhysics = EmberPhysics {
        gravity: 4.5,
        drag: 2.0,
        jitter: 0.0,
        streak: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmberParticle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: Vec3,
    pub age: f32,
    pub max_life: f32,
    pub size: f32,
    /// Points trailing the head, nearest first
    pub tail: [Vec3; EMBER_TAIL_LENGTH - 1],
}

impl EmberParticle {
    /// Placeholder for unused ring slots
    pub const DEAD: EmberParticle = EmberParticle {
        position: Vec3::ZERO,
        velocity: Vec3::ZERO,
        color: Vec3::ZERO,
        age: 0.0,
        max_life: 0.0,
        size: 0.0,
        tail: [Vec3::ZERO; EMBER_TAIL_LENGTH - 1],
    };

    pub fn is_alive(&self) -> bool {
        self.age < self.max_life
    }

    /// Remaining life in [0, 1]
    pub fn life(&self) -> f32 {
        if self.max_life <= 0.0 {
            return 0.0;
        }
        clamp(1.0 - self.age / self.max_life, 0.0, 1.0)
    }

    /// Advance one step. Returns false once expired.
    pub fn tick(&mut self, physics: &EmberPhysics, kick: Vec3, dt: f32) -> bool {
        self.age += dt;
        if !self.is_alive() {
            return false;
        }
        self.velocity.y -= physics.gravity * dt;
        self.velocity *= (-physics.drag * dt).exp();
        self.velocity += kick;
        self.position += self.velocity * dt;
        if physics.streak {
            // Each point closes half the gap to the one ahead of it
            for i in (1..self.tail.len()).rev() {
                self.tail[i] = self.tail[i].lerp(self.tail[i - 1], 0.5);
            }
            if let Some(first) = self.tail.first_mut() {
                *first = first.lerp(self.position, 0.5);
            }
        }
        true
    }

    /// Head followed by the tail, nearest first
    pub fn streak(&self) -> impl Iterator<Item = Vec3> + '_ {
        std::iter::once(self.position).chain(self.tail.iter().copied())
    }
}

/// Fixed-capacity ember storage. While any slot is free a push lands in the
/// next free slot from the cursor, so live embers run their full life. Only
/// a push into a full ring overwrites, and it replaces the oldest ember.
#[derive(Debug, Clone)]
pub struct EmberRing {
    slots: Vec<EmberParticle>,
    next: usize,
    live: usize,
    overwritten: u64,
}

impl EmberRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![EmberParticle::DEAD; capacity],
            next: 0,
            live: 0,
            overwritten: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Live embers
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live embers overwritten before they expired
    pub fn overwritten_total(&self) -> u64 {
        self.overwritten
    }

    pub fn push(&mut self, ember: EmberParticle) {
        let capacity = self.slots.len();
        let mut order = (0..capacity).map(|step| (self.next + step) % capacity);
        let target = if self.live < capacity {
            order.find(|&i| !self.slots[i].is_alive())
        } else {
            // Every ring ember ages at the same rate, so the oldest is the
            // earliest written; ties go to the first slot from the cursor
            order.min_by(|&a, &b| self.slots[b].age.total_cmp(&self.slots[a].age))
        };
        if let Some(target) = target {
            self.next = target;
        }
        let Some(slot) = self.slots.get_mut(self.next) else {
            return;
        };
        match (slot.is_alive(), ember.is_alive()) {
            (true, true) => self.overwritten += 1,
            (true, false) => {
                self.overwritten += 1;
                self.live -= 1;
            }
            (false, true) => self.live += 1,
            (false, false) => {}
        }
        *slot = ember;
        self.next = (self.next + 1) % self.slots.len();
    }

    /// Integrate every live ember
    pub fn integrate(&mut self, physics: &EmberPhysics, dt: f32, rng: &mut SimRng) {
        let half = physics.jitter * 0.5;
        let mut live = 0;
        for ember in self.slots.iter_mut().filter(|e| e.is_alive()) {
            let kick = if half > 0.0 {
                Vec3::new(rand_range(rng, -half, half), 0.0, rand_range(rng, -half, half))
            } else {
                Vec3::ZERO
            };
            if ember.tick(physics, kick, dt) {
                live += 1;
            }
        }
        self.live = live;
    }

    /// Live embers in slot order
    pub fn iter(&self) -> impl Iterator<Item = &EmberParticle> {
        self.slots.iter().filter(|e| e.is_alive())
    }

    pub fn clear(&mut self) {
        self.slots.fill(EmberParticle::DEAD);
        self.next = 0;
        self.live = 0;
    }
}

/// Seeds and integrates the burst residue and rocket exhaust rings
#[derive(Debug, Clone)]
pub struct EmberTrailEmitter {
    settings: EmberSettings,
    residue: EmberRing,
    exhaust: EmberRing,
    rng: SimRng,
}

impl EmberTrailEmitter {
    pub fn new(settings: EmberSettings, rng: SimRng) -> Self {
        Self {
            residue: EmberRing::new(settings.burst_capacity),
            exhaust: EmberRing::new(settings.exhaust_capacity),
            settings,
            rng,
        }
    }

    /// Integrate live embers, then seed new ones from this tick's rockets and bursts
    pub fn tick(&mut self, dt: f32, rockets: &RocketController, bursts: &BurstEngine) {
        let dt = dt.max(0.0);
        self.residue.integrate(&EmberPhysics::RESIDUE, dt, &mut self.rng);
        self.exhaust.integrate(&EmberPhysics::EXHAUST, dt, &mut self.rng);

        for puff in rockets.exhaust() {
            let spark = exhaust_spark(&mut self.rng, puff);
            self.exhaust.push(spark);
        }

        for burst in bursts.bursts() {
            if !self.is_productive(burst) {
                continue;
            }
            for _ in 0..self.settings.samples_per_burst {
                let index = rand_index(&mut self.rng, burst.particles().len());
                if let Some(state) = burst.particle_state(index) {
                    let ember = residue_ember(&mut self.rng, &state, self.settings.inherit_velocity);
                    self.residue.push(ember);
                }
            }
        }
    }

    fn is_productive(&self, burst: &Burst) -> bool {
        !burst.particles().is_empty()
            && burst.age() < burst.duration() * self.settings.productive_fraction
    }

    pub fn residue(&self) -> &EmberRing {
        &self.residue
    }

    pub fn exhaust(&self) -> &EmberRing {
        &self.exhaust
    }

    pub fn live_count(&self) -> usize {
        self.residue.len() + self.exhaust.len()
    }

    pub fn clear(&mut self) {
        self.residue.clear();
        self.exhaust.clear();
    }
}

/// Orange-red ember shed by a burst particle
fn residue_ember(rng: &mut SimRng, state: &ParticleState, inherit: f32) -> EmberParticle {
    let scatter = Vec3::new(
        rand_range(rng, -0.05, 0.05),
        rand_range(rng, -0.05, 0.05),
        rand_range(rng, -0.05, 0.05),
    );
    let velocity = state.velocity * inherit
        + Vec3::new(
            rand_range(rng, -0.08, 0.08),
            -0.3 + rand_range(rng, -0.15, 0.05),
            rand_range(rng, -0.08, 0.08),
        );
    EmberParticle {
        position: state.position + scatter,
        velocity,
        color: from_hsl(
            rand_range(rng, 0.02, 0.12),
            rand_range(rng, 0.7, 0.95),
            rand_range(rng, 0.5, 0.75),
        ),
        age: 0.0,
        max_life: rand_range(rng, 0.35, 0.7),
        size: rand_range(rng, 0.25, 0.65),
        ..EmberParticle::DEAD
    }
}

/// Downward spark from a rocket nozzle, tinted from the head color
fn exhaust_spark(rng: &mut SimRng, puff: &ExhaustPuff) -> EmberParticle {
    let angle = rand_range(rng, 0.0, TAU);
    let spread = rand_range(rng, 0.1, 0.4);
    let outward = rand_range(rng, 0.2, 0.6) * spread;
    let down = rand_range(rng, 1.2, 2.8);

    let (h, s, l) = to_hsl(puff.color);
    let color = from_hsl(
        h + rand_range(rng, -0.03, 0.02),
        clamp(s + rand_range(rng, 0.0, 0.15), 0.8, 1.0),
        clamp(l + rand_range(rng, 0.05, 0.25), 0.65, 0.98),
    );

    let start = puff.position
        + Vec3::new(
            rand_range(rng, -0.03, 0.03),
            rand_range(rng, -0.05, 0.02),
            rand_range(rng, -0.03, 0.03),
        );

    EmberParticle {
        position: start,
        velocity: Vec3::new(
            angle.cos() * outward,
            -down + rand_range(rng, -0.3, 0.2),
            angle.sin() * outward,
        ),
        color,
        age: 0.0,
        max_life: rand_range(rng, 0.2, 0.45),
        size: rand_range(rng, 0.5, 1.2),
        tail: [start; EMBER_TAIL_LENGTH - 1],
    }
}
