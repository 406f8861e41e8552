//! Automatic celebration launcher
//!
//! Fires a rocket every few hundred milliseconds from one of a handful of
//! launch layouts, occasionally followed by a delayed second shot or a
//! three-rocket volley. Delays run on simulation time.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::pattern::choose_pattern;
use super::rng::{SimRng, chance, rand_range};
use super::tick::LaunchRequest;

/// Seconds between scheduled shots
pub const INTERVAL_RANGE: (f32, f32) = (0.15, 0.35);
pub const DOUBLE_CHANCE: f32 = 0.25;
pub const TRIPLE_CHANCE: f32 = 0.15;
/// Spacing between the rockets of a triple volley (seconds)
pub const TRIPLE_SPACING: f32 = 0.1;

/// Where a scheduled shot is aimed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Out to the left or right
    Sides,
    /// On a flattened circle around the center
    Ring,
    Oblique,
    /// Toward the back of the scene
    FarHigh,
}

impl Layout {
    pub const ALL: [Layout; 4] = [Layout::Sides, Layout::Ring, Layout::Oblique, Layout::FarHigh];

    /// Launch target (world XZ) for this layout
    pub fn sample_target<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        match self {
            Layout::Sides => {
                let side = if rng.random::<bool>() { 1.0 } else { -1.0 };
                Vec2::new(side * rand_range(rng, 1.5, 3.0), rand_range(rng, -1.0, 1.0))
            }
            Layout::Ring => {
                let angle = rand_range(rng, 0.0, TAU);
                let radius = rand_range(rng, 1.5, 2.5);
                Vec2::new(angle.cos() * radius, angle.sin() * radius * 0.4)
            }
            Layout::Oblique => Vec2::new(rand_range(rng, -2.5, 2.5), rand_range(rng, -1.5, 0.0)),
            Layout::FarHigh => Vec2::new(rand_range(rng, -2.0, 2.0), rand_range(rng, -2.0, -0.5)),
        }
    }
}

#[derive(Debug, Clone)]
struct PendingLaunch {
    delay: f32,
    request: LaunchRequest,
}

#[derive(Debug, Clone)]
pub struct CelebrationScheduler {
    rng: SimRng,
    timer: f32,
    pending: Vec<PendingLaunch>,
    fired_total: u64,
}

impl CelebrationScheduler {
    /// The first shot fires on the first tick
    pub fn new(rng: SimRng) -> Self {
        Self {
            rng,
            timer: 0.0,
            pending: Vec::new(),
            fired_total: 0,
        }
    }

    /// Advance by `dt` and return the launches due this tick
    pub fn tick(&mut self, dt: f32) -> Vec<LaunchRequest> {
        let dt = dt.max(0.0);
        let mut due = Vec::new();

        self.pending.retain_mut(|p| {
            p.delay -= dt;
            if p.delay <= 0.0 {
                due.push(p.request);
                false
            } else {
                true
            }
        });

        self.timer -= dt;
        if self.timer <= 0.0 {
            self.timer = rand_range(&mut self.rng, INTERVAL_RANGE.0, INTERVAL_RANGE.1);
            self.schedule_shot(&mut due);
        }

        self.fired_total += due.len() as u64;
        due
    }

    fn schedule_shot(&mut self, due: &mut Vec<LaunchRequest>) {
        let rng = &mut self.rng;
        let layout = Layout::ALL[rng.random_range(0..Layout::ALL.len())];
        let target = layout.sample_target(rng);
        due.push(celebration_request(rng, target, (0.8, 1.3)));

        if chance(rng, DOUBLE_CHANCE) {
            let side = if rng.random::<bool>() { 1.0 } else { -1.0 };
            let target = Vec2::new(side * rand_range(rng, 1.2, 2.5), rand_range(rng, -1.0, 1.0));
            let delay = rand_range(rng, 0.05, 0.15);
            let request = celebration_request(rng, target, (0.9, 1.2));
            self.pending.push(PendingLaunch { delay, request });
        }

        if chance(rng, TRIPLE_CHANCE) {
            for i in 0..3 {
                let angle = i as f32 / 3.0 * TAU + rand_range(rng, 0.0, 0.5);
                let target = Vec2::new(angle.cos() * 1.8, angle.sin() * 1.2);
                let request = celebration_request(rng, target, (0.8, 1.1));
                if i == 0 {
                    due.push(request);
                } else {
                    self.pending.push(PendingLaunch {
                        delay: i as f32 * TRIPLE_SPACING,
                        request,
                    });
                }
            }
        }
    }

    /// Launches waiting on a delay
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn fired_total(&self) -> u64 {
        self.fired_total
    }
}

fn celebration_request(rng: &mut SimRng, target: Vec2, intensity: (f32, f32)) -> LaunchRequest {
    LaunchRequest {
        target,
        intensity: rand_range(rng, intensity.0, intensity.1),
        pattern: Some(choose_pattern(true, rng)),
        user_triggered: true,
    }
}
