//! Frame tick
//!
//! Advances a show by one variable-length frame: applies queued launches,
//! then rockets, bursts and embers in that order.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pattern::Pattern;
use super::rocket::BurstEvent;
use super::state::FireworkShow;

/// A rocket launch requested by the caller (or the celebration scheduler)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchRequest {
    /// Launch position on the ground plane (world XZ)
    pub target: Vec2,
    pub intensity: f32,
    /// `None` lets the show pick a weighted random pattern
    pub pattern: Option<Pattern>,
    pub user_triggered: bool,
}

impl LaunchRequest {
    /// Tap / button launch at `target` with a random pattern
    pub fn user(target: Vec2) -> Self {
        Self {
            target,
            intensity: 1.0,
            pattern: None,
            user_triggered: true,
        }
    }
}

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub launches: Vec<LaunchRequest>,
}

/// Clamp a raw frame delta into `[0, max_dt]`; NaN and negatives become 0
pub fn clamp_dt(dt: f32, max_dt: f32) -> f32 {
    if dt.is_nan() || dt <= 0.0 {
        0.0
    } else {
        dt.min(max_dt)
    }
}

/// Advance the show by one frame and return the bursts that occurred
pub fn tick(show: &mut FireworkShow, input: &FrameInput, dt: f32) -> Vec<BurstEvent> {
    let dt = clamp_dt(dt, show.settings.max_frame_dt);

    let scheduled = match show.celebration.as_mut() {
        Some(scheduler) => scheduler.tick(dt),
        None => Vec::new(),
    };
    for req in scheduled.iter().chain(input.launches.iter()) {
        show.launch(req.target, req.intensity, req.pattern, req.user_triggered);
    }

    show.rockets.tick(dt, &mut show.bursts);
    show.bursts.tick(dt);
    show.embers.tick(dt, &show.rockets, &show.bursts);

    show.time += dt;
    show.frame += 1;
    show.rockets.drain_events()
}
