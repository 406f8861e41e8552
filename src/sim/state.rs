//! Show state
//!
//! Everything one firework show owns. Components are separate values; the
//! only cross-links are made by the tick driver passing borrows around.

use glam::Vec2;

use super::burst::BurstEngine;
use super::ember::EmberTrailEmitter;
use super::pattern::{Pattern, choose_pattern};
use super::rng::{RngState, SimRng, streams};
use super::rocket::{RocketController, RocketId};
use super::schedule::CelebrationScheduler;
use crate::settings::Settings;

/// Complete show state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct FireworkShow {
    /// Show seed; every component stream derives from it
    pub seed: u64,
    pub settings: Settings,
    pub rockets: RocketController,
    pub bursts: BurstEngine,
    pub embers: EmberTrailEmitter,
    /// Automatic launcher, when running
    pub celebration: Option<CelebrationScheduler>,
    /// Simulated seconds
    pub time: f32,
    /// Ticks processed
    pub frame: u64,
    /// Picks patterns for launches that leave it open
    rng: SimRng,
}

impl FireworkShow {
    /// Create a show; settings are sanitized first
    pub fn new(settings: Settings, seed: u64) -> Self {
        let settings = settings.sanitized();
        let stream = |id| RngState::new(seed, id).to_rng();
        log::debug!(
            "New show (seed {seed}): {} rockets, {} bursts x {} particles",
            settings.rockets.max_rockets,
            settings.bursts.max_bursts,
            settings.bursts.particles_per_burst
        );
        Self {
            seed,
            rockets: RocketController::new(settings.rockets.clone(), stream(streams::ROCKETS)),
            bursts: BurstEngine::new(settings.bursts.clone(), stream(streams::BURSTS)),
            embers: EmberTrailEmitter::new(settings.embers.clone(), stream(streams::EMBERS)),
            celebration: None,
            time: 0.0,
            frame: 0,
            rng: stream(streams::PATTERNS),
            settings,
        }
    }

    /// Launch a rocket; `None` picks a weighted random pattern
    pub fn launch(
        &mut self,
        target: Vec2,
        intensity: f32,
        pattern: Option<Pattern>,
        user_triggered: bool,
    ) -> RocketId {
        let pattern = pattern.unwrap_or_else(|| choose_pattern(user_triggered, &mut self.rng));
        self.rockets.launch(target, intensity, pattern, user_triggered)
    }

    /// Start the automatic celebration launcher (no-op if already running)
    pub fn start_celebration(&mut self) {
        if self.celebration.is_none() {
            log::info!("Celebration started at t={:.2}s", self.time);
            let rng = RngState::new(self.seed, streams::SCHEDULER).to_rng();
            self.celebration = Some(CelebrationScheduler::new(rng));
        }
    }

    pub fn stop_celebration(&mut self) {
        if let Some(scheduler) = self.celebration.take() {
            log::info!(
                "Celebration stopped after {} launches",
                scheduler.fired_total()
            );
        }
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebration.is_some()
    }

    /// Live burst particles plus live embers
    pub fn particle_count(&self) -> usize {
        self.bursts.particle_count() + self.embers.live_count()
    }

    /// Drop every active effect (counters and RNG streams keep going)
    pub fn clear(&mut self) {
        self.rockets.clear();
        self.bursts.clear();
        self.embers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DevicePreset;

    #[test]
    fn test_new_show_is_empty() {
        let show = FireworkShow::new(Settings::from_preset(DevicePreset::Constrained), 12345);
        assert!(show.rockets.is_empty());
        assert!(show.bursts.is_empty());
        assert_eq!(show.particle_count(), 0);
        assert_eq!(show.rockets.capacity(), 5);
        assert_eq!(show.bursts.capacity(), 8);
        assert!(!show.is_celebrating());
    }

    #[test]
    fn test_launch_with_open_pattern() {
        let mut show = FireworkShow::new(Settings::default(), 1);
        let id = show.launch(Vec2::new(0.5, 0.0), 1.0, None, true);
        assert!(show.rockets.get(id).is_some());
        let id = show.launch(Vec2::ZERO, 1.0, Some(Pattern::Heart), false);
        assert_eq!(show.rockets.get(id).unwrap().pattern(), Pattern::Heart);
    }

    #[test]
    fn test_celebration_toggle() {
        let mut show = FireworkShow::new(Settings::default(), 1);
        show.start_celebration();
        assert!(show.is_celebrating());
        show.stop_celebration();
        assert!(!show.is_celebrating());
    }
}
