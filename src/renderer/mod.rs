//! Render snapshot
//!
//! Builds flat instance buffers from a show once per frame. Only reads the
//! simulation; a GPU collaborator uploads the bytes as-is.

pub mod instance;

pub use instance::ParticleInstance;

use glam::Vec3;

use crate::consts::EMBER_TAIL_LENGTH;
use crate::sim::{EmberParticle, EmberRing, FireworkShow, ParticleState, Rocket};
use instance::shading::{ROCKET_HEAD_SIZE, WARM_SHIFT, WARM_TINT};

/// Instance buffers for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameBuffers {
    pub bursts: Vec<ParticleInstance>,
    /// Residue dots, then one streak of `EMBER_TAIL_LENGTH` points per exhaust spark
    pub embers: Vec<ParticleInstance>,
    /// Rocket heads followed by their trail points
    pub rockets: Vec<ParticleInstance>,
}

impl FrameBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refill every buffer from `show` (allocations are reused)
    pub fn rebuild(&mut self, show: &FireworkShow) {
        let time = show.time;

        self.bursts.clear();
        for burst in show.bursts.bursts() {
            let fade = burst.opacity();
            if fade <= 0.0 {
                continue;
            }
            self.bursts.extend(
                burst
                    .particle_states()
                    .filter(|s| s.life > 0.0)
                    .map(|s| burst_instance(&s, fade, time)),
            );
        }

        self.embers.clear();
        push_embers(&mut self.embers, show.embers.residue());
        for spark in show.embers.exhaust().iter() {
            push_exhaust_streak(&mut self.embers, spark);
        }

        self.rockets.clear();
        for rocket in show.rockets.rockets() {
            push_rocket(&mut self.rockets, rocket);
        }
    }

    pub fn instance_count(&self) -> usize {
        self.bursts.len() + self.embers.len() + self.rockets.len()
    }

    pub fn bursts_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.bursts)
    }

    pub fn embers_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.embers)
    }

    pub fn rockets_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.rockets)
    }
}

/// Two-frequency shimmer; sparks flicker faster
pub fn twinkle(time: f32, seed: f32, spark: bool) -> f32 {
    let speed = if spark { 40.0 } else { 22.0 };
    let fast = 0.75 + 0.25 * (time * speed + seed * 50.0).sin();
    let slow = 0.85 + 0.15 * (time * 7.0 + seed * 30.0).sin();
    fast * slow
}

fn burst_instance(state: &ParticleState, fade: f32, time: f32) -> ParticleInstance {
    let cooling = (1.0 - state.life) * WARM_SHIFT;
    let color = state.color.lerp(state.color * WARM_TINT, cooling);
    let alpha = state.opacity * fade * twinkle(time, state.seed, state.spark);
    ParticleInstance::new(state.position, state.size, color, alpha).with_glint(state.spark)
}

fn push_embers(out: &mut Vec<ParticleInstance>, ring: &EmberRing) {
    out.extend(
        ring.iter()
            .map(|e| ParticleInstance::new(e.position, e.size, e.color, e.life())),
    );
}

/// Head bright and yellow-white, tail smaller, dimmer and redder
fn push_exhaust_streak(out: &mut Vec<ParticleInstance>, spark: &EmberParticle) {
    let life = spark.life();
    let base_alpha = life.powf(0.4);
    for (i, point) in spark.streak().enumerate() {
        let head = 1.0 - i as f32 / EMBER_TAIL_LENGTH as f32;
        let fade = head.powf(0.6);
        let c = spark.color;
        let color = Vec3::new(
            (c.x * (0.7 + 0.3 * head) + (1.0 - head) * 0.15 + head * 0.3).min(1.0),
            c.y * head,
            c.z * head * 0.5,
        );
        out.push(ParticleInstance::new(
            point,
            spark.size * fade * life,
            color,
            base_alpha * fade,
        ));
    }
}

fn push_rocket(out: &mut Vec<ParticleInstance>, rocket: &Rocket) {
    let progress = rocket.progress();
    let flicker = 0.8 + 0.2 * (rocket.age() * 40.0).sin();
    let head_size = ROCKET_HEAD_SIZE * (0.8 + 0.2 * (rocket.age() * 25.0).sin());
    out.push(
        ParticleInstance::new(
            rocket.position(),
            head_size,
            rocket.color(),
            flicker * (0.5 + 0.5 * (1.0 - progress)),
        )
        .with_glint(true),
    );

    let trail_alpha = 0.6 + 0.4 * (1.0 - progress);
    let len = rocket.trail().len().max(1) as f32;
    // Skip the newest point; it sits under the head
    for (i, point) in rocket.trail().iter().enumerate().skip(1) {
        let falloff = 1.0 - i as f32 / len;
        out.push(ParticleInstance::new(
            *point,
            head_size * 0.5 * falloff,
            rocket.color().lerp(Vec3::ONE, 0.2),
            trail_alpha * falloff,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::{FrameInput, Pattern, tick};
    use glam::Vec2;

    fn show() -> FireworkShow {
        let mut settings = Settings::default();
        settings.bursts.particles_per_burst = 40;
        FireworkShow::new(settings, 77)
    }

    #[test]
    fn test_empty_show_has_no_instances() {
        let mut buffers = FrameBuffers::new();
        buffers.rebuild(&show());
        assert_eq!(buffers.instance_count(), 0);
        assert!(buffers.bursts_bytes().is_empty());
    }

    #[test]
    fn test_rocket_head_and_trail() {
        let mut show = show();
        show.launch(Vec2::ZERO, 1.0, Some(Pattern::Ring), false);
        for _ in 0..5 {
            tick(&mut show, &FrameInput::default(), 0.02);
        }
        let mut buffers = FrameBuffers::new();
        buffers.rebuild(&show);
        // Head plus four older trail points
        assert_eq!(buffers.rockets.len(), 5);
        assert_eq!(buffers.rockets[0].glint, 1.0);
        assert_eq!(buffers.rockets_bytes().len(), 5 * 48);
    }

    #[test]
    fn test_burst_instances_match_particles() {
        let mut show = show();
        show.bursts.spawn(Vec3::new(0.0, 3.0, 0.0), 1.0, Pattern::Sphere);
        tick(&mut show, &FrameInput::default(), 0.1);
        let mut buffers = FrameBuffers::new();
        buffers.rebuild(&show);
        let live: usize = show.bursts.bursts().map(|b| b.particles().len()).sum();
        assert_eq!(buffers.bursts.len(), live);
        for inst in &buffers.bursts {
            assert!(inst.alpha >= 0.0 && inst.alpha <= 1.0);
            assert!(inst.size > 0.0);
        }
        assert!(!buffers.embers.is_empty());
    }

    #[test]
    fn test_exhaust_sparks_render_as_streaks() {
        let mut show = show();
        show.launch(Vec2::ZERO, 1.0, Some(Pattern::Sphere), false);
        for _ in 0..6 {
            tick(&mut show, &FrameInput::default(), 0.02);
        }
        let sparks = show.embers.exhaust().len();
        assert!(sparks > 0);
        let mut buffers = FrameBuffers::new();
        buffers.rebuild(&show);
        assert_eq!(show.embers.residue().len(), 0);
        assert_eq!(buffers.embers.len(), sparks * EMBER_TAIL_LENGTH);

        for streak in buffers.embers.chunks(EMBER_TAIL_LENGTH) {
            for pair in streak.windows(2) {
                assert!(pair[1].alpha <= pair[0].alpha);
                assert!(pair[1].size <= pair[0].size);
            }
            assert!(streak[0].alpha <= 1.0);
        }
    }

    #[test]
    fn test_twinkle_bounds() {
        for i in 0..1000 {
            let t = i as f32 * 0.013;
            let v = twinkle(t, 0.37, i % 2 == 0);
            assert!((0.5 * 0.7..=1.0).contains(&v));
        }
    }
}
