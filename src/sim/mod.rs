//! Firework simulation
//!
//! Pure, seeded and tick-driven:
//! - Every component owns its own RNG stream
//! - Pools evict strictly oldest-first
//! - Burst particles are evaluated from age, never integrated
//! - No rendering or platform dependencies

pub mod burst;
pub mod color;
pub mod ember;
pub mod kinematics;
pub mod pattern;
pub mod pool;
pub mod rng;
pub mod rocket;
pub mod schedule;
pub mod state;
pub mod tick;

pub use burst::{Burst, BurstEngine, BurstId, BurstParticle, ParticleState};
pub use ember::{EmberParticle, EmberPhysics, EmberRing, EmberTrailEmitter};
pub use kinematics::KinematicProfile;
pub use pattern::{Pattern, choose_pattern, sample_direction};
pub use pool::EffectPool;
pub use rng::{RngState, SimRng};
pub use rocket::{BurstEvent, ExhaustPuff, Rocket, RocketController, RocketId};
pub use schedule::{CelebrationScheduler, Layout};
pub use state::FireworkShow;
pub use tick::{FrameInput, LaunchRequest, clamp_dt, tick};
