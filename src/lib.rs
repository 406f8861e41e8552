//! Skyburst - firework rocket, burst and ember simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (rockets, bursts, embers, tick driver)
//! - `renderer`: Read-only per-frame particle buffers for a GPU collaborator
//! - `governor`: Frame-time driven quality scaling
//! - `settings`: Capacities and tuning, loadable from JSON

pub mod error;
pub mod governor;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::FireworkError;
pub use governor::PerformanceGovernor;
pub use settings::{DevicePreset, Settings};

/// Simulation constants
pub mod consts {
    /// Largest frame step the simulation will integrate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Upper bound for a configured frame step. A 2 s burst spends 0.4 s in
    /// the default secondary window, so a step this size cannot skip it.
    pub const MAX_FRAME_DT_CEILING: f32 = 0.1;

    /// Points per exhaust spark streak, head included
    pub const EMBER_TAIL_LENGTH: usize = 8;

    /// Smallest drag coefficient / duration accepted by constructors
    pub const MIN_POSITIVE: f32 = 1e-4;

    /// Rockets count as arrived this close to their duration (absorbs f32 drift)
    pub const ARRIVAL_EPSILON: f32 = 1e-4;

    /// Rockets launch from below the visible floor
    pub const LAUNCH_FLOOR_Y: f32 = -0.8;

    /// Head positions remembered per rocket for its trail line
    pub const ROCKET_TRAIL_LENGTH: usize = 20;
}

/// Clamp `value` into `[min, max]`, mapping NaN to `min`
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic ease-out on a clamped `t`
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let x = clamp(t, 0.0, 1.0);
    1.0 - (1.0 - x).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(-3.0), 0.0);
        assert_eq!(ease_out_cubic(7.0), 1.0);
        // Front-loaded: halfway in time is well past halfway in value
        assert!(ease_out_cubic(0.5) > 0.8);
    }

    #[test]
    fn test_clamp_nan() {
        assert_eq!(clamp(f32::NAN, 0.0, 1.0), 0.0);
        assert_eq!(clamp(2.0, 0.0, 1.0), 1.0);
    }
}
