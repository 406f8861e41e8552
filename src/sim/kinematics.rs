//! Closed-form particle kinematics
//!
//! Burst particles obey `dv/dt = -k v - g y_hat`. The exact solution is
//!
//! ```text
//! x(t) = v0 (1 - e^{-kt}) / k  -  (g / k^2) (kt - 1 + e^{-kt}) y_hat
//! v(t) = v0 e^{-kt}            -  (g / k)   (1 - e^{-kt})      y_hat
//! ```
//!
//! so a particle's state is a pure function of its immutable launch fields and
//! its age. Nothing here keeps per-frame state: the same functions serve the
//! per-frame batch evaluation, secondary-burst origin lookups and ember seeding,
//! in any order.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::clamp;
use crate::consts::MIN_POSITIVE;

/// Below this `k * t` the gravity term switches to its series expansion
const SERIES_THRESHOLD: f32 = 1e-2;

/// `(1 - e^{-kt}) / k`, the distance factor applied to the launch velocity
#[inline]
pub fn drag_factor(k: f32, t: f32) -> f32 {
    let k = k.max(MIN_POSITIVE);
    -(-k * t).exp_m1() / k
}

/// `(kt - 1 + e^{-kt}) / k^2`, the drop factor applied to gravity
#[inline]
pub fn gravity_factor(k: f32, t: f32) -> f32 {
    let k = k.max(MIN_POSITIVE);
    let x = k * t;
    if x < SERIES_THRESHOLD {
        // t^2 (1/2 - x/6 + x^2/24); the direct form cancels catastrophically in f32
        t * t * (0.5 - x / 6.0 + x * x / 24.0)
    } else {
        (x + (-x).exp_m1()) / (k * k)
    }
}

/// Displacement from the origin after `t` seconds (negative `t` reads as 0)
#[inline]
pub fn displacement(v0: Vec3, k: f32, g: f32, t: f32) -> Vec3 {
    let t = t.max(0.0);
    v0 * drag_factor(k, t) - Vec3::Y * (g * gravity_factor(k, t))
}

/// Instantaneous velocity after `t` seconds
#[inline]
pub fn velocity(v0: Vec3, k: f32, g: f32, t: f32) -> Vec3 {
    let t = t.max(0.0);
    let k = k.max(MIN_POSITIVE);
    v0 * (-k * t).exp() - Vec3::Y * (g * drag_factor(k, t))
}

/// Limit of `velocity` as `t -> inf`
#[inline]
pub fn terminal_velocity(k: f32, g: f32) -> Vec3 {
    -Vec3::Y * (g / k.max(MIN_POSITIVE))
}

/// Remaining life in [0, 1]
#[inline]
pub fn life_fraction(t: f32, lifetime: f32) -> f32 {
    clamp(1.0 - t / lifetime.max(MIN_POSITIVE), 0.0, 1.0)
}

/// Constants shared by every particle of one burst kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicProfile {
    /// Drag coefficient is `drag_base + drag_seed * seed`
    pub drag_base: f32,
    pub drag_seed: f32,
    pub gravity: f32,
    /// Local clock runs at `time_base + time_life * life_scale`
    pub time_base: f32,
    pub time_life: f32,
    /// Life span is `lifetime_base + lifetime_life * life_scale`
    pub lifetime_base: f32,
    pub lifetime_life: f32,
    /// Point size before per-particle modulation
    pub base_size: f32,
    /// Particles with `seed > spark_threshold` are spark variants
    pub spark_threshold: f32,
    /// Horizontal turbulence amplitude (grows linearly with local time)
    pub turbulence: f32,
    pub turbulence_freq: (f32, f32),
    pub turbulence_phase: (f32, f32),
}

impl KinematicProfile {
    /// Main detonation particles
    pub const PRIMARY: KinematicProfile = KinematicProfile {
        drag_base: 1.6,
        drag_seed: 0.4,
        gravity: 4.5,
        time_base: 0.85,
        time_life: 0.3,
        lifetime_base: 1.6,
        lifetime_life: 0.8,
        base_size: 95.0,
        spark_threshold: 0.6,
        turbulence: 0.08,
        turbulence_freq: (3.0, 2.5),
        turbulence_phase: (20.0, 15.0),
    };

    /// Smaller, draggier sub-explosions
    pub const SECONDARY: KinematicProfile = KinematicProfile {
        drag_base: 2.2,
        drag_seed: 0.5,
        gravity: 5.0,
        time_base: 0.9,
        time_life: 0.2,
        lifetime_base: 0.9,
        lifetime_life: 0.5,
        base_size: 65.0,
        spark_threshold: 0.65,
        turbulence: 0.05,
        turbulence_freq: (4.0, 3.5),
        turbulence_phase: (25.0, 20.0),
    };

    /// Drag coefficient for a particle seed, never below `MIN_POSITIVE`
    #[inline]
    pub fn drag_for(&self, seed: f32) -> f32 {
        (self.drag_base + self.drag_seed * seed).max(MIN_POSITIVE)
    }

    /// Particle-local time for a burst age
    #[inline]
    pub fn local_time(&self, age: f32, life_scale: f32) -> f32 {
        age.max(0.0) * (self.time_base + self.time_life * life_scale)
    }

    #[inline]
    pub fn lifetime(&self, life_scale: f32) -> f32 {
        (self.lifetime_base + self.lifetime_life * life_scale).max(MIN_POSITIVE)
    }

    /// Horizontal drift; zero at t = 0
    #[inline]
    pub fn turbulence_offset(&self, t: f32, seed: f32) -> Vec3 {
        let amp = self.turbulence * t;
        Vec3::new(
            (t * self.turbulence_freq.0 + seed * self.turbulence_phase.0).sin() * amp,
            0.0,
            (t * self.turbulence_freq.1 + seed * self.turbulence_phase.1).cos() * amp,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_age_is_origin() {
        let v0 = Vec3::new(3.0, 5.0, -2.0);
        assert_eq!(displacement(v0, 1.8, 4.5, 0.0), Vec3::ZERO);
        assert_eq!(KinematicProfile::PRIMARY.turbulence_offset(0.0, 0.7), Vec3::ZERO);
    }

    #[test]
    fn test_matches_direct_formula() {
        let v0 = Vec3::new(1.0, 4.0, 0.5);
        let (k, g, t) = (1.7_f32, 4.5_f32, 0.9_f32);
        let e = (-k * t).exp();
        let expected = v0 * (1.0 - e) / k - Vec3::Y * (g / (k * k)) * (k * t - 1.0 + e);
        assert!((displacement(v0, k, g, t) - expected).length() < 1e-5);
    }

    #[test]
    fn test_small_drag_approaches_ballistic() {
        // k -> 0 reduces to v0 t - g t^2 / 2
        let v0 = Vec3::new(0.0, 10.0, 0.0);
        let d = displacement(v0, 0.0, 9.8, 1.0);
        assert!((d.y - (10.0 - 4.9)).abs() < 1e-2, "got {}", d.y);
        assert!(d.is_finite());
    }

    #[test]
    fn test_series_branch_is_continuous() {
        let k = 1.0;
        let below = gravity_factor(k, SERIES_THRESHOLD * 0.999);
        let above = gravity_factor(k, SERIES_THRESHOLD * 1.001);
        assert!((below - above).abs() < 1e-6);
    }

    #[test]
    fn test_velocity_is_derivative_of_displacement() {
        let v0 = Vec3::new(2.0, 3.0, -1.0);
        let (k, g, t, h) = (1.9_f32, 4.5_f32, 0.6_f32, 1e-3_f32);
        let numeric = (displacement(v0, k, g, t + h) - displacement(v0, k, g, t - h)) / (2.0 * h);
        assert!((numeric - velocity(v0, k, g, t)).length() < 1e-2);
    }

    #[test]
    fn test_life_fraction_clamped() {
        assert_eq!(life_fraction(0.0, 2.0), 1.0);
        assert_eq!(life_fraction(1.0, 2.0), 0.5);
        assert_eq!(life_fraction(5.0, 2.0), 0.0);
        assert_eq!(life_fraction(1.0, 0.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_vertical_velocity_non_increasing(
            vy in -8.0f32..8.0,
            k in 0.05f32..4.0,
            g in 0.5f32..10.0,
            t in 0.0f32..5.0,
            dt in 0.001f32..1.0,
        ) {
            let v0 = Vec3::new(0.0, vy, 0.0);
            let terminal = terminal_velocity(k, g).y;
            let a = velocity(v0, k, g, t).y;
            let b = velocity(v0, k, g, t + dt).y;
            // Moves monotonically toward -g/k from whichever side it starts on
            if vy >= terminal {
                prop_assert!(b <= a + 1e-4);
                prop_assert!(b >= terminal - 1e-4);
            } else {
                prop_assert!(b >= a - 1e-4);
                prop_assert!(b <= terminal + 1e-4);
            }
        }

        #[test]
        fn prop_terminal_velocity_limit(vy in -8.0f32..8.0, k in 0.5f32..4.0, g in 0.5f32..10.0) {
            let v = velocity(Vec3::new(1.0, vy, -1.0), k, g, 60.0 / k);
            prop_assert!((v.y - terminal_velocity(k, g).y).abs() < 1e-3);
            prop_assert!(v.x.abs() < 1e-3);
        }

        #[test]
        fn prop_displacement_continuous(
            vx in -8.0f32..8.0, vy in -8.0f32..8.0, k in 0.0f32..4.0, t in 0.0f32..4.0,
        ) {
            let v0 = Vec3::new(vx, vy, 0.0);
            let a = displacement(v0, k, 4.5, t);
            let b = displacement(v0, k, 4.5, t + 1e-3);
            prop_assert!(a.is_finite());
            prop_assert!((a - b).length() < 0.05);
        }
    }
}
