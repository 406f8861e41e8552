//! Burst direction patterns
//!
//! Each pattern is a sampler mapping a random source to a unit direction.
//! The burst silhouette is the image of that distribution scaled by speed.

use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

use glam::{EulerRot, Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rng::rand_range;
use crate::FireworkError;

/// Vertical spread of the ring pattern before normalization
pub const RING_VERTICAL_JITTER: f32 = 0.18;

/// Burst silhouette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    #[default]
    Sphere,
    Heart,
    Ring,
}

impl Pattern {
    pub const ALL: [Pattern; 3] = [Pattern::Sphere, Pattern::Heart, Pattern::Ring];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::Sphere => "sphere",
            Pattern::Heart => "heart",
            Pattern::Ring => "ring",
        }
    }

    /// Initial speed range (before intensity scaling)
    pub fn speed_range(&self) -> (f32, f32) {
        match self {
            Pattern::Heart => (2.5, 6.0),
            Pattern::Ring => (3.0, 6.5),
            Pattern::Sphere => (2.8, 7.0),
        }
    }

    /// Per-particle life-scale range
    pub fn life_scale_range(&self) -> (f32, f32) {
        match self {
            Pattern::Heart => (0.82, 1.1),
            Pattern::Ring | Pattern::Sphere => (0.7, 1.05),
        }
    }

    /// Burst duration (seconds)
    pub fn burst_duration(&self) -> f32 {
        match self {
            Pattern::Heart => 2.2,
            Pattern::Ring => 2.1,
            Pattern::Sphere => 2.0,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pattern {
    type Err = FireworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sphere" => Ok(Pattern::Sphere),
            "heart" => Ok(Pattern::Heart),
            "ring" => Ok(Pattern::Ring),
            _ => Err(FireworkError::InvalidPattern(s.to_string())),
        }
    }
}

/// Sample a unit direction for `pattern`
pub fn sample_direction<R: Rng + ?Sized>(pattern: Pattern, rng: &mut R) -> Vec3 {
    match pattern {
        Pattern::Sphere => sample_sphere(rng),
        Pattern::Ring => sample_ring(rng),
        Pattern::Heart => sample_heart(rng),
    }
}

/// Uniform on the unit sphere (acos of a uniform cosine avoids polar clustering)
fn sample_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta = rand_range(rng, 0.0, TAU);
    let phi = rand_range(rng, -1.0, 1.0).clamp(-1.0, 1.0).acos();
    Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin())
}

/// Horizontal ring with a thin vertical spray
fn sample_ring<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta = rand_range(rng, 0.0, TAU);
    let y = rand_range(rng, -RING_VERTICAL_JITTER, RING_VERTICAL_JITTER);
    // |(cos, y, sin)| >= 1, so the normalized y never exceeds the jitter
    Vec3::new(theta.cos(), y, theta.sin()).normalize()
}

/// Heart curve extruded with some thickness, then turned to a random heading
fn sample_heart<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let t = rand_range(rng, 0.0, TAU);
    let (x, y) = heart_curve(t);
    let z = rand_range(rng, -2.2, 2.2);
    let local = (Vec3::new(x, y, z) * 0.06).try_normalize().unwrap_or(Vec3::Y);

    let roll = rand_range(rng, -0.35, 0.35);
    let yaw = rand_range(rng, 0.0, TAU);
    let rotation = Quat::from_euler(EulerRot::XYZ, roll, yaw, 0.0);
    (rotation * local).normalize()
}

/// Classic parametric heart: x = 16 sin^3 t, y = 13 cos t - 5 cos 2t - 2 cos 3t - cos 4t
pub fn heart_curve(t: f32) -> (f32, f32) {
    let s = t.sin();
    let x = 16.0 * s * s * s;
    let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
    (x, y)
}

/// Weighted pattern choice; taps and buttons favour hearts
pub fn choose_pattern<R: Rng + ?Sized>(user_triggered: bool, rng: &mut R) -> Pattern {
    let r = rng.random::<f32>();
    let (heart, ring) = if user_triggered { (0.32, 0.46) } else { (0.16, 0.32) };
    if r < heart {
        Pattern::Heart
    } else if r < ring {
        Pattern::Ring
    } else {
        Pattern::Sphere
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::RngState;

    #[test]
    fn test_all_patterns_unit_length() {
        let mut rng = RngState::new(11, 0).to_rng();
        for pattern in Pattern::ALL {
            for _ in 0..2000 {
                let d = sample_direction(pattern, &mut rng);
                assert!((d.length() - 1.0).abs() < 1e-4, "{pattern} gave {d:?}");
                assert!(d.is_finite());
            }
        }
    }

    #[test]
    fn test_ring_vertical_and_azimuth_uniformity() {
        const SAMPLES: usize = 10_000;
        const BINS: usize = 16;
        let mut rng = RngState::new(2026, 0).to_rng();
        let mut counts = [0usize; BINS];

        for _ in 0..SAMPLES {
            let d = sample_direction(Pattern::Ring, &mut rng);
            assert!(d.y.abs() <= RING_VERTICAL_JITTER + 1e-6, "vertical {}", d.y);
            let azimuth = d.z.atan2(d.x).rem_euclid(TAU);
            let bin = ((azimuth / TAU) * BINS as f32) as usize;
            counts[bin.min(BINS - 1)] += 1;
        }

        let expected = SAMPLES as f32 / BINS as f32;
        let chi2: f32 = counts
            .iter()
            .map(|&c| {
                let diff = c as f32 - expected;
                diff * diff / expected
            })
            .sum();
        // 15 degrees of freedom, p = 0.001 critical value
        assert!(chi2 < 37.7, "chi-square {chi2} counts {counts:?}");
    }

    #[test]
    fn test_sphere_has_no_polar_clustering() {
        // Uniform on the sphere means y = cos(phi) is uniform on [-1, 1]
        let mut rng = RngState::new(5, 0).to_rng();
        let mut upper_cap = 0;
        let n = 20_000;
        for _ in 0..n {
            if sample_direction(Pattern::Sphere, &mut rng).y > 0.9 {
                upper_cap += 1;
            }
        }
        let frac = upper_cap as f32 / n as f32;
        assert!((frac - 0.05).abs() < 0.01, "cap fraction {frac}");
    }

    #[test]
    fn test_heart_curve_never_degenerate() {
        for i in 0..360 {
            let (x, y) = heart_curve(i as f32 / 360.0 * TAU);
            assert!(x.abs() + y.abs() > 1.0);
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("Heart".parse::<Pattern>().unwrap(), Pattern::Heart);
        assert_eq!(" ring ".parse::<Pattern>().unwrap(), Pattern::Ring);
        let err = "willow".parse::<Pattern>().unwrap_err();
        assert!(matches!(err, FireworkError::InvalidPattern(ref s) if s == "willow"));
    }

    #[test]
    fn test_choose_pattern_weights() {
        let mut rng = RngState::new(9, 0).to_rng();
        let n = 20_000;
        let hearts = (0..n)
            .filter(|_| choose_pattern(true, &mut rng) == Pattern::Heart)
            .count();
        let frac = hearts as f32 / n as f32;
        assert!((frac - 0.32).abs() < 0.02, "heart fraction {frac}");
    }
}
