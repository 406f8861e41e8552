//! Engine settings
//!
//! Capacities and tuning constants supplied at construction. Loadable from a
//! JSON file; every value is sanitized so the simulation never sees degenerate
//! numbers (zero durations, probabilities outside [0, 1], inverted ranges).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::FireworkError;
use crate::consts::{MAX_FRAME_DT, MAX_FRAME_DT_CEILING, MIN_POSITIVE};

/// Device class presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DevicePreset {
    #[default]
    Desktop,
    /// Touch devices and small viewports
    Constrained,
}

impl DevicePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DevicePreset::Desktop => "Desktop",
            DevicePreset::Constrained => "Constrained",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "desktop" => Some(DevicePreset::Desktop),
            "constrained" | "mobile" => Some(DevicePreset::Constrained),
            _ => None,
        }
    }

    /// Maximum rockets in flight for this preset
    pub fn max_rockets(&self) -> usize {
        match self {
            DevicePreset::Desktop => 7,
            DevicePreset::Constrained => 5,
        }
    }

    /// Maximum simultaneous bursts (secondaries included)
    pub fn max_bursts(&self) -> usize {
        match self {
            DevicePreset::Desktop => 10,
            DevicePreset::Constrained => 8,
        }
    }

    /// Particles in a primary burst
    pub fn particles_per_burst(&self) -> usize {
        match self {
            DevicePreset::Desktop => 720,
            DevicePreset::Constrained => 520,
        }
    }
}

/// Rocket flight tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RocketSettings {
    pub max_rockets: usize,
    /// Flight time range (seconds)
    pub duration_range: (f32, f32),
    /// Apex height range (world units)
    pub apex_height_range: (f32, f32),
    /// Apex XZ is pulled toward the launch axis by this factor
    pub target_pull: f32,
    /// Random horizontal offset of the apex (+/-)
    pub horizontal_jitter: f32,
    /// Exhaust sparks per second while ascending
    pub exhaust_rate: f32,
    /// Wobble amplitude at launch (decays to 0 at apex)
    pub wobble_amplitude: f32,
    /// Wobble angular frequency (rad/s)
    pub wobble_frequency: f32,
}

impl Default for RocketSettings {
    fn default() -> Self {
        Self {
            max_rockets: DevicePreset::Desktop.max_rockets(),
            duration_range: (0.7, 1.05),
            apex_height_range: (2.2, 3.8),
            target_pull: 0.7,
            horizontal_jitter: 0.15,
            exhaust_rate: 80.0,
            wobble_amplitude: 0.03,
            wobble_frequency: 18.0,
        }
    }
}

/// Burst tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstSettings {
    pub max_bursts: usize,
    pub particles_per_burst: usize,
    /// Secondary burst size as a fraction of `particles_per_burst`
    pub secondary_particle_fraction: f32,
    /// Probability of the single secondary roll succeeding
    pub secondary_chance: f32,
    /// Life-fraction window in which the secondary roll happens
    pub secondary_window: (f32, f32),
    /// Inclusive number of secondaries on success
    pub secondary_count: (u32, u32),
    /// Secondary intensity relative to the parent
    pub secondary_intensity_scale: f32,
    /// Life fraction after which the burst fades out
    pub fade_start: f32,
    /// Per-particle opacity is `life^opacity_life_power`
    pub opacity_life_power: f32,
    /// Per-particle size carries `life^size_life_power`
    pub size_life_power: f32,
}

impl Default for BurstSettings {
    fn default() -> Self {
        Self {
            max_bursts: DevicePreset::Desktop.max_bursts(),
            particles_per_burst: DevicePreset::Desktop.particles_per_burst(),
            secondary_particle_fraction: 0.25,
            secondary_chance: 0.35,
            secondary_window: (0.4, 0.6),
            secondary_count: (2, 4),
            secondary_intensity_scale: 0.6,
            fade_start: 0.6,
            opacity_life_power: 0.75,
            size_life_power: 0.5,
        }
    }
}

/// Ember buffer tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmberSettings {
    /// Ring capacity for burst residue
    pub burst_capacity: usize,
    /// Ring capacity for rocket exhaust sparks
    pub exhaust_capacity: usize,
    /// Burst particles sampled per burst per tick
    pub samples_per_burst: usize,
    /// Bursts seed embers while younger than this fraction of their duration
    pub productive_fraction: f32,
    /// Share of the source particle velocity an ember inherits
    pub inherit_velocity: f32,
}

impl Default for EmberSettings {
    fn default() -> Self {
        Self {
            burst_capacity: 2000,
            exhaust_capacity: 3000,
            samples_per_burst: 8,
            productive_fraction: 0.7,
            inherit_velocity: 0.15,
        }
    }
}

/// Performance governor tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorSettings {
    /// Frame samples averaged per decision
    pub window: u32,
    /// Average frame time above which quality drops (ms)
    pub slow_frame_ms: f32,
    /// Average frame time below which quality recovers (ms)
    pub fast_frame_ms: f32,
    pub step_down: f32,
    pub step_up: f32,
    pub min_scale: f32,
    /// Hard ceiling; the device scale is clamped into [1, max_scale]
    pub max_scale: f32,
    /// Fraction of the gap to the target closed per decision
    pub smoothing: f32,
    /// Changes smaller than this are not applied
    pub deadband: f32,
}

impl Default for GovernorSettings {
    fn default() -> Self {
        Self {
            window: 30,
            slow_frame_ms: 22.0,
            fast_frame_ms: 16.0,
            step_down: 0.15,
            step_up: 0.08,
            min_scale: 0.9,
            max_scale: 2.0,
            smoothing: 0.35,
            deadband: 0.03,
        }
    }
}

/// Complete engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Preset the capacities were derived from
    pub preset: DevicePreset,
    /// Frame steps are clamped to this (seconds). Capped at
    /// `MAX_FRAME_DT_CEILING`; a step longer than
    /// `secondary_window` width times the burst duration can skip the
    /// secondary roll.
    pub max_frame_dt: f32,
    pub rockets: RocketSettings,
    pub bursts: BurstSettings,
    pub embers: EmberSettings,
    pub governor: GovernorSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: DevicePreset::Desktop,
            max_frame_dt: MAX_FRAME_DT,
            rockets: RocketSettings::default(),
            bursts: BurstSettings::default(),
            embers: EmberSettings::default(),
            governor: GovernorSettings::default(),
        }
    }
}

impl Settings {
    /// Create settings from a device preset (applies preset capacities)
    pub fn from_preset(preset: DevicePreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a device preset (updates capacity settings only)
    pub fn apply_preset(&mut self, preset: DevicePreset) {
        self.preset = preset;
        self.rockets.max_rockets = preset.max_rockets();
        self.bursts.max_bursts = preset.max_bursts();
        self.bursts.particles_per_burst = preset.particles_per_burst();
    }

    /// Clamp every value into its documented domain
    pub fn sanitized(mut self) -> Self {
        if self.max_frame_dt.is_nan() || self.max_frame_dt <= 0.0 {
            self.max_frame_dt = MAX_FRAME_DT;
        }
        self.max_frame_dt = self.max_frame_dt.min(MAX_FRAME_DT_CEILING);

        let r = &mut self.rockets;
        r.duration_range = ordered(r.duration_range, MIN_POSITIVE);
        r.apex_height_range = ordered(r.apex_height_range, f32::MIN);
        r.horizontal_jitter = non_negative(r.horizontal_jitter);
        r.exhaust_rate = non_negative(r.exhaust_rate);
        r.wobble_amplitude = non_negative(r.wobble_amplitude);

        let b = &mut self.bursts;
        b.secondary_particle_fraction = crate::clamp(b.secondary_particle_fraction, 0.0, 1.0);
        b.secondary_chance = crate::clamp(b.secondary_chance, 0.0, 1.0);
        let (lo, hi) = ordered(b.secondary_window, 0.0);
        b.secondary_window = (lo.min(1.0), hi.min(1.0));
        if b.secondary_count.0 > b.secondary_count.1 {
            b.secondary_count = (b.secondary_count.1, b.secondary_count.0);
        }
        b.secondary_intensity_scale = non_negative(b.secondary_intensity_scale);
        b.fade_start = crate::clamp(b.fade_start, 0.0, 0.999);
        b.opacity_life_power = non_negative(b.opacity_life_power);
        b.size_life_power = non_negative(b.size_life_power);

        let e = &mut self.embers;
        e.productive_fraction = crate::clamp(e.productive_fraction, 0.0, 1.0);
        e.inherit_velocity = non_negative(e.inherit_velocity);

        let g = &mut self.governor;
        g.window = g.window.max(1);
        g.min_scale = g.min_scale.max(MIN_POSITIVE);
        g.max_scale = g.max_scale.max(g.min_scale).max(1.0);
        g.smoothing = crate::clamp(g.smoothing, 0.0, 1.0);
        g.deadband = non_negative(g.deadband);

        self
    }

    /// Parse settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, FireworkError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FireworkError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!(
            "Loaded settings from {} ({} preset)",
            path.display(),
            settings.preset.as_str()
        );
        Ok(settings)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, FireworkError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn ordered((a, b): (f32, f32), floor: f32) -> (f32, f32) {
    let a = if a.is_nan() { floor } else { a.max(floor) };
    let b = if b.is_nan() { floor } else { b.max(floor) };
    if a <= b { (a, b) } else { (b, a) }
}

fn non_negative(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.max(0.0) }
}
