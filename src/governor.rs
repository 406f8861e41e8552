//! Frame-time driven quality scaling
//!
//! Averages frame times over a fixed window and nudges a render scale (pixel
//! ratio) down when frames run slow and back up when there is headroom.

use crate::settings::GovernorSettings;
use crate::{clamp, lerp};

#[derive(Debug, Clone)]
pub struct PerformanceGovernor {
    settings: GovernorSettings,
    /// Upper bound: the device scale clamped into [1, max_scale]
    ceiling: f32,
    target: f32,
    current: f32,
    acc_ms: f32,
    samples: u32,
}

impl PerformanceGovernor {
    /// Start at the device scale (e.g. device pixel ratio)
    pub fn new(settings: &GovernorSettings, device_scale: f32) -> Self {
        let ceiling = clamp(device_scale, 1.0, settings.max_scale.max(1.0));
        Self {
            settings: settings.clone(),
            ceiling,
            target: ceiling,
            current: ceiling,
            acc_ms: 0.0,
            samples: 0,
        }
    }

    /// Feed one frame time. Returns the new scale when it changed.
    pub fn observe(&mut self, frame_ms: f32) -> Option<f32> {
        if !frame_ms.is_finite() || frame_ms < 0.0 {
            return None;
        }
        self.acc_ms += frame_ms;
        self.samples += 1;
        if self.samples < self.settings.window.max(1) {
            return None;
        }

        let avg = self.acc_ms / self.samples as f32;
        self.acc_ms = 0.0;
        self.samples = 0;

        let s = &self.settings;
        if avg > s.slow_frame_ms {
            self.target = (self.target - s.step_down).max(s.min_scale);
        } else if avg < s.fast_frame_ms {
            self.target = (self.target + s.step_up).min(self.ceiling);
        }

        let next = lerp(self.current, self.target, s.smoothing);
        if (next - self.current).abs() > s.deadband {
            log::info!(
                "Render scale {:.2} -> {:.2} (avg frame {avg:.1}ms)",
                self.current,
                next
            );
            self.current = next;
            Some(next)
        } else {
            None
        }
    }

    /// Current render scale
    pub fn scale(&self) -> f32 {
        self.current
    }

    /// Scale the governor is easing toward
    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }
}
