//! Per-particle instance records uploaded to the GPU

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// One point sprite. 48 bytes, 16-byte aligned rows for storage buffers.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 3],
    pub alpha: f32,
    /// 1.0 for star-shaped spark sprites, 0.0 for soft dots
    pub glint: f32,
    pub _pad: [f32; 3],
}

impl ParticleInstance {
    pub fn new(position: Vec3, size: f32, color: Vec3, alpha: f32) -> Self {
        Self {
            position: position.to_array(),
            size,
            color: color.to_array(),
            alpha,
            glint: 0.0,
            _pad: [0.0; 3],
        }
    }

    pub fn with_glint(mut self, spark: bool) -> Self {
        self.glint = if spark { 1.0 } else { 0.0 };
        self
    }
}

/// Shading constants shared with the sprite shader
pub mod shading {
    use glam::Vec3;

    /// Tint applied as a particle cools
    pub const WARM_TINT: Vec3 = Vec3::new(1.0, 0.6, 0.3);
    /// Share of the warm tint reached at end of life
    pub const WARM_SHIFT: f32 = 0.4;
    /// Rocket head sprite size
    pub const ROCKET_HEAD_SIZE: f32 = 0.25;
}
