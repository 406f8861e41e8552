//! Particle colors
//!
//! Colors are plain RGB `Vec3`s in [0, 1]. Burst colors start from a small
//! pastel palette and get per-particle HSL jitter, so one burst reads as a
//! family of related tints instead of a flat fill.

use glam::Vec3;
use rand::Rng;

use super::rng::rand_index;

/// Soft pink / violet / blue / champagne / mint
pub const PASTEL_PALETTE: [u32; 7] = [
    0xff6fb7, 0xff4fb1, 0xcbbcff, 0x77d6ff, 0xffd6a6, 0xa9e8ff, 0xb7ffd6,
];

/// Convert a 0xRRGGBB literal to RGB
pub fn hex(rgb: u32) -> Vec3 {
    Vec3::new(
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    )
}

/// Pick a random palette color
pub fn pick_pastel<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    hex(PASTEL_PALETTE[rand_index(rng, PASTEL_PALETTE.len())])
}

/// HSL (all components in [0, 1], hue wraps) to RGB
pub fn from_hsl(h: f32, s: f32, l: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    if s == 0.0 {
        return Vec3::splat(l);
    }
    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Vec3::new(
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

/// RGB to HSL
pub fn to_hsl(c: Vec3) -> (f32, f32, f32) {
    let max = c.max_element();
    let min = c.min_element();
    let l = (max + min) / 2.0;
    if max == min {
        return (0.0, 0.0, l);
    }
    let d = max - min;
    let s = if l <= 0.5 { d / (max + min) } else { d / (2.0 - max - min) };
    let h = if max == c.x {
        (c.y - c.z) / d + if c.y < c.z { 6.0 } else { 0.0 }
    } else if max == c.y {
        (c.z - c.x) / d + 2.0
    } else {
        (c.x - c.y) / d + 4.0
    };
    (h / 6.0, s, l)
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn test_hex() {
        assert!(close(hex(0xff0000), Vec3::X));
        assert!(close(hex(0x00ff00), Vec3::Y));
        assert!(close(hex(0xffffff), Vec3::ONE));
    }

    #[test]
    fn test_hsl_primaries() {
        assert!(close(from_hsl(0.0, 1.0, 0.5), Vec3::X));
        assert!(close(from_hsl(1.0 / 3.0, 1.0, 0.5), Vec3::Y));
        assert!(close(from_hsl(2.0 / 3.0, 1.0, 0.5), Vec3::Z));
        // Hue wraps
        assert!(close(from_hsl(1.0, 1.0, 0.5), Vec3::X));
    }

    #[test]
    fn test_palette_hsl_roundtrip() {
        for rgb in PASTEL_PALETTE {
            let c = hex(rgb);
            let (h, s, l) = to_hsl(c);
            assert!(close(from_hsl(h, s, l), c), "palette color {rgb:06x}");
        }
    }

    #[test]
    fn test_gray_has_zero_saturation() {
        let (_, s, l) = to_hsl(Vec3::splat(0.4));
        assert_eq!(s, 0.0);
        assert!((l - 0.4).abs() < 1e-6);
    }
}
