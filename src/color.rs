use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Fixed colours per group
// ---------------------------------------------------------------------------

pub const HEALTHY: Color32 = Color32::from_rgb(0x00, 0x00, 0xFF);
pub const HEALTHY_LIGHT: Color32 = Color32::from_rgb(0xAD, 0xD8, 0xE6);
pub const HEALTHY_FEMALE: Color32 = Color32::from_rgb(0xFF, 0xC0, 0xCB);
pub const DISEASED: Color32 = Color32::from_rgb(0xFF, 0x00, 0x00);
pub const DISEASED_LIGHT: Color32 = Color32::from_rgb(0xFF, 0xA0, 0x7A);
pub const NOT_INDUCED: Color32 = Color32::from_rgb(0xA9, 0xA9, 0xA9);
pub const NOT_INDUCED_LIGHT: Color32 = Color32::from_rgb(0xD3, 0xD3, 0xD3);
pub const GUIDE: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 77);

/// Colours for the male / female density curves of one outcome group.
#[derive(Debug, Clone, Copy)]
pub struct SexPalette {
    pub male: Color32,
    pub female: Color32,
}

pub const HEALTHY_SEX: SexPalette = SexPalette {
    male: HEALTHY,
    female: HEALTHY_FEMALE,
};

pub const DISEASED_SEX: SexPalette = SexPalette {
    male: DISEASED,
    female: DISEASED_LIGHT,
};

// ---------------------------------------------------------------------------
// Blending
// ---------------------------------------------------------------------------

/// Linear-light blend from `from` (t = 0) to `to` (t = 1).
pub fn blend(from: Color32, to: Color32, t: f32) -> Color32 {
    let a: LinSrgb = Srgb::new(from.r(), from.g(), from.b()).into_format::<f32>().into_linear();
    let b: LinSrgb = Srgb::new(to.r(), to.g(), to.b()).into_format::<f32>().into_linear();
    let mixed: Srgb<f32> = Srgb::from_linear(a.mix(b, t.clamp(0.0, 1.0)));
    let rgb: Srgb<u8> = mixed.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

pub fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), a)
}

/// Sequential white → `base` ramp used for banded 2-D densities
/// ("Blues" for healthy, "Reds" for diseased).
#[derive(Debug, Clone, Copy)]
pub struct Ramp {
    base: Color32,
}

impl Ramp {
    pub const BLUES: Ramp = Ramp { base: HEALTHY };
    pub const REDS: Ramp = Ramp { base: DISEASED };

    /// Colour for band `level` of `levels` (1-based).
    pub fn band(&self, level: usize, levels: usize) -> Color32 {
        let t = if level >= levels {
            1.0
        } else {
            0.15 + 0.85 * level as f32 / levels as f32
        };
        blend(Color32::WHITE, self.base, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(Color32::WHITE, DISEASED, 0.0), Color32::WHITE);
        assert_eq!(blend(Color32::WHITE, DISEASED, 1.0), DISEASED);
    }

    #[test]
    fn ramp_darkens_with_level() {
        let low = Ramp::BLUES.band(1, 10);
        let high = Ramp::BLUES.band(10, 10);
        assert!(low.r() > high.r());
        assert_eq!(high, HEALTHY);
    }

    #[test]
    fn alpha_is_scaled() {
        assert_eq!(with_alpha(DISEASED, 1.0).a(), 255);
        assert_eq!(with_alpha(DISEASED, 0.0).a(), 0);
    }
}
