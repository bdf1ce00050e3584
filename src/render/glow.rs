//! Bass-driven edge glow: a level that snaps up with the music and decays
//! linearly between hits, rendered as fading border bands.

use crate::render::color::Rgba;
use crate::render::frame::{self, Frame};
use crate::util::lerp;

const GLOW_DECAY_PER_TICK: f32 = 0.02;
/// Border thickness range in pixels across the intensity scale.
const MIN_BAND_DEPTH: f32 = 4.0;
const MAX_BAND_DEPTH: f32 = 28.0;
const PEAK_ALPHA: f32 = 160.0;

#[derive(Debug, Default)]
pub struct EdgeGlow {
    level: f32,
}

impl EdgeGlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// One tick: hold the louder of the current bass level and the
    /// decaying previous level.
    pub fn advance(&mut self, bass: f32) {
        self.level = bass
            .clamp(0.0, 1.0)
            .max(self.level - GLOW_DECAY_PER_TICK);
    }

    /// Draw border bands inset from the frame edge; alpha fades with
    /// inset depth and scales with the glow level and intensity.
    pub fn draw(&self, target: &mut Frame, color: Rgba, intensity: f32) {
        if self.level <= 0.0 || intensity <= 0.0 {
            return;
        }

        let (width, height) = target.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        let depth = lerp(MIN_BAND_DEPTH, MAX_BAND_DEPTH, (intensity / 100.0).clamp(0.0, 1.0));
        let bands = depth.ceil() as u32;
        let (w, h) = (width as f32, height as f32);

        for band in 0..bands {
            let falloff = 1.0 - band as f32 / depth;
            let alpha = (PEAK_ALPHA * self.level * falloff).round();
            if alpha < 1.0 {
                break;
            }
            let band_color = color.with_alpha(alpha as u8);
            let inset = band as f32;

            frame::fill_rect(target, inset, inset, w - inset * 2.0, 1.0, band_color);
            frame::fill_rect(target, inset, h - inset - 1.0, w - inset * 2.0, 1.0, band_color);
            frame::fill_rect(target, inset, inset + 1.0, 1.0, h - inset * 2.0 - 2.0, band_color);
            frame::fill_rect(target, w - inset - 1.0, inset + 1.0, 1.0, h - inset * 2.0 - 2.0, band_color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_snaps_up_and_decays_linearly() {
        let mut glow = EdgeGlow::new();
        glow.advance(0.8);
        assert_eq!(glow.level(), 0.8);

        glow.advance(0.0);
        assert!((glow.level() - 0.78).abs() < 1e-6);
        glow.advance(0.0);
        assert!((glow.level() - 0.76).abs() < 1e-6);

        // A louder hit overrides the decay immediately.
        glow.advance(0.9);
        assert_eq!(glow.level(), 0.9);
    }

    #[test]
    fn level_never_goes_negative() {
        let mut glow = EdgeGlow::new();
        for _ in 0..100 {
            glow.advance(0.0);
        }
        assert!(glow.level() >= -GLOW_DECAY_PER_TICK);

        glow.advance(0.01);
        assert!(glow.level() >= 0.0);
    }

    #[test]
    fn draw_paints_the_border_not_the_center() {
        let mut glow = EdgeGlow::new();
        glow.advance(1.0);

        let mut target = frame::new_frame(64, 64);
        glow.draw(&mut target, Rgba::CYAN, 50.0);

        assert!(target.get_pixel(0, 0)[3] > 0);
        assert!(target.get_pixel(32, 0)[3] > 0);
        assert_eq!(target.get_pixel(32, 32)[3], 0);
    }

    #[test]
    fn silent_glow_draws_nothing() {
        let glow = EdgeGlow::new();
        let mut target = frame::new_frame(16, 16);
        glow.draw(&mut target, Rgba::CYAN, 100.0);
        assert!(target.pixels().all(|p| p[3] == 0));
    }
}
