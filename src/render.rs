//! Frame composition: drawing primitives, the per-style visualization
//! pass, and the reactive post effects.

pub mod animation;
pub mod bloom;
pub mod color;
pub mod frame;
pub mod glow;
pub mod particles;

use crate::render::animation::AnimationState;
use crate::render::color::Rgba;
use crate::render::frame::Frame;
use crate::render::particles::ParticleField;
use crate::settings::{AnimationStyle, VisualizerSettings};
use std::f32::consts::TAU;

const CIRCLE_RAY_THICKNESS: f32 = 3.0;
const PARTICLE_ALPHA: u8 = 180;

/// Draw the primary visualization for the active style. Shared by the main
/// frame and the bloom pass (which passes a reduced-alpha color).
pub fn draw_visualization(
    target: &mut Frame,
    smoothed: &[f32],
    anim: &mut AnimationState,
    settings: &VisualizerSettings,
    color: Rgba,
) {
    let (width, height) = target.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    // Circle mode only replaces the plain bar layout; animated styles keep
    // their own transforms.
    if settings.circle_mode && anim.active_style() == AnimationStyle::Bars {
        draw_circle_rays(target, smoothed, settings, color);
        return;
    }

    draw_bars(target, smoothed, anim, settings, color);
}

fn draw_bars(
    target: &mut Frame,
    smoothed: &[f32],
    anim: &mut AnimationState,
    settings: &VisualizerSettings,
    color: Rgba,
) {
    let (width, height) = target.dimensions();
    let bar_count = settings.bar_count.min(smoothed.len());
    if bar_count == 0 {
        return;
    }

    let client_height = height as f32;
    let bar_width = width as f32 / bar_count as f32;
    let fill_width = (bar_width - settings.bar_spacing).max(1.0);

    for (i, &level) in smoothed.iter().take(bar_count).enumerate() {
        let geometry = anim.bar_geometry(i, level, client_height, settings);
        let bar_color = if settings.rainbow_bars {
            color::rainbow_for_level(level).with_alpha(color.a)
        } else {
            color
        };

        frame::fill_rect(
            target,
            i as f32 * bar_width + geometry.x_offset,
            client_height - geometry.height,
            fill_width,
            geometry.height,
            bar_color,
        );
    }
}

fn draw_circle_rays(
    target: &mut Frame,
    smoothed: &[f32],
    settings: &VisualizerSettings,
    color: Rgba,
) {
    let (width, height) = target.dimensions();
    let bar_count = settings.bar_count.min(smoothed.len());
    if bar_count == 0 {
        return;
    }

    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let radius = settings.circle_radius;
    let angle_step = TAU / bar_count as f32;

    for (i, &level) in smoothed.iter().take(bar_count).enumerate() {
        let reach = level * radius;
        let angle = i as f32 * angle_step;
        let (sin, cos) = angle.sin_cos();

        let ray_color = if settings.rainbow_bars {
            color::rainbow_for_level(level).with_alpha(color.a)
        } else {
            color
        };

        frame::draw_line(
            target,
            center_x + cos * radius,
            center_y + sin * radius,
            center_x + cos * (radius + reach),
            center_y + sin * (radius + reach),
            CIRCLE_RAY_THICKNESS,
            ray_color,
        );
    }
}

/// Draw the particle field as soft dots tinted with the bar color.
pub fn draw_particles(target: &mut Frame, field: &ParticleField, color: Rgba) {
    let dot_color = color.with_alpha(PARTICLE_ALPHA.min(color.a));
    for particle in field.particles() {
        frame::fill_circle(
            target,
            particle.x,
            particle.y,
            particle.size / 2.0,
            dot_color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn painted_pixels(target: &Frame) -> usize {
        target.pixels().filter(|p| p[3] > 0).count()
    }

    #[test]
    fn bars_grow_upward_from_the_bottom_edge() {
        let mut target = frame::new_frame(64, 64);
        let mut anim = AnimationState::new(16);
        let mut settings = VisualizerSettings::default();
        settings.bar_count = 16;

        let smoothed = vec![0.5; 16];
        draw_visualization(&mut target, &smoothed, &mut anim, &settings, Rgba::CYAN);

        assert!(target.get_pixel(1, 63)[3] > 0);
        assert_eq!(target.get_pixel(1, 0)[3], 0);
    }

    #[test]
    fn silence_still_draws_the_minimum_bar_stub() {
        let mut target = frame::new_frame(64, 64);
        let mut anim = AnimationState::new(16);
        let mut settings = VisualizerSettings::default();
        settings.bar_count = 16;

        draw_visualization(&mut target, &vec![0.0; 16], &mut anim, &settings, Rgba::CYAN);
        assert!(painted_pixels(&target) > 0);
        // Nothing above the 2px stub line.
        assert_eq!(target.get_pixel(1, 60)[3], 0);
    }

    #[test]
    fn circle_mode_draws_around_the_center() {
        let mut target = frame::new_frame(128, 128);
        let mut anim = AnimationState::new(32);
        let mut settings = VisualizerSettings::default();
        settings.bar_count = 32;
        settings.circle_mode = true;
        settings.circle_radius = 40.0;

        draw_visualization(&mut target, &vec![0.5; 32], &mut anim, &settings, Rgba::CYAN);

        assert!(painted_pixels(&target) > 0);
        // The center of the ring stays empty; bottom-edge bars would not.
        assert_eq!(target.get_pixel(64, 64)[3], 0);
        assert_eq!(target.get_pixel(2, 126)[3], 0);
    }

    #[test]
    fn rainbow_bars_vary_color_with_level() {
        let mut target = frame::new_frame(64, 64);
        let mut anim = AnimationState::new(2);
        let mut settings = VisualizerSettings::default();
        settings.bar_count = 2;
        settings.rainbow_bars = true;
        settings.bar_spacing = 0.0;

        draw_visualization(&mut target, &[0.05, 0.95], &mut anim, &settings, Rgba::CYAN);

        let quiet = *target.get_pixel(8, 63);
        let loud = *target.get_pixel(40, 63);
        assert_ne!(quiet, loud);
        // Quiet bars sit at the red end of the sweep.
        assert!(quiet[0] > quiet[2]);
    }

    #[test]
    fn zero_sized_target_is_ignored() {
        let mut target = frame::new_frame(0, 0);
        let mut anim = AnimationState::new(4);
        let settings = VisualizerSettings::default();
        draw_visualization(&mut target, &[0.5; 4], &mut anim, &settings, Rgba::CYAN);
    }
}
