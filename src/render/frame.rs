//! CPU frame surface and rasterization primitives.
//!
//! The engine draws into plain RGBA pixel buffers; embedders blit the
//! finished frame however their windowing layer likes. All primitives clip
//! against the buffer bounds and blend source-over, so callers never have
//! to pre-clamp coordinates.

use crate::render::color::Rgba;
use image::{Rgba as Pixel, RgbaImage};

/// One drawable/drawn frame.
pub type Frame = RgbaImage;

/// Allocate a frame filled with transparent black.
pub fn new_frame(width: u32, height: u32) -> Frame {
    RgbaImage::from_pixel(width, height, Pixel([0, 0, 0, 0]))
}

/// Overwrite every pixel with `color` (no blending).
pub fn clear(frame: &mut Frame, color: Rgba) {
    let px = Pixel([color.r, color.g, color.b, color.a]);
    for pixel in frame.pixels_mut() {
        *pixel = px;
    }
}

#[inline]
fn blend_pixel(frame: &mut Frame, x: i64, y: i64, color: Rgba) {
    let (width, height) = frame.dimensions();
    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
        return;
    }

    let dst = frame.get_pixel_mut(x as u32, y as u32);
    let src_a = color.a as u32;
    if src_a == 0 {
        return;
    }
    if src_a == 255 {
        *dst = Pixel([color.r, color.g, color.b, 255]);
        return;
    }

    let inv = 255 - src_a;
    let out_a = src_a + dst[3] as u32 * inv / 255;
    dst[0] = ((color.r as u32 * src_a + dst[0] as u32 * inv) / 255) as u8;
    dst[1] = ((color.g as u32 * src_a + dst[1] as u32 * inv) / 255) as u8;
    dst[2] = ((color.b as u32 * src_a + dst[2] as u32 * inv) / 255) as u8;
    dst[3] = out_a.min(255) as u8;
}

/// Fill an axis-aligned rectangle, blending and clipping as needed.
pub fn fill_rect(frame: &mut Frame, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
    if w <= 0.0 || h <= 0.0 {
        return;
    }

    let (width, height) = frame.dimensions();
    let x0 = (x.floor() as i64).max(0);
    let y0 = (y.floor() as i64).max(0);
    let x1 = ((x + w).ceil() as i64).min(width as i64);
    let y1 = ((y + h).ceil() as i64).min(height as i64);

    for py in y0..y1 {
        for px in x0..x1 {
            blend_pixel(frame, px, py, color);
        }
    }
}

/// Fill a circle of the given radius centered at (`cx`, `cy`).
pub fn fill_circle(frame: &mut Frame, cx: f32, cy: f32, radius: f32, color: Rgba) {
    if radius <= 0.0 {
        return;
    }

    let r = radius.ceil() as i64;
    let cxi = cx.round() as i64;
    let cyi = cy.round() as i64;
    let r_sq = radius * radius;

    for dy in -r..=r {
        for dx in -r..=r {
            if (dx * dx + dy * dy) as f32 <= r_sq {
                blend_pixel(frame, cxi + dx, cyi + dy, color);
            }
        }
    }
}

/// Draw a line by stamping discs along a Bresenham walk. `thickness` below
/// 2 degenerates to single pixels.
pub fn draw_line(frame: &mut Frame, x0: f32, y0: f32, x1: f32, y1: f32, thickness: f32, color: Rgba) {
    let mut x = x0.round() as i64;
    let mut y = y0.round() as i64;
    let xe = x1.round() as i64;
    let ye = y1.round() as i64;

    let dx = (xe - x).abs();
    let dy = -(ye - y).abs();
    let sx = if x < xe { 1 } else { -1 };
    let sy = if y < ye { 1 } else { -1 };
    let mut err = dx + dy;
    let radius = thickness * 0.5;

    loop {
        if radius >= 1.0 {
            fill_circle(frame, x as f32, y as f32, radius, color);
        } else {
            blend_pixel(frame, x, y, color);
        }

        if x == xe && y == ye {
            break;
        }
        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x += sx;
        }
        if doubled <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_clips_to_bounds() {
        let mut frame = new_frame(8, 8);
        fill_rect(&mut frame, -4.0, -4.0, 100.0, 100.0, Rgba::new(255, 0, 0, 255));
        assert_eq!(frame.get_pixel(0, 0)[0], 255);
        assert_eq!(frame.get_pixel(7, 7)[0], 255);
    }

    #[test]
    fn fill_rect_ignores_empty_extent() {
        let mut frame = new_frame(4, 4);
        fill_rect(&mut frame, 1.0, 1.0, 0.0, 5.0, Rgba::new(255, 255, 255, 255));
        assert!(frame.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn opaque_blend_replaces_translucent_mixes() {
        let mut frame = new_frame(2, 1);
        fill_rect(&mut frame, 0.0, 0.0, 2.0, 1.0, Rgba::new(0, 0, 0, 255));
        fill_rect(&mut frame, 0.0, 0.0, 1.0, 1.0, Rgba::new(255, 255, 255, 255));
        fill_rect(&mut frame, 1.0, 0.0, 1.0, 1.0, Rgba::new(255, 255, 255, 128));

        assert_eq!(frame.get_pixel(0, 0)[1], 255);
        let mixed = frame.get_pixel(1, 0)[1];
        assert!(mixed > 100 && mixed < 160, "expected ~50% mix, got {mixed}");
    }

    #[test]
    fn line_endpoints_are_painted() {
        let mut frame = new_frame(16, 16);
        draw_line(&mut frame, 1.0, 1.0, 14.0, 14.0, 1.0, Rgba::new(0, 255, 0, 255));
        assert_eq!(frame.get_pixel(1, 1)[1], 255);
        assert_eq!(frame.get_pixel(14, 14)[1], 255);
    }

    #[test]
    fn circle_stays_within_radius() {
        let mut frame = new_frame(16, 16);
        fill_circle(&mut frame, 8.0, 8.0, 3.0, Rgba::new(0, 0, 255, 255));
        assert_eq!(frame.get_pixel(8, 8)[2], 255);
        assert_eq!(frame.get_pixel(8, 12)[2], 0);
        assert_eq!(frame.get_pixel(12, 8)[2], 0);
    }
}
