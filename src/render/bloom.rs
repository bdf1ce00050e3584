//! Bloom post-process: an off-screen copy of the primary visualization,
//! blurred with a separable box kernel and composited over the frame.

use crate::render::frame::{self, Frame};
use image::Rgba as Pixel;

/// Blur iterations per 5 points of intensity; each iteration is one
/// horizontal plus one vertical radius-1 box pass.
const INTENSITY_PER_ITERATION: u32 = 5;

/// Off-screen bloom target. Absent while the client area is zero-sized, in
/// which case the whole effect is a no-op.
#[derive(Debug, Default)]
pub struct BloomBuffer {
    buffer: Option<Frame>,
    scratch: Vec<u8>,
}

impl BloomBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reallocate for a new client area. Zero-area drops the buffer.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            self.buffer = None;
            self.scratch.clear();
        } else {
            self.buffer = Some(frame::new_frame(width, height));
            self.scratch = vec![0; (width * height * 4) as usize];
        }
    }

    /// Drawing target for the reduced-alpha visualization pass, cleared to
    /// transparent. None while unallocated.
    pub fn target(&mut self) -> Option<&mut Frame> {
        let buffer = self.buffer.as_mut()?;
        for pixel in buffer.pixels_mut() {
            *pixel = Pixel([0, 0, 0, 0]);
        }
        Some(buffer)
    }

    /// Blur the buffer per `intensity` and composite it over `frame`.
    pub fn composite_into(&mut self, frame: &mut Frame, intensity: u32) {
        let Some(buffer) = self.buffer.as_mut() else {
            return;
        };
        if buffer.dimensions() != frame.dimensions() {
            // Stale buffer from a missed resize; skip rather than smear.
            return;
        }

        let (width, height) = buffer.dimensions();
        for _ in 0..intensity / INTENSITY_PER_ITERATION {
            box_blur_pass(&mut **buffer, &mut self.scratch, width, height, true);
            box_blur_pass(&mut **buffer, &mut self.scratch, width, height, false);
        }

        for (x, y, src) in buffer.enumerate_pixels() {
            if src[3] == 0 {
                continue;
            }
            let color = crate::render::color::Rgba::new(src[0], src[1], src[2], src[3]);
            frame::fill_rect(frame, x as f32, y as f32, 1.0, 1.0, color);
        }
    }
}

/// One radius-1 box pass over interleaved RGBA bytes, along rows when
/// `horizontal`, else along columns. Edges average the two available taps.
fn box_blur_pass(pixels: &mut [u8], scratch: &mut Vec<u8>, width: u32, height: u32, horizontal: bool) {
    let (width, height) = (width as usize, height as usize);
    scratch.resize(pixels.len(), 0);
    scratch.copy_from_slice(pixels);

    let index = |x: usize, y: usize| (y * width + x) * 4;
    let (lanes, span) = if horizontal {
        (height, width)
    } else {
        (width, height)
    };

    for lane in 0..lanes {
        for pos in 0..span {
            let at = |p: usize| {
                if horizontal {
                    index(p, lane)
                } else {
                    index(lane, p)
                }
            };

            let center = at(pos);
            for channel in 0..4 {
                let mut sum = scratch[center + channel] as u32;
                let mut taps = 1u32;
                if pos > 0 {
                    sum += scratch[at(pos - 1) + channel] as u32;
                    taps += 1;
                }
                if pos + 1 < span {
                    sum += scratch[at(pos + 1) + channel] as u32;
                    taps += 1;
                }
                pixels[center + channel] = (sum / taps) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::color::Rgba;

    #[test]
    fn zero_area_resize_disables_the_effect() {
        let mut bloom = BloomBuffer::new();
        bloom.resize(0, 10);
        assert!(bloom.target().is_none());

        let mut frame = frame::new_frame(10, 10);
        bloom.composite_into(&mut frame, 50);
        assert!(frame.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn target_is_cleared_between_frames() {
        let mut bloom = BloomBuffer::new();
        bloom.resize(4, 4);

        let target = bloom.target().unwrap();
        frame::fill_rect(target, 0.0, 0.0, 4.0, 4.0, Rgba::new(255, 0, 0, 255));
        assert!(bloom.target().unwrap().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn blur_spreads_a_point_into_its_neighborhood() {
        let mut bloom = BloomBuffer::new();
        bloom.resize(9, 9);

        let target = bloom.target().unwrap();
        frame::fill_rect(target, 4.0, 4.0, 1.0, 1.0, Rgba::new(255, 255, 255, 255));

        let mut frame = frame::new_frame(9, 9);
        bloom.composite_into(&mut frame, 10);

        assert!(frame.get_pixel(4, 4)[3] > 0);
        assert!(frame.get_pixel(3, 4)[3] > 0);
        assert!(frame.get_pixel(4, 3)[3] > 0);
        // Energy two iterations of radius 1 cannot reach stays empty.
        assert_eq!(frame.get_pixel(8, 8)[3], 0);
    }

    #[test]
    fn intensity_below_one_iteration_composites_unblurred() {
        let mut bloom = BloomBuffer::new();
        bloom.resize(5, 5);

        let target = bloom.target().unwrap();
        frame::fill_rect(target, 2.0, 2.0, 1.0, 1.0, Rgba::new(0, 255, 0, 255));

        let mut frame = frame::new_frame(5, 5);
        bloom.composite_into(&mut frame, 4);

        assert_eq!(frame.get_pixel(2, 2)[1], 255);
        assert_eq!(frame.get_pixel(1, 2)[3], 0);
    }

    #[test]
    fn mismatched_frame_size_skips_compositing() {
        let mut bloom = BloomBuffer::new();
        bloom.resize(8, 8);
        let target = bloom.target().unwrap();
        frame::fill_rect(target, 0.0, 0.0, 8.0, 8.0, Rgba::new(255, 255, 255, 255));

        let mut frame = frame::new_frame(4, 4);
        bloom.composite_into(&mut frame, 10);
        assert!(frame.pixels().all(|p| p[3] == 0));
    }
}
