//! Bass-reactive particle field.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Bass level above which particles receive an upward impulse.
pub const BASS_THRESHOLD: f32 = 0.15;
const BASS_IMPULSE: f32 = 2.5;
/// Particles may drift this far outside the client area before respawning.
const BOUNDS_MARGIN: f32 = 20.0;
const MIN_LIFE: i32 = 50;
const MAX_LIFE: i32 = 200;
const MIN_SIZE: f32 = 2.0;
const MAX_SIZE: f32 = 6.0;

#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub life: i32,
}

/// Owns exactly the configured number of particles. Count changes and
/// client-area changes rebuild the whole field; there is no incremental
/// growth.
#[derive(Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    width: f32,
    height: f32,
    rng: StdRng,
}

impl ParticleField {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            width: 0.0,
            height: 0.0,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Discard and recreate the full particle set for the given client
    /// area. A zero-area client empties the field.
    pub fn reset(&mut self, count: usize, width: u32, height: u32) {
        self.width = width as f32;
        self.height = height as f32;
        self.particles.clear();

        if width == 0 || height == 0 {
            return;
        }

        self.particles.reserve(count);
        for _ in 0..count {
            let particle = Particle {
                x: self.rng.gen_range(0.0..self.width),
                y: self.rng.gen_range(0.0..self.height),
                vx: (self.rng.r#gen::<f32>() - 0.5) * 2.0,
                vy: (self.rng.r#gen::<f32>() - 0.5) * 2.0,
                size: self.rng.gen_range(MIN_SIZE..MAX_SIZE),
                life: self.rng.gen_range(MIN_LIFE..=MAX_LIFE),
            };
            self.particles.push(particle);
        }
    }

    /// One simulation tick: impulse on strong bass, integrate, age, and
    /// respawn anything dead or out of bounds at the bottom edge.
    pub fn advance(&mut self, bass: f32) {
        if self.particles.is_empty() || self.width <= 0.0 || self.height <= 0.0 {
            return;
        }

        let kick = bass > BASS_THRESHOLD;
        let min_x = -BOUNDS_MARGIN;
        let max_x = self.width + BOUNDS_MARGIN;
        let min_y = -BOUNDS_MARGIN;
        let max_y = self.height + BOUNDS_MARGIN;

        for i in 0..self.particles.len() {
            let mut p = self.particles[i];

            if kick {
                p.vy -= bass * BASS_IMPULSE;
            }

            p.x += p.vx;
            p.y += p.vy;
            p.life -= 1;

            let out_of_bounds = p.x < min_x || p.x > max_x || p.y < min_y || p.y > max_y;
            if p.life <= 0 || out_of_bounds {
                p.x = self.rng.gen_range(0.0..self.width);
                p.y = self.height + 10.0;
                p.vx = (self.rng.r#gen::<f32>() - 0.5) * 2.0;
                p.vy = (self.rng.r#gen::<f32>() - 1.0) * 2.0;
                p.life = self.rng.gen_range(MIN_LIFE..=MAX_LIFE);
            }

            self.particles[i] = p;
        }
    }
}

impl Default for ParticleField {
    fn default() -> Self {
        Self::new()
    }
}
