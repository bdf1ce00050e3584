//! Engine lifecycle and per-tick orchestration.
//!
//! A [`VisualizerEngine`] owns every piece of the pipeline and exposes the
//! three entry points collaborators drive it with: [`update`] once per
//! render-timer interval, [`render`] to produce a frame, and [`resize`]
//! when the client area changes. Configuration flows exclusively through
//! the public [`settings`] field; the engine re-clamps it every tick and
//! reacts to style changes itself, so embedders just mutate and go.
//!
//! [`update`]: VisualizerEngine::update
//! [`render`]: VisualizerEngine::render
//! [`resize`]: VisualizerEngine::resize
//! [`settings`]: VisualizerEngine::settings

use crate::audio::capture::AudioCapture;
use crate::audio::shared_spectrum::SharedSpectrum;
use crate::dsp::analyzer::AnalyzerParams;
use crate::dsp::smoothing::SmoothedSpectrum;
use crate::render::animation::AnimationState;
use crate::render::bloom::BloomBuffer;
use crate::render::color::{Rgba, hsv_to_rgb};
use crate::render::frame::{self, Frame};
use crate::render::glow::EdgeGlow;
use crate::render::particles::ParticleField;
use crate::render::{draw_particles, draw_visualization};
use crate::settings::{SPECTRUM_CAPACITY, VisualizerSettings};
use anyhow::Result;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Alpha the primary visualization is drawn with into the bloom buffer.
const BLOOM_SOURCE_ALPHA: u8 = 100;

pub struct VisualizerEngine {
    /// The single mutable configuration record. Collaborators mutate fields
    /// directly; changes with allocation consequences require [`resize`]
    /// or [`reset_particles`] afterwards.
    ///
    /// [`resize`]: VisualizerEngine::resize
    /// [`reset_particles`]: VisualizerEngine::reset_particles
    pub settings: VisualizerSettings,

    shared: Arc<SharedSpectrum>,
    analyzer_params: Arc<RwLock<AnalyzerParams>>,
    capture: AudioCapture,
    raw: Vec<f32>,
    smoothed: SmoothedSpectrum,
    animation: AnimationState,
    particles: ParticleField,
    bloom: BloomBuffer,
    glow: EdgeGlow,
    width: u32,
    height: u32,
}

impl VisualizerEngine {
    pub fn new(settings: VisualizerSettings) -> Self {
        let settings = settings.normalized();
        let shared = Arc::new(SharedSpectrum::new(SPECTRUM_CAPACITY));
        let analyzer_params = Arc::new(RwLock::new(AnalyzerParams {
            bar_count: settings.bar_count,
            sensitivity: settings.sensitivity,
        }));
        let capture = AudioCapture::new(Arc::clone(&shared), Arc::clone(&analyzer_params));

        Self {
            settings,
            shared,
            analyzer_params,
            capture,
            raw: vec![0.0; SPECTRUM_CAPACITY],
            smoothed: SmoothedSpectrum::new(SPECTRUM_CAPACITY),
            animation: AnimationState::new(SPECTRUM_CAPACITY),
            particles: ParticleField::new(),
            bloom: BloomBuffer::new(),
            glow: EdgeGlow::new(),
            width: 0,
            height: 0,
        }
    }

    /// Start audio capture. Device failure is reported once and leaves the
    /// engine rendering a flat spectrum; everything else keeps ticking.
    pub fn start(&mut self) -> Result<()> {
        self.capture.start().inspect_err(|err| {
            warn!("[engine] audio capture unavailable, rendering silence: {err:#}");
        })
    }

    /// Stop audio capture. Idempotent.
    pub fn stop(&mut self) {
        self.capture.stop();
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_running()
    }

    /// Advance smoothing, animation phases, particles, and glow decay by
    /// one tick. Call once per render-timer interval.
    pub fn update(&mut self) {
        self.settings.normalize();
        self.sync_analyzer_params();

        if self.settings.animation_style != self.animation.target_style() {
            self.animation.request_style(self.settings.animation_style);
        }

        self.shared.snapshot_into(&mut self.raw);
        self.smoothed.advance(&self.raw, self.settings.smooth_speed);
        self.animation.advance(self.smoothed.values(), &self.settings);

        let bass = self.smoothed.bass_level(self.settings.bar_count);
        if self.settings.particles_enabled {
            self.particles.advance(bass);
        }
        self.glow.advance(bass);
    }

    /// Produce one fully drawn frame into `frame`. Pure with respect to
    /// layout: never resizes anything, never touches platform state. A
    /// zero-area frame renders nothing.
    pub fn render(&mut self, frame: &mut Frame) {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        frame::clear(frame, Rgba::new(0, 0, 0, 0));
        let color = self.current_color();

        if self.settings.bloom_enabled
            && let Some(target) = self.bloom.target()
        {
            draw_visualization(
                target,
                self.smoothed.values(),
                &mut self.animation,
                &self.settings,
                color.with_alpha(BLOOM_SOURCE_ALPHA),
            );
        }

        draw_visualization(
            frame,
            self.smoothed.values(),
            &mut self.animation,
            &self.settings,
            color,
        );

        if self.settings.particles_enabled {
            draw_particles(frame, &self.particles, color);
        }

        if self.settings.edge_glow_enabled {
            self.glow.draw(frame, color, self.settings.edge_glow_intensity);
        }

        if self.settings.bloom_enabled {
            self.bloom.composite_into(frame, self.settings.bloom_intensity);
        }
    }

    /// Reallocate size-dependent buffers for a new client area. Safe to
    /// call with a zero-area size; the next render becomes a no-op. Runs
    /// on the render thread, so no frame observes a half-built buffer.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.bloom.resize(width, height);
        if self.settings.particles_enabled {
            self.reset_particles();
        }
        info!("[engine] resized to {width}x{height}");
    }

    /// Rebuild the particle field for the current count and client area.
    /// The explicit reinitialize hook for `particle_count` changes.
    pub fn reset_particles(&mut self) {
        self.particles
            .reset(self.settings.particle_count, self.width, self.height);
    }

    /// Render timer interval for the configured FPS cap.
    pub fn tick_interval(&self) -> Duration {
        self.settings.tick_interval()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.particles().len()
    }

    /// Smoothed magnitudes for the current `bar_count`.
    pub fn smoothed_bars(&self) -> &[f32] {
        &self.smoothed.values()[..self.settings.bar_count]
    }

    fn sync_analyzer_params(&self) {
        let current = *self.analyzer_params.read();
        if current.bar_count != self.settings.bar_count
            || current.sensitivity != self.settings.sensitivity
        {
            *self.analyzer_params.write() = AnalyzerParams {
                bar_count: self.settings.bar_count,
                sensitivity: self.settings.sensitivity,
            };
        }
    }

    fn current_color(&self) -> Rgba {
        if self.settings.color_cycling {
            hsv_to_rgb(self.animation.hue() * 360.0, 1.0, 1.0)
        } else {
            self.settings.bar_color
        }
    }
}

impl Drop for VisualizerEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
