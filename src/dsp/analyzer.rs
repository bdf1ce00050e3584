//! Spectrum analysis: a fixed 2048-sample window, Hamming-weighted and
//! transformed with a real-input FFT, calibrated into normalized bar
//! magnitudes.

use crate::audio::shared_spectrum::SharedSpectrum;
use crate::dsp::AudioBlock;
use crate::settings::{MAX_BAR_COUNT, SPECTRUM_CAPACITY};
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex32;
use std::f32::consts::TAU;
use std::sync::Arc;

/// Accumulation window length. Power of two, as the FFT requires.
pub const ANALYSIS_WINDOW: usize = 2048;

/// Fixed calibration applied to raw magnitudes before the sensitivity
/// multiplier; tuned so typical program material peaks near full scale.
const MAGNITUDE_CALIBRATION: f32 = 100.0;

/// Live parameters the render side may change between analysis windows.
#[derive(Debug, Clone, Copy)]
pub struct AnalyzerParams {
    pub bar_count: usize,
    pub sensitivity: f32,
}

impl Default for AnalyzerParams {
    fn default() -> Self {
        Self {
            bar_count: 256,
            sensitivity: 1.5,
        }
    }
}

/// Accumulates mono samples and publishes one bar snapshot per completed
/// analysis window. Lives inside the capture callback; the only thing it
/// shares with the render tick is the [`SharedSpectrum`] it publishes to.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
    accum: Vec<f32>,
    fill: usize,
    real_buffer: Vec<f32>,
    spectrum_buffer: Vec<Complex32>,
    scratch_buffer: Vec<Complex32>,
    bars: Vec<f32>,
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        let fft = RealFftPlanner::<f32>::new().plan_fft_forward(ANALYSIS_WINDOW);
        let spectrum_buffer = fft.make_output_vec();
        let scratch_buffer = fft.make_scratch_vec();

        Self {
            fft,
            window: hamming_window(ANALYSIS_WINDOW),
            accum: vec![0.0; ANALYSIS_WINDOW],
            fill: 0,
            real_buffer: vec![0.0; ANALYSIS_WINDOW],
            spectrum_buffer,
            scratch_buffer,
            bars: vec![0.0; SPECTRUM_CAPACITY],
        }
    }

    /// Mix the block down to mono, accumulate, and run the FFT for every
    /// window that fills. Returns true if at least one snapshot was
    /// published.
    pub fn process_block(
        &mut self,
        block: &AudioBlock<'_>,
        params: AnalyzerParams,
        out: &SharedSpectrum,
    ) -> bool {
        if block.channels == 0 || block.samples.is_empty() {
            return false;
        }

        let mut produced = false;
        let inv = 1.0 / block.channels as f32;

        for frame in block.samples.chunks_exact(block.channels) {
            let sample = if block.channels == 1 {
                frame[0]
            } else {
                frame.iter().copied().sum::<f32>() * inv
            };

            self.accum[self.fill] = sample;
            self.fill += 1;

            if self.fill == ANALYSIS_WINDOW {
                self.analyze(params);
                out.publish(&self.bars);
                self.fill = 0;
                produced = true;
            }
        }

        produced
    }

    fn analyze(&mut self, params: AnalyzerParams) {
        let bar_count = params.bar_count.min(MAX_BAR_COUNT);

        self.real_buffer.copy_from_slice(&self.accum);
        for (sample, coeff) in self.real_buffer.iter_mut().zip(self.window.iter()) {
            *sample *= *coeff;
        }

        self.fft
            .process_with_scratch(
                &mut self.real_buffer,
                &mut self.spectrum_buffer,
                &mut self.scratch_buffer,
            )
            .expect("real FFT forward transform");

        // 1/N forward normalization keeps the fixed calibration constant in
        // the same range across window sizes.
        let scale = MAGNITUDE_CALIBRATION * params.sensitivity / ANALYSIS_WINDOW as f32;

        for (i, bar) in self.bars.iter_mut().enumerate() {
            *bar = if i < bar_count {
                (self.spectrum_buffer[i].norm() * scale).clamp(0.0, 1.0)
            } else {
                0.0
            };
        }
    }
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn hamming_window(size: usize) -> Vec<f32> {
    let denom = (size - 1) as f32;
    (0..size)
        .map(|i| 0.54 - 0.46 * (TAU * i as f32 / denom).cos())
        .collect()
}
