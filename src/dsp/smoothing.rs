//! Exponential smoothing of raw bar magnitudes, plus the derived bass
//! level that drives the reactive effects.

/// Number of low bars averaged into the bass level.
const BASS_BAR_WINDOW: usize = 12;

/// Render-tick owned smoothed spectrum. Values persist across frames and
/// chase the raw snapshot through a single-pole exponential filter.
#[derive(Debug, Clone)]
pub struct SmoothedSpectrum {
    values: Vec<f32>,
}

impl SmoothedSpectrum {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: vec![0.0; capacity],
        }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// One filter step: `smoothed += (raw - smoothed) * smooth_speed` for
    /// every slot. Results stay within [0,1] as long as the raw input does,
    /// and are clamped anyway against drifting float error.
    pub fn advance(&mut self, raw: &[f32], smooth_speed: f32) {
        let speed = smooth_speed.clamp(0.0, 1.0);
        for (smoothed, &target) in self.values.iter_mut().zip(raw.iter()) {
            *smoothed += (target - *smoothed) * speed;
            *smoothed = smoothed.clamp(0.0, 1.0);
        }
    }

    /// Mean of the lowest `min(12, bar_count)` smoothed bars.
    pub fn bass_level(&self, bar_count: usize) -> f32 {
        let count = BASS_BAR_WINDOW.min(bar_count).min(self.values.len());
        if count == 0 {
            return 0.0;
        }
        self.values[..count].iter().sum::<f32>() / count as f32
    }

    pub fn reset(&mut self) {
        self.values.fill(0.0);
    }
}
