//! Animation state: style phases, peak-hold, glitch rolls, hue cycling,
//! and the timed gate between styles.

use crate::settings::{AnimationStyle, VisualizerSettings};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Ticks a style change keeps rendering the outgoing style before the
/// swap (about half a second at 60 FPS).
pub const TRANSITION_TICKS: u32 = 30;

const PULSE_PHASE_STEP: f32 = 0.05;
const WAVE_OFFSET_STEP: f32 = 0.02;
const WAVE_BAR_PHASE: f32 = 0.15;
const BOUNCE_DECAY_PER_TICK: f32 = 0.015;
const HUE_STEP: f32 = 0.005;
const GLITCH_JITTER_PX: f32 = 5.0;
const MIN_BAR_HEIGHT: f32 = 2.0;

/// In-flight style change. Terminal once `elapsed >= duration`, at which
/// point the current style becomes the target.
#[derive(Debug, Clone, Copy)]
pub struct StyleTransition {
    pub from: AnimationStyle,
    pub to: AnimationStyle,
    pub elapsed: u32,
    pub duration: u32,
}

/// Per-bar draw geometry for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    pub height: f32,
    pub x_offset: f32,
}

#[derive(Debug)]
pub struct AnimationState {
    current: AnimationStyle,
    transition: Option<StyleTransition>,
    pulse_phase: f32,
    wave_offset: f32,
    bounce_heights: Vec<f32>,
    hue: f32,
    rng: StdRng,
}

impl AnimationState {
    pub fn new(capacity: usize) -> Self {
        Self {
            current: AnimationStyle::Bars,
            transition: None,
            pulse_phase: 0.0,
            wave_offset: 0.0,
            bounce_heights: vec![0.0; capacity],
            hue: 0.0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Style used for drawing this frame. During a transition this stays
    /// the outgoing style until the gate elapses.
    pub fn active_style(&self) -> AnimationStyle {
        self.current
    }

    /// Style the machine is heading toward (equals the active style when
    /// no transition is in flight).
    pub fn target_style(&self) -> AnimationStyle {
        self.transition.map(|t| t.to).unwrap_or(self.current)
    }

    pub fn transition(&self) -> Option<&StyleTransition> {
        self.transition.as_ref()
    }

    /// Begin a gated change toward `target`. A repeat request for the
    /// current target is a no-op; a different target restarts the gate
    /// from the currently displayed style.
    pub fn request_style(&mut self, target: AnimationStyle) {
        if target == self.target_style() {
            return;
        }
        if target == self.current {
            self.transition = None;
            return;
        }
        self.transition = Some(StyleTransition {
            from: self.current,
            to: target,
            elapsed: 0,
            duration: TRANSITION_TICKS,
        });
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    /// Advance one tick: style phases, hue cycling, peak-hold decay, and
    /// transition progress.
    pub fn advance(&mut self, smoothed: &[f32], settings: &VisualizerSettings) {
        self.pulse_phase = (self.pulse_phase + PULSE_PHASE_STEP) % TAU;
        self.wave_offset = (self.wave_offset + WAVE_OFFSET_STEP) % TAU;

        if settings.color_cycling {
            self.hue += HUE_STEP * settings.color_speed;
            if self.hue >= 1.0 {
                self.hue -= 1.0;
            }
        }

        for (held, &level) in self.bounce_heights.iter_mut().zip(smoothed.iter()) {
            if level > *held {
                *held = level;
            } else {
                *held = (*held - BOUNCE_DECAY_PER_TICK).max(0.0);
            }
        }

        if let Some(transition) = &mut self.transition {
            transition.elapsed += 1;
            if transition.elapsed >= transition.duration {
                self.current = transition.to;
                self.transition = None;
            }
        }
    }

    /// Draw geometry for bar `index` given its smoothed level. Glitch rolls
    /// fresh randomness on every call, so geometry is not stable within a
    /// tick; that instability is the flicker.
    pub fn bar_geometry(
        &mut self,
        index: usize,
        level: f32,
        client_height: f32,
        settings: &VisualizerSettings,
    ) -> BarGeometry {
        let base = client_height * settings.bar_height_scale / 100.0;

        let (level, factor, x_offset) = match self.current {
            AnimationStyle::Bars => (level, 1.0, 0.0),
            AnimationStyle::Pulse => (level, self.pulse_phase.sin() * 0.2 + 0.8, 0.0),
            AnimationStyle::Wave => {
                let ripple = (self.wave_offset + index as f32 * WAVE_BAR_PHASE).sin() * 0.3 + 0.7;
                (level, ripple, 0.0)
            }
            AnimationStyle::Bounce => {
                let held = self.bounce_heights.get(index).copied().unwrap_or(level);
                (held, 1.0, 0.0)
            }
            AnimationStyle::Glitch => {
                let flicker = self.rng.gen_range(0.8..=1.2);
                let jitter = self.rng.gen_range(-GLITCH_JITTER_PX..=GLITCH_JITTER_PX);
                (level, flicker, jitter)
            }
        };

        BarGeometry {
            height: (level * base * factor).max(MIN_BAR_HEIGHT),
            x_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> VisualizerSettings {
        VisualizerSettings::default()
    }

    #[test]
    fn style_change_gates_for_transition_duration() {
        let mut anim = AnimationState::new(8);
        anim.request_style(AnimationStyle::Wave);

        for _ in 0..TRANSITION_TICKS - 1 {
            anim.advance(&[0.0; 8], &settings());
            assert_eq!(anim.active_style(), AnimationStyle::Bars);
        }

        anim.advance(&[0.0; 8], &settings());
        assert_eq!(anim.active_style(), AnimationStyle::Wave);
        assert!(anim.transition().is_none());
    }

    #[test]
    fn rapid_retarget_keeps_a_well_defined_style() {
        // Glitch requested then immediately replaced by Wave: the display
        // keeps the old style until one gate elapses, then lands on Wave.
        let mut anim = AnimationState::new(8);
        anim.request_style(AnimationStyle::Glitch);
        anim.request_style(AnimationStyle::Wave);
        assert_eq!(anim.target_style(), AnimationStyle::Wave);

        for _ in 0..TRANSITION_TICKS {
            assert_eq!(anim.active_style(), AnimationStyle::Bars);
            anim.advance(&[0.0; 8], &settings());
        }
        assert_eq!(anim.active_style(), AnimationStyle::Wave);
    }

    #[test]
    fn retarget_back_to_current_cancels_the_gate() {
        let mut anim = AnimationState::new(8);
        anim.request_style(AnimationStyle::Pulse);
        anim.request_style(AnimationStyle::Bars);
        assert!(anim.transition().is_none());
        assert_eq!(anim.active_style(), AnimationStyle::Bars);
    }

    #[test]
    fn pulse_factor_stays_in_band() {
        let mut anim = AnimationState::new(4);
        anim.request_style(AnimationStyle::Pulse);
        for _ in 0..TRANSITION_TICKS {
            anim.advance(&[1.0; 4], &settings());
        }

        // sin * 0.2 + 0.8 keeps pulse heights within [0.6, 1.0] of base.
        let base = 100.0 * settings().bar_height_scale / 100.0;
        for _ in 0..500 {
            anim.advance(&[1.0; 4], &settings());
            let geometry = anim.bar_geometry(0, 1.0, 100.0, &settings());
            assert!(geometry.height >= base * 0.6 - 1e-3);
            assert!(geometry.height <= base * 1.0 + 1e-3);
        }
    }

    #[test]
    fn bounce_snaps_up_and_decays_linearly() {
        let mut anim = AnimationState::new(4);
        anim.request_style(AnimationStyle::Bounce);
        for _ in 0..TRANSITION_TICKS {
            anim.advance(&[0.9, 0.0, 0.0, 0.0], &settings());
        }

        let high = anim.bar_geometry(0, 0.0, 100.0, &settings()).height;

        // Raw drops to zero; the held cap falls by exactly the decay rate.
        anim.advance(&[0.0; 4], &settings());
        let lower = anim.bar_geometry(0, 0.0, 100.0, &settings()).height;
        let expected_drop = 0.015 * 100.0 * settings().bar_height_scale / 100.0;
        assert!((high - lower - expected_drop).abs() < 1e-3);
    }

    #[test]
    fn glitch_flicker_and_jitter_stay_in_range() {
        let mut anim = AnimationState::new(4);
        anim.request_style(AnimationStyle::Glitch);
        for _ in 0..TRANSITION_TICKS {
            anim.advance(&[1.0; 4], &settings());
        }

        let base = 100.0 * settings().bar_height_scale / 100.0;
        for _ in 0..500 {
            let geometry = anim.bar_geometry(0, 1.0, 100.0, &settings());
            assert!(geometry.height >= base * 0.8 - 1e-3);
            assert!(geometry.height <= base * 1.2 + 1e-3);
            assert!(geometry.x_offset.abs() <= 5.0);
        }
    }

    #[test]
    fn minimum_visible_height_applies_to_silence() {
        let mut anim = AnimationState::new(4);
        let geometry = anim.bar_geometry(0, 0.0, 1080.0, &settings());
        assert_eq!(geometry.height, 2.0);
    }

    #[test]
    fn hue_cycles_and_wraps() {
        let mut anim = AnimationState::new(1);
        let mut config = settings();
        config.color_cycling = true;
        config.color_speed = 10.0;

        for _ in 0..100 {
            anim.advance(&[0.0], &config);
            assert!((0.0..1.0).contains(&anim.hue()));
        }
        assert!(anim.hue() > 0.0);
    }
}
