//! Engine settings and preset persistence.
//!
//! [`VisualizerSettings`] is the sole channel between the embedding UI and
//! the core: collaborators mutate fields directly and the engine re-clamps
//! them every tick, so out-of-range values degrade instead of faulting.
//! Presets are flat JSON documents in which every field is optional;
//! loading merges present fields over the current settings and leaves the
//! rest untouched, which keeps older and newer documents interchangeable.

use crate::render::color::Rgba;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Fixed slot count of the raw and smoothed spectra.
pub const SPECTRUM_CAPACITY: usize = 512;

pub const MIN_BAR_COUNT: usize = 16;
pub const MAX_BAR_COUNT: usize = SPECTRUM_CAPACITY;
pub const MIN_SMOOTH_SPEED: f32 = 1.0e-3;
pub const MIN_SENSITIVITY: f32 = 0.01;
pub const MAX_SENSITIVITY: f32 = 100.0;
pub const MAX_BAR_HEIGHT_SCALE: f32 = 300.0;
pub const MAX_PARTICLE_COUNT: usize = 2_000;
pub const MAX_BLOOM_INTENSITY: u32 = 100;
pub const MAX_EDGE_GLOW_INTENSITY: f32 = 100.0;
pub const MAX_COLOR_SPEED: f32 = 10.0;
pub const MAX_BAR_SPACING: f32 = 32.0;
pub const MIN_CIRCLE_RADIUS: f32 = 10.0;
pub const MAX_CIRCLE_RADIUS: f32 = 2_000.0;

/// Visual style driving the per-bar transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum AnimationStyle {
    #[default]
    Bars,
    Pulse,
    Wave,
    Bounce,
    Glitch,
}

/// Raised when a preset document carries a style index outside the enum.
#[derive(Debug, Clone, Copy)]
pub struct UnknownStyle(pub u8);

impl fmt::Display for UnknownStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown animation style index {}", self.0)
    }
}

impl std::error::Error for UnknownStyle {}

impl TryFrom<u8> for AnimationStyle {
    type Error = UnknownStyle;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AnimationStyle::Bars),
            1 => Ok(AnimationStyle::Pulse),
            2 => Ok(AnimationStyle::Wave),
            3 => Ok(AnimationStyle::Bounce),
            4 => Ok(AnimationStyle::Glitch),
            other => Err(UnknownStyle(other)),
        }
    }
}

impl From<AnimationStyle> for u8 {
    fn from(style: AnimationStyle) -> Self {
        match style {
            AnimationStyle::Bars => 0,
            AnimationStyle::Pulse => 1,
            AnimationStyle::Wave => 2,
            AnimationStyle::Bounce => 3,
            AnimationStyle::Glitch => 4,
        }
    }
}

/// The single mutable configuration record consumed by every component.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizerSettings {
    /// Number of spectrum bars drawn; never exceeds [`SPECTRUM_CAPACITY`].
    pub bar_count: usize,
    /// Bar height as a percentage of the client height at full magnitude.
    pub bar_height_scale: f32,
    pub sensitivity: f32,
    /// Exponential smoothing rate in (0,1]; 1 tracks raw values instantly.
    pub smooth_speed: f32,
    pub animation_style: AnimationStyle,
    pub circle_mode: bool,
    pub circle_radius: f32,
    pub color_cycling: bool,
    pub color_speed: f32,
    pub bar_color: Rgba,
    pub rainbow_bars: bool,
    /// Horizontal gap between adjacent bars, in pixels.
    pub bar_spacing: f32,
    pub bloom_enabled: bool,
    pub bloom_intensity: u32,
    pub particles_enabled: bool,
    pub particle_count: usize,
    pub edge_glow_enabled: bool,
    pub edge_glow_intensity: f32,
    /// Target frames per second; values outside {30, 60, 120} run uncapped.
    pub fps_limit: u32,
}

impl Default for VisualizerSettings {
    fn default() -> Self {
        Self {
            bar_count: 256,
            bar_height_scale: 80.0,
            sensitivity: 1.5,
            smooth_speed: 0.15,
            animation_style: AnimationStyle::Bars,
            circle_mode: false,
            circle_radius: 200.0,
            color_cycling: false,
            color_speed: 1.0,
            bar_color: Rgba::CYAN,
            rainbow_bars: false,
            bar_spacing: 1.0,
            bloom_enabled: false,
            bloom_intensity: 10,
            particles_enabled: false,
            particle_count: 100,
            edge_glow_enabled: false,
            edge_glow_intensity: 10.0,
            fps_limit: 60,
        }
    }
}

impl VisualizerSettings {
    /// Clamp every field into its documented valid range. Non-finite floats
    /// fall back to defaults rather than poisoning downstream math.
    pub fn normalize(&mut self) {
        let defaults = Self::default();

        self.bar_count = self.bar_count.clamp(MIN_BAR_COUNT, MAX_BAR_COUNT);
        self.bar_height_scale =
            finite_or(self.bar_height_scale, defaults.bar_height_scale).clamp(1.0, MAX_BAR_HEIGHT_SCALE);
        self.sensitivity =
            finite_or(self.sensitivity, defaults.sensitivity).clamp(MIN_SENSITIVITY, MAX_SENSITIVITY);
        self.smooth_speed =
            finite_or(self.smooth_speed, defaults.smooth_speed).clamp(MIN_SMOOTH_SPEED, 1.0);
        self.circle_radius =
            finite_or(self.circle_radius, defaults.circle_radius).clamp(MIN_CIRCLE_RADIUS, MAX_CIRCLE_RADIUS);
        self.color_speed = finite_or(self.color_speed, defaults.color_speed).clamp(0.0, MAX_COLOR_SPEED);
        self.bar_spacing = finite_or(self.bar_spacing, defaults.bar_spacing).clamp(0.0, MAX_BAR_SPACING);
        self.bloom_intensity = self.bloom_intensity.min(MAX_BLOOM_INTENSITY);
        self.particle_count = self.particle_count.min(MAX_PARTICLE_COUNT);
        self.edge_glow_intensity = finite_or(self.edge_glow_intensity, defaults.edge_glow_intensity)
            .clamp(0.0, MAX_EDGE_GLOW_INTENSITY);
    }

    /// Returns a normalized copy of these settings.
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Render timer interval for the configured FPS cap.
    pub fn tick_interval(&self) -> Duration {
        let millis = match self.fps_limit {
            30 => 33,
            60 => 16,
            120 => 8,
            _ => 1,
        };
        Duration::from_millis(millis)
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

/// Serialized settings snapshot. Every field is optional so documents
/// written by older or newer schemas load without disturbing fields they
/// do not mention.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub bar_count: Option<usize>,
    pub bar_height_scale: Option<f32>,
    pub sensitivity: Option<f32>,
    pub smooth_speed: Option<f32>,
    pub animation_style: Option<AnimationStyle>,
    pub circle_mode: Option<bool>,
    pub circle_radius: Option<f32>,
    pub color_cycling: Option<bool>,
    pub color_speed: Option<f32>,
    pub bar_color: Option<Rgba>,
    pub rainbow_bars: Option<bool>,
    pub bar_spacing: Option<f32>,
    pub bloom_enabled: Option<bool>,
    pub bloom_intensity: Option<u32>,
    pub particles_enabled: Option<bool>,
    pub particle_count: Option<usize>,
    pub edge_glow_enabled: Option<bool>,
    pub edge_glow_intensity: Option<f32>,
    pub fps_limit: Option<u32>,
}

macro_rules! apply_fields {
    ($preset:expr, $settings:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $preset.$field {
                $settings.$field = value;
            }
        )+
    };
}

impl Preset {
    /// Capture every field of `settings`.
    pub fn from_settings(settings: &VisualizerSettings) -> Self {
        Self {
            bar_count: Some(settings.bar_count),
            bar_height_scale: Some(settings.bar_height_scale),
            sensitivity: Some(settings.sensitivity),
            smooth_speed: Some(settings.smooth_speed),
            animation_style: Some(settings.animation_style),
            circle_mode: Some(settings.circle_mode),
            circle_radius: Some(settings.circle_radius),
            color_cycling: Some(settings.color_cycling),
            color_speed: Some(settings.color_speed),
            bar_color: Some(settings.bar_color),
            rainbow_bars: Some(settings.rainbow_bars),
            bar_spacing: Some(settings.bar_spacing),
            bloom_enabled: Some(settings.bloom_enabled),
            bloom_intensity: Some(settings.bloom_intensity),
            particles_enabled: Some(settings.particles_enabled),
            particle_count: Some(settings.particle_count),
            edge_glow_enabled: Some(settings.edge_glow_enabled),
            edge_glow_intensity: Some(settings.edge_glow_intensity),
            fps_limit: Some(settings.fps_limit),
        }
    }

    /// Merge present fields over `settings`, then re-clamp. Absent fields
    /// leave the current values untouched.
    pub fn apply_to(&self, settings: &mut VisualizerSettings) {
        apply_fields!(
            self,
            settings,
            bar_count,
            bar_height_scale,
            sensitivity,
            smooth_speed,
            animation_style,
            circle_mode,
            circle_radius,
            color_cycling,
            color_speed,
            bar_color,
            rainbow_bars,
            bar_spacing,
            bloom_enabled,
            bloom_intensity,
            particles_enabled,
            particle_count,
            edge_glow_enabled,
            edge_glow_intensity,
            fps_limit,
        );
        settings.normalize();
    }

    /// Serialize to the flat UTF-8 preset document.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).context("failed to serialize preset")
    }

    /// Parse a preset document. Malformed input fails without touching any
    /// in-memory settings; merging only happens via [`Preset::apply_to`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("failed to parse preset document")
    }
}

/// Path-bound preset persistence with atomic replace-on-save.
#[derive(Debug, Clone)]
pub struct PresetStore {
    path: PathBuf,
}

impl PresetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Preset> {
        let bytes = fs::read(&self.path)
            .with_context(|| format!("failed to read preset {:?}", self.path))?;
        Preset::from_bytes(&bytes).inspect_err(|err| {
            warn!("[preset] rejected {:?}: {err:#}", self.path);
        })
    }

    pub fn save(&self, settings: &VisualizerSettings) -> Result<()> {
        let bytes = Preset::from_settings(settings).to_bytes()?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create preset directory {parent:?}"))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, &bytes)
            .with_context(|| format!("failed to write preset {tmp_path:?}"))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to replace preset {:?}", self.path))
    }
}
