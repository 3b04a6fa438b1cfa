//! Persisted visualizer preferences.
//!
//! Settings live in a TOML file inside the application directory. Every key is
//! optional; missing keys fall back to defaults and out-of-range values are
//! clamped by [`VisualizerSettings::normalized`].

mod io;

use std::path::PathBuf;

use egui::Color32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use io::{config_path, load_from, load_or_default, save, save_to_path};

/// File name of the settings file under the application directory.
pub const CONFIG_FILE_NAME: &str = "wavescope.toml";

const MIN_FFT_SIZE: usize = 32;
const MAX_FFT_SIZE: usize = 32_768;
const MAX_MARGIN: u32 = 4_096;
const MAX_TIME_TICKS: u32 = 64;

/// Errors that may occur while loading or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No usable config directory found.
    #[error("No suitable config directory found")]
    NoConfigDir,
    /// Failed to create the config directory.
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        /// Directory path that failed to create.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to read the settings file.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to write the settings file.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Path that failed to write.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to parse TOML settings.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        /// TOML file path.
        path: PathBuf,
        /// TOML parse error.
        source: toml::de::Error,
    },
    /// Failed to serialize settings to TOML.
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        /// TOML file path.
        path: PathBuf,
        /// TOML serialization error.
        source: toml::ser::Error,
    },
}

/// Root of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerSettings {
    /// Axis margins around the chart area.
    pub layout: LayoutSettings,
    /// Gridline and label placement.
    pub axes: AxesSettings,
    /// Spectrum bar view.
    pub spectrum: SpectrumSettings,
    /// Live analyser parameters.
    pub live_tap: LiveTapSettings,
    /// Colors used by every renderer.
    pub palette: Palette,
}

impl VisualizerSettings {
    /// Clamp out-of-range values so renderers can trust the settings.
    pub fn normalized(mut self) -> Self {
        for margin in [
            &mut self.layout.margin_left,
            &mut self.layout.margin_right,
            &mut self.layout.margin_top,
            &mut self.layout.margin_bottom,
        ] {
            *margin = (*margin).min(MAX_MARGIN);
        }
        self.axes.max_time_ticks = self.axes.max_time_ticks.clamp(1, MAX_TIME_TICKS);
        if !(self.axes.seconds_per_tick.is_finite() && self.axes.seconds_per_tick > 0.0) {
            self.axes.seconds_per_tick = default_seconds_per_tick();
        }
        self.axes
            .amplitude_labels
            .retain(|value| value.is_finite() && (-1.0..=1.0).contains(value));
        self.spectrum.max_bars = self.spectrum.max_bars.max(1);
        self.live_tap.fft_size = self
            .live_tap
            .fft_size
            .clamp(MIN_FFT_SIZE, MAX_FFT_SIZE)
            .next_power_of_two()
            .min(MAX_FFT_SIZE);
        if !self.live_tap.smoothing.is_finite() {
            self.live_tap.smoothing = default_smoothing();
        }
        self.live_tap.smoothing = self.live_tap.smoothing.clamp(0.0, 1.0);
        if !(self.live_tap.max_decibels > self.live_tap.min_decibels) {
            self.live_tap.min_decibels = default_min_decibels();
            self.live_tap.max_decibels = default_max_decibels();
        }
        self
    }
}

/// Margins reserved for axis labels, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub margin_left: u32,
    pub margin_right: u32,
    pub margin_top: u32,
    pub margin_bottom: u32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            margin_left: 60,
            margin_right: 20,
            margin_top: 20,
            margin_bottom: 50,
        }
    }
}

/// Gridline and label configuration.
///
/// Config keys: `amplitude_labels`, `max_time_ticks`, `seconds_per_tick`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesSettings {
    /// Amplitudes that receive a horizontal gridline and label.
    pub amplitude_labels: Vec<f32>,
    /// Upper bound on vertical time gridlines.
    pub max_time_ticks: u32,
    /// Target spacing between time gridlines before the cap applies.
    pub seconds_per_tick: f64,
}

impl Default for AxesSettings {
    fn default() -> Self {
        Self {
            amplitude_labels: vec![1.0, 0.5, 0.0, -0.5, -1.0],
            max_time_ticks: 12,
            seconds_per_tick: default_seconds_per_tick(),
        }
    }
}

impl AxesSettings {
    /// Number of time intervals for a track: `min(max_time_ticks, ceil(duration / seconds_per_tick))`.
    pub fn time_tick_count(&self, duration: f64) -> u32 {
        if !(duration.is_finite() && duration > 0.0) {
            return 0;
        }
        let wanted = (duration / self.seconds_per_tick).ceil().max(1.0);
        (wanted.min(self.max_time_ticks as f64)) as u32
    }
}

/// Spectrum view configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumSettings {
    /// Upper bound on drawn bars.
    pub max_bars: usize,
}

impl Default for SpectrumSettings {
    fn default() -> Self {
        Self { max_bars: 150 }
    }
}

/// Analyser parameters for the software live tap and its attach policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveTapSettings {
    /// Time-domain window length; a power of two.
    pub fft_size: usize,
    /// Exponential smoothing applied to successive spectra (0..=1).
    pub smoothing: f32,
    /// Magnitude mapped to byte 0.
    pub min_decibels: f32,
    /// Magnitude mapped to byte 255.
    pub max_decibels: f32,
    /// Extra attach attempts allowed after a transient failure; 0 downgrades immediately.
    pub transient_retry_limit: u32,
}

impl Default for LiveTapSettings {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            smoothing: default_smoothing(),
            min_decibels: default_min_decibels(),
            max_decibels: default_max_decibels(),
            transient_retry_limit: 0,
        }
    }
}

/// RGB colors used by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: [u8; 3],
    pub grid: [u8; 3],
    pub axis: [u8; 3],
    pub label: [u8; 3],
    pub envelope: [u8; 3],
    pub live_waveform: [u8; 3],
    pub playhead: [u8; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: [18, 16, 14],
            grid: [52, 48, 44],
            axis: [140, 134, 126],
            label: [200, 194, 186],
            envelope: [96, 165, 250],
            live_waveform: [52, 211, 153],
            playhead: [239, 68, 68],
        }
    }
}

impl Palette {
    pub(crate) fn color(rgb: [u8; 3]) -> Color32 {
        Color32::from_rgb(rgb[0], rgb[1], rgb[2])
    }
}

fn default_seconds_per_tick() -> f64 {
    5.0
}

fn default_smoothing() -> f32 {
    0.8
}

fn default_min_decibels() -> f32 {
    -100.0
}

fn default_max_decibels() -> f32 {
    -30.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_ticks_follow_duration_and_cap() {
        let axes = AxesSettings::default();
        assert_eq!(axes.time_tick_count(12.0), 3);
        assert_eq!(axes.time_tick_count(5.0), 1);
        assert_eq!(axes.time_tick_count(0.2), 1);
        assert_eq!(axes.time_tick_count(600.0), 12);
        assert_eq!(axes.time_tick_count(0.0), 0);
    }

    #[test]
    fn normalized_clamps_invalid_values() {
        let mut settings = VisualizerSettings::default();
        settings.live_tap.fft_size = 1000;
        settings.live_tap.smoothing = 3.0;
        settings.live_tap.min_decibels = -10.0;
        settings.live_tap.max_decibels = -20.0;
        settings.spectrum.max_bars = 0;
        settings.axes.max_time_ticks = 0;
        settings.axes.seconds_per_tick = -1.0;
        settings.axes.amplitude_labels = vec![2.0, 0.5, f32::NAN];

        let settings = settings.normalized();

        assert_eq!(settings.live_tap.fft_size, 1024);
        assert_eq!(settings.live_tap.smoothing, 1.0);
        assert_eq!(settings.live_tap.min_decibels, -100.0);
        assert_eq!(settings.live_tap.max_decibels, -30.0);
        assert_eq!(settings.spectrum.max_bars, 1);
        assert_eq!(settings.axes.max_time_ticks, 1);
        assert_eq!(settings.axes.seconds_per_tick, 5.0);
        assert_eq!(settings.axes.amplitude_labels, vec![0.5]);
    }

    #[test]
    fn normalized_bounds_margins_and_tick_count() {
        let mut settings = VisualizerSettings::default();
        settings.layout.margin_left = u32::MAX;
        settings.layout.margin_bottom = 5_000;
        settings.axes.max_time_ticks = u32::MAX;
        settings.axes.seconds_per_tick = 1e-9;

        let settings = settings.normalized();

        assert_eq!(settings.layout.margin_left, 4_096);
        assert_eq!(settings.layout.margin_bottom, 4_096);
        assert_eq!(settings.layout.margin_top, 20);
        assert_eq!(settings.axes.max_time_ticks, 64);
        assert_eq!(settings.axes.time_tick_count(600.0), 64);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let settings: VisualizerSettings = toml::from_str(
            "[layout]\nmargin_left = 80\n\n[live_tap]\ntransient_retry_limit = 2\n",
        )
        .unwrap();
        assert_eq!(settings.layout.margin_left, 80);
        assert_eq!(settings.layout.margin_bottom, 50);
        assert_eq!(settings.live_tap.transient_retry_limit, 2);
        assert_eq!(settings.live_tap.fft_size, 2048);
        assert_eq!(settings.palette, Palette::default());
    }
}
