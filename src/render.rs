//! Frame rendering onto a [`Surface`](crate::surface::Surface).
//!
//! Static frames draw the precomputed envelope; live frames draw fresh
//! time- or frequency-domain bytes from a [`LiveTap`](crate::live_tap::LiveTap).
//! Both share the same chrome and playhead so switching between them never
//! shifts the layout.

mod chrome;
mod content;
mod live;
mod playhead;
mod static_view;

use crate::config::VisualizerSettings;
use crate::geometry::ViewportGeometry;
use crate::mapper::CoordinateMapper;
use crate::transport::SharedTransport;

pub use content::{DrawContent, EnvelopeContent, SpectrumBars, WaveformTrace};
pub use live::LiveRenderer;
pub use static_view::StaticRenderer;

/// What live frames display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VisualizationMode {
    /// Oscilloscope trace of the most recent samples.
    #[default]
    Waveform,
    /// Frequency bars.
    Spectrum,
}

/// Which path produced a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    Static,
    Live(VisualizationMode),
    /// A live frame was due but no tap was available.
    StaticFallback,
}

/// Summary of one drawn frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub kind: FrameKind,
    /// Transport time read while drawing.
    pub playhead_time: f64,
    /// X coordinate the playhead was drawn at.
    pub playhead_x: f32,
}

/// Everything a renderer reads besides its content.
pub struct Scene<'a> {
    pub geometry: &'a ViewportGeometry,
    pub mapper: CoordinateMapper,
    pub settings: &'a VisualizerSettings,
    pub transport: &'a SharedTransport,
}

impl Scene<'_> {
    /// Current transport time and its x coordinate, read now.
    fn playhead(&self) -> (f64, f32) {
        let time = self.transport.borrow().current_time();
        (time, self.mapper.time_to_x(time))
    }
}

/// Amplitude label text, one decimal place.
pub fn format_amplitude(value: f32) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value:.1}")
}

/// Time label text as `m:ss`.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() {
        seconds.max(0.0).floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
