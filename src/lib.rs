//! Library exports for the waveform visualizer, its CLI, tests and benchmarks.
/// Application directory resolution.
pub mod app_dirs;
/// Persisted visualizer settings.
pub mod config;
/// Decoding audio bytes into sample buffers.
pub mod decode;
/// Per-column min/max envelopes.
pub mod envelope;
/// Surface and chart layout.
pub mod geometry;
/// Live sample taps for playing audio.
pub mod live_tap;
/// Tracing subscriber setup.
pub mod logging;
/// Time and x-coordinate mapping.
pub mod mapper;
/// Static and live frame renderers.
pub mod render;
/// Decoded audio storage.
pub mod samples;
/// Display-tick render loop.
pub mod scheduler;
/// Pointer scrubbing.
pub mod scrubber;
/// Drawing surfaces.
pub mod surface;
/// Playback transport contract.
pub mod transport;
/// The visualizer component.
pub mod visualizer;

pub use render::VisualizationMode;
pub use samples::SampleBuffer;
pub use visualizer::WaveformVisualizer;
