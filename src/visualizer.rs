//! The waveform visualizer component.
//!
//! Owns geometry, envelope, render loop and scrub state for one drawable
//! surface. The host forwards load, resize, play/pause, pointer, transport
//! and display-tick events; every method is synchronous and never blocks.

use std::sync::Arc;

use crate::config::VisualizerSettings;
use crate::decode::{DecodeError, DecodeService};
use crate::envelope::{Envelope, EnvelopeBuilder};
use crate::geometry::{Margins, ViewportGeometry};
use crate::live_tap::{LiveTapSlot, SampleTapSource, TapSource, TapState};
use crate::mapper::CoordinateMapper;
use crate::render::{FrameReport, LiveRenderer, Scene, StaticRenderer, VisualizationMode};
use crate::samples::SampleBuffer;
use crate::scheduler::{FrameClock, FrameToken, RenderScheduler, SchedulerState, TickOutcome};
use crate::scrubber::{ScrubState, ScrubberController};
use crate::surface::Surface;
use crate::transport::{SharedTransport, TransportEvent};

/// Last size reported by the host, kept so geometry can be rebuilt when
/// margins change.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SurfaceSize {
    width: u32,
    height: u32,
    device_pixel_ratio: f32,
}

/// Waveform/spectrum visualizer bound to one surface and one transport.
pub struct WaveformVisualizer<S: Surface> {
    settings: VisualizerSettings,
    surface: S,
    transport: SharedTransport,
    clock: Box<dyn FrameClock>,
    tap_source: Box<dyn TapSource>,
    /// False once the host installs its own tap provider.
    builtin_tap_source: bool,
    tap: LiveTapSlot,
    samples: Option<Arc<SampleBuffer>>,
    size: Option<SurfaceSize>,
    geometry: Option<ViewportGeometry>,
    envelope: Option<Envelope>,
    scheduler: RenderScheduler,
    scrubber: ScrubberController,
    mode: VisualizationMode,
    live: LiveRenderer,
    last_frame: Option<FrameReport>,
}

impl<S: Surface> WaveformVisualizer<S> {
    /// Create a visualizer using the software sample tap for live frames.
    pub fn new(
        settings: VisualizerSettings,
        surface: S,
        transport: SharedTransport,
        clock: Box<dyn FrameClock>,
    ) -> Self {
        let settings = settings.normalized();
        let tap_source = Box::new(SampleTapSource::new(settings.live_tap));
        let tap = LiveTapSlot::new(settings.live_tap.transient_retry_limit);
        Self {
            settings,
            surface,
            transport,
            clock,
            tap_source,
            builtin_tap_source: true,
            tap,
            samples: None,
            size: None,
            geometry: None,
            envelope: None,
            scheduler: RenderScheduler::new(),
            scrubber: ScrubberController::new(),
            mode: VisualizationMode::default(),
            live: LiveRenderer::new(),
            last_frame: None,
        }
    }

    /// Replace the live tap provider.
    pub fn with_tap_source(mut self, tap_source: Box<dyn TapSource>) -> Self {
        self.tap.reset();
        self.tap_source = tap_source;
        self.builtin_tap_source = false;
        self
    }

    /// Show newly decoded audio, replacing whatever was loaded before.
    pub fn on_load(&mut self, samples: SampleBuffer) {
        self.release_audio();
        tracing::info!(
            "Loaded audio: {} channel(s), {} Hz, {:.2}s",
            samples.channel_count(),
            samples.sample_rate(),
            samples.duration()
        );
        self.samples = Some(Arc::new(samples));
        if let Some(size) = self.size {
            self.geometry = self.compute_geometry(size);
        }
        self.rebuild_envelope();
        self.draw_static();
    }

    /// Decode `bytes` and load the result; on failure the previous audio is cleared.
    pub fn load_bytes(
        &mut self,
        bytes: &[u8],
        decoder: &dyn DecodeService,
    ) -> Result<(), DecodeError> {
        match decoder.decode(bytes) {
            Ok(samples) => {
                self.on_load(samples);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Failed to decode audio: {err}");
                self.clear();
                Err(err)
            }
        }
    }

    /// The surface changed size. Invalid sizes suspend drawing until a valid one arrives.
    pub fn on_resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) {
        let size = SurfaceSize {
            width,
            height,
            device_pixel_ratio,
        };
        self.size = Some(size);
        self.geometry = self.compute_geometry(size);
        if self.geometry.is_none() {
            tracing::debug!("Skipping redraw for unusable surface {width}x{height} @{device_pixel_ratio}");
            self.envelope = None;
            return;
        }
        self.rebuild_envelope();
        if !self.scheduler.is_running() {
            self.draw_static();
        }
    }

    /// Toggle playback. Starting attaches the live tap on first use and starts the loop.
    pub fn on_play_toggle(&mut self) {
        let playing = self.transport.borrow().is_playing();
        if playing {
            self.transport.borrow_mut().pause();
            self.scheduler.stop(self.clock.as_mut());
            self.draw_static();
            return;
        }
        let Some(samples) = self.samples.clone() else {
            tracing::debug!("Play requested with no audio loaded");
            return;
        };
        self.transport.borrow_mut().play();
        self.tap
            .ensure_attached(self.tap_source.as_mut(), &samples, &self.transport);
        self.scheduler.start(self.clock.as_mut());
    }

    /// Seek to the time under `x`; positions outside the chart are ignored.
    pub fn on_seek(&mut self, x: f64) {
        match self.mapper().and_then(|mapper| mapper.x_to_time(x)) {
            Some(seconds) => self.seek_to(seconds),
            None => tracing::debug!("Ignoring seek outside chart at x={x}"),
        }
    }

    pub fn on_pointer_down(&mut self, x: f64) {
        let mapper = self.mapper();
        if let Some(seconds) = self.scrubber.press(x, mapper.as_ref()) {
            self.seek_to(seconds);
        }
    }

    pub fn on_pointer_move(&mut self, x: f64) {
        let mapper = self.mapper();
        if let Some(seconds) = self.scrubber.drag(x, mapper.as_ref()) {
            self.seek_to(seconds);
        }
    }

    pub fn on_pointer_up(&mut self) {
        self.scrubber.release();
    }

    pub fn on_pointer_leave(&mut self) {
        self.scrubber.leave();
    }

    /// Select what live frames show. Static frames do not depend on the mode.
    pub fn on_mode_change(&mut self, mode: VisualizationMode) {
        if self.mode != mode {
            tracing::debug!("Visualization mode changed to {mode:?}");
        }
        self.mode = mode;
    }

    /// React to a transport notification.
    pub fn on_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::LoadedMetadata => self.draw_static(),
            TransportEvent::TimeUpdate => {
                if !self.scheduler.is_running() {
                    self.draw_static();
                }
            }
            TransportEvent::Ended => {
                tracing::debug!("Playback ended");
                self.scheduler.stop(self.clock.as_mut());
                self.draw_static();
            }
        }
    }

    /// Handle a display tick delivered by the frame clock.
    pub fn on_frame(&mut self, token: FrameToken) -> Option<FrameReport> {
        let playing = self.transport.borrow().is_playing();
        match self.scheduler.on_tick(token, playing, self.clock.as_mut()) {
            TickOutcome::Render => self.draw_live(),
            TickOutcome::Stopped | TickOutcome::Ignored => None,
        }
    }

    /// Stop rendering and release everything tied to the loaded audio.
    pub fn on_teardown(&mut self) {
        self.release_audio();
        tracing::debug!("Visualizer torn down");
    }

    /// Forget the loaded audio; nothing is drawn until the next load.
    pub fn clear(&mut self) {
        self.release_audio();
        tracing::debug!("Visualizer cleared");
    }

    /// Apply new settings, rebuilding layout and redrawing when idle.
    ///
    /// Changed analyser settings replace the attached tap; while playing the
    /// replacement attaches immediately.
    pub fn apply_settings(&mut self, settings: VisualizerSettings) {
        let settings = settings.normalized();
        let live_tap_changed = settings.live_tap != self.settings.live_tap;
        self.settings = settings;
        if live_tap_changed {
            self.rebuild_tap();
        }
        if let Some(size) = self.size {
            self.geometry = self.compute_geometry(size);
        }
        self.rebuild_envelope();
        if !self.scheduler.is_running() {
            self.draw_static();
        }
    }

    pub fn settings(&self) -> &VisualizerSettings {
        &self.settings
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn transport(&self) -> &SharedTransport {
        &self.transport
    }

    pub fn samples(&self) -> Option<&Arc<SampleBuffer>> {
        self.samples.as_ref()
    }

    pub fn geometry(&self) -> Option<&ViewportGeometry> {
        self.geometry.as_ref()
    }

    pub fn envelope(&self) -> Option<&Envelope> {
        self.envelope.as_ref()
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn scrub_state(&self) -> ScrubState {
        self.scrubber.state()
    }

    pub fn tap_state(&self) -> TapState {
        self.tap.state()
    }

    pub fn mode(&self) -> VisualizationMode {
        self.mode
    }

    /// Report for the most recently drawn frame.
    pub fn last_frame(&self) -> Option<FrameReport> {
        self.last_frame
    }

    /// Timeline length: the transport's once known, otherwise the buffer's.
    pub fn duration(&self) -> f64 {
        let transport_duration = self.transport.borrow().duration();
        if transport_duration.is_finite() && transport_duration > 0.0 {
            return transport_duration;
        }
        self.samples
            .as_ref()
            .map(|samples| samples.duration())
            .unwrap_or(0.0)
    }

    /// Mapper for the current geometry and duration.
    pub fn mapper(&self) -> Option<CoordinateMapper> {
        CoordinateMapper::new(self.geometry.as_ref()?, self.duration())
    }

    fn compute_geometry(&self, size: SurfaceSize) -> Option<ViewportGeometry> {
        ViewportGeometry::compute(
            size.width,
            size.height,
            size.device_pixel_ratio,
            Margins::from(&self.settings.layout),
        )
    }

    fn rebuild_tap(&mut self) {
        let live_tap = self.settings.live_tap;
        tracing::debug!("Live tap settings changed; replacing tap");
        self.tap.reset();
        self.tap = LiveTapSlot::new(live_tap.transient_retry_limit);
        if self.builtin_tap_source {
            self.tap_source = Box::new(SampleTapSource::new(live_tap));
        }
        if !self.scheduler.is_running() {
            return;
        }
        if let Some(samples) = self.samples.clone() {
            self.tap
                .ensure_attached(self.tap_source.as_mut(), &samples, &self.transport);
        }
    }

    fn rebuild_envelope(&mut self) {
        self.envelope = match (self.samples.as_deref(), self.geometry.as_ref()) {
            (Some(samples), Some(geometry)) => {
                let width = geometry.chart_width() as usize;
                tracing::debug!("Building envelope for {width} columns");
                Some(EnvelopeBuilder::build_for(samples, width))
            }
            _ => None,
        };
    }

    fn seek_to(&mut self, seconds: f64) {
        self.transport.borrow_mut().seek(seconds);
        if !self.scheduler.is_running() {
            self.draw_static();
        }
    }

    fn draw_static(&mut self) {
        let duration = self.duration();
        let (Some(geometry), Some(envelope)) = (self.geometry.as_ref(), self.envelope.as_ref())
        else {
            return;
        };
        let Some(mapper) = CoordinateMapper::new(geometry, duration) else {
            return;
        };
        let scene = Scene {
            geometry,
            mapper,
            settings: &self.settings,
            transport: &self.transport,
        };
        self.last_frame = Some(StaticRenderer.draw(&mut self.surface, &scene, envelope));
    }

    fn draw_live(&mut self) -> Option<FrameReport> {
        let duration = self.duration();
        let (Some(geometry), Some(envelope)) = (self.geometry.as_ref(), self.envelope.as_ref())
        else {
            return None;
        };
        let mapper = CoordinateMapper::new(geometry, duration)?;
        let scene = Scene {
            geometry,
            mapper,
            settings: &self.settings,
            transport: &self.transport,
        };
        let report = match self.tap.tap_mut() {
            Some(tap) => self.live.draw(&mut self.surface, &scene, self.mode, tap),
            None => StaticRenderer.draw_fallback(&mut self.surface, &scene, envelope),
        };
        self.last_frame = Some(report);
        Some(report)
    }

    /// Stop the loop, detach the tap and drop the buffer. Idempotent.
    fn release_audio(&mut self) {
        self.scheduler.stop(self.clock.as_mut());
        self.tap.reset();
        self.scrubber.release();
        self.samples = None;
        self.envelope = None;
    }
}
