use super::chrome::draw_chrome;
use super::content::{DrawContent, SpectrumBars, WaveformTrace};
use super::playhead::draw_playhead;
use super::{FrameKind, FrameReport, Scene, VisualizationMode};
use crate::config::Palette;
use crate::live_tap::LiveTap;
use crate::surface::Surface;

/// Draws frames from live tap data.
///
/// Keeps its byte buffers between frames so steady-state rendering does not
/// allocate.
#[derive(Debug, Default)]
pub struct LiveRenderer {
    time_domain: Vec<u8>,
    frequency: Vec<u8>,
}

impl LiveRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull fresh data for `mode` from `tap` and draw one frame.
    pub fn draw(
        &mut self,
        surface: &mut dyn Surface,
        scene: &Scene<'_>,
        mode: VisualizationMode,
        tap: &mut dyn LiveTap,
    ) -> FrameReport {
        let palette = &scene.settings.palette;
        surface.begin_frame(scene.geometry);
        draw_chrome(surface, scene);
        match mode {
            VisualizationMode::Waveform => {
                tap.read_time_domain(&mut self.time_domain);
                WaveformTrace {
                    bytes: &self.time_domain,
                }
                .draw(surface, scene.geometry, palette);
            }
            VisualizationMode::Spectrum => {
                tap.read_frequency_domain(&mut self.frequency);
                SpectrumBars {
                    bins: &self.frequency,
                    max_bars: scene.settings.spectrum.max_bars,
                }
                .draw(surface, scene.geometry, palette);
            }
        }
        let (playhead_time, playhead_x) = scene.playhead();
        draw_playhead(
            surface,
            scene.geometry,
            playhead_x,
            Palette::color(palette.playhead),
        );
        surface.end_frame();
        FrameReport {
            kind: FrameKind::Live(mode),
            playhead_time,
            playhead_x,
        }
    }

    /// Bytes read by the most recent waveform frame.
    pub fn time_domain(&self) -> &[u8] {
        &self.time_domain
    }

    /// Bytes read by the most recent spectrum frame.
    pub fn frequency(&self) -> &[u8] {
        &self.frequency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VisualizerSettings;
    use crate::geometry::{Margins, ViewportGeometry};
    use crate::mapper::CoordinateMapper;
    use crate::surface::RasterSurface;
    use crate::transport::{ClockTransport, SharedTransport};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RampTap;

    impl LiveTap for RampTap {
        fn time_domain_len(&self) -> usize {
            32
        }
        fn frequency_bin_count(&self) -> usize {
            16
        }
        fn read_time_domain(&mut self, out: &mut Vec<u8>) {
            out.clear();
            out.extend((0..32).map(|i| (i * 8) as u8));
        }
        fn read_frequency_domain(&mut self, out: &mut Vec<u8>) {
            out.clear();
            out.extend(std::iter::repeat_n(200, 16));
        }
    }

    fn render(mode: VisualizationMode) -> (LiveRenderer, FrameReport) {
        let settings = VisualizerSettings::default();
        let geometry = ViewportGeometry::compute(400, 200, 1.0, Margins::default()).unwrap();
        let transport: SharedTransport = Rc::new(RefCell::new(ClockTransport::new(10.0)));
        let scene = Scene {
            geometry: &geometry,
            mapper: CoordinateMapper::new(&geometry, 10.0).unwrap(),
            settings: &settings,
            transport: &transport,
        };
        let mut surface = RasterSurface::new();
        let mut renderer = LiveRenderer::new();
        let report = renderer.draw(&mut surface, &scene, mode, &mut RampTap);
        (renderer, report)
    }

    #[test]
    fn waveform_mode_reads_time_domain_only() {
        let (renderer, report) = render(VisualizationMode::Waveform);
        assert_eq!(report.kind, FrameKind::Live(VisualizationMode::Waveform));
        assert_eq!(renderer.time_domain().len(), 32);
        assert!(renderer.frequency().is_empty());
    }

    #[test]
    fn spectrum_mode_reads_frequency_only() {
        let (renderer, report) = render(VisualizationMode::Spectrum);
        assert_eq!(report.kind, FrameKind::Live(VisualizationMode::Spectrum));
        assert_eq!(renderer.frequency().len(), 16);
        assert!(renderer.time_domain().is_empty());
        assert_eq!(report.playhead_x, 60.0);
    }
}
