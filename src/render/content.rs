use egui::{Color32, Pos2, Rect, pos2};

use crate::config::Palette;
use crate::envelope::Envelope;
use crate::geometry::ViewportGeometry;
use crate::surface::Surface;

/// One way of filling the chart area.
pub trait DrawContent {
    fn draw(&self, surface: &mut dyn Surface, geometry: &ViewportGeometry, palette: &Palette);
}

/// Filled min/max envelope, one column per chart pixel.
pub struct EnvelopeContent<'a> {
    pub envelope: &'a Envelope,
}

impl DrawContent for EnvelopeContent<'_> {
    fn draw(&self, surface: &mut dyn Surface, geometry: &ViewportGeometry, palette: &Palette) {
        let columns = self.envelope.columns();
        if columns.is_empty() {
            return;
        }
        let color = Palette::color(palette.envelope);
        let left = geometry.margins().left as f32;
        let column_x = |index: usize| left + index as f32 + 0.5;

        let upper = columns
            .iter()
            .enumerate()
            .map(|(index, (_, max))| pos2(column_x(index), geometry.amplitude_to_y(*max)))
            .collect::<Vec<Pos2>>();
        let lower = columns
            .iter()
            .enumerate()
            .map(|(index, (min, _))| pos2(column_x(index), geometry.amplitude_to_y(*min)))
            .collect::<Vec<Pos2>>();

        if columns.len() == 1 {
            surface.stroke_line(upper[0], lower[0], 1.0, color);
            return;
        }
        let outline = upper
            .iter()
            .chain(lower.iter().rev())
            .copied()
            .collect::<Vec<_>>();
        surface.fill_polygon(&outline, color);
        surface.stroke_polyline(&upper, 1.0, color);
        surface.stroke_polyline(&lower, 1.0, color);
    }
}

/// Oscilloscope trace of unsigned time-domain bytes centered on 128.
pub struct WaveformTrace<'a> {
    pub bytes: &'a [u8],
}

impl DrawContent for WaveformTrace<'_> {
    fn draw(&self, surface: &mut dyn Surface, geometry: &ViewportGeometry, palette: &Palette) {
        if self.bytes.is_empty() {
            return;
        }
        let left = geometry.margins().left as f32;
        let top = geometry.margins().top as f32;
        let width = geometry.chart_width() as f32;
        let half_height = geometry.chart_height() as f32 / 2.0;
        let count = self.bytes.len() as f32;
        let points = self
            .bytes
            .iter()
            .enumerate()
            .map(|(index, byte)| {
                pos2(
                    left + width * index as f32 / count,
                    top + (*byte as f32 / 128.0) * half_height,
                )
            })
            .collect::<Vec<_>>();
        surface.stroke_polyline(&points, 2.0, Palette::color(palette.live_waveform));
    }
}

/// Frequency bars colored by hue across the spectrum.
pub struct SpectrumBars<'a> {
    pub bins: &'a [u8],
    pub max_bars: usize,
}

impl SpectrumBars<'_> {
    /// Number of bars drawn: one per bin, capped at `max_bars`.
    pub fn bar_count(&self) -> usize {
        self.bins.len().min(self.max_bars.max(1))
    }

    /// Mean of the bins that fall into each bar.
    pub fn bar_levels(&self) -> Vec<f32> {
        let bars = self.bar_count();
        let len = self.bins.len();
        (0..bars)
            .map(|bar| {
                let start = bar * len / bars;
                let end = ((bar + 1) * len / bars).max(start + 1);
                let slice = &self.bins[start..end.min(len)];
                slice.iter().map(|value| *value as f32).sum::<f32>() / slice.len() as f32
            })
            .collect()
    }
}

impl DrawContent for SpectrumBars<'_> {
    fn draw(&self, surface: &mut dyn Surface, geometry: &ViewportGeometry, _palette: &Palette) {
        if self.bins.is_empty() {
            return;
        }
        let levels = self.bar_levels();
        let bars = levels.len();
        let left = geometry.margins().left as f32;
        let bottom = geometry.chart_bottom();
        let chart_height = geometry.chart_height() as f32;
        let bar_width = geometry.chart_width() as f32 / bars as f32;
        let gap = if bar_width > 2.0 { 1.0 } else { 0.0 };
        for (index, level) in levels.iter().enumerate() {
            let height = level / 255.0 * chart_height;
            if height <= 0.0 {
                continue;
            }
            let x = left + index as f32 * bar_width;
            let rect = Rect::from_min_max(
                pos2(x, bottom - height),
                pos2(x + bar_width - gap, bottom),
            );
            let hue = index as f32 / bars as f32 * 360.0;
            surface.fill_rect(rect, hsl_to_color(hue, 0.8, 0.5));
        }
    }
}

/// Convert HSL (hue in degrees, saturation and lightness in `[0, 1]`) to an opaque color.
pub(super) fn hsl_to_color(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue.rem_euclid(360.0) / 60.0;
    let second = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, second, 0.0),
        1 => (second, chroma, 0.0),
        2 => (0.0, chroma, second),
        3 => (0.0, second, chroma),
        4 => (second, 0.0, chroma),
        _ => (chroma, 0.0, second),
    };
    let offset = lightness - chroma / 2.0;
    let channel = |value: f32| ((value + offset) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color32::from_rgb(channel(r), channel(g), channel(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::EnvelopeBuilder;
    use crate::geometry::Margins;
    use crate::surface::RasterSurface;

    fn frame() -> (RasterSurface, ViewportGeometry) {
        let geometry = ViewportGeometry::compute(280, 170, 1.0, Margins::default()).unwrap();
        let mut surface = RasterSurface::new();
        surface.begin_frame(&geometry);
        (surface, geometry)
    }

    #[test]
    fn bars_are_capped_and_averaged() {
        let bins = (0..1024).map(|i| (i % 256) as u8).collect::<Vec<_>>();
        let bars = SpectrumBars {
            bins: &bins,
            max_bars: 150,
        };
        assert_eq!(bars.bar_count(), 150);
        assert_eq!(bars.bar_levels().len(), 150);

        let few = [10u8, 20, 30];
        let bars = SpectrumBars {
            bins: &few,
            max_bars: 150,
        };
        assert_eq!(bars.bar_levels(), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn bar_partition_takes_means() {
        let bins = [0u8, 100, 200, 200];
        let bars = SpectrumBars {
            bins: &bins,
            max_bars: 2,
        };
        assert_eq!(bars.bar_levels(), vec![50.0, 200.0]);
    }

    #[test]
    fn hue_wheel_primaries() {
        assert_eq!(hsl_to_color(0.0, 1.0, 0.5), Color32::from_rgb(255, 0, 0));
        assert_eq!(hsl_to_color(120.0, 1.0, 0.5), Color32::from_rgb(0, 255, 0));
        assert_eq!(hsl_to_color(240.0, 1.0, 0.5), Color32::from_rgb(0, 0, 255));
    }

    #[test]
    fn full_scale_envelope_fills_chart_column() {
        let (mut surface, geometry) = frame();
        let samples = (0..4_000)
            .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect::<Vec<f32>>();
        let envelope = EnvelopeBuilder::build(&samples, geometry.chart_width() as usize);
        let palette = Palette::default();
        EnvelopeContent {
            envelope: &envelope,
        }
        .draw(&mut surface, &geometry, &palette);
        let expected = Palette::color(palette.envelope);
        assert_eq!(surface.pixel_at(100.0, geometry.center_y()), Some(expected));
        assert_eq!(surface.pixel_at(100.0, 25.0), Some(expected));
        assert_eq!(surface.pixel_at(100.0, 115.0), Some(expected));
    }

    #[test]
    fn centered_trace_runs_through_middle() {
        let (mut surface, geometry) = frame();
        let bytes = vec![128u8; 64];
        let palette = Palette::default();
        WaveformTrace { bytes: &bytes }.draw(&mut surface, &geometry, &palette);
        let expected = Palette::color(palette.live_waveform);
        assert_eq!(surface.pixel_at(150.0, geometry.center_y()), Some(expected));
        assert_eq!(surface.pixel_at(150.0, 30.0), Some(Color32::TRANSPARENT));
    }

    #[test]
    fn loud_bin_draws_tall_bar() {
        let (mut surface, geometry) = frame();
        let bins = [255u8, 0];
        let palette = Palette::default();
        SpectrumBars {
            bins: &bins,
            max_bars: 150,
        }
        .draw(&mut surface, &geometry, &palette);
        assert_eq!(surface.pixel_at(70.0, 25.0), Some(hsl_to_color(0.0, 0.8, 0.5)));
        assert_eq!(surface.pixel_at(200.0, 100.0), Some(Color32::TRANSPARENT));
    }
}
