//! Chart layout for a drawable surface.
//!
//! All layout values are CSS pixels. Renderers draw in CSS pixels too; the
//! surface applies the device pixel ratio once when a frame begins, so this
//! module never mixes unit systems.

use egui::{Pos2, Rect, pos2};

use crate::config::LayoutSettings;

/// Largest physical pixel buffer a surface may request.
pub const MAX_PHYSICAL_PIXELS: usize = 1 << 26;

/// Space reserved around the chart for axis labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Margins {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Default for Margins {
    fn default() -> Self {
        Self::from(&LayoutSettings::default())
    }
}

impl From<&LayoutSettings> for Margins {
    fn from(layout: &LayoutSettings) -> Self {
        Self {
            left: layout.margin_left,
            right: layout.margin_right,
            top: layout.margin_top,
            bottom: layout.margin_bottom,
        }
    }
}

/// Layout of one drawable surface at one size.
///
/// Only constructed through [`ViewportGeometry::compute`], which guarantees a
/// chart area at least one pixel wide and tall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportGeometry {
    surface_width: u32,
    surface_height: u32,
    margins: Margins,
    device_pixel_ratio: f32,
    chart_width: u32,
    chart_height: u32,
    physical_size: [usize; 2],
}

impl ViewportGeometry {
    /// Lay out a surface of the given CSS size.
    ///
    /// Returns `None` when the margins leave no chart area, the pixel ratio
    /// is unusable or the physical buffer would exceed
    /// [`MAX_PHYSICAL_PIXELS`]; callers skip rebuilding and drawing until a
    /// valid size arrives.
    pub fn compute(
        surface_width: u32,
        surface_height: u32,
        device_pixel_ratio: f32,
        margins: Margins,
    ) -> Option<Self> {
        if !(device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0) {
            return None;
        }
        let chart_width = surface_width.checked_sub(margins.left.checked_add(margins.right)?)?;
        let chart_height = surface_height.checked_sub(margins.top.checked_add(margins.bottom)?)?;
        if chart_width == 0 || chart_height == 0 {
            return None;
        }
        let physical_size = [
            physical_extent(surface_width, device_pixel_ratio)?,
            physical_extent(surface_height, device_pixel_ratio)?,
        ];
        if physical_size[0].checked_mul(physical_size[1])? > MAX_PHYSICAL_PIXELS {
            return None;
        }
        Some(Self {
            surface_width,
            surface_height,
            margins,
            device_pixel_ratio,
            chart_width,
            chart_height,
            physical_size,
        })
    }

    pub fn surface_width(&self) -> u32 {
        self.surface_width
    }

    pub fn surface_height(&self) -> u32 {
        self.surface_height
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    /// Chart width in CSS pixels; also the envelope column count.
    pub fn chart_width(&self) -> u32 {
        self.chart_width
    }

    pub fn chart_height(&self) -> u32 {
        self.chart_height
    }

    /// Physical pixel buffer size: `css * dpr`, rounded, at least 1×1.
    pub fn physical_size(&self) -> [usize; 2] {
        self.physical_size
    }

    /// Whole surface in CSS pixels.
    pub fn surface_rect(&self) -> Rect {
        Rect::from_min_size(
            Pos2::ZERO,
            egui::vec2(self.surface_width as f32, self.surface_height as f32),
        )
    }

    /// Chart area inside the margins.
    pub fn chart_rect(&self) -> Rect {
        Rect::from_min_size(
            pos2(self.margins.left as f32, self.margins.top as f32),
            egui::vec2(self.chart_width as f32, self.chart_height as f32),
        )
    }

    /// Vertical center of the chart, where amplitude zero is drawn.
    pub fn center_y(&self) -> f32 {
        self.margins.top as f32 + self.chart_height as f32 / 2.0
    }

    /// Y coordinate for a normalized amplitude in `[-1, 1]`.
    pub fn amplitude_to_y(&self, amplitude: f32) -> f32 {
        self.center_y() - amplitude.clamp(-1.0, 1.0) * self.chart_height as f32 / 2.0
    }

    /// Right edge of the chart: `surface_width - margin_right`.
    pub fn chart_right(&self) -> f32 {
        (self.margins.left + self.chart_width) as f32
    }

    /// Bottom edge of the chart.
    pub fn chart_bottom(&self) -> f32 {
        (self.margins.top + self.chart_height) as f32
    }
}

fn physical_extent(css: u32, device_pixel_ratio: f32) -> Option<usize> {
    let scaled = (f64::from(css) * f64::from(device_pixel_ratio)).round();
    if scaled > MAX_PHYSICAL_PIXELS as f64 {
        return None;
    }
    Some((scaled as usize).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_area_excludes_margins() {
        let geometry = ViewportGeometry::compute(800, 300, 2.0, Margins::default()).unwrap();
        assert_eq!(geometry.chart_width(), 720);
        assert_eq!(geometry.chart_height(), 230);
        assert_eq!(geometry.physical_size(), [1600, 600]);
        assert_eq!(geometry.chart_right(), 780.0);
        assert_eq!(geometry.chart_bottom(), 250.0);
        assert_eq!(geometry.center_y(), 135.0);
    }

    #[test]
    fn rejects_surfaces_without_chart_area() {
        assert!(ViewportGeometry::compute(80, 300, 1.0, Margins::default()).is_none());
        assert!(ViewportGeometry::compute(50, 300, 1.0, Margins::default()).is_none());
        assert!(ViewportGeometry::compute(800, 70, 1.0, Margins::default()).is_none());
        assert!(ViewportGeometry::compute(800, 300, 0.0, Margins::default()).is_none());
        assert!(ViewportGeometry::compute(800, 300, f32::NAN, Margins::default()).is_none());
    }

    #[test]
    fn overflowing_margins_leave_no_chart() {
        let margins = Margins {
            left: u32::MAX,
            ..Margins::default()
        };
        assert!(ViewportGeometry::compute(1080, 300, 1.0, margins).is_none());
        let margins = Margins {
            top: u32::MAX - 10,
            bottom: 20,
            ..Margins::default()
        };
        assert!(ViewportGeometry::compute(1080, 300, 1.0, margins).is_none());
    }

    #[test]
    fn oversized_physical_buffer_is_rejected() {
        assert!(ViewportGeometry::compute(1080, 300, 1e30, Margins::default()).is_none());
        assert!(ViewportGeometry::compute(u32::MAX, u32::MAX, 1.0, Margins::default()).is_none());
        let geometry = ViewportGeometry::compute(4096, 4096, 2.0, Margins::default()).unwrap();
        assert_eq!(geometry.physical_size(), [8192, 8192]);
    }

    #[test]
    fn single_column_chart_is_valid() {
        let geometry = ViewportGeometry::compute(81, 71, 1.0, Margins::default()).unwrap();
        assert_eq!(geometry.chart_width(), 1);
        assert_eq!(geometry.chart_height(), 1);
    }

    #[test]
    fn fractional_ratio_rounds_physical_size() {
        let geometry = ViewportGeometry::compute(101, 101, 1.5, Margins::default()).unwrap();
        assert_eq!(geometry.physical_size(), [152, 152]);
    }

    #[test]
    fn amplitude_maps_to_chart_edges() {
        let geometry = ViewportGeometry::compute(800, 300, 1.0, Margins::default()).unwrap();
        assert_eq!(geometry.amplitude_to_y(1.0), 20.0);
        assert_eq!(geometry.amplitude_to_y(-1.0), 250.0);
        assert_eq!(geometry.amplitude_to_y(0.0), 135.0);
    }
}
