//! Bidirectional mapping between chart x coordinates and playback time.

use crate::geometry::ViewportGeometry;

/// Maps between CSS-pixel x positions and seconds for one geometry and duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateMapper {
    left: f64,
    width: f64,
    right: f64,
    duration: f64,
}

impl CoordinateMapper {
    /// Build a mapper; `None` when the duration is not positive.
    pub fn new(geometry: &ViewportGeometry, duration: f64) -> Option<Self> {
        if !(duration.is_finite() && duration > 0.0) {
            return None;
        }
        Some(Self {
            left: geometry.margins().left as f64,
            width: geometry.chart_width() as f64,
            right: geometry.chart_right() as f64,
            duration,
        })
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// `left + width * (t / duration)`, with `t` clamped to the timeline.
    pub fn time_to_x(&self, seconds: f64) -> f32 {
        let t = if seconds.is_finite() {
            seconds.clamp(0.0, self.duration)
        } else {
            0.0
        };
        (self.left + self.width * (t / self.duration)) as f32
    }

    /// Seconds under `x`, or `None` when `x` lies outside the chart's horizontal bounds.
    pub fn x_to_time(&self, x: f64) -> Option<f64> {
        if !x.is_finite() || x < self.left || x > self.right {
            return None;
        }
        let fraction = ((x - self.left) / self.width).clamp(0.0, 1.0);
        Some(fraction * self.duration)
    }

    /// Time covered by one chart pixel.
    pub fn seconds_per_pixel(&self) -> f64 {
        self.duration / self.width
    }
}
