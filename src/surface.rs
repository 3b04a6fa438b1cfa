//! Drawing target abstraction.
//!
//! Renderers issue primitives in CSS pixels. Each surface applies its device
//! pixel ratio once, at `begin_frame`, from the geometry it is handed.

mod glyphs;
mod raster;

use egui::{Color32, Pos2, Rect};

use crate::geometry::ViewportGeometry;

pub use raster::{RasterSurface, SurfaceError};

/// Horizontal placement of text relative to its anchor point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// 2D drawing primitives used by the renderers.
pub trait Surface {
    /// Resize the backing store if needed and reset the pixel transform.
    fn begin_frame(&mut self, geometry: &ViewportGeometry);
    fn fill_rect(&mut self, rect: Rect, color: Color32);
    fn stroke_line(&mut self, from: Pos2, to: Pos2, width: f32, color: Color32);
    fn fill_polygon(&mut self, points: &[Pos2], color: Color32);
    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32);
    /// Draw `text` vertically centered on `anchor.y`.
    fn fill_text(&mut self, text: &str, anchor: Pos2, align: TextAlign, color: Color32);
    /// Present the frame.
    fn end_frame(&mut self);

    fn stroke_polyline(&mut self, points: &[Pos2], width: f32, color: Color32) {
        for pair in points.windows(2) {
            self.stroke_line(pair[0], pair[1], width, color);
        }
    }
}
