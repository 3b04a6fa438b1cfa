use egui::{Color32, pos2};

use crate::geometry::ViewportGeometry;
use crate::surface::Surface;

const LINE_WIDTH: f32 = 2.0;
const HANDLE_RADIUS: f32 = 6.0;
const MARKER_HALF_WIDTH: f32 = 6.0;
const MARKER_HEIGHT: f32 = 8.0;

/// Vertical playhead with a round handle on top and a triangle marker below.
pub(super) fn draw_playhead(
    surface: &mut dyn Surface,
    geometry: &ViewportGeometry,
    x: f32,
    color: Color32,
) {
    let top = geometry.margins().top as f32;
    let bottom = geometry.chart_bottom();
    surface.stroke_line(pos2(x, top), pos2(x, bottom), LINE_WIDTH, color);
    surface.fill_circle(pos2(x, top), HANDLE_RADIUS, color);
    surface.fill_polygon(
        &[
            pos2(x - MARKER_HALF_WIDTH, bottom + MARKER_HEIGHT),
            pos2(x + MARKER_HALF_WIDTH, bottom + MARKER_HEIGHT),
            pos2(x, bottom),
        ],
        color,
    );
}
