use egui::pos2;

use super::{Scene, format_amplitude, format_time};
use crate::config::Palette;
use crate::surface::{Surface, TextAlign};

/// Horizontal gap between the chart edge and amplitude labels.
const AMPLITUDE_LABEL_GAP: f32 = 8.0;
/// Vertical offset of time labels below the chart.
const TIME_LABEL_OFFSET: f32 = 16.0;

/// Background, gridlines, axis labels and border shared by every frame.
pub(super) fn draw_chrome(surface: &mut dyn Surface, scene: &Scene<'_>) {
    let geometry = scene.geometry;
    let palette = &scene.settings.palette;
    let grid = Palette::color(palette.grid);
    let label = Palette::color(palette.label);
    let left = geometry.margins().left as f32;
    let right = geometry.chart_right();
    let top = geometry.margins().top as f32;
    let bottom = geometry.chart_bottom();

    surface.fill_rect(geometry.surface_rect(), Palette::color(palette.background));

    for amplitude in &scene.settings.axes.amplitude_labels {
        let y = geometry.amplitude_to_y(*amplitude);
        surface.stroke_line(pos2(left, y), pos2(right, y), 1.0, grid);
        surface.fill_text(
            &format_amplitude(*amplitude),
            pos2(left - AMPLITUDE_LABEL_GAP, y),
            TextAlign::Right,
            label,
        );
    }

    let duration = scene.mapper.duration();
    let ticks = scene.settings.axes.time_tick_count(duration);
    if ticks > 0 {
        for index in 0..=ticks {
            let seconds = duration * index as f64 / ticks as f64;
            let x = scene.mapper.time_to_x(seconds);
            surface.stroke_line(pos2(x, top), pos2(x, bottom), 1.0, grid);
            surface.fill_text(
                &format_time(seconds),
                pos2(x, bottom + TIME_LABEL_OFFSET),
                TextAlign::Center,
                label,
            );
        }
    }

    let axis = Palette::color(palette.axis);
    let corners = [
        pos2(left, top),
        pos2(right, top),
        pos2(right, bottom),
        pos2(left, bottom),
        pos2(left, top),
    ];
    surface.stroke_polyline(&corners, 1.0, axis);
}
