use std::path::{Path, PathBuf};

use egui::{Color32, ColorImage, Pos2, Rect, pos2};
use image::{ImageFormat, RgbaImage};

use super::glyphs::{GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH, glyph, text_width};
use super::{Surface, TextAlign};
use crate::geometry::ViewportGeometry;

/// Size of one font pixel in CSS pixels.
const TEXT_PIXEL: f32 = 1.5;

/// Errors raised while exporting a raster surface.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// Pixel data did not match the reported image size.
    #[error("Surface buffer of {width}x{height} could not be converted")]
    Buffer { width: u32, height: u32 },
    /// Encoding or writing the image failed.
    #[error("Failed to write image to {path}: {source}")]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Software surface backed by an egui [`ColorImage`] at physical resolution.
pub struct RasterSurface {
    image: ColorImage,
    scale: f32,
    frames_presented: u64,
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterSurface {
    pub fn new() -> Self {
        Self {
            image: ColorImage::new([1, 1], vec![Color32::TRANSPARENT]),
            scale: 1.0,
            frames_presented: 0,
        }
    }

    /// Pixels of the most recent frame.
    pub fn image(&self) -> &ColorImage {
        &self.image
    }

    /// Number of completed `begin_frame`/`end_frame` pairs.
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Color at a CSS-pixel position, if it lies on the surface.
    pub fn pixel_at(&self, x: f32, y: f32) -> Option<Color32> {
        let px = (x * self.scale).floor();
        let py = (y * self.scale).floor();
        if px < 0.0 || py < 0.0 {
            return None;
        }
        let (px, py) = (px as usize, py as usize);
        let [width, height] = self.image.size;
        if px >= width || py >= height {
            return None;
        }
        self.image.pixels.get(py * width + px).copied()
    }

    /// Copy the surface into an RGBA buffer for encoding.
    pub fn to_rgba_image(&self) -> Result<RgbaImage, SurfaceError> {
        let [width, height] = self.image.size;
        let bytes = self
            .image
            .pixels
            .iter()
            .flat_map(|color| color.to_srgba_unmultiplied())
            .collect::<Vec<u8>>();
        RgbaImage::from_raw(width as u32, height as u32, bytes).ok_or(SurfaceError::Buffer {
            width: width as u32,
            height: height as u32,
        })
    }

    /// Encode the surface as a PNG file.
    pub fn save_png(&self, path: &Path) -> Result<(), SurfaceError> {
        self.to_rgba_image()?
            .save_with_format(path, ImageFormat::Png)
            .map_err(|source| SurfaceError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::info!("Wrote {}", path.display());
        Ok(())
    }

    fn put(&mut self, x: i64, y: i64, color: Color32) {
        let [width, height] = self.image.size;
        if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
            return;
        }
        self.image.pixels[y as usize * width + x as usize] = color;
    }

    /// Fill a physical-pixel span; non-empty spans always cover at least one pixel.
    fn fill_physical(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Color32) {
        let [width, height] = self.image.size;
        let (left, right) = pixel_span(x0, x1, width);
        let (top, bottom) = pixel_span(y0, y1, height);
        for y in top..bottom {
            let row = y * width;
            if let Some(pixels) = self.image.pixels.get_mut(row + left..row + right) {
                pixels.fill(color);
            }
        }
    }

    fn to_physical(&self, point: Pos2) -> Pos2 {
        pos2(point.x * self.scale, point.y * self.scale)
    }
}

fn pixel_span(start: f32, end: f32, limit: usize) -> (usize, usize) {
    if !(start.is_finite() && end.is_finite()) || end <= start {
        return (0, 0);
    }
    let mut first = start.round();
    let mut last = end.round();
    if last <= first {
        first = start.floor();
        last = first + 1.0;
    }
    let clamp = |value: f32| value.clamp(0.0, limit as f32) as usize;
    (clamp(first), clamp(last))
}

impl Surface for RasterSurface {
    fn begin_frame(&mut self, geometry: &ViewportGeometry) {
        let size = geometry.physical_size();
        if self.image.size != size {
            self.image = ColorImage::new(size, vec![Color32::TRANSPARENT; size[0] * size[1]]);
        } else {
            self.image.pixels.fill(Color32::TRANSPARENT);
        }
        self.scale = geometry.device_pixel_ratio();
    }

    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        let min = self.to_physical(rect.min);
        let max = self.to_physical(rect.max);
        self.fill_physical(min.x, min.y, max.x, max.y, color);
    }

    fn stroke_line(&mut self, from: Pos2, to: Pos2, width: f32, color: Color32) {
        let from = self.to_physical(from);
        let to = self.to_physical(to);
        let thickness = (width * self.scale).max(1.0);
        let half = thickness / 2.0;
        let length = from.distance(to);
        let steps = (length * 2.0).ceil().max(1.0) as usize;
        for step in 0..=steps {
            let point = from.lerp(to, step as f32 / steps as f32);
            self.fill_physical(
                point.x - half,
                point.y - half,
                point.x + half,
                point.y + half,
                color,
            );
        }
    }

    fn fill_polygon(&mut self, points: &[Pos2], color: Color32) {
        if points.len() < 3 {
            return;
        }
        let points = points
            .iter()
            .map(|point| self.to_physical(*point))
            .collect::<Vec<_>>();
        let (min_y, max_y) = points
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        let height = self.image.size[1] as f32;
        let first_row = min_y.floor().clamp(0.0, height) as usize;
        let last_row = max_y.ceil().clamp(0.0, height) as usize;
        let mut crossings = Vec::new();
        for row in first_row..last_row {
            let scan_y = row as f32 + 0.5;
            crossings.clear();
            for (index, a) in points.iter().enumerate() {
                let b = points[(index + 1) % points.len()];
                let spans_row = (a.y <= scan_y && scan_y < b.y) || (b.y <= scan_y && scan_y < a.y);
                if spans_row {
                    crossings.push(a.x + (scan_y - a.y) * (b.x - a.x) / (b.y - a.y));
                }
            }
            crossings.sort_by(f32::total_cmp);
            for pair in crossings.chunks_exact(2) {
                self.fill_physical(pair[0], row as f32, pair[1], row as f32 + 1.0, color);
            }
        }
    }

    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32) {
        let center = self.to_physical(center);
        let radius = (radius * self.scale).max(0.5);
        let radius_sq = radius * radius;
        let top = (center.y - radius).floor() as i64;
        let bottom = (center.y + radius).ceil() as i64;
        let left = (center.x - radius).floor() as i64;
        let right = (center.x + radius).ceil() as i64;
        for y in top..bottom {
            let dy = y as f32 + 0.5 - center.y;
            for x in left..right {
                let dx = x as f32 + 0.5 - center.x;
                if dx * dx + dy * dy <= radius_sq {
                    self.put(x, y, color);
                }
            }
        }
    }

    fn fill_text(&mut self, text: &str, anchor: Pos2, align: TextAlign, color: Color32) {
        let width = text_width(text) as f32 * TEXT_PIXEL;
        let origin_x = match align {
            TextAlign::Left => anchor.x,
            TextAlign::Center => anchor.x - width / 2.0,
            TextAlign::Right => anchor.x - width,
        };
        let origin_y = anchor.y - GLYPH_HEIGHT as f32 * TEXT_PIXEL / 2.0;
        for (index, ch) in text.chars().enumerate() {
            let Some(rows) = glyph(ch) else {
                continue;
            };
            let glyph_x = origin_x + (index * GLYPH_ADVANCE) as f32 * TEXT_PIXEL;
            for (row, bits) in rows.iter().enumerate() {
                for column in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - column)) == 0 {
                        continue;
                    }
                    let min = pos2(
                        glyph_x + column as f32 * TEXT_PIXEL,
                        origin_y + row as f32 * TEXT_PIXEL,
                    );
                    let rect = Rect::from_min_size(min, egui::vec2(TEXT_PIXEL, TEXT_PIXEL));
                    self.fill_rect(rect, color);
                }
            }
        }
    }

    fn end_frame(&mut self) {
        self.frames_presented += 1;
    }
}
