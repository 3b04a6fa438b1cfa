use super::chrome::draw_chrome;
use super::content::{DrawContent, EnvelopeContent};
use super::playhead::draw_playhead;
use super::{FrameKind, FrameReport, Scene};
use crate::config::Palette;
use crate::envelope::Envelope;
use crate::surface::Surface;

/// Draws the cached envelope with the playhead at the transport's current time.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticRenderer;

impl StaticRenderer {
    /// Draw a static frame.
    pub fn draw(
        &self,
        surface: &mut dyn Surface,
        scene: &Scene<'_>,
        envelope: &Envelope,
    ) -> FrameReport {
        self.draw_as(surface, scene, envelope, FrameKind::Static)
    }

    /// Draw a static frame standing in for a live one.
    pub fn draw_fallback(
        &self,
        surface: &mut dyn Surface,
        scene: &Scene<'_>,
        envelope: &Envelope,
    ) -> FrameReport {
        self.draw_as(surface, scene, envelope, FrameKind::StaticFallback)
    }

    fn draw_as(
        &self,
        surface: &mut dyn Surface,
        scene: &Scene<'_>,
        envelope: &Envelope,
        kind: FrameKind,
    ) -> FrameReport {
        let palette = &scene.settings.palette;
        surface.begin_frame(scene.geometry);
        draw_chrome(surface, scene);
        EnvelopeContent { envelope }.draw(surface, scene.geometry, palette);
        let (playhead_time, playhead_x) = scene.playhead();
        draw_playhead(
            surface,
            scene.geometry,
            playhead_x,
            Palette::color(palette.playhead),
        );
        surface.end_frame();
        FrameReport {
            kind,
            playhead_time,
            playhead_x,
        }
    }
}
