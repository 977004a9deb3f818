use std::fs;
use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut};
use log::{info, warn};

use crate::config::{ColorTable, RenderConfig};
use crate::projection::{BoundingBoxFit, FlatFigure, Projection};
use crate::sequence::Provenance;
use crate::session::FrameSnapshot;

const TEXT_SCALE: f32 = 22.0;
const TEXT_MARGIN: i32 = 16;
const LINE_SPACING: i32 = 28;

const EMBEDDED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// The bundled font, or the TrueType file at `path` when one is given and usable.
pub fn load_font(path: Option<&Path>) -> FontArc {
    if let Some(path) = path {
        match fs::read(path).map(FontArc::try_from_vec) {
            Ok(Ok(font)) => {
                info!("Using font {path:?}");
                return font;
            }
            Ok(Err(error)) => warn!("Font {path:?} unusable: {error}"),
            Err(error) => warn!("Font {path:?} unreadable: {error}"),
        }
    }
    FontArc::try_from_slice(EMBEDDED_FONT).unwrap()
}

/// Draws the skeleton as a flat line figure onto a raster.
pub struct LineFigureRenderer {
    config: RenderConfig,
    font: FontArc,
}

impl LineFigureRenderer {
    pub fn new(config: RenderConfig, font: FontArc) -> Self {
        Self { config, font }
    }

    pub fn blank_surface(&self) -> RgbaImage {
        RgbaImage::new(self.config.surface_width, self.config.surface_height)
    }

    pub fn render(&self, snapshot: &FrameSnapshot) -> RgbaImage {
        let mut canvas = self.blank_surface();
        self.draw(&mut canvas, snapshot);
        canvas
    }

    /// Full redraw: background, bones, joints, then the frame text.
    pub fn draw(&self, canvas: &mut RgbaImage, snapshot: &FrameSnapshot) {
        let colors = &self.config.colors;
        let background = rgba(colors.background);
        for pixel in canvas.pixels_mut() {
            *pixel = background;
        }
        let fit = BoundingBoxFit::new(canvas.width(), canvas.height(), self.config.fit_margin);
        let figure = fit.project(&snapshot.skeleton);
        self.draw_bones(canvas, &figure);
        self.draw_joints(canvas, &figure);
        self.draw_text(canvas, snapshot);
    }

    pub fn joint_color(&self, landmark_index: usize) -> Rgba<u8> {
        let colors = &self.config.colors;
        if landmark_index < self.config.upper_body_split {
            rgba(colors.upper_joint)
        } else {
            rgba(colors.lower_joint)
        }
    }

    pub fn label_color(&self, provenance: Provenance) -> Rgba<u8> {
        let colors = &self.config.colors;
        match provenance {
            Provenance::Seed => rgba(colors.seed_label),
            Provenance::Generated => rgba(colors.generated_label),
        }
    }

    fn draw_bones(&self, canvas: &mut RgbaImage, figure: &FlatFigure) {
        let color = rgba(self.config.colors.bone);
        let half_stroke = (self.config.bone_stroke / 2.0).max(0.0);
        for &(start, end) in &figure.segments {
            let (a, b) = (figure.points[start], figure.points[end]);
            let Some(along) = (b - a).try_normalize() else {
                continue;
            };
            let across = along.perp();
            let mut offset = -half_stroke;
            while offset <= half_stroke {
                let shift = across * offset;
                draw_line_segment_mut(
                    canvas,
                    (a + shift).into(),
                    (b + shift).into(),
                    color,
                );
                offset += 1.0;
            }
        }
    }

    fn draw_joints(&self, canvas: &mut RgbaImage, figure: &FlatFigure) {
        let radius = self.config.joint_marker_size.round() as i32;
        for (index, point) in figure.points.iter().enumerate() {
            let center = (point.x.round() as i32, point.y.round() as i32);
            draw_filled_circle_mut(canvas, center, radius, self.joint_color(index));
        }
    }

    fn draw_text(&self, canvas: &mut RgbaImage, snapshot: &FrameSnapshot) {
        let font = &self.font;
        let scale = PxScale::from(TEXT_SCALE);
        let text_color = rgba(self.config.colors.text);
        let mut status = format!("{} fps", snapshot.state.frames_per_second);
        if !snapshot.state.is_playing {
            status.push_str("  PAUSED");
        }
        draw_text_mut(
            canvas,
            text_color,
            TEXT_MARGIN,
            TEXT_MARGIN,
            scale,
            font,
            &snapshot.frame_text(),
        );
        draw_text_mut(
            canvas,
            self.label_color(snapshot.provenance),
            TEXT_MARGIN,
            TEXT_MARGIN + LINE_SPACING,
            scale,
            font,
            snapshot.provenance.label(),
        );
        draw_text_mut(
            canvas,
            text_color,
            TEXT_MARGIN,
            TEXT_MARGIN + 2 * LINE_SPACING,
            scale,
            font,
            &status,
        );
    }
}

fn rgba(color: [f32; 4]) -> Rgba<u8> {
    Rgba(ColorTable::rgba8(color))
}
