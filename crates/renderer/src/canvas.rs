//! Vector drawing of map layers onto a tiny-skia pixmap.

use eclipse_common::{PointOfInterest, WeatherSample};
use image::{ImageBuffer, RgbaImage};
use tiny_skia::{
    FillRule, LineCap, LineJoin, Mask, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform,
};

use crate::colormap::{jet, Color, ValueScale};
use crate::error::RenderError;
use crate::viewport::{PlotArea, Viewport};

/// A pixmap plus the viewport used to place geographic shapes on it.
///
/// Geographic layers are clipped to the viewport's plot area; decorations
/// such as the frame and colorbar are drawn unclipped.
pub struct MapCanvas {
    pixmap: Pixmap,
    viewport: Viewport,
    clip: Option<Mask>,
}

impl MapCanvas {
    pub fn new(width: u32, height: u32, viewport: Viewport) -> Result<Self, RenderError> {
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::InvalidCanvas { width, height })?;
        let clip = plot_area_mask(width, height, &viewport.area());
        Ok(Self {
            pixmap,
            viewport,
            clip,
        })
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn fill(&mut self, color: Color) {
        self.pixmap.fill(tiny_skia::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
    }

    /// Stroke lon/lat polylines, clipped to the plot area.
    pub fn stroke_paths(&mut self, paths: &[&[[f64; 2]]], color: Color, width: f32) {
        let paint = paint(color);
        let stroke = Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        for coords in paths {
            if coords.len() < 2 {
                continue;
            }
            let mut pb = PathBuilder::new();
            let (x, y) = self.viewport.project(coords[0][0], coords[0][1]);
            pb.move_to(x, y);
            for position in &coords[1..] {
                let (x, y) = self.viewport.project(position[0], position[1]);
                pb.line_to(x, y);
            }
            if let Some(path) = pb.finish() {
                self.pixmap.stroke_path(
                    &path,
                    &paint,
                    &stroke,
                    Transform::identity(),
                    self.clip.as_ref(),
                );
            }
        }
    }

    /// One dot per sample, colored by the jet map over `scale`.
    pub fn draw_samples(
        &mut self,
        samples: &[WeatherSample],
        scale: &ValueScale,
        alpha: f32,
        radius: f32,
    ) {
        for sample in samples {
            let color = scale.color(sample.tcc).with_alpha(alpha);
            let (x, y) = self.viewport.project(sample.lon, sample.lat);
            self.dot(x, y, radius, color);
        }
    }

    /// Marker for every point of interest.
    pub fn draw_markers(&mut self, points: &[PointOfInterest], color: Color, radius: f32) {
        for point in points {
            let (x, y) = self.viewport.project(point.lon, point.lat);
            self.dot(x, y, radius, color);
        }
    }

    fn dot(&mut self, x: f32, y: f32, radius: f32, color: Color) {
        if let Some(path) = PathBuilder::from_circle(x, y, radius) {
            self.pixmap.fill_path(
                &path,
                &paint(color),
                FillRule::Winding,
                Transform::identity(),
                self.clip.as_ref(),
            );
        }
    }

    /// Outline of the plot area.
    pub fn draw_frame(&mut self, color: Color, width: f32) {
        let area = self.viewport.area();
        if let Some(rect) = Rect::from_xywh(area.left, area.top, area.width, area.height) {
            let path = PathBuilder::from_rect(rect);
            let stroke = Stroke {
                width,
                ..Stroke::default()
            };
            self.pixmap
                .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
        }
    }

    /// Vertical jet gradient in `bar`, maximum at the top, with an outline.
    pub fn draw_colorbar(&mut self, bar: &PlotArea) {
        let rows = bar.height.round().max(1.0) as usize;
        for row in 0..rows {
            let t = 1.0 - row as f32 / (rows.max(2) - 1) as f32;
            if let Some(rect) = Rect::from_xywh(bar.left, bar.top + row as f32, bar.width, 1.0) {
                self.pixmap
                    .fill_rect(rect, &paint_solid(jet(t)), Transform::identity(), None);
            }
        }

        if let Some(rect) = Rect::from_xywh(bar.left, bar.top, bar.width, bar.height) {
            let path = PathBuilder::from_rect(rect);
            let stroke = Stroke {
                width: 1.0,
                ..Stroke::default()
            };
            self.pixmap.stroke_path(
                &path,
                &paint(Color::BLACK),
                &stroke,
                Transform::identity(),
                None,
            );
        }
    }

    /// Straight line in pixel coordinates, unclipped.
    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, width: f32) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        if let Some(path) = pb.finish() {
            let stroke = Stroke {
                width,
                ..Stroke::default()
            };
            self.pixmap
                .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
        }
    }

    /// Straight (non-premultiplied) RGBA copy of the canvas for text
    /// compositing and encoding.
    pub fn to_image(&self) -> RgbaImage {
        let mut data = Vec::with_capacity(self.pixmap.data().len());
        for pixel in self.pixmap.pixels() {
            let c = pixel.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        ImageBuffer::from_raw(self.width(), self.height(), data)
            .unwrap_or_else(|| RgbaImage::new(self.width(), self.height()))
    }
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn paint_solid(color: Color) -> Paint<'static> {
    let mut paint = paint(color);
    paint.anti_alias = false;
    paint
}

fn plot_area_mask(width: u32, height: u32, area: &PlotArea) -> Option<Mask> {
    let rect = Rect::from_xywh(area.left, area.top, area.width, area.height)?;
    let mut mask = Mask::new(width, height)?;
    mask.fill_path(
        &PathBuilder::from_rect(rect),
        FillRule::Winding,
        false,
        Transform::identity(),
    );
    Some(mask)
}
