//! Composition of the annotated cloud-cover map.
//!
//! Layers are drawn bottom to top: background, underlays (state
//! boundaries), forecast samples, overlays (umbra outline, centerline),
//! point markers, then text. Sizes are given in points and converted with
//! the configured DPI.

use eclipse_common::{GeoLayer, MapBounds, PointOfInterest, WeatherSample};
use image::RgbaImage;
use tracing::{debug, info, warn};

use crate::canvas::MapCanvas;
use crate::colormap::{Color, ValueScale};
use crate::error::RenderError;
use crate::png::create_png_auto;
use crate::text::LabelFont;
use crate::viewport::{PlotArea, Viewport};

/// Extent used when there is nothing to fit the view to.
const WORLD: MapBounds = MapBounds {
    lon_min: -180.0,
    lon_max: 180.0,
    lat_min: -90.0,
    lat_max: 90.0,
};

/// Look of the rendered map.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Edge length of the square image in pixels
    pub size: u32,
    pub dpi: f32,
    pub sample_alpha: f32,
    pub sample_radius_pt: f32,
    pub marker_radius_pt: f32,
    pub line_width_pt: f32,
    pub label_size_pt: f32,
    /// Label position relative to its point, x right and y up
    pub label_offset_pt: (f32, f32),
    pub halo_pt: f32,
    pub title_size_pt: f32,
    pub tick_size_pt: f32,
    pub colorbar_ticks: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: 2400,
            dpi: 100.0,
            sample_alpha: 0.5,
            sample_radius_pt: 3.0,
            marker_radius_pt: 3.0,
            line_width_pt: 1.5,
            label_size_pt: 18.0,
            label_offset_pt: (15.0, -6.0),
            halo_pt: 2.0,
            title_size_pt: 24.0,
            tick_size_pt: 14.0,
            colorbar_ticks: 6,
        }
    }
}

impl RenderOptions {
    fn px(&self, points: f32) -> f32 {
        points * self.dpi / 72.0
    }
}

/// A reference layer and the color its outlines are stroked in.
#[derive(Debug, Clone, Copy)]
pub struct Overlay<'a> {
    pub layer: &'a GeoLayer,
    pub color: Color,
}

/// Everything that goes on one map.
#[derive(Debug, Clone)]
pub struct MapScene<'a> {
    pub title: &'a str,
    /// Fixed extent; `None` fits the view to the plotted data
    pub bounds: Option<MapBounds>,
    pub underlays: Vec<Overlay<'a>>,
    pub samples: &'a [WeatherSample],
    pub overlays: Vec<Overlay<'a>>,
    pub points: &'a [PointOfInterest],
}

impl MapScene<'_> {
    /// The configured bounds, or the union of all plotted data.
    pub fn extent(&self) -> MapBounds {
        if let Some(bounds) = self.bounds {
            return bounds;
        }

        let data = MapBounds::enclosing(
            self.samples
                .iter()
                .map(|s| (s.lon, s.lat))
                .chain(self.points.iter().map(|p| (p.lon, p.lat))),
        );
        let layers = self
            .underlays
            .iter()
            .chain(self.overlays.iter())
            .filter_map(|o| o.layer.bounds());

        let fitted = layers.fold(data, |acc, b| match acc {
            Some(a) => Some(a.union(&b)),
            None => Some(b),
        });
        match fitted {
            Some(bounds) => bounds.padded(0.05),
            None => {
                debug!("Nothing to fit, using the whole world");
                WORLD
            }
        }
    }
}

/// Renders [`MapScene`]s with a fixed style and optional font.
pub struct MapRenderer {
    options: RenderOptions,
    font: Option<LabelFont>,
}

impl MapRenderer {
    /// Without a font the map is drawn with no text at all.
    pub fn new(options: RenderOptions, font: Option<LabelFont>) -> Self {
        if font.is_none() {
            warn!("No font available, labels and title will be skipped");
        }
        Self { options, font }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn render(&self, scene: &MapScene<'_>) -> Result<RgbaImage, RenderError> {
        let opts = &self.options;
        let size = opts.size as f32;
        let frame = PlotArea {
            left: size * 0.06,
            top: size * 0.06,
            width: size * 0.76,
            height: size * 0.88,
        };
        let extent = scene.extent();
        let viewport = Viewport::new(extent, frame);
        let area = viewport.area();

        let mut canvas = MapCanvas::new(opts.size, opts.size, viewport)?;
        canvas.fill(Color::WHITE);

        let line_width = opts.px(opts.line_width_pt);
        for overlay in &scene.underlays {
            canvas.stroke_paths(&overlay.layer.paths(), overlay.color, line_width);
        }

        let scale = ValueScale::from_samples(scene.samples);
        if let Some(scale) = &scale {
            canvas.draw_samples(
                scene.samples,
                scale,
                opts.sample_alpha,
                opts.px(opts.sample_radius_pt),
            );
        }

        for overlay in &scene.overlays {
            canvas.stroke_paths(&overlay.layer.paths(), overlay.color, line_width);
        }
        canvas.draw_markers(scene.points, Color::RED, opts.px(opts.marker_radius_pt));
        canvas.draw_frame(Color::BLACK, 1.0);

        let bar = PlotArea {
            left: area.right() + size * 0.02,
            top: area.top,
            width: size * 0.02,
            height: area.height,
        };
        if scale.is_some() {
            canvas.draw_colorbar(&bar);
            for value in tick_values(scale.as_ref(), opts.colorbar_ticks) {
                let y = tick_y(&bar, scale.as_ref(), value);
                canvas.line((bar.right(), y), (bar.right() + 6.0, y), Color::BLACK, 1.0);
            }
        }

        let mut img = canvas.to_image();
        if let Some(font) = &self.font {
            self.draw_labels(&mut img, font, &viewport, scene.points);
            if let Some(scale) = &scale {
                self.draw_ticks(&mut img, font, &bar, scale);
            }
            self.draw_title(&mut img, font, &area, scene.title);
        }

        info!(
            size = opts.size,
            lon_min = extent.lon_min,
            lon_max = extent.lon_max,
            lat_min = extent.lat_min,
            lat_max = extent.lat_max,
            samples = scene.samples.len(),
            points = scene.points.len(),
            labelled = self.font.is_some(),
            "Rendered map"
        );
        Ok(img)
    }

    /// Render and encode as PNG.
    pub fn render_png(&self, scene: &MapScene<'_>) -> Result<Vec<u8>, RenderError> {
        let img = self.render(scene)?;
        create_png_auto(img.as_raw(), img.width() as usize, img.height() as usize)
    }

    fn draw_labels(
        &self,
        img: &mut RgbaImage,
        font: &LabelFont,
        viewport: &Viewport,
        points: &[PointOfInterest],
    ) {
        let opts = &self.options;
        let size = opts.px(opts.label_size_pt);
        let ascent = font.ascent(size);
        let (dx, dy) = opts.label_offset_pt;
        let halo = opts.px(opts.halo_pt).round() as i32;

        for point in points {
            let (x, y) = viewport.project(point.lon, point.lat);
            // Offset is y-up; the text is placed by its baseline
            let baseline = y - opts.px(dy);
            let left = x + opts.px(dx);
            font.draw_with_halo(
                img,
                &point.label(),
                left.round() as i32,
                (baseline - ascent).round() as i32,
                size,
                Color::BLACK,
                Color::WHITE,
                halo,
            );
        }
    }

    fn draw_ticks(&self, img: &mut RgbaImage, font: &LabelFont, bar: &PlotArea, scale: &ValueScale) {
        let opts = &self.options;
        let size = opts.px(opts.tick_size_pt);
        for value in tick_values(Some(scale), opts.colorbar_ticks) {
            let text = format!("{:.0}", value);
            let (_, h) = font.measure(&text, size);
            let y = tick_y(bar, Some(scale), value);
            font.draw(
                img,
                &text,
                (bar.right() + 10.0).round() as i32,
                (y - h as f32 / 2.0).round() as i32,
                size,
                Color::BLACK,
            );
        }
    }

    fn draw_title(&self, img: &mut RgbaImage, font: &LabelFont, area: &PlotArea, title: &str) {
        if title.is_empty() {
            return;
        }
        let opts = &self.options;
        let size = opts.px(opts.title_size_pt);
        let (w, h) = font.measure(title, size);
        let x = area.left + (area.width - w as f32) / 2.0;
        let y = area.top - h as f32 - size * 0.5;
        font.draw(
            img,
            title,
            x.round() as i32,
            y.max(0.0).round() as i32,
            size,
            Color::BLACK,
        );
    }
}

fn tick_values(scale: Option<&ValueScale>, count: usize) -> Vec<f32> {
    scale.map(|s| s.ticks(count)).unwrap_or_default()
}

fn tick_y(bar: &PlotArea, scale: Option<&ValueScale>, value: f32) -> f32 {
    let t = scale.map(|s| s.normalize(value)).unwrap_or(0.0);
    bar.bottom() - t * bar.height
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"STUSPS": "TX"},
         "geometry": {"type": "Polygon", "coordinates": [[[-106, 26], [-94, 26], [-94, 36], [-106, 36], [-106, 26]]]}}
    ]}"#;

    fn small_options() -> RenderOptions {
        RenderOptions {
            size: 200,
            ..RenderOptions::default()
        }
    }

    #[test]
    fn test_extent_prefers_configured_bounds() {
        let bounds = MapBounds::new(-107.0, -93.0, 25.5, 36.7);
        let scene = MapScene {
            title: "",
            bounds: Some(bounds),
            underlays: Vec::new(),
            samples: &[],
            overlays: Vec::new(),
            points: &[],
        };
        assert_eq!(scene.extent(), bounds);
    }

    #[test]
    fn test_extent_fits_data_and_layers() {
        let layer = GeoLayer::from_geojson_str("states", STATES).unwrap();
        let samples = [WeatherSample::new(40.0, -100.0, 10.0)];
        let points = [PointOfInterest::new("East", -90.0, 30.0)];
        let scene = MapScene {
            title: "",
            bounds: None,
            underlays: vec![Overlay {
                layer: &layer,
                color: Color::LIGHT_GREY,
            }],
            samples: &samples,
            overlays: Vec::new(),
            points: &points,
        };

        let extent = scene.extent();
        // -106..-90 by 26..40 plus 5% padding
        assert!((extent.lon_min - -106.8).abs() < 1e-9);
        assert!((extent.lon_max - -89.2).abs() < 1e-9);
        assert!((extent.lat_min - 25.3).abs() < 1e-9);
        assert!((extent.lat_max - 40.7).abs() < 1e-9);
    }

    #[test]
    fn test_empty_scene_uses_world() {
        let scene = MapScene {
            title: "",
            bounds: None,
            underlays: Vec::new(),
            samples: &[],
            overlays: Vec::new(),
            points: &[],
        };
        assert_eq!(scene.extent(), WORLD);
    }

    #[test]
    fn test_render_without_font() {
        let samples = [
            WeatherSample::new(30.0, -100.0, 0.0),
            WeatherSample::new(31.0, -99.0, 100.0),
        ];
        let scene = MapScene {
            title: "Forecasted Total Cloud Cover (%)",
            bounds: Some(MapBounds::new(-101.0, -98.0, 29.0, 32.0)),
            underlays: Vec::new(),
            samples: &samples,
            overlays: Vec::new(),
            points: &[],
        };
        let renderer = MapRenderer::new(small_options(), None);

        let img = renderer.render(&scene).unwrap();
        assert_eq!(img.dimensions(), (200, 200));
        // Corner stays background
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert!(img.pixels().any(|p| p.0[2] > p.0[0] && p.0[0] < 200));
    }

    #[test]
    fn test_px_conversion() {
        let opts = RenderOptions::default();
        assert_eq!(opts.px(72.0), 100.0);
    }
}
