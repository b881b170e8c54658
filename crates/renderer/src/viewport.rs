//! Mapping from lon/lat to canvas pixels.

use eclipse_common::MapBounds;

/// Pixel rectangle on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl PlotArea {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Plate carrée view of `bounds` fitted inside a frame.
///
/// One degree of latitude is drawn `1 / cos(mid latitude)` times taller than
/// one degree of longitude, so shapes keep their proportions at the map's
/// centre. The plot area is the largest such box centred in the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    bounds: MapBounds,
    area: PlotArea,
}

impl Viewport {
    pub fn new(bounds: MapBounds, frame: PlotArea) -> Self {
        let bounds = if bounds.width() > 0.0 && bounds.height() > 0.0 {
            bounds
        } else {
            bounds.padded(0.0)
        };

        let mid_lat = (bounds.lat_min + bounds.lat_max) / 2.0;
        let aspect = 1.0 / mid_lat.to_radians().cos().max(0.01);

        let px_per_lon = (frame.width as f64 / bounds.width())
            .min(frame.height as f64 / (bounds.height() * aspect));
        let width = (bounds.width() * px_per_lon) as f32;
        let height = (bounds.height() * px_per_lon * aspect) as f32;

        let area = PlotArea {
            left: frame.left + (frame.width - width) / 2.0,
            top: frame.top + (frame.height - height) / 2.0,
            width,
            height,
        };
        Self { bounds, area }
    }

    pub fn bounds(&self) -> &MapBounds {
        &self.bounds
    }

    pub fn area(&self) -> PlotArea {
        self.area
    }

    /// Pixel position of a lon/lat; may fall outside the plot area.
    pub fn project(&self, lon: f64, lat: f64) -> (f32, f32) {
        let fx = (lon - self.bounds.lon_min) / self.bounds.width();
        let fy = (self.bounds.lat_max - lat) / self.bounds.height();
        (
            self.area.left + (fx * self.area.width as f64) as f32,
            self.area.top + (fy * self.area.height as f64) as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> PlotArea {
        PlotArea {
            left: 10.0,
            top: 20.0,
            width: 200.0,
            height: 200.0,
        }
    }

    #[test]
    fn test_equator_view_is_square() {
        let vp = Viewport::new(MapBounds::new(-10.0, 10.0, -10.0, 10.0), frame());
        assert_eq!(vp.area(), frame());
        assert_eq!(vp.project(-10.0, 10.0), (10.0, 20.0));
        assert_eq!(vp.project(10.0, -10.0), (210.0, 220.0));
        assert_eq!(vp.project(0.0, 0.0), (110.0, 120.0));
    }

    #[test]
    fn test_wide_bounds_are_letterboxed() {
        let vp = Viewport::new(MapBounds::new(0.0, 40.0, -5.0, 5.0), frame());
        let area = vp.area();
        assert_eq!(area.width, 200.0);
        assert!(area.height < 60.0);
        assert!((area.top + area.height / 2.0 - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_high_latitudes_are_stretched() {
        let vp = Viewport::new(MapBounds::new(-100.0, -90.0, 55.0, 65.0), frame());
        let area = vp.area();
        // cos(60) = 0.5: a degree of latitude is twice as tall
        assert!((area.height - 200.0).abs() < 1e-3);
        assert!((area.width - 100.0).abs() < 1e-2);
    }

    #[test]
    fn test_degenerate_bounds_are_padded() {
        let vp = Viewport::new(MapBounds::new(5.0, 5.0, 1.0, 1.0), frame());
        assert_eq!(vp.bounds().width(), 1.0);
        let (x, _) = vp.project(5.0, 1.0);
        assert!(x.is_finite());
    }
}
