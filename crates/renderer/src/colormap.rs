//! Colors and the jet colormap used for cloud cover.

use eclipse_common::WeatherSample;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const RED: Color = Color::new(255, 0, 0, 255);
    pub const LIGHT_GREY: Color = Color::new(211, 211, 211, 255);
    /// Default line color for unstyled outlines
    pub const STEEL_BLUE: Color = Color::new(31, 119, 180, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with alpha set from a 0-1 opacity.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }
}

// Piecewise-linear channel curves of the classic jet map, as (x, value).
const JET_RED: [(f32, f32); 5] = [(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const JET_GREEN: [(f32, f32); 6] = [
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const JET_BLUE: [(f32, f32); 5] = [(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

/// Jet colormap: dark blue at 0 through cyan, yellow and red to dark red
/// at 1. Inputs outside [0, 1] are clamped; NaN maps to 0.
pub fn jet(t: f32) -> Color {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    Color::new(
        channel(&JET_RED, t),
        channel(&JET_GREEN, t),
        channel(&JET_BLUE, t),
        255,
    )
}

fn channel(curve: &[(f32, f32)], t: f32) -> u8 {
    let mut value = curve[curve.len() - 1].1;
    for pair in curve.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if t <= x1 {
            let f = if x1 > x0 { (t - x0) / (x1 - x0) } else { 0.0 };
            value = y0 + (y1 - y0) * f;
            break;
        }
    }
    (value * 255.0).round() as u8
}

/// Linear mapping from data values to colormap positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueScale {
    pub min: f32,
    pub max: f32,
}

impl ValueScale {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Scale spanning the finite cloud-cover values, `None` when there are
    /// none.
    pub fn from_samples(samples: &[WeatherSample]) -> Option<Self> {
        let mut range: Option<(f32, f32)> = None;
        for tcc in samples.iter().map(|s| s.tcc).filter(|v| v.is_finite()) {
            range = Some(match range {
                None => (tcc, tcc),
                Some((lo, hi)) => (lo.min(tcc), hi.max(tcc)),
            });
        }
        range.map(|(min, max)| Self { min, max })
    }

    /// Position of `value` in [0, 1]. A zero-width scale maps everything
    /// to 0.
    pub fn normalize(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f32) -> Color {
        jet(self.normalize(value))
    }

    /// `count` evenly spaced values from min to max.
    pub fn ticks(&self, count: usize) -> Vec<f32> {
        match count {
            0 => Vec::new(),
            1 => vec![self.min],
            _ => (0..count)
                .map(|i| self.min + (self.max - self.min) * i as f32 / (count - 1) as f32)
                .collect(),
        }
    }
}
