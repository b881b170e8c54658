//! TrueType text drawing for labels, the title and colorbar ticks.

use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};

use crate::colormap::Color;
use crate::error::RenderError;

/// A font loaded from disk, used for every piece of text on the map.
pub struct LabelFont {
    font: Font<'static>,
}

impl LabelFont {
    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        let data = std::fs::read(path).map_err(|e| RenderError::Font {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_bytes(data).ok_or_else(|| RenderError::Font {
            path: path.to_path_buf(),
            reason: "not a TrueType font".to_string(),
        })
    }

    pub fn from_bytes(data: Vec<u8>) -> Option<Self> {
        Font::try_from_vec(data).map(|font| Self { font })
    }

    /// Ascent above the baseline in pixels at `size`.
    pub fn ascent(&self, size: f32) -> f32 {
        self.font.v_metrics(Scale::uniform(size)).ascent
    }

    /// Rendered (width, height) of `text` in pixels.
    pub fn measure(&self, text: &str, size: f32) -> (i32, i32) {
        text_size(Scale::uniform(size), &self.font, text)
    }

    /// Draw `text` with its top-left corner at (x, y).
    pub fn draw(&self, img: &mut RgbaImage, text: &str, x: i32, y: i32, size: f32, color: Color) {
        draw_text_mut(
            img,
            rgba(color),
            x,
            y,
            Scale::uniform(size),
            &self.font,
            text,
        );
    }

    /// Draw `text` over a halo of `halo` pixels so it stays readable on
    /// top of colored dots.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_with_halo(
        &self,
        img: &mut RgbaImage,
        text: &str,
        x: i32,
        y: i32,
        size: f32,
        color: Color,
        halo_color: Color,
        halo: i32,
    ) {
        for dy in -halo..=halo {
            for dx in -halo..=halo {
                if (dx != 0 || dy != 0) && dx * dx + dy * dy <= halo * halo {
                    self.draw(img, text, x + dx, y + dy, size, halo_color);
                }
            }
        }
        self.draw(img, text, x, y, size, color);
    }
}

fn rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, color.a])
}
