//! PNG encoding for RGBA image data.
//!
//! Supports two encoding modes:
//! - **Indexed PNG (color type 3)**: used when the image has ≤256 unique
//!   colors, e.g. a map with only outlines and a few markers.
//! - **RGBA PNG (color type 6)**: fallback once alpha-blended samples or
//!   antialiased text push the color count higher.

use std::collections::HashMap;
use std::io::Write;

use crate::error::RenderError;

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Create a PNG image with automatic format selection.
///
/// # Arguments
/// - `pixels`: RGBA pixel data (4 bytes per pixel)
/// - `width`: Image width in pixels
/// - `height`: Image height in pixels
pub fn create_png_auto(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, RenderError> {
    check_len(pixels.len(), width * height * 4)?;

    match extract_palette(pixels) {
        Some((palette, indices)) => create_png_indexed(width, height, &palette, &indices),
        None => create_png(pixels, width, height),
    }
}

/// Pack RGBA bytes into a u32 for faster hashing
#[inline(always)]
fn pack_color(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24)
}

/// Palette and per-pixel indices, or `None` past 256 colors.
fn extract_palette(pixels: &[u8]) -> Option<(Vec<[u8; 4]>, Vec<u8>)> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<[u8; 4]> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / 4);

    for chunk in pixels.chunks_exact(4) {
        let packed = pack_color(chunk[0], chunk[1], chunk[2], chunk[3]);

        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push([chunk[0], chunk[1], chunk[2], chunk[3]]);
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Create an indexed PNG (color type 3) from palette and indices.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[[u8; 4]],
    indices: &[u8],
) -> Result<Vec<u8>, RenderError> {
    check_len(indices.len(), width * height)?;
    let mut png = Vec::new();
    png.extend_from_slice(&SIGNATURE);

    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    let plte_data: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte_data);

    // tRNS only when some entry is not opaque
    if palette.iter().any(|c| c[3] < 255) {
        let trns_data: Vec<u8> = palette.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns_data);
    }

    let idat_data = deflate_scanlines(indices, width, height)
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))?;
    write_chunk(&mut png, b"IDAT", &idat_data);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Create a PNG image from RGBA pixel data (color type 6).
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, RenderError> {
    check_len(pixels.len(), width * height * 4)?;
    let mut png = Vec::new();
    png.extend_from_slice(&SIGNATURE);

    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 6));

    let idat_data = deflate_scanlines(pixels, width * 4, height)
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))?;
    write_chunk(&mut png, b"IDAT", &idat_data);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

fn check_len(actual: usize, expected: usize) -> Result<(), RenderError> {
    if actual != expected {
        return Err(RenderError::Encode(format!(
            "Expected {} bytes of image data, got {}",
            expected, actual
        )));
    }
    Ok(())
}

fn ihdr(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(color_type);
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    ihdr_data
}

/// Write a PNG chunk: length, type, data, CRC over type and data.
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Prefix each `row_bytes` scanline with filter type 0 and deflate.
fn deflate_scanlines(data: &[u8], row_bytes: usize, height: usize) -> std::io::Result<Vec<u8>> {
    let mut uncompressed = Vec::with_capacity(height * (1 + row_bytes));
    for row in data.chunks_exact(row_bytes.max(1)).take(height) {
        uncompressed.push(0);
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&uncompressed)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_palette_simple() {
        let pixels = [
            255, 0, 0, 255, // red
            0, 255, 0, 255, // green
            0, 0, 255, 255, // blue
            255, 0, 0, 255, // red again
        ];

        let (palette, indices) = extract_palette(&pixels).unwrap();
        assert_eq!(palette.len(), 3);
        assert_eq!(indices, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_extract_palette_gives_up_past_256_colors() {
        let pixels: Vec<u8> = (0..257u32)
            .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 0, 255])
            .collect();
        assert!(extract_palette(&pixels).is_none());
    }

    #[test]
    fn test_chunk_crc() {
        let mut png = Vec::new();
        write_chunk(&mut png, b"IEND", &[]);
        // Well-known CRC of an empty IEND chunk
        assert_eq!(&png[8..], &[0xAE, 0x42, 0x60, 0x82]);
    }

    #[test]
    fn test_wrong_buffer_length() {
        assert!(matches!(
            create_png(&[0; 10], 2, 2),
            Err(RenderError::Encode(_))
        ));
    }
}
