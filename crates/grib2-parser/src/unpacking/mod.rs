//! GRIB2 data unpacking.
//!
//! Simple packing (template 5.0) is decoded here. Complex packing, JPEG2000
//! and PNG packing are handed to the `grib` crate, which does not read the
//! minimal simple-packed messages our test builder produces.

use std::io::Cursor;

use crate::Grib2Error;

/// Unpack simple packed GRIB2 data
///
/// Simple packing formula: value = (reference_value + packed_value * 2^E) * 10^(-D)
///
/// Returns one value per packed point; a bitmap, if any, has to be applied
/// afterwards with [`apply_bitmap`].
pub fn unpack_simple(
    packed_data: &[u8],
    num_values: u32,
    bits_per_value: u8,
    reference_value: f32,
    binary_scale_factor: i16,
    decimal_scale_factor: i16,
) -> Result<Vec<f32>, Grib2Error> {
    let decimal_scale = 10.0_f64.powi(-(decimal_scale_factor as i32));

    if bits_per_value == 0 {
        // All values are the reference value
        let value = (reference_value as f64 * decimal_scale) as f32;
        return Ok(vec![value; num_values as usize]);
    }

    let binary_scale = 2.0_f64.powi(binary_scale_factor as i32);
    let bits_per_value = bits_per_value as usize;

    let mut values = Vec::with_capacity(num_values as usize);
    let mut bit_position = 0;
    for _ in 0..num_values {
        let packed_value = extract_bits(packed_data, bit_position, bits_per_value)
            .map_err(|e| Grib2Error::UnpackingError(format!("Failed to extract bits: {}", e)))?;
        bit_position += bits_per_value;

        let value =
            (reference_value as f64 + packed_value as f64 * binary_scale) * decimal_scale;
        values.push(value as f32);
    }

    Ok(values)
}

/// Spread packed values over the full grid using a section 6 bitmap.
///
/// Bitmap: 1 bit per grid point, MSB first, 1 = value present. Points
/// without a value become NaN.
pub fn apply_bitmap(
    packed: &[f32],
    bitmap: &[u8],
    num_points: usize,
) -> Result<Vec<f32>, Grib2Error> {
    if bitmap.len() * 8 < num_points {
        return Err(Grib2Error::UnpackingError(format!(
            "Bitmap covers {} points, grid has {}",
            bitmap.len() * 8,
            num_points
        )));
    }

    let mut next = packed.iter();
    let mut values = Vec::with_capacity(num_points);
    for i in 0..num_points {
        let present = (bitmap[i / 8] >> (7 - (i % 8))) & 1 == 1;
        if present {
            let value = next.next().ok_or_else(|| {
                Grib2Error::UnpackingError(format!(
                    "Bitmap marks more points than the {} packed values",
                    packed.len()
                ))
            })?;
            values.push(*value);
        } else {
            values.push(f32::NAN);
        }
    }

    Ok(values)
}

/// Decode one message with the `grib` crate.
///
/// Missing points come back as NaN.
pub fn decode_with_grib_crate(message: &[u8]) -> Result<Vec<f32>, Grib2Error> {
    let grib_file = grib::from_reader(Cursor::new(message))
        .map_err(|e| Grib2Error::UnpackingError(format!("grib crate parse failed: {}", e)))?;

    let (_, submsg) = grib_file
        .iter()
        .next()
        .ok_or_else(|| Grib2Error::UnpackingError("grib crate found no submessage".into()))?;

    let decoder = grib::Grib2SubmessageDecoder::from(submsg)
        .map_err(|e| Grib2Error::UnpackingError(format!("grib decoder: {}", e)))?;
    let values = decoder
        .dispatch()
        .map_err(|e| Grib2Error::UnpackingError(format!("grib decode: {}", e)))?;

    Ok(values.collect())
}

/// Extract bits from a byte array
/// Returns the bits as a 32-bit unsigned integer
fn extract_bits(data: &[u8], start_bit: usize, num_bits: usize) -> Result<u32, String> {
    if num_bits > 32 || num_bits == 0 {
        return Err(format!("Invalid number of bits: {}", num_bits));
    }

    let mut result = 0u32;

    for i in 0..num_bits {
        let absolute_bit = start_bit + i;
        let byte_idx = absolute_bit / 8;
        let bit_idx = 7 - (absolute_bit % 8); // MSB first

        if byte_idx >= data.len() {
            return Err("Not enough data to extract bits".to_string());
        }

        let bit = (data[byte_idx] >> bit_idx) & 1;
        result = (result << 1) | (bit as u32);
    }

    Ok(result)
}
