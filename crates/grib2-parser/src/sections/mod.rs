//! GRIB2 section parsing.
//!
//! This module handles parsing of individual GRIB2 message sections.
//! Each GRIB2 message consists of multiple sections containing
//! metadata, grid information, and compressed data.
//!
//! Every function takes the bytes of one complete message, starting at the
//! `GRIB` magic.

use crate::tables::Grib2Tables;
use crate::Grib2Error;
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;

/// Section 0: Indicator Section (16 bytes)
#[derive(Debug, Clone)]
pub struct Indicator {
    pub discipline: u8,
    pub edition: u8,
    pub message_length: u64,
}

/// Section 1: Identification Section
#[derive(Debug, Clone)]
pub struct Identification {
    pub center: u16,
    pub sub_center: u16,
    pub table_version: u8,
    pub local_table_version: u8,
    pub significance_of_reference_time: u8,
    pub reference_time: DateTime<Utc>,
    pub production_status: u8,
    pub data_type: u8,
}

/// Grid geometry carried by section 3, in degrees and meters.
#[derive(Debug, Clone, PartialEq)]
pub enum GridProjection {
    /// Template 3.0: regular latitude/longitude
    LatLon {
        la1: f64,
        lo1: f64,
        la2: f64,
        lo2: f64,
        di: f64,
        dj: f64,
    },
    /// Template 3.30: Lambert conformal
    Lambert {
        la1: f64,
        lo1: f64,
        lad: f64,
        lov: f64,
        dx: f64,
        dy: f64,
        latin1: f64,
        latin2: f64,
    },
    /// Any other template; only the dimensions are known.
    Unsupported,
}

/// Section 3: Grid Definition Section
#[derive(Debug, Clone)]
pub struct GridDefinition {
    pub template_number: u16,
    pub num_data_points: u32,
    pub shape_of_earth: u8,
    pub earth_radius: f64,
    /// Points along a row (x)
    pub ni: u32,
    /// Number of rows (y)
    pub nj: u32,
    pub scanning_mode: u8,
    pub projection: GridProjection,
}

/// Section 4: Product Definition Section
#[derive(Debug, Clone)]
pub struct ProductDefinition {
    pub template_number: u16,
    pub parameter_category: u8,
    pub parameter_number: u8,
    pub parameter_short_name: String,
    pub level_type: u8,
    pub level_value: u32,
    pub level_description: String,
    pub forecast_hour: u32,
}

/// Section 5: Data Representation Section
#[derive(Debug, Clone)]
pub struct DataRepresentation {
    /// Number of packed values (grid points with data)
    pub num_data_points: u32,
    pub template_number: u16,
    pub original_data_type: u8,
    pub reference_value: f32,
    pub binary_scale_factor: i16,
    pub decimal_scale_factor: i16,
    pub bits_per_value: u8,
}

/// Section 6: Bitmap Section
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub indicator: u8,
    pub data: Bytes,
}

/// Section 7: Data Section
#[derive(Debug, Clone)]
pub struct DataSection {
    pub data: Bytes,
}

// ===== Parsing Functions =====

/// Parse Section 0 (Indicator) from start of message
pub fn parse_indicator(data: &[u8]) -> Result<Indicator, Grib2Error> {
    if data.len() < 16 {
        return Err(Grib2Error::InvalidFormat(
            "Not enough data for indicator section".to_string(),
        ));
    }

    if &data[0..4] != b"GRIB" {
        return Err(Grib2Error::InvalidFormat(
            "Invalid GRIB magic bytes".to_string(),
        ));
    }

    // Octets 1-4: "GRIB", 5-6: reserved, 7: discipline, 8: edition,
    // 9-16: total length of the message
    let discipline = data[6];
    let edition = data[7];
    let message_length = read_u64(&data[8..16]);

    if edition != 2 {
        return Err(Grib2Error::InvalidFormat(format!(
            "Expected GRIB edition 2, got {}",
            edition
        )));
    }

    Ok(Indicator {
        discipline,
        edition,
        message_length,
    })
}

/// Parse Section 1 (Identification)
/// Located at offset 16 in the message
pub fn parse_identification(data: &[u8]) -> Result<Identification, Grib2Error> {
    const OFFSET: usize = 16;

    if data.len() < OFFSET + 21 {
        return Err(Grib2Error::InvalidSection {
            section: 1,
            reason: "Not enough data".to_string(),
        });
    }

    // Skip section header (4 bytes) and section number (1 byte)
    let sec_data = &data[OFFSET + 5..];

    let center = u16::from_be_bytes([sec_data[0], sec_data[1]]);
    let sub_center = u16::from_be_bytes([sec_data[2], sec_data[3]]);
    let table_version = sec_data[4];
    let local_table_version = sec_data[5];
    let significance_of_reference_time = sec_data[6];

    // Reference time
    let year = u16::from_be_bytes([sec_data[7], sec_data[8]]);
    let month = sec_data[9];
    let day = sec_data[10];
    let hour = sec_data[11];
    let minute = sec_data[12];
    let second = sec_data[13];

    let reference_time = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .and_then(|date| date.and_hms_opt(hour as u32, minute as u32, second as u32))
        .ok_or_else(|| Grib2Error::InvalidSection {
            section: 1,
            reason: format!(
                "Invalid date: {}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            ),
        })?;

    let reference_time = DateTime::<Utc>::from_naive_utc_and_offset(reference_time, Utc);

    let production_status = sec_data.get(14).copied().unwrap_or(0);
    let data_type = sec_data.get(15).copied().unwrap_or(0);

    Ok(Identification {
        center,
        sub_center,
        table_version,
        local_table_version,
        significance_of_reference_time,
        reference_time,
        production_status,
        data_type,
    })
}

/// Parse Section 3 (Grid Definition)
pub fn parse_grid_definition(data: &[u8]) -> Result<GridDefinition, Grib2Error> {
    let section_data = section_slice(data, 3)?;
    if section_data.len() < 38 {
        return Err(Grib2Error::InvalidSection {
            section: 3,
            reason: "Not enough data".to_string(),
        });
    }

    // Section 3 structure:
    // Bytes 0-3: Section length
    // Byte 4: Section number (3)
    // Byte 5: Source of grid definition
    // Bytes 6-9: Number of data points (u32)
    // Byte 10: Number of optional list
    // Byte 11: Interpretation of optional list
    // Bytes 12-13: Grid definition template number (u16)
    // Bytes 14+: Template-specific data
    let num_data_points = read_u32(&section_data[6..10]);
    let template_number = u16::from_be_bytes([section_data[12], section_data[13]]);

    // Template data starts at byte 14. Templates 3.0 and 3.30 share the
    // earth shape block (bytes 0-15) and Ni/Nj (bytes 16-23).
    let gd = &section_data[14..];
    let shape_of_earth = gd[0];
    let earth_radius = earth_radius(shape_of_earth, gd[1], read_u32(&gd[2..6]));
    let ni = read_u32(&gd[16..20]);
    let nj = read_u32(&gd[20..24]);

    let (projection, scanning_mode) = match template_number {
        0 => {
            // Template 3.0: Latitude/longitude
            // Bytes 32-35: La1, 36-39: Lo1 (microdegrees, sign-magnitude)
            // Byte 40: Resolution and component flags
            // Bytes 41-44: La2, 45-48: Lo2
            // Bytes 49-52: Di, 53-56: Dj
            // Byte 57: Scanning mode (flags)
            require_len(gd, 58, template_number)?;
            (
                GridProjection::LatLon {
                    la1: micro(read_i32(&gd[32..36])),
                    lo1: micro(read_i32(&gd[36..40])),
                    la2: micro(read_i32(&gd[41..45])),
                    lo2: micro(read_i32(&gd[45..49])),
                    di: micro(read_u32(&gd[49..53]) as i64),
                    dj: micro(read_u32(&gd[53..57]) as i64),
                },
                gd[57],
            )
        }
        30 => {
            // Template 3.30: Lambert conformal
            // Bytes 24-27: La1, 28-31: Lo1 (microdegrees)
            // Byte 32: Resolution and component flags
            // Bytes 33-36: LaD, 37-40: LoV
            // Bytes 41-44: Dx, 45-48: Dy (millimeters)
            // Byte 49: Projection centre flag
            // Byte 50: Scanning mode
            // Bytes 51-54: Latin1, 55-58: Latin2
            require_len(gd, 59, template_number)?;
            (
                GridProjection::Lambert {
                    la1: micro(read_i32(&gd[24..28])),
                    lo1: micro(read_i32(&gd[28..32])),
                    lad: micro(read_i32(&gd[33..37])),
                    lov: micro(read_i32(&gd[37..41])),
                    dx: read_u32(&gd[41..45]) as f64 / 1000.0,
                    dy: read_u32(&gd[45..49]) as f64 / 1000.0,
                    latin1: micro(read_i32(&gd[51..55])),
                    latin2: micro(read_i32(&gd[55..59])),
                },
                gd[50],
            )
        }
        _ => (GridProjection::Unsupported, 0),
    };

    Ok(GridDefinition {
        template_number,
        num_data_points,
        shape_of_earth,
        earth_radius,
        ni,
        nj,
        scanning_mode,
        projection,
    })
}

/// Parse Section 4 (Product Definition)
pub fn parse_product_definition(
    data: &[u8],
    discipline: u8,
    tables: &Grib2Tables,
) -> Result<ProductDefinition, Grib2Error> {
    let section_data = section_slice(data, 4)?;

    if section_data.len() < 11 {
        return Err(Grib2Error::InvalidSection {
            section: 4,
            reason: "Not enough data".to_string(),
        });
    }

    // GRIB2 Section 4 structure:
    // Bytes 0-3: Section length
    // Byte 4: Section number (4)
    // Bytes 5-6: Number of coordinate values
    // Bytes 7-8: Product definition template number
    // Byte 9: Parameter category
    // Byte 10: Parameter number
    // ... (rest depends on template)
    let template_number = u16::from_be_bytes([section_data[7], section_data[8]]);
    let parameter_category = section_data[9];
    let parameter_number = section_data[10];

    // Templates 4.0-4.15 share this layout:
    // Byte 18-21: Forecast time (4 bytes)
    // Byte 22: Type of first fixed surface
    // Byte 23: Scale factor of first fixed surface
    // Byte 24-27: Scaled value of first fixed surface (4 bytes)
    let forecast_hour = if section_data.len() >= 22 {
        read_u32(&section_data[18..22])
    } else {
        0
    };

    let level_type = section_data.get(22).copied().unwrap_or(1);
    let level_value = if section_data.len() >= 28 {
        read_u32(&section_data[24..28])
    } else {
        0
    };

    let parameter_short_name =
        tables.get_parameter_name(discipline, parameter_category, parameter_number);
    let level_description = tables.get_level_description(level_type, level_value);

    Ok(ProductDefinition {
        template_number,
        parameter_category,
        parameter_number,
        parameter_short_name,
        level_type,
        level_value,
        level_description,
        forecast_hour,
    })
}

/// Parse Section 5 (Data Representation)
pub fn parse_data_representation(data: &[u8]) -> Result<DataRepresentation, Grib2Error> {
    let section_data = section_slice(data, 5)?;

    if section_data.len() < 11 {
        return Err(Grib2Error::InvalidSection {
            section: 5,
            reason: "Not enough data".to_string(),
        });
    }

    // Section 5 structure (GRIB2 spec):
    // Octets 1-4 [0-3]: Section length
    // Octet 5 [4]: Section number (5)
    // Octets 6-9 [5-8]: Number of data points (N)
    // Octets 10-11 [9-10]: Data representation template number
    // Octets 12+ [11+]: Template-specific data
    //
    // Templates 5.0, 5.2, 5.3, 5.40 and 5.41 all start with:
    // Octets 12-15 [11-14]: Reference value (R) - IEEE 32-bit float
    // Octets 16-17 [15-16]: Binary scale factor (E) - sign-magnitude 16-bit
    // Octets 18-19 [17-18]: Decimal scale factor (D) - sign-magnitude 16-bit
    // Octet 20 [19]: Number of bits per packed value
    // Octet 21 [20]: Type of original field values
    let num_data_points = read_u32(&section_data[5..9]);
    let template_number = u16::from_be_bytes([section_data[9], section_data[10]]);

    let template_data = &section_data[11..];

    let reference_value = if template_data.len() >= 4 {
        f32::from_be_bytes([
            template_data[0],
            template_data[1],
            template_data[2],
            template_data[3],
        ])
    } else {
        0.0
    };
    let binary_scale_factor = if template_data.len() >= 6 {
        read_i16(&template_data[4..6])
    } else {
        0
    };
    let decimal_scale_factor = if template_data.len() >= 8 {
        read_i16(&template_data[6..8])
    } else {
        0
    };
    let bits_per_value = template_data.get(8).copied().unwrap_or(0);
    let original_data_type = template_data.get(9).copied().unwrap_or(0);

    Ok(DataRepresentation {
        num_data_points,
        template_number,
        original_data_type,
        reference_value,
        binary_scale_factor,
        decimal_scale_factor,
        bits_per_value,
    })
}

/// Parse Section 6 (Bitmap).
///
/// Returns `None` when the message says no bitmap applies (indicator 255).
pub fn parse_bitmap(data: &[u8]) -> Result<Option<Bitmap>, Grib2Error> {
    let section_data = section_slice(data, 6)?;

    if section_data.len() < 6 {
        return Err(Grib2Error::InvalidSection {
            section: 6,
            reason: "Not enough data".to_string(),
        });
    }

    match section_data[5] {
        255 => Ok(None),
        0 => Ok(Some(Bitmap {
            indicator: 0,
            data: Bytes::copy_from_slice(&section_data[6..]),
        })),
        other => Err(Grib2Error::InvalidSection {
            section: 6,
            reason: format!("Unsupported bitmap indicator {}", other),
        }),
    }
}

/// Parse Section 7 (Data)
pub fn parse_data_section(data: &[u8]) -> Result<DataSection, Grib2Error> {
    let section_data = section_slice(data, 7)?;

    Ok(DataSection {
        data: Bytes::copy_from_slice(&section_data[5..]),
    })
}

// ===== Helper Functions =====

/// Bytes of the first section with the given number, header included.
fn section_slice(data: &[u8], section_num: u8) -> Result<&[u8], Grib2Error> {
    let offset = find_section(data, section_num)?;
    let length = read_u32(&data[offset..offset + 4]) as usize;
    Ok(&data[offset..offset + length])
}

/// Find a section by number within a message
fn find_section(data: &[u8], section_num: u8) -> Result<usize, Grib2Error> {
    let mut offset = 16; // After Section 0

    loop {
        if offset + 4 <= data.len() && &data[offset..offset + 4] == b"7777" {
            return Err(Grib2Error::InvalidSection {
                section: section_num,
                reason: "Reached end of message without finding section".to_string(),
            });
        }

        if offset + 5 > data.len() {
            return Err(Grib2Error::InvalidSection {
                section: section_num,
                reason: "Section not found".to_string(),
            });
        }

        let section_length = read_u32(&data[offset..offset + 4]) as usize;

        if section_length < 5 || offset + section_length > data.len() {
            return Err(Grib2Error::InvalidSection {
                section: section_num,
                reason: "Invalid section length".to_string(),
            });
        }

        if data[offset + 4] == section_num {
            return Ok(offset);
        }

        offset += section_length;
    }
}

fn require_len(gd: &[u8], needed: usize, template: u16) -> Result<(), Grib2Error> {
    if gd.len() < needed {
        return Err(Grib2Error::InvalidSection {
            section: 3,
            reason: format!(
                "Template {} needs at least {} bytes, got {}",
                template,
                needed,
                gd.len()
            ),
        });
    }
    Ok(())
}

/// Radius of the spherical earth for a shape code (code table 3.2).
fn earth_radius(shape: u8, scale_factor: u8, scaled_value: u32) -> f64 {
    match shape {
        0 => 6_367_470.0,
        1 => scaled_value as f64 / 10f64.powi(scale_factor as i32),
        6 => 6_371_229.0,
        8 => 6_371_200.0,
        other => {
            warn!(shape = other, "Non-spherical earth shape, using 6371229 m sphere");
            6_371_229.0
        }
    }
}

fn micro(value: i64) -> f64 {
    value as f64 / 1_000_000.0
}

fn read_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

fn read_u64(b: &[u8]) -> u64 {
    u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

/// Decode a 4-byte GRIB2 signed integer.
///
/// GRIB2 signed integers are sign-magnitude, not two's complement. Any
/// other slice length decodes as 0.
pub fn decode_grib2_signed(bytes: &[u8]) -> i32 {
    if bytes.len() != 4 {
        return 0;
    }
    let raw = read_u32(bytes);
    let magnitude = (raw & 0x7fff_ffff) as i32;
    if raw & 0x8000_0000 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

fn read_i32(b: &[u8]) -> i64 {
    decode_grib2_signed(b) as i64
}

fn read_i16(b: &[u8]) -> i16 {
    let raw = u16::from_be_bytes([b[0], b[1]]);
    let magnitude = (raw & 0x7fff) as i16;
    if raw & 0x8000 != 0 {
        -magnitude
    } else {
        magnitude
    }
}
