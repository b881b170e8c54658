//! GRIB2 parser implementation (WMO FM 92 GRIB Edition 2).
//!
//! Walks the messages of a GRIB2 file, parses their sections and decodes a
//! selected field together with the latitude and longitude of every grid
//! point.

pub mod error;
pub mod field;
pub mod sections;
pub mod tables;
pub mod unpacking;

pub use error::Grib2Error;
pub use field::{load_field, read_field, FieldGrid};
pub use sections::{
    Bitmap, DataRepresentation, DataSection, GridDefinition, GridProjection, Identification,
    Indicator, ProductDefinition,
};
pub use tables::{Grib2Tables, ParameterEntry};
pub use unpacking::{apply_bitmap, unpack_simple};

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, trace};

/// One decoded GRIB2 message.
///
/// Messages that repeat sections 2-7 (several fields in one message) are
/// read as their first field only.
#[derive(Debug, Clone)]
pub struct Grib2Message {
    /// Byte offset of the message in the file
    pub offset: usize,
    pub indicator: Indicator,
    pub identification: Identification,
    pub grid_definition: GridDefinition,
    pub product_definition: ProductDefinition,
    pub data_representation: DataRepresentation,
    pub bitmap: Option<Bitmap>,
    pub data_section: DataSection,
    raw: Bytes,
}

impl Grib2Message {
    /// Parameter short name, e.g. `TCDC`.
    pub fn parameter(&self) -> &str {
        &self.product_definition.parameter_short_name
    }

    /// Grid dimensions as (nj, ni): rows, then points per row.
    pub fn grid_dims(&self) -> (usize, usize) {
        (
            self.grid_definition.nj as usize,
            self.grid_definition.ni as usize,
        )
    }

    /// Decode the field values in storage order; missing points are NaN.
    pub fn unpack_data(&self) -> Result<Vec<f32>, Grib2Error> {
        let num_points = self.grid_definition.num_data_points as usize;
        let rep = &self.data_representation;

        let values = match rep.template_number {
            0 => {
                let packed = unpack_simple(
                    &self.data_section.data,
                    rep.num_data_points,
                    rep.bits_per_value,
                    rep.reference_value,
                    rep.binary_scale_factor,
                    rep.decimal_scale_factor,
                )?;
                match &self.bitmap {
                    Some(bitmap) => apply_bitmap(&packed, &bitmap.data, num_points)?,
                    None => packed,
                }
            }
            template => {
                trace!(template, "Decoding through the grib crate");
                unpacking::decode_with_grib_crate(&self.raw)?
            }
        };

        if values.len() != num_points {
            return Err(Grib2Error::GridMismatch {
                expected: num_points,
                actual: values.len(),
            });
        }
        Ok(values)
    }
}

/// Sequential reader over the messages in a GRIB2 byte buffer.
pub struct Grib2Reader {
    data: Bytes,
    offset: usize,
    tables: Arc<Grib2Tables>,
}

impl Grib2Reader {
    pub fn new(data: Bytes, tables: Arc<Grib2Tables>) -> Self {
        Self {
            data,
            offset: 0,
            tables,
        }
    }

    /// Parse the next message, or `None` once no further `GRIB` magic is
    /// found.
    pub fn next_message(&mut self) -> Result<Option<Grib2Message>, Grib2Error> {
        let Some(start) = find_magic(&self.data, self.offset) else {
            self.offset = self.data.len();
            return Ok(None);
        };

        let indicator = sections::parse_indicator(&self.data[start..])?;
        let length = usize::try_from(indicator.message_length).unwrap_or(usize::MAX);
        if length < 16 || start.saturating_add(length) > self.data.len() {
            return Err(Grib2Error::InvalidFormat(format!(
                "Message at offset {} claims {} bytes, {} available",
                start,
                indicator.message_length,
                self.data.len() - start
            )));
        }

        let raw = self.data.slice(start..start + length);
        if &raw[length - 4..] != b"7777" {
            return Err(Grib2Error::InvalidFormat(format!(
                "Message at offset {} is missing its end section",
                start
            )));
        }
        self.offset = start + length;

        let identification = sections::parse_identification(&raw)?;
        let grid_definition = sections::parse_grid_definition(&raw)?;
        let product_definition =
            sections::parse_product_definition(&raw, indicator.discipline, &self.tables)?;
        let data_representation = sections::parse_data_representation(&raw)?;
        let bitmap = sections::parse_bitmap(&raw)?;
        let data_section = sections::parse_data_section(&raw)?;

        debug!(
            offset = start,
            parameter = %product_definition.parameter_short_name,
            level = %product_definition.level_description,
            forecast_hour = product_definition.forecast_hour,
            "Parsed GRIB2 message"
        );

        Ok(Some(Grib2Message {
            offset: start,
            indicator,
            identification,
            grid_definition,
            product_definition,
            data_representation,
            bitmap,
            data_section,
            raw,
        }))
    }
}

fn find_magic(data: &[u8], from: usize) -> Option<usize> {
    if from >= data.len() {
        return None;
    }
    data[from..]
        .windows(4)
        .position(|w| w == b"GRIB")
        .map(|pos| from + pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_magic_skips_padding() {
        let data = b"\0\0junkGRIBxx";
        assert_eq!(find_magic(data, 0), Some(6));
        assert_eq!(find_magic(data, 7), None);
        assert_eq!(find_magic(data, 100), None);
    }

    #[test]
    fn test_reader_on_empty_buffer() {
        let mut reader = Grib2Reader::new(Bytes::new(), Arc::new(Grib2Tables::nbm()));
        assert!(reader.next_message().unwrap().is_none());
    }
}
