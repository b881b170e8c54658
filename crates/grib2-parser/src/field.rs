//! Field selection: one named parameter with its grid coordinates.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use eclipse_common::WeatherSample;
use projection::{GridGeometry, LambertConformal, LatLonGrid};
use tracing::{debug, info};

use crate::sections::{GridDefinition, GridProjection};
use crate::tables::Grib2Tables;
use crate::{Grib2Error, Grib2Message, Grib2Reader};

// Flag table 3.4
const SCAN_NEGATIVE_I: u8 = 0x80;
const SCAN_POSITIVE_J: u8 = 0x40;
const SCAN_J_CONSECUTIVE: u8 = 0x20;
const SCAN_BOUSTROPHEDON: u8 = 0x10;

/// A decoded field in storage order, with coordinates per point.
#[derive(Debug, Clone)]
pub struct FieldGrid {
    pub parameter: String,
    pub reference_time: DateTime<Utc>,
    pub forecast_hour: u32,
    pub ni: usize,
    pub nj: usize,
    /// NaN marks a missing point
    pub values: Vec<f32>,
    pub lats: Vec<f64>,
    /// Normalized to [-180, 180)
    pub lons: Vec<f64>,
}

impl FieldGrid {
    /// Every non-missing point as a sample, in grid order.
    pub fn samples(&self) -> Vec<WeatherSample> {
        self.values
            .iter()
            .zip(self.lats.iter().zip(self.lons.iter()))
            .filter(|(value, _)| !value.is_nan())
            .map(|(&value, (&lat, &lon))| WeatherSample::new(lat, lon, value))
            .collect()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }
}

/// Read a GRIB2 file and decode the first message carrying `parameter`.
pub fn load_field(path: &Path, parameter: &str) -> Result<FieldGrid, Grib2Error> {
    let data = std::fs::read(path).map_err(|source| Grib2Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        size = data.len(),
        parameter,
        "Loading forecast field"
    );
    read_field(Bytes::from(data), parameter)
}

/// Decode the first message carrying `parameter` from an in-memory file.
///
/// `parameter` is a short name (`TCDC`) or a full name (`Total Cloud Cover`).
pub fn read_field(data: Bytes, parameter: &str) -> Result<FieldGrid, Grib2Error> {
    let tables = Grib2Tables::nbm();
    let short_name = tables
        .by_name(parameter)
        .map(|entry| entry.short_name)
        .unwrap_or(parameter);
    let mut reader = Grib2Reader::new(data, Arc::new(tables));
    let mut scanned = 0usize;

    while let Some(message) = reader.next_message()? {
        scanned += 1;
        if message.parameter() == short_name {
            debug!(
                parameter,
                offset = message.offset,
                scanned,
                "Found field"
            );
            return field_from_message(&message);
        }
    }

    Err(Grib2Error::FieldNotFound(parameter.to_string()))
}

fn field_from_message(message: &Grib2Message) -> Result<FieldGrid, Grib2Error> {
    let grid = &message.grid_definition;
    let (nj, ni) = message.grid_dims();
    if ni * nj != grid.num_data_points as usize {
        return Err(Grib2Error::GridMismatch {
            expected: grid.num_data_points as usize,
            actual: ni * nj,
        });
    }

    let values = message.unpack_data()?;
    let (lats, lons) = grid_coordinates(grid)?;

    let field = FieldGrid {
        parameter: message.parameter().to_string(),
        reference_time: message.identification.reference_time,
        forecast_hour: message.product_definition.forecast_hour,
        ni,
        nj,
        values,
        lats,
        lons,
    };
    info!(
        parameter = %field.parameter,
        reference_time = %field.reference_time,
        forecast_hour = field.forecast_hour,
        ni,
        nj,
        missing = field.missing_count(),
        "Decoded field"
    );
    Ok(field)
}

/// Latitude and longitude of every point, in storage order.
pub fn grid_coordinates(grid: &GridDefinition) -> Result<(Vec<f64>, Vec<f64>), Grib2Error> {
    if grid.scanning_mode & SCAN_J_CONSECUTIVE != 0 {
        return Err(Grib2Error::UnsupportedTemplate {
            section: 3,
            template: grid.template_number,
        });
    }

    let (ni, nj) = (grid.ni as usize, grid.nj as usize);
    let geometry: Box<dyn GridGeometry> = match grid.projection {
        GridProjection::LatLon {
            la1, lo1, di, dj, ..
        } => Box::new(LatLonGrid::new(la1, lo1, dj, di, ni, nj)?),
        GridProjection::Lambert {
            la1,
            lo1,
            lov,
            dx,
            dy,
            latin1,
            latin2,
            ..
        } => Box::new(LambertConformal::from_grib2(
            la1,
            lo1,
            lov,
            latin1,
            latin2,
            dx,
            dy,
            ni,
            nj,
            grid.earth_radius,
        )?),
        GridProjection::Unsupported => {
            return Err(Grib2Error::UnsupportedTemplate {
                section: 3,
                template: grid.template_number,
            })
        }
    };

    let i_step = if grid.scanning_mode & SCAN_NEGATIVE_I != 0 {
        -1.0
    } else {
        1.0
    };
    let j_step = if grid.scanning_mode & SCAN_POSITIVE_J != 0 {
        1.0
    } else {
        -1.0
    };
    let boustrophedon = grid.scanning_mode & SCAN_BOUSTROPHEDON != 0;

    let mut lats = Vec::with_capacity(ni * nj);
    let mut lons = Vec::with_capacity(ni * nj);
    for row in 0..nj {
        for col in 0..ni {
            let col = if boustrophedon && row % 2 == 1 {
                ni - 1 - col
            } else {
                col
            };
            let (lat, lon) = geometry.grid_to_geo(col as f64 * i_step, row as f64 * j_step);
            lats.push(lat);
            lons.push(lon);
        }
    }

    Ok((lats, lons))
}
