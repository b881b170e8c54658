//! Sidecar record describing the downloaded forecast.
//!
//! Written once by the resolver after a successful download, read once by
//! the map renderer to name its output image.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CommonError, CommonResult};

/// File name of the metadata record inside the forecast directory.
pub const METADATA_FILE_NAME: &str = "latest_info.json";

/// File name of the downloaded forecast inside the forecast directory.
pub const FORECAST_FILE_NAME: &str = "latest_forecast.grib2";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastMetadata {
    /// Cycle identifier, e.g. `blend.20240403/02`
    pub latest_cycle: String,
    /// Cycle issuance time, e.g. `2024-04-03T02:00:00Z`
    pub cycle_dt: String,
    /// Lead hours from the cycle to the event, truncated
    pub estimated_forecast_hour: i64,
    /// Lead hours of the candidate that was actually found
    pub actual_forecast_hour: i64,
    /// Remote artifact name that was downloaded
    pub forecast_name: String,
}

impl ForecastMetadata {
    /// Serialize as 4-space indented JSON.
    pub fn to_json_pretty(&self) -> CommonResult<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)
            .map_err(|e| CommonError::json(METADATA_FILE_NAME, e))?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Write the record, replacing any previous one.
    pub fn write(&self, path: &Path) -> CommonResult<()> {
        let body = self.to_json_pretty()?;
        fs::write(path, body).map_err(|e| CommonError::io(path, e))?;
        debug!(path = %path.display(), cycle = %self.latest_cycle, "Wrote forecast metadata");
        Ok(())
    }

    /// Read a record written by [`ForecastMetadata::write`].
    pub fn read(path: &Path) -> CommonResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| CommonError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| CommonError::json(path, e))
    }

    /// Output image name: `forecast_{cycle_dt}_f{actual_forecast_hour}.png`.
    pub fn output_file_name(&self) -> String {
        format!(
            "forecast_{}_f{}.png",
            self.cycle_dt, self.actual_forecast_hour
        )
    }
}
