//! Cycle resolution and forecast candidate selection.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, TimeZone, Timelike, Utc};
use eclipse_common::metadata::{FORECAST_FILE_NAME, METADATA_FILE_NAME};
use eclipse_common::{format_cycle_dt, ForecastMetadata};
use tracing::{debug, info, warn};

use crate::archive::Archive;
use crate::error::ResolveError;

const IDENTIFIER_PREFIX: &str = "blend.";

/// A model run: run-date directory plus cycle-hour directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// e.g. `blend.20240403`
    pub run_date: String,
    /// e.g. `02`
    pub hour: String,
}

impl Cycle {
    /// `blend.YYYYMMDD/HH`
    pub fn identifier(&self) -> String {
        format!("{}/{}", self.run_date, self.hour)
    }

    /// Archive path holding this cycle's forecast files.
    pub fn core_path(&self) -> String {
        format!("{}/{}/core", self.run_date, self.hour)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.run_date, self.hour)
    }
}

/// An artifact name paired with the lead hours it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastCandidate {
    pub filename: String,
    pub forecast_hour: i64,
}

/// Latest cycle in the archive by plain string order of the directory names.
///
/// Run-dates are zero-padded so string order is chronological; no date
/// parsing happens here.
pub async fn resolve_latest_cycle(archive: &dyn Archive) -> Result<Cycle, ResolveError> {
    let run_dates = archive.list("").await?;
    let run_date = latest_entry(&run_dates).ok_or_else(|| ResolveError::ArchiveEmpty {
        path: archive.location(),
    })?;

    let hours = archive.list(run_date).await?;
    let hour = latest_entry(&hours).ok_or_else(|| ResolveError::ArchiveEmpty {
        path: run_date.to_string(),
    })?;

    debug!(
        run_dates = run_dates.len(),
        cycles = hours.len(),
        run_date = %run_date,
        hour = %hour,
        "Resolved latest cycle"
    );
    Ok(Cycle {
        run_date: run_date.to_string(),
        hour: hour.to_string(),
    })
}

fn latest_entry(entries: &[String]) -> Option<&str> {
    entries.iter().max().map(String::as_str)
}

/// Parse `blend.YYYYMMDD/HH` into the cycle issuance time.
pub fn cycle_identifier_to_timestamp(identifier: &str) -> Result<DateTime<Utc>, ResolveError> {
    let expected_len = IDENTIFIER_PREFIX.len() + 8 + 1 + 2;
    if identifier.len() != expected_len {
        return Err(ResolveError::malformed(
            identifier,
            format!("expected {} characters, got {}", expected_len, identifier.len()),
        ));
    }
    let rest = identifier
        .strip_prefix(IDENTIFIER_PREFIX)
        .ok_or_else(|| ResolveError::malformed(identifier, "missing 'blend.' prefix"))?;

    let (date, hour) = rest
        .split_once('/')
        .filter(|(date, _)| date.len() == 8)
        .ok_or_else(|| ResolveError::malformed(identifier, "expected '/' after the run date"))?;

    // All ASCII digits from here on, so byte slicing is safe
    digits(identifier, date)?;
    let year = digits(identifier, &date[0..4])?;
    let month = digits(identifier, &date[4..6])?;
    let day = digits(identifier, &date[6..8])?;
    let hour = digits(identifier, hour)?;

    let date = NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| ResolveError::malformed(identifier, "not a calendar date"))?;
    let naive = date
        .and_hms_opt(hour, 0, 0)
        .ok_or_else(|| ResolveError::malformed(identifier, format!("hour {} out of range", hour)))?;
    Ok(Utc.from_utc_datetime(&naive))
}

fn digits(identifier: &str, field: &str) -> Result<u32, ResolveError> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ResolveError::malformed(
            identifier,
            format!("'{}' is not numeric", field),
        ));
    }
    field
        .parse()
        .map_err(|_| ResolveError::malformed(identifier, format!("'{}' is not numeric", field)))
}

/// Whole hours from the cycle to the target, truncated toward zero.
pub fn desired_lead_hours(cycle: &DateTime<Utc>, target: &DateTime<Utc>) -> i64 {
    (*target - *cycle).num_seconds() / 3600
}

/// Candidates for lead hours `desired, desired - 1, ...`, `max_fallback` in
/// total, best first.
///
/// Every candidate names the file of the desired lead hour; only the paired
/// offset steps down. Negative lead hours give names that never match.
pub fn generate_candidates(
    cycle_hour: u32,
    desired_lead_hours: i64,
    max_fallback: usize,
) -> Vec<ForecastCandidate> {
    let filename = forecast_filename(cycle_hour, desired_lead_hours);
    (0..max_fallback as i64)
        .map(|step| ForecastCandidate {
            filename: filename.clone(),
            forecast_hour: desired_lead_hours - step,
        })
        .collect()
}

fn forecast_filename(cycle_hour: u32, lead_hours: i64) -> String {
    format!("blend.t{:02}z.core.f{:03}.co.grib2", cycle_hour, lead_hours)
}

/// First candidate, in candidate order, whose file is in the listing.
pub fn select_available(
    cycle: &str,
    candidates: &[ForecastCandidate],
    listing: &[String],
) -> Result<ForecastCandidate, ResolveError> {
    candidates
        .iter()
        .find(|c| listing.iter().any(|name| *name == c.filename))
        .cloned()
        .ok_or_else(|| ResolveError::NoMatchingForecast {
            cycle: cycle.to_string(),
            tried: candidates
                .iter()
                .map(|c| format!("{} (f{})", c.filename, c.forecast_hour))
                .collect(),
        })
}

/// Settings for one resolver run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub output_dir: PathBuf,
    pub target_time: DateTime<Utc>,
    pub max_fallback: usize,
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub metadata: ForecastMetadata,
    pub forecast_path: PathBuf,
    pub metadata_path: PathBuf,
    pub bytes: u64,
}

/// Resolve, download and record the forecast closest to the target time.
///
/// The metadata record is only written once the download has finished.
pub async fn run(archive: &dyn Archive, config: &RunConfig) -> Result<RunSummary, ResolveError> {
    info!(archive = %archive.location(), "Resolving latest forecast cycle");

    let cycle = resolve_latest_cycle(archive).await?;
    let identifier = cycle.identifier();
    let cycle_dt = cycle_identifier_to_timestamp(&identifier)?;
    let desired = desired_lead_hours(&cycle_dt, &config.target_time);
    info!(
        cycle = %identifier,
        cycle_dt = %format_cycle_dt(&cycle_dt),
        target = %format_cycle_dt(&config.target_time),
        desired_lead_hours = desired,
        "Latest cycle"
    );
    if desired < 0 {
        warn!(desired_lead_hours = desired, "Cycle is already past the target time");
    }

    let listing = archive.list(&cycle.core_path()).await?;
    let candidates = generate_candidates(cycle_dt.hour(), desired, config.max_fallback);
    let selected = select_available(&identifier, &candidates, &listing)?;
    if selected.forecast_hour != desired {
        info!(
            desired = desired,
            actual = selected.forecast_hour,
            "Using fallback forecast hour"
        );
    }

    let forecast_path = config.output_dir.join(FORECAST_FILE_NAME);
    let remote = format!("{}/{}", cycle.core_path(), selected.filename);
    let bytes = archive.fetch(&remote, &forecast_path).await?;

    let metadata = ForecastMetadata {
        latest_cycle: identifier,
        cycle_dt: format_cycle_dt(&cycle_dt),
        estimated_forecast_hour: desired,
        actual_forecast_hour: selected.forecast_hour,
        forecast_name: selected.filename,
    };
    let metadata_path = config.output_dir.join(METADATA_FILE_NAME);
    metadata.write(&metadata_path)?;

    info!(
        forecast = %metadata.forecast_name,
        path = %forecast_path.display(),
        bytes = bytes,
        "Forecast downloaded"
    );
    Ok(RunSummary {
        metadata,
        forecast_path,
        metadata_path,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_latest_entry_is_string_maximum() {
        let entries = names(&["blend.20240402", "blend.20240403", "blend.20240401"]);
        assert_eq!(latest_entry(&entries), Some("blend.20240403"));
    }

    #[test]
    fn test_latest_entry_is_not_date_aware() {
        // April 9 without padding sorts after April 10 as a string
        let entries = names(&["blend.20240410", "blend.2024049"]);
        assert_eq!(latest_entry(&entries), Some("blend.2024049"));
        assert_eq!(latest_entry(&[]), None);
    }

    #[test]
    fn test_identifier_to_timestamp() {
        let dt = cycle_identifier_to_timestamp("blend.20240403/02").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 4, 3, 2, 0, 0).unwrap());
    }

    #[test]
    fn test_malformed_identifiers() {
        for id in [
            "",
            "blend.20240403/2",
            "blend.2024040/023",
            "blend-20240403/02",
            "blend.2024a403/02",
            "blend.20240403-02",
            "blend.20240231/02",
            "blend.20240403/24",
            "blend.20240403/+2",
        ] {
            let err = cycle_identifier_to_timestamp(id).unwrap_err();
            assert!(
                matches!(err, ResolveError::MalformedIdentifier { .. }),
                "{} gave {:?}",
                id,
                err
            );
        }
    }

    #[test]
    fn test_desired_lead_hours() {
        let cycle = Utc.with_ymd_and_hms(2024, 4, 3, 2, 0, 0).unwrap();
        let target = Utc.with_ymd_and_hms(2024, 4, 8, 18, 0, 0).unwrap();
        assert_eq!(desired_lead_hours(&cycle, &target), 136);

        let half_past = Utc.with_ymd_and_hms(2024, 4, 8, 18, 30, 0).unwrap();
        assert_eq!(desired_lead_hours(&cycle, &half_past), 136);
    }

    #[test]
    fn test_desired_lead_hours_truncates_toward_zero() {
        let cycle = Utc.with_ymd_and_hms(2024, 4, 8, 20, 30, 0).unwrap();
        let target = Utc.with_ymd_and_hms(2024, 4, 8, 18, 0, 0).unwrap();
        assert_eq!(desired_lead_hours(&cycle, &target), -2);
    }

    #[test]
    fn test_generate_candidates_reuses_desired_filename() {
        let candidates = generate_candidates(2, 136, 6);
        assert_eq!(candidates.len(), 6);
        assert!(candidates
            .iter()
            .all(|c| c.filename == "blend.t02z.core.f136.co.grib2"));
        let hours: Vec<i64> = candidates.iter().map(|c| c.forecast_hour).collect();
        assert_eq!(hours, vec![136, 135, 134, 133, 132, 131]);
    }

    #[test]
    fn test_generate_candidates_padding() {
        let candidates = generate_candidates(14, 7, 1);
        assert_eq!(candidates[0].filename, "blend.t14z.core.f007.co.grib2");
        assert!(generate_candidates(14, 7, 0).is_empty());
    }

    #[test]
    fn test_select_first_match_wins() {
        let candidates = vec![
            ForecastCandidate {
                filename: "a.grib2".to_string(),
                forecast_hour: 10,
            },
            ForecastCandidate {
                filename: "b.grib2".to_string(),
                forecast_hour: 9,
            },
            ForecastCandidate {
                filename: "c.grib2".to_string(),
                forecast_hour: 8,
            },
        ];
        let listing = names(&["c.grib2", "b.grib2"]);
        let selected = select_available("blend.20240403/02", &candidates, &listing).unwrap();
        assert_eq!(selected.forecast_hour, 9);
    }

    #[test]
    fn test_select_with_identical_filenames_takes_desired_hour() {
        let candidates = generate_candidates(2, 136, 6);
        let listing = names(&["blend.t02z.core.f136.co.grib2"]);
        let selected = select_available("blend.20240403/02", &candidates, &listing).unwrap();
        assert_eq!(selected.forecast_hour, 136);
    }

    #[test]
    fn test_select_nothing_available() {
        let candidates = generate_candidates(2, 136, 2);
        let listing = names(&["blend.t02z.core.f135.co.grib2"]);
        match select_available("blend.20240403/02", &candidates, &listing) {
            Err(ResolveError::NoMatchingForecast { cycle, tried }) => {
                assert_eq!(cycle, "blend.20240403/02");
                assert_eq!(tried.len(), 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_cycle_paths() {
        let cycle = Cycle {
            run_date: "blend.20240403".to_string(),
            hour: "02".to_string(),
        };
        assert_eq!(cycle.identifier(), "blend.20240403/02");
        assert_eq!(cycle.core_path(), "blend.20240403/02/core");
        assert_eq!(cycle.to_string(), cycle.identifier());
    }
}
