//! Time handling for the eclipse event and forecast cycles.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::error::{CommonError, CommonResult};

/// Totality over Texas, 2024-04-08 18:00 UTC.
pub const ECLIPSE_DATETIME: &str = "2024-04-08T18:00:00Z";

/// Seconds since the Unix epoch of [`ECLIPSE_DATETIME`].
const ECLIPSE_UNIX_SECONDS: i64 = 1_712_599_200;

/// The fixed event time the forecast is resolved against.
pub fn eclipse_datetime() -> DateTime<Utc> {
    // In range for nanosecond timestamps until 2262
    Utc.timestamp_nanos(ECLIPSE_UNIX_SECONDS * 1_000_000_000)
}

/// Parse an ISO 8601 UTC timestamp.
///
/// Accepts RFC 3339 with any offset (converted to UTC) and the bare
/// `YYYY-MM-DDTHH:MM:SS` form, which is taken as UTC.
pub fn parse_utc_time(s: &str) -> CommonResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    Err(CommonError::InvalidTime(s.to_string()))
}

/// Format a cycle issuance time the way the metadata record stores it,
/// e.g. `2024-04-03T02:00:00Z`.
pub fn format_cycle_dt(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
