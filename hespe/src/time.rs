//! HESPE time system
//!
//! HESPE counts seconds since 1979-01-01T00:00:00 UTC. Map products embed that
//! count in their filenames and light curves store it per sample; the event
//! filter URL wants Unix milliseconds instead.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{HespeError, Result};

/// Seconds between the Unix epoch and the HESPE epoch (1979-01-01)
pub const HESPE_TIME_TO_UNIX_TIME: i64 = 283_996_800;

const DATE_OBS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Convert a HESPE timestamp (seconds since 1979-01-01) to UTC.
///
/// Sub-second parts are kept to millisecond resolution.
pub fn hespe_time_to_utc(seconds: f64) -> Result<DateTime<Utc>> {
    let unix_seconds = seconds + HESPE_TIME_TO_UNIX_TIME as f64;
    if !unix_seconds.is_finite() {
        return Err(HespeError::Timestamp(seconds.to_string()));
    }
    let millis = (unix_seconds * 1000.0).round() as i64;
    DateTime::from_timestamp_millis(millis).ok_or_else(|| HespeError::Timestamp(seconds.to_string()))
}

/// Convert UTC to a HESPE timestamp
pub fn utc_to_hespe_time(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0 - HESPE_TIME_TO_UNIX_TIME as f64
}

/// Milliseconds since the Unix epoch, as used by the event filter URL
pub fn unix_millis(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

/// Extract the HESPE timestamp embedded in a product filename.
///
/// The number sits between the first and second underscore, e.g.
/// `hsi_1052841480_coarse_6-12.fits` carries `1052841480`.
pub fn timestamp_from_filename(filename: &str) -> Result<f64> {
    let mut parts = filename.splitn(3, '_');
    parts.next();
    match (parts.next(), parts.next()) {
        (Some(number), Some(_)) => number
            .parse::<f64>()
            .map_err(|_| HespeError::Timestamp(filename.to_string())),
        _ => Err(HespeError::Timestamp(filename.to_string())),
    }
}

/// Format a time as a FITS DATE-OBS value
pub fn format_date_obs(time: DateTime<Utc>) -> String {
    time.format(DATE_OBS_FORMAT).to_string()
}

/// Parse a FITS DATE-OBS value (ISO 8601 without zone, UTC assumed)
pub fn parse_date_obs(value: &str) -> Result<DateTime<Utc>> {
    let normalized = value.trim().trim_end_matches('Z').replacen(' ', "T", 1);
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| HespeError::Timestamp(value.to_string()))
}
