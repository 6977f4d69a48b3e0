use chrono::{DateTime, SecondsFormat, Utc};

/// Fractional epoch seconds, the unit the scheduler API speaks.
pub fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / 1000.0
}

pub fn epoch_seconds_to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let millis = (seconds * 1000.0).round();
    if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

pub fn epoch_seconds_to_rfc3339(seconds: f64) -> Option<String> {
    epoch_seconds_to_datetime(seconds).map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, false))
}
