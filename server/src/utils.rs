use chrono::{SecondsFormat, Utc};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// Get current timestamp in milliseconds
pub fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}

// Wall clock as RFC 3339 with millisecond precision, e.g. 2024-05-01T12:00:00.000Z
pub fn server_time() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
