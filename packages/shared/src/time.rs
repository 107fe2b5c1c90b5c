//! Time-related utilities with clock abstraction for testability.

use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp (milliseconds)
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        current_timestamp()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            fixed_time: fixed_time_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_time
    }
}

/// Get current Unix timestamp (milliseconds)
pub fn current_timestamp() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render a message timestamp as `dd/mm HH:MM` in the local time zone.
///
/// Out-of-range timestamps fall back to the Unix epoch.
pub fn format_message_time(timestamp_millis: i64) -> String {
    local_datetime(timestamp_millis)
        .format("%d/%m %H:%M")
        .to_string()
}

/// Convert Unix timestamp (milliseconds) to RFC 3339 in UTC
pub fn timestamp_to_rfc3339(timestamp_millis: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_millis)
        .single()
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn local_datetime(timestamp_millis: i64) -> DateTime<Local> {
    Utc.timestamp_millis_opt(timestamp_millis)
        .single()
        .unwrap_or_default()
        .with_timezone(&Local)
}
