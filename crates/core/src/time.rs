//! Calendar decomposition of event timestamps.
//!
//! The warehouse derives the `time` dimension with `EXTRACT` on a timestamp
//! built from the raw epoch value. [`TimeParts`] computes the same fields in
//! Rust so loaded rows can be checked against an independent source.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};

/// Unit of the epoch values stored in `staging_events.ts`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampUnit {
    #[default]
    Seconds,
    Milliseconds,
}

impl TimestampUnit {
    /// Parses a unit name as written in the config file.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "seconds" => Some(Self::Seconds),
            "ms" | "millis" | "milliseconds" => Some(Self::Milliseconds),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seconds => "seconds",
            Self::Milliseconds => "milliseconds",
        }
    }

    /// Whole epoch seconds for a raw value, truncating like integer division in SQL.
    pub fn to_seconds(&self, value: i64) -> i64 {
        match self {
            Self::Seconds => value,
            Self::Milliseconds => value / 1000,
        }
    }

    /// SQL expression turning `column` into a `TIMESTAMP`.
    ///
    /// `TIMESTAMP 'epoch' + n * INTERVAL '1 second'` is understood by both
    /// Redshift and Postgres.
    pub fn timestamp_expr(&self, column: &str) -> String {
        let seconds = match self {
            Self::Seconds => column.to_string(),
            Self::Milliseconds => format!("({column} / 1000)"),
        };
        format!("TIMESTAMP 'epoch' + {seconds} * INTERVAL '1 second'")
    }
}

/// Calendar fields of one `time` dimension row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParts {
    pub start_time: NaiveDateTime,
    pub hour: u32,
    pub day: u32,
    /// ISO-8601 week number, as returned by `EXTRACT(week ...)`.
    pub week: u32,
    pub month: u32,
    pub year: i32,
    /// Day of week with Sunday = 0, as returned by `EXTRACT(dow ...)`.
    pub weekday: u32,
}

impl TimeParts {
    /// Decomposes a raw epoch value. Returns `None` when out of chrono's range.
    pub fn from_epoch(value: i64, unit: TimestampUnit) -> Option<Self> {
        let start_time = DateTime::from_timestamp(unit.to_seconds(value), 0)?.naive_utc();
        Some(Self::from_datetime(start_time))
    }

    pub fn from_datetime(start_time: NaiveDateTime) -> Self {
        Self {
            start_time,
            hour: start_time.hour(),
            day: start_time.day(),
            week: start_time.iso_week().week(),
            month: start_time.month(),
            year: start_time.year(),
            weekday: start_time.weekday().num_days_from_sunday(),
        }
    }
}
