//! UTC to display-time conversion.
//!
//! All timestamps arrive as UTC ISO-8601 strings and are shown in Alaska time.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Timezone every displayed timestamp is rendered in.
pub const DISPLAY_TZ: Tz = chrono_tz::America::Anchorage;

/// Weekday, month, two-digit day, 24-hour clock. e.g. `Monday, January 15, 03:00:00`.
pub const LONG_FORMAT: &str = "%A, %B %d, %H:%M:%S";
pub const DATE_FORMAT: &str = "%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Offset-less timestamps are taken as UTC.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("unparseable timestamp: {0:?}")]
    Unparseable(String),
}

/// Parse an ISO-8601 timestamp with an explicit or implied UTC zone.
///
/// Reduced precision is accepted: `2024-01-15` is midnight and
/// `2024-01-15T12Z` is the top of the hour.
pub fn parse_utc(input: &str) -> Result<DateTime<Utc>, TimeError> {
    let trimmed = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = trimmed
        .strip_suffix('Z')
        .or_else(|| trimmed.strip_suffix('z'))
        .unwrap_or(trimmed);
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
        .or_else(|| parse_coarse(naive))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimeError::Unparseable(input.to_string()))
}

/// `YYYY-MM-DD` or `YYYY-MM-DDTHH`.
fn parse_coarse(s: &str) -> Option<NaiveDateTime> {
    let (date, hour) = match s.split_once('T').or_else(|| s.split_once(' ')) {
        Some((date, hour)) => (date, Some(hour)),
        None => (s, None),
    };
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let hour: u32 = match hour {
        None => 0,
        Some(h) if h.len() == 2 && h.bytes().all(|b| b.is_ascii_digit()) => h.parse().ok()?,
        Some(_) => return None,
    };
    date.and_hms_opt(hour, 0, 0)
}

/// One instant, already shifted into [`DISPLAY_TZ`].
///
/// The long, date and time strings are all projections of the same value, so
/// a row's date and time columns can never describe different instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DisplayInstant {
    utc: DateTime<Utc>,
    local: DateTime<Tz>,
}

impl DisplayInstant {
    pub fn from_utc(utc: DateTime<Utc>) -> Self {
        Self {
            utc,
            local: utc.with_timezone(&DISPLAY_TZ),
        }
    }

    pub fn parse(input: &str) -> Result<Self, TimeError> {
        parse_utc(input).map(Self::from_utc)
    }

    pub fn utc(&self) -> DateTime<Utc> {
        self.utc
    }

    pub fn local(&self) -> DateTime<Tz> {
        self.local
    }

    pub fn long(&self) -> String {
        self.local.format(LONG_FORMAT).to_string()
    }

    /// Month-day in display time.
    pub fn date(&self) -> String {
        self.local.format(DATE_FORMAT).to_string()
    }

    pub fn time(&self) -> String {
        self.local.format(TIME_FORMAT).to_string()
    }
}

impl Serialize for DisplayInstant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr {
            utc: String,
            display: String,
            date: String,
            time: String,
        }
        Repr {
            utc: self.utc.to_rfc3339(),
            display: self.long(),
            date: self.date(),
            time: self.time(),
        }
        .serialize(serializer)
    }
}

/// Convert a UTC ISO-8601 string straight to its long display form.
pub fn to_display_time(input: &str) -> Result<String, TimeError> {
    DisplayInstant::parse(input).map(|d| d.long())
}
