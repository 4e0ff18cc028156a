//! Parsing for the ISO 8601 timestamps the NWIS services emit.
//!
//! Daily values carry local times without an offset
//! (`2024-05-01T00:00:00.000`), instantaneous values carry an offset with a
//! colon (`2024-05-01T12:15:00.000-05:00`), and user-facing dates are often
//! plain `YYYY-MM-DD`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::model::{NwisError, Result};

/// A parsed NWIS timestamp. Only instantaneous values carry an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsgsTimestamp {
    Zoned(DateTime<FixedOffset>),
    Local(NaiveDateTime),
}

impl UsgsTimestamp {
    /// Wall-clock time at the site, dropping any offset.
    pub fn naive_local(&self) -> NaiveDateTime {
        match self {
            UsgsTimestamp::Zoned(dt) => dt.naive_local(),
            UsgsTimestamp::Local(dt) => *dt,
        }
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        match self {
            UsgsTimestamp::Zoned(dt) => Some(*dt.offset()),
            UsgsTimestamp::Local(_) => None,
        }
    }
}

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parses any of the timestamp shapes NWIS produces:
///
/// - `YYYY-MM-DDTHH:MM:SS.fff±HH:MM`
/// - `YYYY-MM-DDTHH:MM:SS.fff`
/// - `YYYY-MM-DDTHH:MM:SS`
/// - `YYYY-MM-DDTHH:MM`
/// - `YYYY-MM-DD` (midnight)
///
/// # Errors
/// `NwisError::MalformedResponse` for anything else.
pub fn parse_usgs_datetime(text: &str) -> Result<UsgsTimestamp> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(UsgsTimestamp::Zoned(dt));
    }

    for pattern in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, pattern) {
            return Ok(UsgsTimestamp::Local(dt));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(UsgsTimestamp::Local(date.and_time(NaiveTime::MIN)));
    }

    Err(NwisError::MalformedResponse(format!(
        "unrecognized timestamp '{}'",
        text
    )))
}
