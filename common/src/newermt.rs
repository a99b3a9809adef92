//! `--newermt` resolution
//!
//! The argument is either a reference file (its mtime becomes the cutoff) or an ISO-8601
//! date / date-time string. An existing path always wins over date parsing.
//!
//! Accepted date forms:
//! - `2023-10-27`, `20231027` - start of that day (local midnight)
//! - `2023-10-27T10`, `2023-10-27T10:00`, `2023-10-27 10:00:00`, `2023-10-27T10:00:00.250`,
//!   `20231027T100000` - local time
//! - `2023-10-27T10:00:00Z`, `2023-10-27T10Z`, `2023-10-27T10:00:00+02:00` - explicit offset

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::instrument;

use crate::error::Error;

pub type Timestamp = SystemTime;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y%m%dT%H%M%S%.f%:z",
    "%Y%m%dT%H%M%:z",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// What a `--newermt` argument turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeReference {
    /// an existing file or directory, the cutoff is its modification time
    File(PathBuf),
    /// an ISO date or date-time
    Instant(DateTime<FixedOffset>),
}

impl TimeReference {
    /// Classify `arg`: existing path first, ISO date/time second.
    pub fn parse(arg: &str) -> Result<Self, Error> {
        let path = crate::path::expand_tilde(Path::new(arg));
        if std::fs::metadata(&path).is_ok() {
            return Ok(TimeReference::File(path));
        }
        parse_iso(arg)
            .map(TimeReference::Instant)
            .ok_or_else(|| Error::InvalidTimeFilter(arg.to_string()))
    }

    /// Produce the cutoff timestamp.
    pub fn cutoff(&self) -> Result<Timestamp, Error> {
        match self {
            TimeReference::File(path) => std::fs::metadata(path)
                .and_then(|md| md.modified())
                .map_err(|_| Error::InvalidTimeFilter(path.display().to_string())),
            TimeReference::Instant(datetime) => Ok(SystemTime::from(*datetime)),
        }
    }
}

/// Resolve a `--newermt` argument straight to its cutoff.
#[instrument]
pub fn resolve(arg: &str) -> Result<Timestamp, Error> {
    let reference = TimeReference::parse(arg)?;
    let cutoff = reference.cutoff()?;
    tracing::debug!(
        "newermt {:?} resolved to {:?}, cutoff {}",
        arg,
        &reference,
        display_timestamp(cutoff)
    );
    Ok(cutoff)
}

fn display_timestamp(timestamp: Timestamp) -> String {
    // humantime only formats times after the epoch
    if timestamp >= SystemTime::UNIX_EPOCH {
        humantime::format_rfc3339_nanos(timestamp).to_string()
    } else {
        format!("{timestamp:?}")
    }
}

/// Parse an ISO-8601 date or date-time. Naive values are taken in the local timezone and a
/// date without a time is the start of that day.
pub fn parse_iso(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = normalize(value.trim());
    let value = value.as_str();
    if value.is_empty() {
        return None;
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime);
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(datetime) = DateTime::parse_from_str(value, format) {
            return Some(datetime);
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return local(naive);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return local(date.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// Rewrite the ISO forms chrono has no format for: an hour without minutes
/// (`2023-10-27T10` becomes `2023-10-27T10:00`) and a `Z` suffix (becomes `+00:00`).
fn normalize(value: &str) -> String {
    let mut value = value.to_string();
    if let Some(rest) = value.strip_suffix(['Z', 'z']) {
        value = format!("{}+00:00", rest.trim_end());
    }
    let bytes = value.as_bytes();
    let hour_only = bytes.len() >= 13
        && matches!(bytes[10], b'T' | b't' | b' ')
        && bytes[11].is_ascii_digit()
        && bytes[12].is_ascii_digit()
        && !matches!(bytes.get(13), Some(b':' | b'0'..=b'9'));
    if hour_only {
        // bytes[12] is ASCII, so 13 is a char boundary
        value.insert_str(13, ":00");
    }
    value
}

// non-existent local times (DST gap) are rejected, ambiguous ones take the earlier instant
fn local(naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    naive
        .and_local_timezone(Local)
        .earliest()
        .map(|datetime| datetime.fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local_time(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> SystemTime {
        SystemTime::from(Local.with_ymd_and_hms(y, mo, d, h, mi, s).earliest().unwrap())
    }

    #[test]
    fn test_date_only_is_start_of_day() {
        let cutoff = resolve("2023-10-27").unwrap();
        assert_eq!(cutoff, local_time(2023, 10, 27, 0, 0, 0));
    }

    #[test]
    fn test_naive_datetime_forms() {
        let expected = local_time(2023, 10, 27, 10, 0, 0);
        assert_eq!(resolve("2023-10-27T10:00:00").unwrap(), expected);
        assert_eq!(resolve("2023-10-27 10:00:00").unwrap(), expected);
        assert_eq!(resolve("2023-10-27T10:00").unwrap(), expected);
        assert_eq!(
            resolve("2023-10-27T10:00:00.5").unwrap(),
            expected + std::time::Duration::from_millis(500)
        );
        assert_eq!(resolve("2023-10-27T10").unwrap(), expected);
        assert_eq!(resolve("2023-10-27 10").unwrap(), expected);
        assert_eq!(resolve("20231027T100000").unwrap(), expected);
        assert_eq!(resolve("20231027T1000").unwrap(), expected);
    }

    #[test]
    fn test_basic_date_is_start_of_day() {
        assert_eq!(
            resolve("20231027").unwrap(),
            local_time(2023, 10, 27, 0, 0, 0)
        );
        assert!(matches!(
            resolve("20231345"),
            Err(Error::InvalidTimeFilter(_))
        ));
    }

    #[test]
    fn test_explicit_offsets_are_honoured() {
        let utc = resolve("2023-10-27T10:00:00Z").unwrap();
        let plus_two = resolve("2023-10-27T12:00:00+02:00").unwrap();
        assert_eq!(utc, plus_two);
        assert_eq!(resolve("2023-10-27T10Z").unwrap(), utc);
        assert_eq!(resolve("2023-10-27T12+02:00").unwrap(), utc);
        assert_eq!(resolve("2023-10-27T12:00:00+0200").unwrap(), utc);
        assert_eq!(resolve("20231027T100000Z").unwrap(), utc);
        let since_epoch = utc.duration_since(SystemTime::UNIX_EPOCH).unwrap();
        assert_eq!(since_epoch.as_secs(), 1_698_400_800);
    }

    #[test]
    fn test_reference_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("stamp");
        std::fs::write(&reference, "x").unwrap();
        let mtime = local_time(2020, 1, 2, 3, 4, 5);
        filetime::set_file_mtime(&reference, filetime::FileTime::from_system_time(mtime)).unwrap();
        let arg = reference.to_str().unwrap();
        assert_eq!(
            TimeReference::parse(arg).unwrap(),
            TimeReference::File(reference.clone())
        );
        assert_eq!(resolve(arg).unwrap(), mtime);
    }

    #[test]
    fn test_file_named_like_a_date_wins() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("2023-10-27");
        std::fs::write(&reference, "x").unwrap();
        let mtime = local_time(2001, 5, 6, 7, 8, 9);
        filetime::set_file_mtime(&reference, filetime::FileTime::from_system_time(mtime)).unwrap();
        assert_eq!(resolve(reference.to_str().unwrap()).unwrap(), mtime);
    }

    #[test]
    fn test_invalid_value_names_argument() {
        match resolve("invalid-date").unwrap_err() {
            Error::InvalidTimeFilter(arg) => assert_eq!(arg, "invalid-date"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(resolve(""), Err(Error::InvalidTimeFilter(_))));
        assert!(matches!(
            resolve("2023-13-45"),
            Err(Error::InvalidTimeFilter(_))
        ));
    }
}
