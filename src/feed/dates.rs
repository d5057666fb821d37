//! Publish date resolution for episodes.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::path::Path;
use std::time::SystemTime;

/// Where an episode's effective timestamp came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    /// The `pub_date` declared in the episode config.
    Declared,
    /// The audio file's last-modified time.
    FileModified,
    /// Neither was available; sorts after everything else.
    Unknown,
}

/// Parses an ISO-8601 timestamp as written in episode configs.
///
/// A trailing `Z` is UTC. Timestamps without an offset, and bare dates, are
/// taken as UTC. Returns `None` for anything else.
pub fn parse_iso8601(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let formats_with_tz = [
        // Space separated: "2024-01-01 10:00:00+02:00"
        "%Y-%m-%d %H:%M:%S%.f%:z",
        // No seconds: "2024-01-01T10:00+02:00"
        "%Y-%m-%dT%H:%M%:z",
        // Compact offset: "2024-01-01T10:00:00+0200"
        "%Y-%m-%dT%H:%M:%S%.f%z",
    ];
    let normalized = s.replacen('Z', "+00:00", 1);
    for fmt in &formats_with_tz {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let formats_naive = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in &formats_naive {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// Last-modified time of `path`, if the file can be stat'ed.
pub fn file_modified(path: &Path) -> Option<DateTime<Utc>> {
    let modified: SystemTime = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

/// Resolves the effective publish timestamp of an episode.
///
/// Declared date first; on a missing or unparsable date the file's mtime,
/// and the Unix epoch when the file is missing too.
pub fn resolve_pub_date(
    declared: Option<&str>,
    file: &Path,
) -> (DateTime<Utc>, DateSource) {
    if let Some(raw) = declared {
        match parse_iso8601(raw) {
            Some(dt) => return (dt, DateSource::Declared),
            None => {
                tracing::warn!(
                    file = %file.display(),
                    pub_date = %raw,
                    "Invalid pub_date, falling back to file timestamp"
                );
            }
        }
    }

    match file_modified(file) {
        Some(dt) => (dt, DateSource::FileModified),
        None => (DateTime::<Utc>::UNIX_EPOCH, DateSource::Unknown),
    }
}

/// RFC 2822 rendering in UTC, as RSS `pubDate`/`lastBuildDate` expect.
pub fn rfc2822(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S %z").to_string()
}
