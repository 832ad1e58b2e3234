use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use crate::error::{ArchiveError, Result};
use crate::models::{SemesterLabel, Term, UploadRecord};

pub fn classify_datetime(timestamp: DateTime<Utc>) -> SemesterLabel {
    let term = match timestamp.month0() {
        0..=4 => Term::Spring,
        5..=7 => Term::Summer,
        _ => Term::Fall,
    };

    SemesterLabel {
        term,
        year: timestamp.year(),
    }
}

/// Classifies a raw timestamp string as stored by the backend.
pub fn classify(raw: &str) -> Result<SemesterLabel> {
    parse_timestamp(raw).map(classify_datetime)
}

/// Accepts RFC 3339, Postgres `timestamptz` text (`+00` style offsets), a naive
/// `YYYY-MM-DD HH:MM:SS[.f]` (read as UTC), or a bare date.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(parsed) = DateTime::parse_from_str(trimmed, format) {
            return Ok(parsed.with_timezone(&Utc));
        }
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ArchiveError::InvalidTimestamp(raw.to_string()))
}

/// Distinct labels across all uploads, sorted lexicographically then reversed.
///
/// This is string order, not calendar order: "Summer 2025" lands ahead of
/// "Spring 2025" and "Fall 2025" lands after both.
pub fn available_semesters(records: &[UploadRecord]) -> Vec<String> {
    let mut labels: Vec<String> = records
        .iter()
        .map(|record| classify_datetime(record.uploaded_at).to_string())
        .collect();

    labels.sort();
    labels.dedup();
    labels.reverse();
    labels
}
