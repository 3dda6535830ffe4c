//! Field validators. Each takes a raw scalar and returns it unchanged, or
//! fails with a field-tagged error. Validators keep the original textual
//! representation; they reject, never reformat.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{Field, ParseError};

static PROGRAM_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+-\d+$").unwrap());

static AIR_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+(\d{1,2}),\s+(\d{4})$",
    )
    .unwrap()
});

static MM_SS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{1,3}):([0-5]\d)$").unwrap());
static HH_MM_SS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):([0-5]\d):([0-5]\d)$").unwrap());

/// Program ids are digits-digits, e.g. "57267-1".
pub fn validate_program_id(value: &str) -> Result<&str, ParseError> {
    if PROGRAM_ID_RE.is_match(value) {
        Ok(value)
    } else {
        Err(ParseError::invalid(
            Field::ProgramId,
            format!("'{}' must be in digits-digits format (e.g. '57267-1')", value),
        ))
    }
}

/// Air dates are "Month DD, YYYY" with a full or abbreviated month name,
/// e.g. "June 5, 1994" or "Feb 14, 1995". The string must be a real
/// calendar date with a year plausible for the Booknotes run (1989-2004,
/// bounded loosely to [1980, 2010]). Returns the original string.
pub fn validate_air_date(value: &str) -> Result<&str, ParseError> {
    let date_str = value.trim();
    if date_str.is_empty() {
        return Err(ParseError::invalid(Field::AirDate, "air date is empty"));
    }

    let caps = AIR_DATE_RE.captures(date_str).ok_or_else(|| {
        ParseError::invalid(
            Field::AirDate,
            format!("'{}' must be in 'Month DD, YYYY' format (e.g. 'June 5, 1994')", date_str),
        )
    })?;

    // chrono's %B accepts both full and abbreviated month names on parse,
    // and rejects impossible dates like February 30.
    NaiveDate::parse_from_str(date_str, "%B %d, %Y").map_err(|_| {
        ParseError::invalid(
            Field::AirDate,
            format!("'{}' is not a valid calendar date", date_str),
        )
    })?;

    let day: u32 = caps[2].parse().unwrap_or(0);
    let year: i32 = caps[3].parse().unwrap_or(0);

    if !(1980..=2010).contains(&year) {
        return Err(ParseError::invalid(
            Field::AirDate,
            format!("year {} is outside the plausible range [1980, 2010]", year),
        ));
    }
    if !(1..=31).contains(&day) {
        return Err(ParseError::invalid(
            Field::AirDate,
            format!("day {} must be between 1 and 31", day),
        ));
    }

    Ok(value)
}

/// Durations are "MM:SS" (minutes up to 999) or "HH:MM:SS" (hours up to 99);
/// seconds and trailing minutes must be 00-59.
pub fn validate_duration(value: &str) -> Result<&str, ParseError> {
    let duration = value.trim();
    if duration.is_empty() {
        return Err(ParseError::invalid(Field::Duration, "duration is empty"));
    }

    if MM_SS_RE.is_match(duration) || HH_MM_SS_RE.is_match(duration) {
        Ok(value)
    } else {
        Err(ParseError::invalid(
            Field::Duration,
            format!(
                "'{}' must be MM:SS or HH:MM:SS (e.g. '57:09', '1:23:45'), sub-fields 00-59",
                duration
            ),
        ))
    }
}

// ── Tests ──
