use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::TimeCodeError;

// @module: ASS time code parsing

// @const: ASS timestamp regex (H:MM:SS.CC, fraction of 1 to 3 digits)
static ASS_TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})\.(\d{1,3})$").unwrap()
});

/// Parse an ASS time code such as `0:01:01.50` into milliseconds.
///
/// The fraction is read as a decimal fraction of a second, so `.5`, `.50`
/// and `.500` all mean half a second.
pub fn parse_timecode(value: &str) -> Result<u64, TimeCodeError> {
    let trimmed = value.trim();
    let caps = ASS_TIMESTAMP_REGEX
        .captures(trimmed)
        .ok_or_else(|| TimeCodeError::Malformed(trimmed.to_string()))?;

    let field = |idx: usize| -> Result<u64, TimeCodeError> {
        caps.get(idx)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .ok_or_else(|| TimeCodeError::Malformed(trimmed.to_string()))
    };

    let hours = field(1)?;
    let minutes = field(2)?;
    let seconds = field(3)?;
    if minutes >= 60 || seconds >= 60 {
        return Err(TimeCodeError::Malformed(trimmed.to_string()));
    }

    let fraction = caps.get(4).map_or("", |m| m.as_str());
    let millis = match fraction.len() {
        1 => field(4)? * 100,
        2 => field(4)? * 10,
        _ => field(4)?,
    };

    hours
        .checked_mul(3_600_000)
        .and_then(|h| h.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
        .ok_or_else(|| TimeCodeError::Malformed(trimmed.to_string()))
}

/// Parse a start/end pair and check that the range is not inverted
pub fn parse_time_range(start: &str, end: &str) -> Result<(u64, u64), TimeCodeError> {
    let start_ms = parse_timecode(start)?;
    let end_ms = parse_timecode(end)?;
    if end_ms < start_ms {
        return Err(TimeCodeError::EndBeforeStart { start_ms, end_ms });
    }
    Ok((start_ms, end_ms))
}
