//! The reference UTC offset every timestamp is normalized to.
//!
//! Containment is only meaningful when both sides agree on an offset, so the
//! offset is passed explicitly into each normalization step instead of being
//! read from a global.

use chrono::{FixedOffset, NaiveDate, NaiveTime, Offset, Utc};

use crate::types::{Interval, ValidationError};

/// Offset of Indian Standard Time (UTC+05:30), in seconds.
pub const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Largest offset accepted, in seconds (just under a day).
const MAX_OFFSET_SECS: i32 = 86_399;

/// Returns the default reference offset, UTC+05:30.
#[must_use]
pub fn default_offset() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Parses a UTC offset such as `+05:30`, `-0800`, `+02`, `Z` or `UTC`.
pub fn parse_utc_offset(text: &str) -> Result<FixedOffset, ValidationError> {
    let trimmed = text.trim();
    let invalid = || ValidationError::InvalidOffset {
        value: text.to_string(),
    };

    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }

    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'+') => (1, &trimmed[1..]),
        Some(b'-') => (-1, &trimmed[1..]),
        _ => return Err(invalid()),
    };
    // Byte-based splitting below relies on this
    if !rest.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return Err(invalid());
    }

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None if rest.len() <= 2 => (rest, "0"),
        None => return Err(invalid()),
    };

    if hours.is_empty() || minutes.contains(':') {
        return Err(invalid());
    }

    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes >= 60 {
        return Err(invalid());
    }

    let secs = sign * (hours * 3600 + minutes * 60);
    if secs.abs() > MAX_OFFSET_SECS {
        return Err(invalid());
    }
    FixedOffset::east_opt(secs).ok_or_else(invalid)
}

/// Returns the window from midnight of `first` to midnight after `last`, at `offset`.
///
/// Returns `None` if `last` is before `first` or the dates are out of range.
#[must_use]
pub fn day_window(first: NaiveDate, last: NaiveDate, offset: FixedOffset) -> Option<Interval> {
    if last < first {
        return None;
    }
    let start = first
        .and_time(NaiveTime::MIN)
        .and_local_timezone(offset)
        .single()?;
    let end = last
        .succ_opt()?
        .and_time(NaiveTime::MIN)
        .and_local_timezone(offset)
        .single()?;
    Interval::new(start, end).ok()
}
