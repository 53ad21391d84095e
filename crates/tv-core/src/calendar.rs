//! Calendar event normalization.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::entry::CalendarEvent;
use crate::types::{Interval, Normalized, RecordSource, SkippedRecord, ValidationError};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// An event as delivered by a calendar source, before normalization.
///
/// `start` and `end` are timestamp strings as the source wrote them: RFC 3339
/// with an offset, a local date-time without one, or a bare date for all-day
/// events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCalendarEvent {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Converts raw events to the reference offset.
///
/// Events with missing or unparseable timestamps, or that end before they
/// start, are skipped and reported.
pub fn normalize_events(raw: Vec<RawCalendarEvent>, offset: FixedOffset) -> Normalized<CalendarEvent> {
    let mut normalized = Normalized::default();
    for (idx, event) in raw.into_iter().enumerate() {
        let position = idx as u64 + 1;
        match normalize_event(event, offset) {
            Ok(event) => normalized.records.push(event),
            Err(err) => {
                let reason = err.to_string();
                tracing::warn!(position, %reason, "skipping invalid calendar event");
                normalized.skipped.push(SkippedRecord {
                    source: RecordSource::Calendar,
                    position,
                    reason,
                });
            }
        }
    }

    tracing::debug!(
        events = normalized.records.len(),
        skipped = normalized.skipped.len(),
        "normalized calendar events"
    );
    normalized
}

/// Drops events that fall entirely outside `window`, returning how many were dropped.
///
/// Offline calendar exports are not range-limited the way API queries are.
pub fn retain_within(events: &mut Vec<CalendarEvent>, window: &Interval) -> usize {
    let before = events.len();
    events.retain(|event| window.overlaps(&event.interval));
    before - events.len()
}

fn normalize_event(
    event: RawCalendarEvent,
    offset: FixedOffset,
) -> Result<CalendarEvent, ValidationError> {
    let start = event
        .start
        .as_deref()
        .ok_or(ValidationError::Empty { field: "start" })?;
    let end = event
        .end
        .as_deref()
        .ok_or(ValidationError::Empty { field: "end" })?;

    let interval = Interval::new(
        parse_event_time(start, offset)?,
        parse_event_time(end, offset)?,
    )?;
    Ok(CalendarEvent::new(interval, event.summary))
}

/// Parses a calendar timestamp and expresses it at `offset`.
///
/// Offset-less values are taken to already be local to `offset`.
pub fn parse_event_time(
    value: &str,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, ValidationError> {
    let value = value.trim();
    let invalid = || ValidationError::InvalidTimestamp {
        value: value.to_string(),
    };

    if value.is_empty() {
        return Err(invalid());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&offset));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .ok_or_else(invalid)?;

    naive.and_local_timezone(offset).single().ok_or_else(invalid)
}
