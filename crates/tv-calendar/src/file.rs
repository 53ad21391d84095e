//! Offline calendar exports.
//!
//! Accepts the body of a Google `events.list` response (`{"items": [...]}`),
//! or a bare array of events. Event boundaries may be Google-style objects
//! (`{"dateTime": ...}` / `{"date": ...}`) or plain timestamp strings.

use std::path::Path;

use serde_json::Value;
use tv_core::RawCalendarEvent;

use crate::CalendarError;
use crate::google::into_raw_events;

/// Reads calendar events from a JSON export.
///
/// An export with no events is `Ok(vec![])`.
pub async fn load_events_file(path: &Path) -> Result<Vec<RawCalendarEvent>, CalendarError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CalendarError::EventFile {
            path: path.to_path_buf(),
            source,
        })?;
    let events =
        parse_events_json(&contents).map_err(|message| CalendarError::InvalidEventFile {
            path: path.to_path_buf(),
            message,
        })?;
    tracing::debug!(path = %path.display(), events = events.len(), "loaded calendar export");
    Ok(events)
}

/// Extracts the event list from an export.
///
/// Anything other than an array or an object with an `items` array is an
/// error, never an empty calendar.
fn parse_events_json(json: &str) -> Result<Vec<RawCalendarEvent>, String> {
    let items = match serde_json::from_str::<Value>(json).map_err(|err| err.to_string())? {
        Value::Array(items) => items,
        Value::Object(mut page) => match page.remove("items") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err("`items` is not an array".to_string()),
            None => return Err("expected an `items` array of events".to_string()),
        },
        _ => return Err("expected an array of events or an object with `items`".to_string()),
    };
    Ok(into_raw_events(&items))
}
