//! Google Calendar v3 events client.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tv_core::{Interval, RawCalendarEvent};

use crate::CalendarError;
use crate::auth::Credentials;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const GOOGLE_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_MAX_RESULTS: u32 = 250;
/// The API refuses page sizes above this.
const MAX_PAGE_SIZE: u32 = 2500;
/// Hard stop on pagination.
const MAX_PAGES: usize = 20;

/// Google Calendar API client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct GoogleCalendar {
    http: reqwest::Client,
    credentials: Credentials,
    calendar_id: String,
    base_url: String,
    max_results: u32,
}

impl fmt::Debug for GoogleCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleCalendar")
            .field("calendar_id", &self.calendar_id)
            .field("base_url", &self.base_url)
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}

impl GoogleCalendar {
    /// Creates a client for one calendar.
    ///
    /// # Errors
    ///
    /// Returns an error if the calendar ID is blank, or if the HTTP client
    /// fails to build.
    pub fn new(
        credentials: Credentials,
        calendar_id: impl Into<String>,
    ) -> Result<Self, CalendarError> {
        let calendar_id = calendar_id.into();
        if calendar_id.trim().is_empty() {
            return Err(CalendarError::InvalidCalendarId);
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(CalendarError::ClientBuild)?;

        Ok(Self {
            http,
            credentials,
            calendar_id,
            base_url: GOOGLE_CALENDAR_API_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        })
    }

    /// Sets the page size, clamped to what the API accepts.
    #[must_use]
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Points the client at a different API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    /// Fetches every event overlapping `window`, expanding recurring events.
    ///
    /// An empty calendar is `Ok(vec![])`; any failure to reach or read the
    /// calendar is an error.
    pub async fn fetch_events(
        &self,
        window: &Interval,
    ) -> Result<Vec<RawCalendarEvent>, CalendarError> {
        let access_token = self.credentials.access_token(&self.http).await?;
        let url = self.events_url()?;

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        for page in 1..=MAX_PAGES {
            let body = self
                .fetch_page(&url, &access_token, window, page_token.as_deref())
                .await?;
            let parsed = parse_events_page(&body)?;
            tracing::debug!(page, items = parsed.items.len(), "fetched calendar page");
            events.extend(into_raw_events(&parsed.items));

            page_token = parsed.next_page_token;
            if page_token.is_none() {
                return Ok(events);
            }
        }

        tracing::warn!(
            pages = MAX_PAGES,
            events = events.len(),
            "calendar pagination limit reached; later events ignored"
        );
        Ok(events)
    }

    async fn fetch_page(
        &self,
        url: &reqwest::Url,
        access_token: &str,
        window: &Interval,
        page_token: Option<&str>,
    ) -> Result<String, CalendarError> {
        let max_results = self.max_results.to_string();
        let mut query = vec![
            ("timeMin", window.start().to_rfc3339()),
            ("timeMax", window.end().to_rfc3339()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("maxResults", max_results),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let response = self
            .http
            .get(url.clone())
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }

        let message = parse_api_error(&body).unwrap_or_else(|| format!("status {status}: {body}"));
        if matches!(status.as_u16(), 401 | 403) {
            return Err(CalendarError::Unauthorized { message });
        }
        Err(CalendarError::Api {
            status: status.as_u16(),
            message,
        })
    }

    fn events_url(&self) -> Result<reqwest::Url, CalendarError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|err| CalendarError::InvalidUrl(format!("{}: {err}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| CalendarError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }
}

/// `kind` of a successful `events.list` response.
const EVENTS_KIND: &str = "calendar#events";

/// One page of an `events.list` response.
///
/// Items stay as raw JSON so that one malformed event cannot fail the page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventsPage {
    kind: String,
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Converts event resources, dropping cancelled ones.
pub(crate) fn into_raw_events(items: &[Value]) -> Vec<RawCalendarEvent> {
    items.iter().filter_map(raw_event).collect()
}

/// Reads the fields we use from one event resource.
///
/// Wrongly typed values are passed through as JSON text, so normalization
/// rejects the event with a reason and its position instead of the whole
/// source failing. Returns `None` for cancelled events.
fn raw_event(item: &Value) -> Option<RawCalendarEvent> {
    if item.get("status").and_then(Value::as_str) == Some("cancelled") {
        return None;
    }
    Some(RawCalendarEvent {
        start: item.get("start").and_then(event_time),
        end: item.get("end").and_then(event_time),
        summary: item.get("summary").and_then(text),
    })
}

/// An event boundary: `{"dateTime": ...}`, all-day `{"date": ...}`, or (in
/// offline exports) a plain timestamp string.
fn event_time(value: &Value) -> Option<String> {
    match value {
        Value::Object(fields) => ["dateTime", "date"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(text)),
        other => text(other),
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(value) => Some(value.clone()),
        other => Some(other.to_string()),
    }
}

pub(crate) fn parse_events_page(body: &str) -> Result<EventsPage, CalendarError> {
    let page: EventsPage =
        serde_json::from_str(body).map_err(|err| CalendarError::InvalidResponse(err.to_string()))?;
    if page.kind != EVENTS_KIND {
        return Err(CalendarError::InvalidResponse(format!(
            "expected `{EVENTS_KIND}`, got `{}`",
            page.kind
        )));
    }
    Ok(page)
}

fn parse_api_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| payload.error.message)
}
