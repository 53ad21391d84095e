//! Calendar sources for the timesheet validator.
//!
//! Provides:
//! - A Google Calendar v3 client with OAuth token refresh
//! - Offline JSON calendar exports
//!
//! Every source reports failure as a [`CalendarError`]. An empty calendar is
//! a successful, empty result, never an error.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tv_core::{Interval, RawCalendarEvent};

pub mod auth;
mod file;
pub mod google;

pub use auth::Credentials;
pub use file::load_events_file;
pub use google::GoogleCalendar;

/// Calendar source errors.
///
/// All of these mean the calendar could not be consulted at all.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// No access token and no way to obtain one.
    #[error("no calendar credentials configured (set TV_ACCESS_TOKEN or provide token.json)")]
    MissingCredentials,
    /// The credentials file could not be read.
    #[error("failed to read credentials from {}: {source}", path.display())]
    CredentialsFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The credentials file could not be parsed.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
    /// The calendar ID was blank.
    #[error("calendar ID cannot be empty")]
    InvalidCalendarId,
    /// The API base URL could not be used.
    #[error("invalid calendar API URL: {0}")]
    InvalidUrl(String),
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The API rejected our credentials.
    #[error("calendar access denied: {message}")]
    Unauthorized { message: String },
    /// API returned an error response.
    #[error("calendar API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The calendar export could not be read.
    #[error("failed to read calendar export {}: {source}", path.display())]
    EventFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The calendar export could not be parsed.
    #[error("invalid calendar export {}: {message}", path.display())]
    InvalidEventFile { path: PathBuf, message: String },
}

/// Where calendar events come from.
#[derive(Debug)]
pub enum CalendarSource {
    /// The Google Calendar API.
    Google(GoogleCalendar),
    /// A JSON export on disk.
    File(PathBuf),
}

impl CalendarSource {
    /// Fetches events for `window`.
    ///
    /// File exports are returned whole; callers trim them to the window.
    pub async fn fetch(&self, window: &Interval) -> Result<Vec<RawCalendarEvent>, CalendarError> {
        match self {
            Self::Google(calendar) => calendar.fetch_events(window).await,
            Self::File(path) => load_events_file(path).await,
        }
    }

    /// Human-readable description for logs and messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Google(calendar) => format!("Google Calendar `{}`", calendar.calendar_id()),
            Self::File(path) => format!("calendar export {}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_names_the_source() {
        let google = GoogleCalendar::new(Credentials::from_access_token("t"), "primary").unwrap();
        assert_eq!(
            CalendarSource::Google(google).describe(),
            "Google Calendar `primary`"
        );
        assert_eq!(
            CalendarSource::File(PathBuf::from("/tmp/events.json")).describe(),
            "calendar export /tmp/events.json"
        );
    }

    #[test]
    fn errors_render_readably() {
        assert_eq!(
            CalendarError::Api {
                status: 500,
                message: "Backend Error".to_string()
            }
            .to_string(),
            "calendar API error (500): Backend Error"
        );
    }
}
