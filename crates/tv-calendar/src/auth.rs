//! Google OAuth credentials.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::CalendarError;

/// Google's OAuth 2.0 token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Credentials for the Google Calendar API.
///
/// Either a bare access token, or the "authorized user" file written by
/// Google's OAuth client libraries (`token.json`), which carries a refresh
/// token that can mint fresh access tokens.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(default, alias = "access_token")]
    token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    client_secret: Option<String>,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Credentials")
            .field("token", &redact(&self.token))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl Credentials {
    /// Wraps an already-issued access token.
    pub fn from_access_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            refresh_token: None,
            client_id: None,
            client_secret: None,
            token_uri: default_token_uri(),
        }
    }

    /// Reads a Google "authorized user" credentials file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_authorized_user_file(path: &Path) -> Result<Self, CalendarError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| CalendarError::CredentialsFile {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&contents)
    }

    /// Parses credentials from JSON.
    pub fn from_json(json: &str) -> Result<Self, CalendarError> {
        serde_json::from_str(json).map_err(|err| CalendarError::InvalidCredentials(err.to_string()))
    }

    fn stored_token(&self) -> Option<&str> {
        non_empty(self.token.as_deref())
    }

    fn refresh_params(&self) -> Option<[(&'static str, &str); 4]> {
        Some([
            ("client_id", non_empty(self.client_id.as_deref())?),
            ("client_secret", non_empty(self.client_secret.as_deref())?),
            ("refresh_token", non_empty(self.refresh_token.as_deref())?),
            ("grant_type", "refresh_token"),
        ])
    }

    /// Returns true if these credentials can mint a new access token.
    #[must_use]
    pub fn can_refresh(&self) -> bool {
        self.refresh_params().is_some()
    }

    /// Returns an access token, refreshing it first when possible.
    ///
    /// Stored tokens in `token.json` are usually expired, so a refresh is
    /// always preferred over the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::MissingCredentials`] if there is neither a
    /// stored token nor the means to refresh one, or a request error if the
    /// refresh fails.
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String, CalendarError> {
        let Some(params) = self.refresh_params() else {
            return self
                .stored_token()
                .map(str::to_string)
                .ok_or(CalendarError::MissingCredentials);
        };

        tracing::debug!(token_uri = %self.token_uri, "refreshing access token");
        let response = http.post(&self.token_uri).form(&params).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CalendarError::Unauthorized {
                message: format!("token refresh failed with status {status}: {body}"),
            });
        }

        let payload: TokenResponse = serde_json::from_str(&body)
            .map_err(|err| CalendarError::InvalidResponse(err.to_string()))?;
        Ok(payload.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_authorized_user_file() {
        let json = r#"{
            "token": "ya29.stale",
            "refresh_token": "1//refresh",
            "client_id": "client.apps.googleusercontent.com",
            "client_secret": "shh",
            "token_uri": "https://oauth2.googleapis.com/token",
            "scopes": ["https://www.googleapis.com/auth/calendar.readonly"],
            "expiry": "2025-03-10T10:00:00Z"
        }"#;
        let credentials = Credentials::from_json(json).unwrap();
        assert!(credentials.can_refresh());
        assert_eq!(credentials.stored_token(), Some("ya29.stale"));
    }

    #[test]
    fn token_without_refresh_data_cannot_refresh() {
        let credentials = Credentials::from_json(r#"{"access_token":"abc"}"#).unwrap();
        assert!(!credentials.can_refresh());
        assert_eq!(credentials.stored_token(), Some("abc"));
        assert_eq!(credentials.token_uri, GOOGLE_TOKEN_URL);
    }

    #[test]
    fn blank_refresh_fields_do_not_count() {
        let credentials = Credentials::from_json(
            r#"{"token":"abc","refresh_token":" ","client_id":"id","client_secret":"secret"}"#,
        )
        .unwrap();
        assert!(!credentials.can_refresh());
    }

    #[test]
    fn rejects_invalid_json() {
        let err = Credentials::from_json("not-json").unwrap_err();
        assert!(matches!(err, CalendarError::InvalidCredentials(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("token.json");
        let err = Credentials::from_authorized_user_file(&path).unwrap_err();
        assert!(matches!(err, CalendarError::CredentialsFile { .. }));
        assert!(err.to_string().contains("token.json"));
    }

    #[tokio::test]
    async fn blank_token_is_missing_credentials() {
        let http = reqwest::Client::new();
        let err = Credentials::from_access_token("  ")
            .access_token(&http)
            .await
            .unwrap_err();
        assert!(matches!(err, CalendarError::MissingCredentials));
    }

    #[tokio::test]
    async fn stored_token_is_returned_without_network() {
        let http = reqwest::Client::new();
        let token = Credentials::from_access_token("ya29.token")
            .access_token(&http)
            .await
            .unwrap();
        assert_eq!(token, "ya29.token");
    }

    #[test]
    fn debug_redacts_secrets() {
        let credentials = Credentials::from_json(
            r#"{"token":"tok-secret","refresh_token":"ref-secret","client_id":"id","client_secret":"cli-secret"}"#,
        )
        .unwrap();
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("tok-secret"));
        assert!(!debug.contains("ref-secret"));
        assert!(!debug.contains("cli-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
