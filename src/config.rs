//! Configuration for the Gmail client.
//!
//! Use [`GmailConfigBuilder`] to create a configuration with sensible defaults:
//!
//! ```
//! use gmail_watch::GmailConfig;
//!
//! let config = GmailConfig::builder()
//!     .credentials_path("credentials/credentials.json")
//!     .build()
//!     .expect("valid config");
//! ```

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default OAuth scopes requested during authorization.
///
/// Changing scopes invalidates a previously stored token - delete the token
/// file after modifying them.
pub const DEFAULT_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://mail.google.com/",
];

const DEFAULT_API_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";
const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const TOKEN_FILE_NAME: &str = "token.json";

/// Configuration for connecting to the Gmail API.
///
/// Create using [`GmailConfig::builder()`]. Credential material lives on disk
/// in the standard layout: a `credentials.json` with the installed-app OAuth
/// client (`{"installed": {"client_id", "client_secret", "redirect_uris"}}`)
/// and a `token.json` holding the user's access and refresh tokens, written
/// by the authorization flow.
#[derive(Debug, Clone)]
pub struct GmailConfig {
    /// Path of the OAuth client credentials file.
    pub credentials_path: PathBuf,
    /// Path of the stored token file (default: `token.json` next to the
    /// credentials file).
    pub token_path: PathBuf,
    /// Gmail user id the mailbox operations target (default: `"me"`, the
    /// authorized account).
    pub user_id: String,
    /// OAuth scopes requested during authorization.
    pub scopes: Vec<String>,
    /// Gmail API base URL (overridable for tests).
    pub api_base_url: String,
    /// OAuth consent page URL.
    pub auth_url: String,
    /// OAuth token endpoint URL (overridable for tests).
    pub token_url: String,
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
    /// Polling configuration for waiting operations.
    pub polling: PollingConfig,
}

impl GmailConfig {
    /// Creates a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use gmail_watch::GmailConfig;
    /// use std::time::Duration;
    ///
    /// let config = GmailConfig::builder()
    ///     .credentials_path("credentials/credentials.json")
    ///     .poll_interval(Duration::from_secs(5))
    ///     .build()
    ///     .expect("valid config");
    /// ```
    #[must_use]
    pub fn builder() -> GmailConfigBuilder {
        GmailConfigBuilder::default()
    }
}

/// Timeout configuration for HTTP operations.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Timeout for establishing a TCP/TLS connection.
    pub connect: Duration,
    /// Total timeout for one API request.
    pub request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            request: Duration::from_secs(30),
        }
    }
}

/// Polling configuration for wait operations.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Interval between search attempts when waiting for a message.
    pub interval: Duration,
    /// Maximum total time to wait for a matching message.
    pub max_wait: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_wait: Duration::from_secs(300), // 5 minutes
        }
    }
}

/// Builder for [`GmailConfig`].
#[derive(Debug, Default)]
pub struct GmailConfigBuilder {
    credentials_path: Option<PathBuf>,
    token_path: Option<PathBuf>,
    user_id: Option<String>,
    scopes: Option<Vec<String>>,
    api_base_url: Option<String>,
    auth_url: Option<String>,
    token_url: Option<String>,
    timeouts: Option<TimeoutConfig>,
    polling: Option<PollingConfig>,
}

impl GmailConfigBuilder {
    /// Sets the path of the OAuth client credentials file (required).
    #[must_use]
    pub fn credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    /// Sets the path of the stored token file.
    ///
    /// If not set, defaults to `token.json` in the credentials file's
    /// directory.
    #[must_use]
    pub fn token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = Some(path.into());
        self
    }

    /// Sets the Gmail user id the mailbox operations target.
    ///
    /// Default is `"me"`, the account the stored token belongs to.
    #[must_use]
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Sets the OAuth scopes requested during authorization.
    ///
    /// Default is [`DEFAULT_SCOPES`]. A previously stored token is only valid
    /// for the scopes it was issued with.
    #[must_use]
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    /// Overrides the Gmail API base URL.
    ///
    /// Intended for pointing the client at a mock server in tests.
    #[must_use]
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Overrides the OAuth consent page URL.
    #[must_use]
    pub fn auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = Some(url.into());
        self
    }

    /// Overrides the OAuth token endpoint URL.
    ///
    /// Intended for pointing the authenticator at a mock server in tests.
    #[must_use]
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    /// Sets timeout configuration.
    #[must_use]
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .connect = timeout;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .request = timeout;
        self
    }

    /// Sets polling configuration.
    #[must_use]
    pub fn polling(mut self, polling: PollingConfig) -> Self {
        self.polling = Some(polling);
        self
    }

    /// Sets the polling interval for wait operations.
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.polling
            .get_or_insert_with(PollingConfig::default)
            .interval = interval;
        self
    }

    /// Sets the maximum wait time for wait operations.
    #[must_use]
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.polling
            .get_or_insert_with(PollingConfig::default)
            .max_wait = max_wait;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<GmailConfig> {
        let credentials_path = self.credentials_path.ok_or_else(|| Error::InvalidConfig {
            message: "credentials_path is required".into(),
        })?;

        // Token lives next to the credentials unless placed explicitly
        let token_path = self
            .token_path
            .unwrap_or_else(|| default_token_path(&credentials_path));

        Ok(GmailConfig {
            credentials_path,
            token_path,
            user_id: self.user_id.unwrap_or_else(|| "me".into()),
            scopes: self
                .scopes
                .unwrap_or_else(|| DEFAULT_SCOPES.iter().map(ToString::to_string).collect()),
            api_base_url: self
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.into()),
            auth_url: self.auth_url.unwrap_or_else(|| DEFAULT_AUTH_URL.into()),
            token_url: self.token_url.unwrap_or_else(|| DEFAULT_TOKEN_URL.into()),
            timeouts: self.timeouts.unwrap_or_default(),
            polling: self.polling.unwrap_or_default(),
        })
    }
}

/// Places `token.json` in the credentials file's directory.
fn default_token_path(credentials_path: &Path) -> PathBuf {
    match credentials_path.parent() {
        Some(dir) => dir.join(TOKEN_FILE_NAME),
        None => PathBuf::from(TOKEN_FILE_NAME),
    }
}
