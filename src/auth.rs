//! OAuth2 credential material and token handling.
//!
//! This module is the identity-provider side of the client: it loads the
//! installed-application client from `credentials.json`, keeps the user's
//! access and refresh tokens in a googleapis-compatible `token.json`, and
//! hands out a valid bearer token per operation, refreshing when needed.
//!
//! The interactive part of the bootstrap (opening the consent URL, prompting
//! for the authorization code) is left to callers - see the `authorize` demo.

use crate::config::GmailConfig;
use crate::error::{Error, Result};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};
use url::Url;

/// Tokens expiring within this window are refreshed eagerly (milliseconds).
const EXPIRY_LEEWAY_MS: i64 = 5 * 60 * 1000;

/// On-disk layout of `credentials.json` as produced by the Google Cloud
/// Console for an installed application.
#[derive(Deserialize)]
struct CredentialsFile {
    installed: RawInstalled,
}

#[derive(Deserialize)]
struct RawInstalled {
    client_id: String,
    client_secret: String,
    redirect_uris: Vec<String>,
}

/// Installed-application OAuth client material.
///
/// The client secret is wrapped in a [`SecretString`] to keep it out of
/// accidental logging.
#[derive(Clone)]
pub(crate) struct InstalledCredentials {
    pub(crate) client_id: String,
    pub(crate) client_secret: SecretString,
    pub(crate) redirect_uris: Vec<String>,
}

impl From<RawInstalled> for InstalledCredentials {
    fn from(raw: RawInstalled) -> Self {
        Self {
            client_id: raw.client_id,
            client_secret: SecretString::from(raw.client_secret),
            redirect_uris: raw.redirect_uris,
        }
    }
}

impl std::fmt::Debug for InstalledCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstalledCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uris", &self.redirect_uris)
            .finish()
    }
}

/// Stored token, field-compatible with the `token.json` the googleapis
/// tooling writes. `expiry_date` is epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredToken {
    pub(crate) access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) expiry_date: Option<i64>,
}

impl StoredToken {
    /// Whether the access token is still usable at `now_ms`.
    ///
    /// A token without an expiry is taken at face value.
    fn is_fresh(&self, now_ms: i64) -> bool {
        match self.expiry_date {
            Some(expiry) => expiry > now_ms + EXPIRY_LEEWAY_MS,
            None => true,
        }
    }
}

/// Token endpoint response for both code exchange and refresh.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

impl TokenResponse {
    /// Converts the endpoint response into the persisted layout.
    ///
    /// Google omits the refresh token from refresh responses, so the previous
    /// one is carried over.
    fn into_stored(self, now_ms: i64, previous_refresh: Option<String>) -> StoredToken {
        StoredToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            scope: self.scope,
            token_type: self.token_type,
            expiry_date: self.expires_in.map(|secs| now_ms + secs * 1000),
        }
    }
}

/// Identity-provider collaborator: loads credential material, exchanges and
/// refreshes tokens, and persists them at the configured token path.
///
/// Created by the client during [`connect`](crate::GmailClient::connect);
/// exposed through the client's [`authorization_url`](crate::GmailClient::authorization_url)
/// and [`exchange_code`](crate::GmailClient::exchange_code).
pub struct Authenticator {
    http: reqwest::Client,
    credentials: InstalledCredentials,
    token_path: PathBuf,
    auth_url: String,
    token_url: String,
    scopes: Vec<String>,
}

impl Authenticator {
    /// Loads the credentials file and prepares the authenticator.
    ///
    /// No network I/O happens here; tokens are resolved per operation.
    pub(crate) async fn load(config: &GmailConfig, http: reqwest::Client) -> Result<Self> {
        let credentials = read_credentials(&config.credentials_path).await?;

        if credentials.redirect_uris.is_empty() {
            return Err(Error::InvalidConfig {
                message: format!(
                    "credentials file {:?} lists no redirect_uris",
                    config.credentials_path
                ),
            });
        }

        Ok(Self {
            http,
            credentials,
            token_path: config.token_path.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            scopes: config.scopes.clone(),
        })
    }

    /// Builds the consent URL the user must visit to authorize the client.
    ///
    /// Requests offline access so the resulting token carries a refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured auth URL cannot be parsed.
    pub fn authorization_url(&self) -> Result<String> {
        let mut url = Url::parse(&self.auth_url).map_err(|e| Error::InvalidConfig {
            message: format!("invalid auth_url {:?}: {e}", self.auth_url),
        })?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.credentials.client_id)
            .append_pair("redirect_uri", &self.credentials.redirect_uris[0])
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("access_type", "offline");

        Ok(url.to_string())
    }

    /// Exchanges an authorization code for tokens and persists them.
    #[instrument(name = "auth::exchange_code", skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<()> {
        let response = self
            .post_token_form(&[
                ("code", code),
                ("client_id", self.credentials.client_id.as_str()),
                (
                    "client_secret",
                    self.credentials.client_secret.expose_secret(),
                ),
                ("redirect_uri", self.credentials.redirect_uris[0].as_str()),
                ("grant_type", "authorization_code"),
            ])
            .await?;

        let stored = response.into_stored(Utc::now().timestamp_millis(), None);
        self.persist_token(&stored).await?;

        debug!(path = ?self.token_path, "Token stored");

        Ok(())
    }

    /// Returns a bearer access token, refreshing and re-persisting if the
    /// stored one is expired or about to expire.
    ///
    /// The token file is re-read on every call so an externally refreshed
    /// token is picked up.
    #[instrument(name = "auth::access_token", skip_all)]
    pub(crate) async fn access_token(&self) -> Result<String> {
        let token = self.load_stored_token().await?;

        if token.is_fresh(Utc::now().timestamp_millis()) {
            return Ok(token.access_token);
        }

        let Some(refresh_token) = token.refresh_token else {
            return Err(Error::TokenExpired {
                path: self.token_path.clone(),
            });
        };

        let refreshed = self.refresh(&refresh_token).await?;
        self.persist_token(&refreshed).await?;

        Ok(refreshed.access_token)
    }

    /// Refreshes an expired access token.
    async fn refresh(&self, refresh_token: &str) -> Result<StoredToken> {
        debug!("Refreshing expired access token");

        let response = self
            .post_token_form(&[
                ("client_id", self.credentials.client_id.as_str()),
                (
                    "client_secret",
                    self.credentials.client_secret.expose_secret(),
                ),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .await?;

        Ok(response.into_stored(
            Utc::now().timestamp_millis(),
            Some(refresh_token.to_string()),
        ))
    }

    /// Form-posts to the token endpoint and parses the response.
    async fn post_token_form(&self, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .http
            .post(&self.token_url)
            .form(params)
            .send()
            .await
            .map_err(|source| Error::TokenRequest {
                url: self.token_url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::TokenEndpoint {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|source| Error::TokenRequest {
                url: self.token_url.clone(),
                source,
            })
    }

    /// Reads and parses the stored token file.
    async fn load_stored_token(&self) -> Result<StoredToken> {
        let content = tokio::fs::read_to_string(&self.token_path)
            .await
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    Error::NoStoredToken {
                        path: self.token_path.clone(),
                    }
                } else {
                    Error::TokenRead {
                        path: self.token_path.clone(),
                        source,
                    }
                }
            })?;

        serde_json::from_str(&content).map_err(|source| Error::TokenParse {
            path: self.token_path.clone(),
            source,
        })
    }

    /// Writes the token file, creating its directory if needed.
    async fn persist_token(&self, token: &StoredToken) -> Result<()> {
        let persist_err = |source: std::io::Error| Error::TokenPersist {
            path: self.token_path.clone(),
            source,
        };

        if let Some(parent) = self.token_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(persist_err)?;
        }

        let content =
            serde_json::to_string_pretty(token).map_err(|e| persist_err(std::io::Error::other(e)))?;

        tokio::fs::write(&self.token_path, content)
            .await
            .map_err(persist_err)
    }

    /// Path of the token file this authenticator reads and writes.
    #[must_use]
    pub fn token_path(&self) -> &Path {
        &self.token_path
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("client_id", &self.credentials.client_id)
            .field("token_path", &self.token_path)
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}

/// Reads and parses the OAuth client credentials file.
async fn read_credentials(path: &Path) -> Result<InstalledCredentials> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::CredentialsRead {
            path: path.to_path_buf(),
            source,
        })?;

    let file: CredentialsFile =
        serde_json::from_str(&content).map_err(|source| Error::CredentialsParse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(file.installed.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GmailConfig;

    const CREDENTIALS_JSON: &str = r#"{
        "installed": {
            "client_id": "client-123.apps.googleusercontent.com",
            "client_secret": "super-secret",
            "redirect_uris": ["urn:ietf:wg:oauth:2.0:oob", "http://localhost"]
        }
    }"#;

    fn sample_token(expiry_date: Option<i64>, refresh: Option<&str>) -> StoredToken {
        StoredToken {
            access_token: "ya29.sample".into(),
            refresh_token: refresh.map(ToString::to_string),
            scope: None,
            token_type: Some("Bearer".into()),
            expiry_date,
        }
    }

    async fn test_authenticator(dir: &std::path::Path) -> Authenticator {
        let credentials_path = dir.join("credentials.json");
        tokio::fs::write(&credentials_path, CREDENTIALS_JSON)
            .await
            .unwrap();

        let config = GmailConfig::builder()
            .credentials_path(&credentials_path)
            .build()
            .unwrap();

        Authenticator::load(&config, reqwest::Client::new())
            .await
            .unwrap()
    }

    #[test]
    fn test_token_freshness() {
        let now = 1_700_000_000_000;

        // Well past the leeway window
        assert!(sample_token(Some(now + EXPIRY_LEEWAY_MS + 1), None).is_fresh(now));
        // Inside the leeway window counts as stale
        assert!(!sample_token(Some(now + EXPIRY_LEEWAY_MS - 1), None).is_fresh(now));
        // Already expired
        assert!(!sample_token(Some(now - 1), None).is_fresh(now));
        // No expiry recorded: taken at face value
        assert!(sample_token(None, None).is_fresh(now));
    }

    #[test]
    fn test_stored_token_layout() {
        let token = sample_token(Some(1_700_000_000_000), Some("1//refresh"));
        let json = serde_json::to_string(&token).unwrap();

        assert!(json.contains("\"access_token\""));
        assert!(json.contains("\"refresh_token\""));
        assert!(json.contains("\"expiry_date\":1700000000000"));
        // Absent optional fields are omitted, not serialized as null
        assert!(!json.contains("\"scope\""));
    }

    #[test]
    fn test_refresh_response_preserves_refresh_token() {
        let response = TokenResponse {
            access_token: "ya29.new".into(),
            refresh_token: None,
            expires_in: Some(3600),
            scope: None,
            token_type: Some("Bearer".into()),
        };

        let now = 1_700_000_000_000;
        let stored = response.into_stored(now, Some("1//previous".into()));

        assert_eq!(stored.access_token, "ya29.new");
        assert_eq!(stored.refresh_token.as_deref(), Some("1//previous"));
        assert_eq!(stored.expiry_date, Some(now + 3_600_000));
    }

    #[test]
    fn test_exchange_response_keeps_own_refresh_token() {
        let response = TokenResponse {
            access_token: "ya29.new".into(),
            refresh_token: Some("1//fresh".into()),
            expires_in: None,
            scope: Some("https://mail.google.com/".into()),
            token_type: None,
        };

        let stored = response.into_stored(0, None);
        assert_eq!(stored.refresh_token.as_deref(), Some("1//fresh"));
        assert_eq!(stored.expiry_date, None);
    }

    #[tokio::test]
    async fn test_credentials_parsing_and_redaction() {
        let dir = tempfile::tempdir().unwrap();
        let auth = test_authenticator(dir.path()).await;

        assert_eq!(
            auth.credentials.client_id,
            "client-123.apps.googleusercontent.com"
        );

        let debug_str = format!("{auth:?}");
        assert!(!debug_str.contains("super-secret"));
    }

    #[tokio::test]
    async fn test_authorization_url_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let auth = test_authenticator(dir.path()).await;

        let url = auth.authorization_url().unwrap();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-123.apps.googleusercontent.com"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("access_type=offline"));
        // First redirect URI wins
        assert!(url.contains("redirect_uri=urn%3Aietf%3Awg%3Aoauth%3A2.0%3Aoob"));
    }

    #[tokio::test]
    async fn test_token_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let auth = test_authenticator(dir.path()).await;

        let token = sample_token(Some(9_999_999_999_999), Some("1//refresh"));
        auth.persist_token(&token).await.unwrap();

        let reloaded = auth.load_stored_token().await.unwrap();
        assert_eq!(reloaded.access_token, token.access_token);
        assert_eq!(reloaded.refresh_token, token.refresh_token);
        assert_eq!(reloaded.expiry_date, token.expiry_date);
    }

    #[tokio::test]
    async fn test_missing_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let auth = test_authenticator(dir.path()).await;

        let err = auth.load_stored_token().await.unwrap_err();
        assert!(matches!(err, Error::NoStoredToken { .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_missing_redirect_uris_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let credentials_path = dir.path().join("credentials.json");
        tokio::fs::write(
            &credentials_path,
            r#"{"installed": {"client_id": "id", "client_secret": "s", "redirect_uris": []}}"#,
        )
        .await
        .unwrap();

        let config = GmailConfig::builder()
            .credentials_path(&credentials_path)
            .build()
            .unwrap();

        let result = Authenticator::load(&config, reqwest::Client::new()).await;
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }
}
