//! Gmail client for searching, waiting on and trashing messages.
//!
//! The [`GmailClient`] is the main entry point for this crate. It provides
//! async methods to:
//!
//! - Search the mailbox for exactly one message matching a query
//! - Wait for a matching message to arrive
//! - Move a matching message to trash
//!
//! # Example
//!
//! ```no_run
//! use gmail_watch::{GmailClient, GmailConfig, QueryBuilder};
//!
//! # async fn example() -> gmail_watch::Result<()> {
//! let config = GmailConfig::builder()
//!     .credentials_path("credentials/credentials.json")
//!     .build()?;
//!
//! let client = GmailClient::connect(config).await?;
//!
//! let query = QueryBuilder::new()
//!     .from("noreply@example.com")
//!     .read(false)
//!     .newer_than("1d")
//!     .build();
//!
//! // Poll until the message arrives or the deadline passes
//! let message = client.wait_for_message(&query).await?;
//! println!("Got message {}: {}", message.message_id, message.body);
//!
//! // Optionally remove it afterwards
//! client.trash(&query).await?;
//! # Ok(())
//! # }
//! ```

use crate::api;
use crate::auth::Authenticator;
use crate::body;
use crate::config::{GmailConfig, PollingConfig};
use crate::error::{Error, Result};
use crate::poll;
use tracing::{debug, instrument};

/// Search requests are bounded to two results: enough to tell "exactly one"
/// from "too many" without paging through the rest of the mailbox.
const SEARCH_RESULT_BOUND: u32 = 2;

/// A successfully resolved search: exactly one message matched the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageResult {
    /// Always true for results produced by a successful search; retained so
    /// the result can be forwarded as a presence probe.
    pub exists: bool,
    /// Gmail id of the matched message.
    pub message_id: String,
    /// Message body decoded from its transport encoding.
    pub body: String,
}

/// Async Gmail API client for waiting on and trashing messages.
///
/// Create using [`GmailClient::connect`]. Every mailbox operation
/// authenticates against the stored token (refreshing it when stale), so a
/// client value stays valid across long waits.
///
/// # Example
///
/// ```no_run
/// use gmail_watch::{GmailClient, GmailConfig, QueryBuilder};
///
/// # async fn example() -> gmail_watch::Result<()> {
/// let config = GmailConfig::builder()
///     .credentials_path("credentials/credentials.json")
///     .build()?;
/// let client = GmailClient::connect(config).await?;
///
/// let query = QueryBuilder::new().with_subject("Weekly report").build();
/// let message = client.search(&query).await?;
/// # Ok(())
/// # }
/// ```
pub struct GmailClient {
    http: reqwest::Client,
    auth: Authenticator,
    config: GmailConfig,
}

impl GmailClient {
    /// Loads credential material and prepares the client.
    ///
    /// Reads and validates the credentials file and builds the HTTP client
    /// with the configured timeouts. No network I/O happens here - tokens are
    /// resolved per operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials file cannot be read or parsed, or
    /// if the HTTP client cannot be constructed.
    #[instrument(
        name = "GmailClient::connect",
        skip_all,
        fields(
            credentials = ?config.credentials_path,
            user_id = %config.user_id
        )
    )]
    pub async fn connect(config: GmailConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeouts.connect)
            .timeout(config.timeouts.request)
            .build()
            .map_err(|source| Error::Http { source })?;

        let auth = Authenticator::load(&config, http.clone()).await?;

        debug!("Client ready");

        Ok(Self { http, auth, config })
    }

    /// Searches the mailbox for exactly one message matching `query`.
    ///
    /// The search is bounded to two results; zero matches fail with
    /// [`Error::NotFound`] and more than one with [`Error::AmbiguousMatch`]
    /// carrying the query text. On a single match the message's full
    /// representation is fetched and its body decoded.
    ///
    /// # Errors
    ///
    /// Returns an error on authentication failure, API failure, an unresolved
    /// search (zero or multiple matches), or an undecodable body.
    #[instrument(name = "GmailClient::search", skip_all, fields(query = %query))]
    pub async fn search(&self, query: &str) -> Result<MessageResult> {
        let access_token = self.auth.access_token().await?;

        let matches = api::list_messages(
            &self.http,
            &self.config,
            &access_token,
            query,
            SEARCH_RESULT_BOUND,
        )
        .await?;

        let matched = match matches.as_slice() {
            [] => return Err(Error::NotFound),
            [one] => one,
            _ => {
                return Err(Error::AmbiguousMatch {
                    query: query.to_string(),
                })
            }
        };

        let message =
            api::get_message(&self.http, &self.config, &access_token, &matched.id).await?;

        debug!(
            message_id = %message.id,
            snippet = message.snippet.as_deref().unwrap_or_default(),
            "Fetched matching message"
        );

        let payload = message.payload.as_ref().ok_or_else(|| Error::BodyMissing {
            message_id: message.id.clone(),
        })?;
        let body = body::extract_text(&message.id, payload)?;

        Ok(MessageResult {
            exists: true,
            message_id: message.id,
            body,
        })
    }

    /// Waits for a message matching `query`, using the configured polling
    /// interval and deadline.
    ///
    /// Sleeps between attempts and keeps searching until a single match is
    /// found or the deadline passes. Misses and transient provider failures
    /// do not abort the wait; authentication and decoding failures do.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WaitTimeout`] when the deadline is exhausted, or any
    /// non-retryable error from an individual search attempt.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gmail_watch::{GmailClient, GmailConfig, QueryBuilder};
    ///
    /// # async fn example() -> gmail_watch::Result<()> {
    /// # let config = GmailConfig::builder().credentials_path("c.json").build()?;
    /// let client = GmailClient::connect(config).await?;
    /// let query = QueryBuilder::new().with_subject("Your code").build();
    ///
    /// let message = client.wait_for_message(&query).await?;
    /// println!("{}", message.body);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(name = "GmailClient::wait_for_message", skip_all, fields(query = %query))]
    pub async fn wait_for_message(&self, query: &str) -> Result<MessageResult> {
        self.wait_with(query, &self.config.polling).await
    }

    /// Waits for a message matching `query` with explicit polling overrides.
    ///
    /// See [`wait_for_message`](Self::wait_for_message).
    ///
    /// # Errors
    ///
    /// Returns [`Error::WaitTimeout`] when the deadline is exhausted, or any
    /// non-retryable error from an individual search attempt.
    #[instrument(
        name = "GmailClient::wait_for_message_with",
        skip_all,
        fields(
            query = %query,
            interval_ms = polling.interval.as_millis() as u64,
            max_wait_ms = polling.max_wait.as_millis() as u64
        )
    )]
    pub async fn wait_for_message_with(
        &self,
        query: &str,
        polling: &PollingConfig,
    ) -> Result<MessageResult> {
        self.wait_with(query, polling).await
    }

    /// Moves the single message matching `query` to trash.
    ///
    /// Runs the same search as [`search`](Self::search) first; the trash
    /// request is only issued once the query resolved to exactly one message.
    ///
    /// # Errors
    ///
    /// Returns the search's [`Error::NotFound`]/[`Error::AmbiguousMatch`] if
    /// the precondition fails, or an API error if the trash request is
    /// rejected.
    #[instrument(name = "GmailClient::trash", skip_all, fields(query = %query))]
    pub async fn trash(&self, query: &str) -> Result<()> {
        let found = self.search(query).await?;

        let access_token = self.auth.access_token().await?;
        api::trash_message(&self.http, &self.config, &access_token, &found.message_id).await?;

        debug!(message_id = %found.message_id, "Message moved to trash");

        Ok(())
    }

    /// Builds the consent URL for the interactive authorization bootstrap.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured auth URL cannot be parsed.
    pub fn authorization_url(&self) -> Result<String> {
        self.auth.authorization_url()
    }

    /// Exchanges an authorization code for tokens and persists them at the
    /// configured token path.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange is rejected or the token cannot be
    /// persisted.
    pub async fn exchange_code(&self, code: &str) -> Result<()> {
        self.auth.exchange_code(code).await
    }

    /// Returns the identity-provider collaborator backing this client.
    #[must_use]
    pub fn authenticator(&self) -> &Authenticator {
        &self.auth
    }

    /// Returns the Gmail user id mailbox operations target.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.config.user_id
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private methods
    // ─────────────────────────────────────────────────────────────────────────

    async fn wait_with(&self, query: &str, polling: &PollingConfig) -> Result<MessageResult> {
        poll::wait_until_found(polling, || self.search(query)).await
    }
}

impl std::fmt::Debug for GmailClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GmailClient")
            .field("user_id", &self.config.user_id)
            .field("api_base_url", &self.config.api_base_url)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}
