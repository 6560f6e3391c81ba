//! Error types for the gmail-watch crate.
//!
//! All errors implement [`std::error::Error`] and provide context about what went wrong.
//! Errors are categorized by their retryability - see [`Error::is_retryable`].

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during Gmail operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration / validation errors (NOT retryable)
    // ─────────────────────────────────────────────────────────────────────────
    /// Invalid configuration provided.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Credential material errors (NOT retryable - fix the files, not the call)
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to read the OAuth client credentials file.
    #[error("failed to read credentials file {path:?}")]
    CredentialsRead {
        /// Path of the credentials file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the OAuth client credentials file.
    #[error("failed to parse credentials file {path:?}")]
    CredentialsParse {
        /// Path of the credentials file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// No stored OAuth token exists yet.
    #[error("no stored token at {path:?}; run the authorization flow first")]
    NoStoredToken {
        /// Path where the token file was expected.
        path: PathBuf,
    },

    /// Failed to read the stored OAuth token file.
    #[error("failed to read token file {path:?}")]
    TokenRead {
        /// Path of the token file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the stored OAuth token file.
    #[error("failed to parse token file {path:?}")]
    TokenParse {
        /// Path of the token file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to persist the OAuth token file.
    #[error("failed to persist token file {path:?}")]
    TokenPersist {
        /// Path of the token file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The stored token is expired and carries no refresh token.
    #[error("stored token at {path:?} is expired and cannot be refreshed")]
    TokenExpired {
        /// Path of the expired token file.
        path: PathBuf,
    },

    /// The token endpoint could not be reached during exchange or refresh.
    #[error("token request to {url} failed")]
    TokenRequest {
        /// The token endpoint URL.
        url: String,
        /// The underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },

    /// The token endpoint rejected an exchange or refresh.
    #[error("token endpoint rejected the request with status {status}: {message}")]
    TokenEndpoint {
        /// HTTP status code returned by the token endpoint.
        status: u16,
        /// Error detail from the response body.
        message: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Transport errors (RETRYABLE)
    // ─────────────────────────────────────────────────────────────────────────
    /// HTTP transport failure talking to the Gmail API.
    #[error("Gmail API request failed")]
    Http {
        /// The underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Provider errors (RETRYABLE - could be transient server issues)
    // ─────────────────────────────────────────────────────────────────────────
    /// The Gmail API returned a non-success status.
    #[error("Gmail API returned status {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error detail from the response body.
        message: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Search result errors (RETRYABLE inside a poll - the message may not
    // have arrived yet, or a stale duplicate may not have expired)
    // ─────────────────────────────────────────────────────────────────────────
    /// No message matched the query.
    #[error("no message found matching the query")]
    NotFound,

    /// More than one message matched the query.
    #[error("more than one message found for query: {query}")]
    AmbiguousMatch {
        /// The query that matched multiple messages.
        query: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Body decoding errors (NOT retryable - malformed content won't change)
    // ─────────────────────────────────────────────────────────────────────────
    /// The fetched message carries no body data.
    #[error("message {message_id} has no body data")]
    BodyMissing {
        /// Id of the message without a body.
        message_id: String,
    },

    /// The message body is not valid base64url.
    #[error("failed to decode body of message {message_id}")]
    BodyDecode {
        /// Id of the message with the undecodable body.
        message_id: String,
        /// The underlying decode error.
        #[source]
        source: base64::DecodeError,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Timeout errors (NOT retryable - we already waited)
    // ─────────────────────────────────────────────────────────────────────────
    /// Timeout waiting for a matching message.
    #[error("timeout waiting for matching message after {timeout:?}")]
    WaitTimeout {
        /// The configured deadline that was exceeded.
        timeout: Duration,
    },
}

impl Error {
    /// Returns `true` if this error represents a transient failure that might succeed on retry.
    ///
    /// The poll loop uses this to decide whether a failed search attempt keeps
    /// the wait alive or aborts it:
    ///
    /// ```ignore
    /// if error.is_retryable() {
    ///     // Stay in the wait loop until the deadline
    /// } else {
    ///     // Fail the whole wait
    /// }
    /// ```
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            // RETRYABLE errors: transport, API rejections, unsettled search results
            Error::Http { .. }
            | Error::Api { .. }
            | Error::NotFound
            | Error::AmbiguousMatch { .. } => true,

            // NOT retryable: config, credential material, decoding, wait timeout
            Error::InvalidConfig { .. }
            | Error::CredentialsRead { .. }
            | Error::CredentialsParse { .. }
            | Error::NoStoredToken { .. }
            | Error::TokenRead { .. }
            | Error::TokenParse { .. }
            | Error::TokenPersist { .. }
            | Error::TokenExpired { .. }
            | Error::TokenRequest { .. }
            | Error::TokenEndpoint { .. }
            | Error::BodyMissing { .. }
            | Error::BodyDecode { .. }
            | Error::WaitTimeout { .. } => false,
        }
    }

    /// Returns the error category for metrics/logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidConfig { .. } => ErrorCategory::Configuration,

            Error::CredentialsRead { .. }
            | Error::CredentialsParse { .. }
            | Error::NoStoredToken { .. }
            | Error::TokenRead { .. }
            | Error::TokenParse { .. }
            | Error::TokenPersist { .. }
            | Error::TokenExpired { .. }
            | Error::TokenRequest { .. }
            | Error::TokenEndpoint { .. } => ErrorCategory::Auth,

            Error::Http { .. } => ErrorCategory::Network,

            Error::Api { .. } => ErrorCategory::Api,

            Error::NotFound | Error::AmbiguousMatch { .. } => ErrorCategory::Search,

            Error::BodyMissing { .. } | Error::BodyDecode { .. } => ErrorCategory::Parse,

            Error::WaitTimeout { .. } => ErrorCategory::Timeout,
        }
    }
}

/// Error categories for metrics and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration or validation errors.
    Configuration,
    /// Credential loading, exchange or refresh errors.
    Auth,
    /// Network connectivity errors.
    Network,
    /// Gmail API errors.
    Api,
    /// Message body decoding errors.
    Parse,
    /// Search resolution errors (no match, ambiguous match).
    Search,
    /// Timeout errors.
    Timeout,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Auth => write!(f, "auth"),
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Api => write!(f, "api"),
            ErrorCategory::Parse => write!(f, "parse"),
            ErrorCategory::Search => write!(f, "search"),
            ErrorCategory::Timeout => write!(f, "timeout"),
        }
    }
}
