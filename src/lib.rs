//! # gmail-watch
//!
//! Async Gmail API client for waiting on messages that match a search query,
//! then reading or trashing them.
//!
//! This crate provides a high-level, async API for:
//! - Building Gmail search queries with a fluent builder
//! - Waiting for a message matching a query to arrive (bounded polling)
//! - Fetching the matched message's decoded body
//! - Moving the matched message to trash
//!
//! ## Features
//!
//! - **`observability`**: Enables OpenTelemetry integration for distributed tracing.
//!   Without this feature, tracing spans are still emitted but require no OTEL dependencies.
//!
//! ## Credential material
//!
//! Authentication uses the standard installed-application OAuth layout: a
//! `credentials.json` from the Google Cloud Console and a `token.json` written
//! by the authorization flow (see the `authorize` demo). Both live at paths
//! given in [`GmailConfig`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use gmail_watch::{GmailClient, GmailConfig, QueryBuilder};
//!
//! # async fn example() -> gmail_watch::Result<()> {
//! // Configure the client
//! let config = GmailConfig::builder()
//!     .credentials_path("credentials/credentials.json")
//!     .build()?;
//!
//! // Load credential material
//! let client = GmailClient::connect(config).await?;
//!
//! // Describe the message to wait for
//! let query = QueryBuilder::new()
//!     .from("noreply@example.com")
//!     .read(false)
//!     .with_subject("Your report is ready")
//!     .newer_than("1d")
//!     .build();
//!
//! // Poll until it arrives (default: every 10s, up to 5 minutes)
//! let message = client.wait_for_message(&query).await?;
//! println!("Got message {}: {}", message.message_id, message.body);
//! # Ok(())
//! # }
//! ```
//!
//! ## Query construction
//!
//! Queries must be specific enough to match at most one message - a search
//! resolving to several messages fails with [`Error::AmbiguousMatch`] rather
//! than picking one arbitrarily:
//!
//! ```
//! use gmail_watch::QueryBuilder;
//!
//! let query = QueryBuilder::new()
//!     .from("billing@example.com")
//!     .with_attachment()
//!     .with_file("invoice.pdf")
//!     .newer_than("1d")
//!     .build();
//!
//! assert_eq!(
//!     query,
//!     "from:billing@example.com has:attachment filename:invoice.pdf newer_than:1d"
//! );
//! ```
//!
//! ## Error Handling
//!
//! All errors implement `std::error::Error` and provide context. Use
//! [`Error::is_retryable`] to determine if an operation can be retried - the
//! wait loop uses the same classification internally:
//!
//! ```
//! use gmail_watch::Error;
//!
//! fn handle_error(error: &Error) {
//!     if error.is_retryable() {
//!         println!("Transient error, can retry: {}", error);
//!     } else {
//!         println!("Permanent error: {}", error);
//!     }
//! }
//! ```
//!
//! ## Observability
//!
//! The crate uses `tracing` for instrumentation. All major operations emit
//! spans with structured fields suitable for distributed tracing.
//!
//! ### Span Naming Convention
//!
//! - `GmailClient::connect` - Credential loading
//! - `GmailClient::search` - Single-shot search
//! - `GmailClient::wait_for_message` - Waiting for a message
//! - `GmailClient::trash` - Search-then-trash
//! - `auth::access_token` - Token resolution/refresh
//! - `auth::exchange_code` - Authorization code exchange
//!
//! ### Standard Fields
//!
//! - `query` - The rendered search query
//! - `user_id` - Gmail user id (usually `me`)
//! - `message_id` - Matched message id
//! - `elapsed_ms` - Accumulated wait time inside a poll
//!
//! Enable the `observability` feature for OpenTelemetry integration.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod auth;
pub mod config;
pub mod error;
pub mod query;

// Internal modules
mod api;
mod body;
mod client;
mod poll;

// Re-exports for ergonomic API
pub use auth::Authenticator;
pub use client::{GmailClient, MessageResult};
pub use config::{GmailConfig, GmailConfigBuilder, PollingConfig, TimeoutConfig, DEFAULT_SCOPES};
pub use error::{Error, ErrorCategory, Result};
pub use query::{QueryBuilder, QueryToken};
