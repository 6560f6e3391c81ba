//! Basic example: wait for a message from a given sender to arrive.
//!
//! Polls the mailbox every 10 seconds for up to 5 minutes (the defaults) and
//! prints the decoded body of the first message matching the query.
//!
//! # Usage
//!
//! ```bash
//! export GMAIL_WATCH_CREDENTIALS="credentials/credentials.json"
//! export FROM_ADDRESS="noreply@example.com"
//! # Optional: narrow the query further
//! export SUBJECT="Your report is ready"
//! cargo run --example wait_for_message
//! ```
//!
//! Run the `authorize` example once first to create the stored token.

use gmail_watch::{GmailClient, GmailConfig, QueryBuilder};
use std::env;

#[tokio::main]
async fn main() -> gmail_watch::Result<()> {
    // Structured logs on stderr; control with RUST_LOG (e.g. RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let credentials = env::var("GMAIL_WATCH_CREDENTIALS")
        .expect("GMAIL_WATCH_CREDENTIALS environment variable required");
    let from = env::var("FROM_ADDRESS").expect("FROM_ADDRESS environment variable required");

    let config = GmailConfig::builder()
        .credentials_path(credentials)
        .build()?;

    let client = GmailClient::connect(config).await?;

    let mut builder = QueryBuilder::new().from(&from).newer_than("1d");
    if let Ok(subject) = env::var("SUBJECT") {
        builder = builder.with_subject(subject);
    }
    let query = builder.build();

    println!("Waiting for a message matching: {query}");
    println!("(Send the message now, or press Ctrl+C to cancel)");

    let message = client.wait_for_message(&query).await?;

    println!("Got message {}", message.message_id);
    println!("{}", message.body);

    Ok(())
}
