//! Example: move the single message matching a query to trash.
//!
//! The query must resolve to exactly one message - an ambiguous query fails
//! rather than trashing an arbitrary match.
//!
//! # Usage
//!
//! ```bash
//! export GMAIL_WATCH_CREDENTIALS="credentials/credentials.json"
//! export FROM_ADDRESS="noreply@example.com"
//! export SUBJECT="Your report is ready"
//! cargo run --example trash_message
//! ```

use gmail_watch::{GmailClient, GmailConfig, QueryBuilder};
use std::env;

#[tokio::main]
async fn main() -> gmail_watch::Result<()> {
    let credentials = env::var("GMAIL_WATCH_CREDENTIALS")
        .expect("GMAIL_WATCH_CREDENTIALS environment variable required");
    let from = env::var("FROM_ADDRESS").expect("FROM_ADDRESS environment variable required");
    let subject = env::var("SUBJECT").expect("SUBJECT environment variable required");

    let config = GmailConfig::builder()
        .credentials_path(credentials)
        .build()?;

    let client = GmailClient::connect(config).await?;

    let query = QueryBuilder::new()
        .from(&from)
        .with_subject(&subject)
        .newer_than("1d")
        .build();

    println!("Trashing the message matching: {query}");

    client.trash(&query).await?;

    println!("Done.");

    Ok(())
}
