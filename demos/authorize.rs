//! One-time authorization bootstrap: create the stored token for later runs.
//!
//! Prints the consent URL, waits for the authorization code to be pasted in,
//! then exchanges it and persists the token next to the credentials file.
//!
//! # Usage
//!
//! ```bash
//! export GMAIL_WATCH_CREDENTIALS="credentials/credentials.json"
//! cargo run --example authorize
//! ```
//!
//! Create the credentials file in the Google Cloud Console (OAuth client of
//! type "Desktop app") before running this.

use gmail_watch::{GmailClient, GmailConfig};
use std::env;
use std::io::{BufRead, Write};

#[tokio::main]
async fn main() -> gmail_watch::Result<()> {
    let credentials = env::var("GMAIL_WATCH_CREDENTIALS")
        .expect("GMAIL_WATCH_CREDENTIALS environment variable required");

    let config = GmailConfig::builder()
        .credentials_path(credentials)
        .build()?;

    let client = GmailClient::connect(config).await?;

    println!("Authorize this app by visiting this url:");
    println!("{}", client.authorization_url()?);
    print!("Enter the code from that page here: ");
    std::io::stdout().flush().expect("flush stdout");

    let mut code = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut code)
        .expect("read authorization code");

    client.exchange_code(code.trim()).await?;

    println!(
        "Token stored to {}",
        client.authenticator().token_path().display()
    );

    Ok(())
}
