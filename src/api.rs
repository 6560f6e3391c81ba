//! Internal Gmail REST plumbing.
//!
//! Wire types and the three API calls the client issues: bounded message
//! listing, full message fetch, and moving a message to trash.

use crate::config::GmailConfig;
use crate::error::{Error, Result};
use serde::Deserialize;
use tracing::debug;

/// Reference to a message in a list response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessageRef {
    pub(crate) id: String,
    #[allow(dead_code)]
    pub(crate) thread_id: Option<String>,
}

/// `users.messages.list` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListMessagesResponse {
    pub(crate) messages: Option<Vec<MessageRef>>,
    #[allow(dead_code)]
    pub(crate) next_page_token: Option<String>,
    #[allow(dead_code)]
    pub(crate) result_size_estimate: Option<u32>,
}

/// `users.messages.get` response (format=full).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GmailMessage {
    pub(crate) id: String,
    pub(crate) snippet: Option<String>,
    pub(crate) payload: Option<MessagePayload>,
}

/// Top-level message payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessagePayload {
    #[allow(dead_code)]
    pub(crate) mime_type: Option<String>,
    pub(crate) body: Option<MessageBody>,
    pub(crate) parts: Option<Vec<MessagePart>>,
}

/// One part of a multipart payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessagePart {
    pub(crate) mime_type: Option<String>,
    pub(crate) body: Option<MessageBody>,
    pub(crate) parts: Option<Vec<MessagePart>>,
}

/// Body container holding base64url-encoded data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessageBody {
    pub(crate) data: Option<String>,
    #[allow(dead_code)]
    pub(crate) size: Option<u32>,
}

/// Gmail error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Lists message ids matching `query`, bounded to `max_results`.
pub(crate) async fn list_messages(
    http: &reqwest::Client,
    config: &GmailConfig,
    access_token: &str,
    query: &str,
    max_results: u32,
) -> Result<Vec<MessageRef>> {
    let url = format!(
        "{}/users/{}/messages",
        config.api_base_url.trim_end_matches('/'),
        config.user_id
    );
    let max_results = max_results.to_string();

    debug!(%url, query, "Listing messages");

    let response = http
        .get(&url)
        .query(&[("q", query), ("maxResults", max_results.as_str())])
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|source| Error::Http { source })?;

    let list: ListMessagesResponse = read_json(response).await?;

    Ok(list.messages.unwrap_or_default())
}

/// Fetches a message's full representation.
pub(crate) async fn get_message(
    http: &reqwest::Client,
    config: &GmailConfig,
    access_token: &str,
    id: &str,
) -> Result<GmailMessage> {
    let url = format!(
        "{}/users/{}/messages/{}",
        config.api_base_url.trim_end_matches('/'),
        config.user_id,
        id
    );

    debug!(%url, "Fetching message");

    let response = http
        .get(&url)
        .query(&[("format", "full")])
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|source| Error::Http { source })?;

    read_json(response).await
}

/// Moves a message to trash.
pub(crate) async fn trash_message(
    http: &reqwest::Client,
    config: &GmailConfig,
    access_token: &str,
    id: &str,
) -> Result<()> {
    let url = format!(
        "{}/users/{}/messages/{}/trash",
        config.api_base_url.trim_end_matches('/'),
        config.user_id,
        id
    );

    debug!(%url, "Trashing message");

    let response = http
        .post(&url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|source| Error::Http { source })?;

    check_status(response).await?;

    Ok(())
}

/// Verifies the status and parses the JSON body.
async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = check_status(response).await?;

    response
        .json()
        .await
        .map_err(|source| Error::Http { source })
}

/// Maps non-success responses to [`Error::Api`], extracting the Gmail error
/// message when the body carries one.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
        .unwrap_or(body);

    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_response_deserializes() {
        let json = r#"{
            "messages": [
                {"id": "18c1a2b3", "threadId": "18c1a2b3"},
                {"id": "18c1a2b4", "threadId": "18c1a2b4"}
            ],
            "resultSizeEstimate": 2
        }"#;

        let list: ListMessagesResponse = serde_json::from_str(json).unwrap();
        let messages = list.messages.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, "18c1a2b3");
    }

    #[test]
    fn test_empty_list_response() {
        // Gmail omits the messages array entirely when nothing matches
        let json = r#"{"resultSizeEstimate": 0}"#;
        let list: ListMessagesResponse = serde_json::from_str(json).unwrap();
        assert!(list.messages.is_none());
    }

    #[test]
    fn test_full_message_deserializes() {
        let json = r#"{
            "id": "18c1a2b3",
            "snippet": "Your delivery has arrived",
            "payload": {
                "mimeType": "multipart/alternative",
                "body": {"size": 0},
                "parts": [
                    {"mimeType": "text/plain", "body": {"data": "aGVsbG8", "size": 5}},
                    {"mimeType": "text/html", "body": {"data": "PGI-aGk8L2I-", "size": 12}}
                ]
            }
        }"#;

        let message: GmailMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message.id, "18c1a2b3");

        let payload = message.payload.unwrap();
        let parts = payload.parts.unwrap();
        assert_eq!(parts[0].mime_type.as_deref(), Some("text/plain"));
        assert_eq!(
            parts[0].body.as_ref().unwrap().data.as_deref(),
            Some("aGVsbG8")
        );
    }

    #[test]
    fn test_error_envelope_extraction() {
        let json = r#"{"error": {"code": 403, "message": "Rate limit exceeded", "status": "PERMISSION_DENIED"}}"#;
        let envelope: ApiErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(
            envelope.error.unwrap().message.as_deref(),
            Some("Rate limit exceeded")
        );
    }
}
