//! Internal module for decoding message bodies.
//!
//! Gmail ships body content as base64url data on the payload (single-part
//! messages) or spread over MIME parts (multipart messages). This module
//! turns either shape into plain text.

use crate::api::{MessagePart, MessagePayload};
use crate::error::{Error, Result};
use base64::prelude::*;
use tracing::debug;

/// Decodes the text content of a fetched message payload.
///
/// Single-part messages carry their data directly on the payload body.
/// For multipart messages the first `text/plain` part wins, falling back to
/// `text/html`, searching nested parts depth-last.
pub(crate) fn extract_text(message_id: &str, payload: &MessagePayload) -> Result<String> {
    if let Some(data) = payload.body.as_ref().and_then(|body| body.data.as_deref()) {
        if !data.is_empty() {
            return decode_data(message_id, data);
        }
    }

    if let Some(parts) = &payload.parts {
        if let Some(data) = find_text_part(parts) {
            debug!(message_id, "Using multipart body data");
            return decode_data(message_id, data);
        }
    }

    Err(Error::BodyMissing {
        message_id: message_id.to_string(),
    })
}

/// Finds the best text part: text/plain first, then text/html, then any
/// nested multipart containing one.
fn find_text_part(parts: &[MessagePart]) -> Option<&str> {
    for wanted in ["text/plain", "text/html"] {
        for part in parts {
            let matches = part
                .mime_type
                .as_deref()
                .is_some_and(|mime| mime.eq_ignore_ascii_case(wanted));
            if !matches {
                continue;
            }
            if let Some(data) = part.body.as_ref().and_then(|body| body.data.as_deref()) {
                if !data.is_empty() {
                    return Some(data);
                }
            }
        }
    }

    for part in parts {
        if let Some(nested) = &part.parts {
            if let Some(data) = find_text_part(nested) {
                return Some(data);
            }
        }
    }

    None
}

/// Decodes base64url data into text.
///
/// Gmail emits unpadded base64url but padded variants appear in the wild, so
/// padding is stripped before decoding. Invalid UTF-8 is replaced rather than
/// rejected, matching how mail bodies are usually consumed.
fn decode_data(message_id: &str, data: &str) -> Result<String> {
    let bytes = BASE64_URL_SAFE_NO_PAD
        .decode(data.trim_end_matches('='))
        .map_err(|source| Error::BodyDecode {
            message_id: message_id.to_string(),
            source,
        })?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MessageBody;

    fn body(data: &str) -> Option<MessageBody> {
        Some(MessageBody {
            data: Some(data.to_string()),
            size: None,
        })
    }

    fn part(mime: &str, data: &str) -> MessagePart {
        MessagePart {
            mime_type: Some(mime.to_string()),
            body: body(data),
            parts: None,
        }
    }

    #[test]
    fn test_single_part_decode() {
        let payload = MessagePayload {
            mime_type: Some("text/plain".into()),
            // "hello world"
            body: body("aGVsbG8gd29ybGQ"),
            parts: None,
        };

        assert_eq!(extract_text("m1", &payload).unwrap(), "hello world");
    }

    #[test]
    fn test_padded_input_accepted() {
        let payload = MessagePayload {
            mime_type: Some("text/plain".into()),
            body: body("aGVsbG8="),
            parts: None,
        };

        assert_eq!(extract_text("m1", &payload).unwrap(), "hello");
    }

    #[test]
    fn test_multipart_prefers_text_plain() {
        let payload = MessagePayload {
            mime_type: Some("multipart/alternative".into()),
            body: None,
            // html part listed first; plain should still win
            parts: Some(vec![
                part("text/html", "PGI-aGk8L2I-"),
                part("text/plain", "aGk"),
            ]),
        };

        assert_eq!(extract_text("m1", &payload).unwrap(), "hi");
    }

    #[test]
    fn test_multipart_falls_back_to_html() {
        let payload = MessagePayload {
            mime_type: Some("multipart/alternative".into()),
            body: None,
            parts: Some(vec![part("text/html", "PGI-aGk8L2I-")]),
        };

        assert_eq!(extract_text("m1", &payload).unwrap(), "<b>hi</b>");
    }

    #[test]
    fn test_nested_multipart() {
        let inner = MessagePart {
            mime_type: Some("multipart/alternative".into()),
            body: None,
            parts: Some(vec![part("text/plain", "bmVzdGVk")]),
        };
        let payload = MessagePayload {
            mime_type: Some("multipart/mixed".into()),
            body: None,
            parts: Some(vec![inner]),
        };

        assert_eq!(extract_text("m1", &payload).unwrap(), "nested");
    }

    #[test]
    fn test_missing_body_errors() {
        let payload = MessagePayload {
            mime_type: Some("multipart/mixed".into()),
            body: None,
            parts: Some(vec![MessagePart {
                mime_type: Some("application/pdf".into()),
                body: None,
                parts: None,
            }]),
        };

        let err = extract_text("m1", &payload).unwrap_err();
        assert!(matches!(err, Error::BodyMissing { .. }));
        assert!(err.to_string().contains("m1"));
    }

    #[test]
    fn test_invalid_base64_errors() {
        let payload = MessagePayload {
            mime_type: Some("text/plain".into()),
            body: body("not base64!!!"),
            parts: None,
        };

        assert!(matches!(
            extract_text("m1", &payload),
            Err(Error::BodyDecode { .. })
        ));
    }
}
