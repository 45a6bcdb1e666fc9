//! Email message codec
//!
//! Pure functions over the wire format: building raw RFC822 payloads for the
//! Gmail `raw` field, and normalizing inbound MIME part trees into a
//! plain-text/HTML view. No I/O here.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD},
    Engine,
};

use crate::error::{GmailApiError, Result, ServerError};
use crate::gmail::types::MessagePart;

/// An outgoing email before encoding
///
/// Absent fields produce no header line at all; only the body is required.
#[derive(Debug, Clone, Default)]
pub struct OutgoingMessage {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub body: String,
    pub cc: Option<String>,
    pub bcc: Option<String>,
}

/// Build the raw payload for draft creation
///
/// Header lines in fixed order: To, Cc, Bcc, Content-Type, MIME-Version,
/// Subject. CRLF terminated, blank line, then the body. Encoded as padded
/// base64url.
pub fn encode_draft(msg: &OutgoingMessage) -> String {
    let mut email = String::new();

    if let Some(ref to) = msg.to {
        email.push_str(&format!("To: {}\r\n", to));
    }
    if let Some(ref cc) = msg.cc {
        email.push_str(&format!("Cc: {}\r\n", cc));
    }
    if let Some(ref bcc) = msg.bcc {
        email.push_str(&format!("Bcc: {}\r\n", bcc));
    }
    email.push_str("Content-Type: text/plain; charset=\"UTF-8\"\r\n");
    email.push_str("MIME-Version: 1.0\r\n");
    if let Some(ref subject) = msg.subject {
        email.push_str(&format!("Subject: {}\r\n", subject));
    }
    email.push_str("\r\n");
    email.push_str(&msg.body);

    URL_SAFE.encode(email.as_bytes())
}

/// Build the raw payload for direct send
///
/// The bare variant: To and Subject only, no MIME headers, unpadded
/// base64url. Kept separate from [`encode_draft`] on purpose; the two paths
/// emit genuinely different header sets.
pub fn encode_send(to: &str, subject: &str, body: &str) -> String {
    let email = format!("To: {}\r\nSubject: {}\r\n\r\n{}", to, subject, body);
    URL_SAFE_NO_PAD.encode(email.as_bytes())
}

/// Decode base64url data from Gmail API
/// Handles both padded and non-padded base64url encoding
pub fn decode_base64url(data: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(data)
        .or_else(|_| URL_SAFE.decode(data))
        .or_else(|_| STANDARD.decode(data))
        .map_err(|e| {
            ServerError::Gmail(GmailApiError::RequestFailed {
                message: format!("invalid base64 body data: {}", e),
            })
        })
}

/// Decode base64url data to string
pub fn decode_base64url_string(data: &str) -> Result<String> {
    let bytes = decode_base64url(data)?;
    String::from_utf8(bytes).map_err(|e| {
        ServerError::Gmail(GmailApiError::RequestFailed {
            message: format!("body data is not UTF-8: {}", e),
        })
    })
}

/// Normalized text view of a decoded message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageView {
    /// Decoded text/plain content
    pub text: String,

    /// Decoded text/html content
    pub html: String,
}

impl MessageView {
    /// True iff any HTML part was found
    pub fn has_html(&self) -> bool {
        !self.html.is_empty()
    }

    /// The caller-facing body: plain text preferred, HTML as fallback
    pub fn body(&self) -> &str {
        if self.text.is_empty() {
            &self.html
        } else {
            &self.text
        }
    }
}

/// Extract the text bodies from a MIME part tree
///
/// A payload with child parts gets a depth-first walk; later parts of the
/// same type overwrite earlier ones. A payload with no children but body
/// data is the degenerate single-part case, decided by its own MIME type.
pub fn extract_content(payload: &MessagePart) -> MessageView {
    let mut view = MessageView::default();

    if !payload.parts.is_empty() {
        for part in &payload.parts {
            collect_text_parts(part, &mut view);
        }
    } else if let Some(data) = part_data(payload) {
        match payload.mime_type.as_deref() {
            Some("text/plain") => decode_into(data, &mut view.text),
            Some("text/html") => decode_into(data, &mut view.html),
            _ => {}
        }
    }

    view
}

fn collect_text_parts(part: &MessagePart, view: &mut MessageView) {
    match (part.mime_type.as_deref(), part_data(part)) {
        (Some("text/plain"), Some(data)) => decode_into(data, &mut view.text),
        (Some("text/html"), Some(data)) => decode_into(data, &mut view.html),
        _ => {
            for child in &part.parts {
                collect_text_parts(child, view);
            }
        }
    }
}

fn part_data(part: &MessagePart) -> Option<&str> {
    part.body.as_ref().and_then(|b| b.data.as_deref())
}

fn decode_into(data: &str, slot: &mut String) {
    match decode_base64url_string(data) {
        Ok(decoded) => *slot = decoded,
        Err(e) => {
            // Skip undecodable parts, keep walking
            tracing::debug!("failed to decode message part: {}", e);
        }
    }
}

/// Find header value by name (case-insensitive, first occurrence wins)
pub fn find_header<'a>(part: &'a MessagePart, name: &str) -> Option<&'a str> {
    part.headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}
