//! Outbound message composition
//!
//! Builds an RFC 822 style envelope (headers, blank line, HTML body) and
//! encodes it the way the Gmail API expects its `raw` field: URL-safe
//! base64 with the padding stripped.

use base64::{engine::general_purpose::STANDARD, engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::{Error, Identity, Result};

/// Subject used when none (or a blank one) is supplied
pub const DEFAULT_SUBJECT: &str = "AI Generated Email";

pub const CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// A validated message ready to be turned into an envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    recipients: Vec<String>,
    subject: Option<String>,
    body: String,
}

impl OutboundMessage {
    /// Validate and build a message.
    ///
    /// Recipients are trimmed and blank entries dropped; order and
    /// duplicates are kept. Fails if no recipient remains or the body is empty.
    pub fn new<I, S>(recipients: I, subject: Option<String>, body: impl Into<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let recipients: Vec<String> = recipients
            .into_iter()
            .map(|r| r.as_ref().trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        if recipients.is_empty() {
            return Err(Error::InvalidRequest("Missing recipients".to_string()));
        }

        let body = body.into();
        if body.is_empty() {
            return Err(Error::InvalidRequest("Missing body".to_string()));
        }

        Ok(Self {
            recipients,
            subject,
            body,
        })
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    /// The subject line, with the default applied
    pub fn subject(&self) -> &str {
        match self.subject.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => DEFAULT_SUBJECT,
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Render the full envelope sent on behalf of `sender`
    pub fn envelope(&self, sender: &Identity) -> String {
        let mailbox = if sender.email.is_empty() {
            "me"
        } else {
            sender.email.as_str()
        };
        let from = if sender.display_name.trim().is_empty() {
            format!("<{}>", header_value(mailbox))
        } else {
            format!(
                "{} <{}>",
                phrase(&header_value(&sender.display_name)),
                header_value(mailbox)
            )
        };

        let lines = [
            format!("From: {}", from),
            format!("To: {}", header_value(&self.recipients.join(", "))),
            format!("Subject: {}", encode_word(&header_value(self.subject()))),
            "MIME-Version: 1.0".to_string(),
            format!("Content-Type: {}", CONTENT_TYPE),
            String::new(),
            self.body.clone(),
        ];
        lines.join("\r\n")
    }

    /// Envelope for `sender`, encoded for the delivery API
    pub fn to_raw(&self, sender: &Identity) -> String {
        encode_raw(&self.envelope(sender))
    }
}

/// URL-safe base64 without padding
pub fn encode_raw(envelope: &str) -> String {
    URL_SAFE_NO_PAD.encode(envelope.as_bytes())
}

/// Inverse of [`encode_raw`]; tolerates re-added padding
pub fn decode_raw(raw: &str) -> Result<String> {
    let bytes = URL_SAFE_NO_PAD.decode(raw.trim_end_matches('='))?;
    Ok(String::from_utf8(bytes)?)
}

/// Header values are single-line
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// Characters that end a phrase unless it is quoted (RFC 5322 `specials`)
const SPECIALS: &[char] = &['(', ')', '<', '>', '[', ']', ':', ';', '@', '\\', ',', '.', '"'];

/// Display name as a mailbox phrase: encoded word, quoted string or bare atoms
fn phrase(name: &str) -> String {
    if !name.is_ascii() {
        encode_word(name)
    } else if name.contains(SPECIALS) {
        format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        name.to_string()
    }
}

/// RFC 2047 encoded word for non-ASCII header text
fn encode_word(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value.as_bytes()))
    }
}
