//! Splitting generated text into subject and body
//!
//! The generation endpoint returns undifferentiated text; callers that want
//! to prefill a form split it here. The expected layout is
//! `Subject: <line>` followed by a blank line and the body.

const MARKER: &str = "subject:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedEmail {
    pub subject: Option<String>,
    pub body: String,
}

impl GeneratedEmail {
    /// Split `text` at the first `Subject:` line (any case) that is
    /// followed by a blank line. Both parts are trimmed. Text without such
    /// a line becomes the body as-is, with no subject.
    pub fn parse(text: &str) -> Self {
        let normalized = text.replace("\r\n", "\n");
        match split_subject(&normalized) {
            Some((subject, body)) => Self {
                subject: Some(subject.trim().to_string()),
                body: body.trim().to_string(),
            },
            None => Self {
                subject: None,
                body: text.to_string(),
            },
        }
    }
}

fn split_subject(text: &str) -> Option<(&str, &str)> {
    // ASCII lowercasing keeps byte offsets aligned with `text`
    let lower = text.to_ascii_lowercase();
    let mut from = 0;
    while let Some(found) = lower[from..].find(MARKER) {
        let after = from + found + MARKER.len();
        if let Some(split) = split_after_marker(&text[after..]) {
            return Some(split);
        }
        from = after;
    }
    None
}

/// `rest` follows the marker: optional whitespace, the subject line, then an
/// empty line. Longer whitespace runs are tried first, so a subject may
/// start on the line after the marker.
fn split_after_marker(rest: &str) -> Option<(&str, &str)> {
    let ws_len = rest.len() - rest.trim_start().len();
    let starts: Vec<usize> = rest
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i < ws_len)
        .chain(std::iter::once(ws_len))
        .collect();
    starts.into_iter().rev().find_map(|skip| {
        let line_start = &rest[skip..];
        let line_end = line_start.find('\n')?;
        let (line, tail) = line_start.split_at(line_end);
        tail.strip_prefix("\n\n").map(|body| (line, body))
    })
}
