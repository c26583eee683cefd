//! Chat-completion request and response schemas
//!
//! Completion providers disagree on where the generated text lives. Each
//! supported schema is an explicit variant of [`CompletionResponse`]; a
//! payload that matches none of them is an error, never a best-effort dump.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Upper bound on generated tokens
pub const MAX_TOKENS: u32 = 600;

/// Low sampling temperature for predictable drafts
pub const TEMPERATURE: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of a chat-completion call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl CompletionRequest {
    /// A request carrying `prompt` as the only (user) message
    pub fn for_prompt(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

/// Supported response schemas, tried in declaration order
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CompletionResponse {
    /// OpenAI-style chat completion: `choices[0].message.content`
    Chat { choices: Vec<ChatChoice> },
    /// Legacy text completion: `choices[0].text`
    Text { choices: Vec<TextChoice> },
    /// Responses-style output: `output[0].content`
    Output { output: Vec<OutputItem> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextChoice {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputItem {
    pub content: OutputContent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OutputContent {
    Text(String),
    Parts(Vec<OutputPart>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputPart {
    #[serde(default)]
    pub text: Option<String>,
}

impl CompletionResponse {
    /// Generated text of the first choice, if there is any
    pub fn text(&self) -> Option<String> {
        let text = match self {
            CompletionResponse::Chat { choices } => choices.first()?.message.content.clone()?,
            CompletionResponse::Text { choices } => choices.first()?.text.clone(),
            CompletionResponse::Output { output } => match &output.first()?.content {
                OutputContent::Text(text) => text.clone(),
                OutputContent::Parts(parts) => parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .concat(),
            },
        };
        Some(text)
    }
}

/// Pull the generated text out of a raw completion payload.
///
/// Blank text counts as no match.
pub fn extract_text(payload: &Value) -> Result<String> {
    CompletionResponse::deserialize(payload)
        .ok()
        .and_then(|response| response.text())
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| Error::UnrecognizedResponseShape(payload.clone()))
}
