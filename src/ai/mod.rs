//! Hosted language-model gateway.
//!
//! Callers build a [`GenerateRequest`] and hand it to any [`TextGenerator`];
//! [`GeminiClient`] is the production implementation. The task functions in
//! [`tasks`] wrap prompt construction and response shaping for the three
//! workflows: opinions, feedback and chat.

pub mod gemini;
pub mod models;
pub mod opinions;
pub mod prompt;
pub mod tasks;

pub use gemini::GeminiClient;
pub use tasks::*;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, EXIT_AI, EXIT_DATA};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub messages: Vec<ChatMessage>,
    pub system_instruction: Option<String>,
    /// Retry a missing model (HTTP 404) against the fallback model list.
    pub allow_model_fallback: bool,
}

impl GenerateRequest {
    /// Single user turn, no system instruction.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::user(text)],
            system_instruction: None,
            allow_model_fallback: false,
        }
    }

    pub fn chat(messages: Vec<ChatMessage>, system_instruction: impl Into<String>) -> Self {
        Self {
            messages,
            system_instruction: Some(system_instruction.into()),
            allow_model_fallback: true,
        }
    }
}

/// Anything that turns a request into generated text.
pub trait TextGenerator {
    fn generate(&self, request: &GenerateRequest) -> Result<String, AiError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AiError {
    #[error("Gemini API key not configured. Set GEMINI_API_KEY in the environment or .env.")]
    MissingApiKey,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Non-success status; `message` is the upstream `error.message` when present.
    #[error("{message} (HTTP {status})")]
    Upstream { status: u16, message: String },

    #[error("AI request failed: {0}")]
    Transport(String),

    #[error("No content in response")]
    NoContent,

    #[error("Failed to parse AI response")]
    MalformedResponse { details: String },

    #[error("No available models found. Please check your API key and try again.")]
    NoModels,
}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        match &err {
            AiError::Transport(_) => AppError::new(EXIT_DATA, err.to_string()),
            AiError::MalformedResponse { details } => AppError::new(EXIT_AI, format!("{err}:\n{details}")),
            _ => AppError::new(EXIT_AI, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_is_passed_through() {
        let err = AiError::Upstream {
            status: 429,
            message: "Resource has been exhausted".to_string(),
        };
        let app: AppError = err.into();
        assert_eq!(app.exit_code(), EXIT_AI);
        assert!(app.message().starts_with("Resource has been exhausted"));
    }

    #[test]
    fn transport_failures_map_to_data_exit_code() {
        let app: AppError = AiError::Transport("connection refused".to_string()).into();
        assert_eq!(app.exit_code(), EXIT_DATA);
    }

    #[test]
    fn malformed_response_keeps_raw_content() {
        let app: AppError = AiError::MalformedResponse {
            details: "not json".to_string(),
        }
        .into();
        assert!(app.message().ends_with("not json"));
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&ChatMessage::model("hi")).unwrap();
        assert_eq!(json, r#"{"role":"model","content":"hi"}"#);
    }
}
