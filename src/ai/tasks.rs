//! Opinion, feedback and chat tasks built on any [`TextGenerator`](crate::ai::TextGenerator).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ai::opinions::parse_opinions;
use crate::ai::prompt::{chat_system_prompt, feedback_prompt, opinions_prompt};
use crate::ai::{AiError, ChatMessage, GenerateRequest, TextGenerator};
use crate::domain::{AiOpinions, DataSnapshot, EventType, JournalEntry, PredictionCategory};
use crate::snapshot::{ChatContext, generate_data_hash};

/// Bullish/neutral/bearish opinions for an upcoming event, fingerprinted with
/// the snapshot they were generated from.
pub fn generate_opinions(
    generator: &dyn TextGenerator,
    event_type: EventType,
    category: PredictionCategory,
    snapshot: &DataSnapshot,
    language: &str,
    now: DateTime<Utc>,
) -> Result<AiOpinions, AiError> {
    let prompt = opinions_prompt(event_type, category, snapshot, language)?;
    tracing::info!(%event_type, ?category, "generating AI opinions");
    let content = generator.generate(&GenerateRequest::prompt(prompt))?;
    parse_opinions(&content, generate_data_hash(snapshot), now, || Uuid::new_v4().to_string())
}

/// Mentor-style review of a recorded prediction against the actual outcome.
pub fn generate_feedback(
    generator: &dyn TextGenerator,
    entry: &JournalEntry,
    actual: &str,
    current: &DataSnapshot,
    language: &str,
) -> Result<String, AiError> {
    if actual.trim().is_empty() {
        return Err(AiError::InvalidRequest("actual result is required".to_string()));
    }
    let prompt = feedback_prompt(entry, actual, current, language)?;
    tracing::info!(id = %entry.id, actual, "generating AI feedback");
    generator.generate(&GenerateRequest::prompt(prompt))
}

pub fn answer_chat(
    generator: &dyn TextGenerator,
    messages: &[ChatMessage],
    context: &ChatContext,
    language: &str,
) -> Result<String, AiError> {
    if messages.is_empty() {
        return Err(AiError::InvalidRequest("messages must not be empty".to_string()));
    }
    let system = chat_system_prompt(context, language)?;
    let content = generator.generate(&GenerateRequest::chat(messages.to_vec(), system))?;
    tracing::debug!(length = content.len(), "chat answer received");
    Ok(content)
}
