//! Shaping model output into [`AiOpinions`].

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::ai::AiError;
use crate::domain::{AiOpinions, Opinion, OpinionSet, Stance};

/// Remove Markdown code fences the model tends to wrap JSON in.
pub fn strip_code_fences(content: &str) -> String {
    content
        .replace("```json\n", "")
        .replace("```json", "")
        .replace("```\n", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse the three-stance JSON answer.
///
/// Missing or mistyped fields fall back to empty values; only content that is
/// not JSON at all is rejected. Each opinion gets a fresh id from `new_id`.
pub fn parse_opinions(
    content: &str,
    data_hash: String,
    generated_at: DateTime<Utc>,
    mut new_id: impl FnMut() -> String,
) -> Result<AiOpinions, AiError> {
    let parsed: Value = serde_json::from_str(&strip_code_fences(content)).map_err(|_| AiError::MalformedResponse {
        details: content.to_string(),
    })?;

    let mut opinion = |stance: Stance| {
        let raw = &parsed[stance.as_str()];
        let text = |field: &str| raw[field].as_str().unwrap_or_default().to_string();
        Opinion {
            id: new_id(),
            stance,
            title: text("title"),
            summary: text("summary"),
            reasoning: text("reasoning"),
            key_indicators: raw["keyIndicators"]
                .as_array()
                .map(|items| items.iter().filter_map(|v| v.as_str()).map(str::to_string).collect())
                .unwrap_or_default(),
        }
    };

    Ok(AiOpinions {
        generated_at,
        data_hash,
        opinions: OpinionSet {
            bullish: opinion(Stance::Bullish),
            neutral: opinion(Stance::Neutral),
            bearish: opinion(Stance::Bearish),
        },
    })
}
