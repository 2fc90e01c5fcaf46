//! Google Gemini `generateContent` client.

use reqwest::blocking::Client;
use serde_json::{Value, json};

use crate::ai::models::{FALLBACK_ATTEMPTS, select_model};
use crate::ai::{AiError, ChatMessage, GenerateRequest, Role, TextGenerator};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION: &str = "v1beta";

pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<&str>, model: impl Into<String>) -> Result<Self, AiError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(AiError::MissingApiKey)?;
        Ok(Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Models that support `generateContent`, without the `models/` prefix.
    pub fn list_models(&self) -> Result<Vec<String>, AiError> {
        let url = format!("{}/{API_VERSION}/models", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .map_err(|e| AiError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().map_err(|e| AiError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(upstream_error(status.as_u16(), &body, "Failed to list models"));
        }
        let value: Value = serde_json::from_str(&body).map_err(|_| AiError::MalformedResponse { details: body })?;
        Ok(generate_content_models(&value))
    }

    /// Replace the configured model with the best one the key can use.
    ///
    /// A failed model listing is not fatal; the configured model is kept.
    pub fn resolve_model(&mut self) -> Result<(), AiError> {
        let available = match self.list_models() {
            Ok(models) => models,
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch available models");
                Vec::new()
            }
        };
        self.model = select_model(&self.model, &available).ok_or(AiError::NoModels)?;
        tracing::info!(model = %self.model, "using Gemini model");
        Ok(())
    }

    fn post(&self, version: &str, model: &str, body: &Value) -> Result<Value, AiError> {
        let url = format!(
            "{}/{version}/models/{model}:generateContent",
            self.base_url.trim_end_matches('/')
        );
        tracing::debug!(%url, "calling Gemini");
        let resp = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .map_err(|e| AiError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp.text().map_err(|e| AiError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(upstream_error(status.as_u16(), &text, "Failed to get response from AI"));
        }
        serde_json::from_str(&text).map_err(|_| AiError::MalformedResponse { details: text })
    }

    fn post_with_fallback(&self, body: &Value) -> Result<Value, AiError> {
        let first = match self.post(API_VERSION, &self.model, body) {
            Err(AiError::Upstream { status: 404, .. }) => {
                tracing::warn!(model = %self.model, version = API_VERSION, "model not found, trying alternatives");
                None
            }
            other => Some(other),
        };
        if let Some(result) = first {
            return result;
        }

        let mut last = None;
        for (version, model) in FALLBACK_ATTEMPTS {
            if model == self.model && version == API_VERSION {
                continue;
            }
            match self.post(version, model, body) {
                Ok(value) => {
                    tracing::info!(model, version, "fallback model succeeded");
                    return Ok(value);
                }
                Err(err) => last = Some(err),
            }
        }

        Err(match last {
            Some(AiError::Upstream { status: 404, message }) if message.contains("not found") => AiError::Upstream {
                status: 404,
                message: format!(
                    "Model \"{}\" not found. Check available models at https://ai.google.dev/models or set GEMINI_MODEL.",
                    self.model
                ),
            },
            Some(err) => err,
            None => AiError::NoModels,
        })
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, request: &GenerateRequest) -> Result<String, AiError> {
        let body = request_body(request);
        let value = if request.allow_model_fallback {
            self.post_with_fallback(&body)?
        } else {
            self.post(API_VERSION, &self.model, &body)?
        };
        extract_text(&value)
    }
}

fn request_body(request: &GenerateRequest) -> Value {
    let contents: Vec<Value> = request.messages.iter().map(content_entry).collect();
    let mut body = json!({
        "contents": contents,
        "generationConfig": {
            "temperature": 0.7,
            "topK": 40,
            "topP": 0.95,
        },
    });
    if let Some(system) = &request.system_instruction {
        body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }
    body
}

fn content_entry(message: &ChatMessage) -> Value {
    let role = match message.role {
        Role::User => "user",
        Role::Model => "model",
    };
    json!({ "role": role, "parts": [{ "text": message.content }] })
}

/// First candidate's text; `parts[0].text` is preferred over `content.text`.
fn extract_text(response: &Value) -> Result<String, AiError> {
    let candidate = &response["candidates"][0];
    if candidate["finishReason"].as_str() == Some("MAX_TOKENS") {
        tracing::warn!("response was truncated by the MAX_TOKENS limit");
    }

    let content = &candidate["content"];
    content["parts"][0]["text"]
        .as_str()
        .or_else(|| content["text"].as_str())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or(AiError::NoContent)
}

fn upstream_error(status: u16, body: &str, fallback: &str) -> AiError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| {
            tracing::debug!(status, body, "unparseable error body");
            fallback.to_string()
        });
    AiError::Upstream { status, message }
}

fn generate_content_models(value: &Value) -> Vec<String> {
    let Some(models) = value["models"].as_array() else {
        return Vec::new();
    };
    models
        .iter()
        .filter(|m| {
            m["supportedGenerationMethods"]
                .as_array()
                .is_some_and(|methods| methods.iter().any(|x| x.as_str() == Some("generateContent")))
        })
        .filter_map(|m| m["name"].as_str())
        .map(|name| name.trim_start_matches("models/").to_string())
        .filter(|name| !name.is_empty())
        .collect()
}
