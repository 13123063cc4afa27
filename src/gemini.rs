//! Minimal Google Gemini client, the primary generative backend.
//!
//! Calls `models/{model}:generateContent` with one user turn and returns the text of the
//! first candidate. Same logging rules as the OpenAI client: sizes and usage, never contents.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::backend::{status_error, BackendKind, CompletionBackend};
use crate::config::QuizSettings;
use crate::error::BackendError;

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub temperature: f32,
  pub max_output_tokens: u32,
}

impl Gemini {
  /// Construct the client if we find GOOGLE_API_KEY; otherwise return None.
  pub fn from_env(settings: &QuizSettings) -> Option<Self> {
    let api_key = std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url = std::env::var("GEMINI_BASE_URL")
      .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into());
    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(settings.backend_timeout_secs))
      .build()
      .ok()?;

    Some(Self {
      client,
      api_key,
      base_url,
      model,
      temperature: settings.temperature,
      max_output_tokens: settings.max_output_tokens,
    })
  }

  fn request(&self, prompt: &str) -> GenerateRequest {
    GenerateRequest {
      contents: vec![Content {
        role: Some("user".into()),
        parts: vec![Part { text: Some(prompt.into()) }],
      }],
      generation_config: GenerationConfig {
        temperature: self.temperature,
        max_output_tokens: self.max_output_tokens,
      },
    }
  }
}

#[async_trait]
impl CompletionBackend for Gemini {
  fn kind(&self) -> BackendKind {
    BackendKind::Gemini
  }

  #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
  async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
    let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

    let start = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "movie-quiz-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header("x-goog-api-key", &self.api_key)
      .json(&self.request(prompt)).send().await?;

    if !res.status().is_success() {
      return Err(status_error("Gemini", res).await);
    }

    let body: GenerateResponse = res.json().await.map_err(|e| BackendError::Decode(e.to_string()))?;
    if let Some(usage) = &body.usage_metadata {
      info!(prompt_tokens = ?usage.prompt_token_count, completion_tokens = ?usage.candidates_token_count, total_tokens = ?usage.total_token_count, "Gemini usage");
    }
    let text = body.first_text();

    info!(elapsed = ?start.elapsed(), response_len = text.len(), "Gemini response received");
    if text.is_empty() {
      return Err(BackendError::EmptyResponse);
    }
    Ok(text)
  }
}

// --- generateContent DTOs ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
  contents: Vec<Content>,
  generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  role: Option<String>,
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
  temperature: f32,
  max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
  #[serde(default)]
  usage_metadata: Option<UsageMetadata>,
}

impl GenerateResponse {
  /// Concatenated text parts of the first candidate, trimmed.
  fn first_text(&self) -> String {
    self
      .candidates
      .first()
      .and_then(|c| c.content.as_ref())
      .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect::<String>())
      .unwrap_or_default()
      .trim()
      .to_string()
  }
}

#[derive(Deserialize)]
struct Candidate {
  #[serde(default)]
  content: Option<Content>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)] prompt_token_count: Option<u32>,
  #[serde(default)] candidates_token_count: Option<u32>,
  #[serde(default)] total_token_count: Option<u32>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client() -> Gemini {
    Gemini {
      client: reqwest::Client::new(),
      api_key: "k".into(),
      base_url: "http://localhost".into(),
      model: "gemini-1.5-flash".into(),
      temperature: 0.3,
      max_output_tokens: 1000,
    }
  }

  #[test]
  fn request_uses_camel_case_generation_config() {
    let v = serde_json::to_value(client().request("hello")).unwrap();
    assert_eq!(v["contents"][0]["parts"][0]["text"], "hello");
    assert_eq!(v["generationConfig"]["maxOutputTokens"], 1000);
  }

  #[test]
  fn first_text_joins_parts() {
    let body: GenerateResponse = serde_json::from_str(
      r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Q: a\n"},{"text":"A. b"}]}}]}"#,
    )
    .unwrap();
    assert_eq!(body.first_text(), "Q: a\nA. b");
  }

  #[test]
  fn blocked_candidate_has_no_text() {
    let body: GenerateResponse =
      serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
    assert_eq!(body.first_text(), "");
  }
}
