//! Generative backend capability and startup selection.
//!
//! Preference order: Google Gemini (GOOGLE_API_KEY), then OpenAI (OPENAI_API_KEY), then
//! offline. The choice is made once at startup; `None` means offline and every question
//! comes from the fallback synthesizer.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::QuizSettings;
use crate::error::BackendError;
use crate::gemini::Gemini;
use crate::openai::OpenAI;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
  Gemini,
  OpenAi,
  Offline,
}

/// Chat-completion capability: one prompt in, free text out.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
  fn kind(&self) -> BackendKind;

  async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Pick the first configured provider.
pub fn from_env(settings: &QuizSettings) -> Option<Arc<dyn CompletionBackend>> {
  if let Some(g) = Gemini::from_env(settings) {
    info!(target: "movie_quiz", base_url = %g.base_url, model = %g.model, "Gemini enabled (primary).");
    return Some(Arc::new(g));
  }
  if let Some(oa) = OpenAI::from_env(settings) {
    info!(target: "movie_quiz", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled (secondary).");
    return Some(Arc::new(oa));
  }
  info!(target: "movie_quiz", "No GOOGLE_API_KEY or OPENAI_API_KEY. Using offline question synthesis.");
  None
}

/// Turn a non-success response into a `BackendError::Status`, keeping the provider's message.
pub(crate) async fn status_error(provider: &'static str, res: reqwest::Response) -> BackendError {
  let status = res.status().as_u16();
  let body = res.text().await.unwrap_or_default();
  let message = extract_api_error(&body).unwrap_or(body);
  BackendError::Status { provider, status, message }
}

/// Try to extract a clean error message from a provider error body.
/// OpenAI and Gemini both use `{"error": {"message": ...}}`.
pub(crate) fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
