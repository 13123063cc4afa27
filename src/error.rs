//! Error types for the engine and their HTTP mapping.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;
use thiserror::Error;

/// Dataset loading failures. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("failed to read dataset: {0}")]
  Io(#[from] std::io::Error),

  #[error("malformed dataset: {0}")]
  Csv(#[from] csv::Error),

  #[error("dataset has no '{0}' column")]
  MissingColumn(&'static str),

  #[error("dataset contains no movies")]
  DatasetEmpty,
}

/// Generative backend failures. Never surfaced to callers; they trigger the fallback path.
#[derive(Debug, Error)]
pub enum BackendError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{provider} HTTP {status}: {message}")]
  Status { provider: &'static str, status: u16, message: String },

  #[error("could not decode response: {0}")]
  Decode(String),

  #[error("response contained no text")]
  EmptyResponse,

  #[error("timed out after {0:?}")]
  Timeout(std::time::Duration),
}

/// Caller input errors reported by the quiz manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
  #[error("Invalid session")]
  InvalidSession,

  #[error("Invalid question")]
  InvalidQuestion,
}

impl IntoResponse for QuizError {
  fn into_response(self) -> Response {
    let body = Json(json!({ "error": self.to_string() }));
    (StatusCode::BAD_REQUEST, body).into_response()
  }
}
