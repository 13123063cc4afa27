//! Public request/response bodies for the HTTP API (serde ready).
//! Outcomes of start/answer are serialized straight from the manager's types.

use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;

#[derive(Debug, Default, Deserialize)]
pub struct StartIn {
  #[serde(default)]
  pub total_questions: Option<u32>,
  #[serde(default)]
  pub preferred_genre: Option<String>,
  #[serde(default)]
  pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
  pub session_id: String,
  pub question_id: String,
  /// -1 reports a timeout.
  pub answer_index: i64,
  #[serde(default)]
  pub time_left: i64,
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
  pub ok: bool,
  pub backend: BackendKind,
  pub movies: usize,
}
