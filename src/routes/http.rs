//! HTTP endpoint handlers. These are thin wrappers that forward to the quiz manager.
//! Each handler is instrumented and logs basic result info.

use std::sync::Arc;
use axum::{extract::State, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::error::QuizError;
use crate::manager::{AnswerOutcome, StartOutcome};
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, backend: state.backend_kind(), movies: state.movie_count() })
}

#[instrument(level = "info", skip(state, body), fields(total = ?body.total_questions, genre = ?body.preferred_genre))]
pub async fn http_post_start(
  State(state): State<Arc<AppState>>,
  Json(body): Json<StartIn>,
) -> Json<StartOutcome> {
  let out = state
    .manager
    .start_session(body.total_questions, body.preferred_genre, body.user_id)
    .await;
  let sessions = state.manager.session_count().await;
  info!(target: "quiz", session_id = %out.session_id, question_id = %out.question.id, sessions, "HTTP quiz started");
  Json(out)
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id, %body.question_id, answer_index = body.answer_index))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOutcome>, QuizError> {
  let out = state
    .manager
    .answer_question(&body.session_id, &body.question_id, body.answer_index, body.time_left)
    .await?;
  info!(target: "quiz", session_id = %body.session_id, correct = out.correct, score = out.score, complete = out.quiz_complete, "HTTP answer evaluated");
  Ok(Json(out))
}
