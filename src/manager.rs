//! Quiz orchestration: sessions, question ids and the answer/score/difficulty cycle.
//!
//! The manager is the only writer of the session store. An answer is checked against
//! both stores before anything changes, so a bad id never leaves a half-updated session.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::QuizSettings;
use crate::domain::ExposedQuestion;
use crate::error::QuizError;
use crate::generator::QuestionGenerator;
use crate::session::QuizSession;
use crate::store::SessionStore;

#[derive(Debug, Serialize)]
pub struct StartOutcome {
  pub session_id: String,
  pub question: ExposedQuestion,
  pub score: u64,
  pub questions_remaining: u32,
}

#[derive(Debug, Serialize)]
pub struct AnswerOutcome {
  pub correct: bool,
  pub correct_index: usize,
  pub score: u64,
  pub quiz_complete: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_question: Option<ExposedQuestion>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub difficulty_level: Option<u8>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub questions_remaining: Option<u32>,
}

pub struct QuizManager {
  generator: QuestionGenerator,
  store: SessionStore,
  settings: QuizSettings,
}

impl QuizManager {
  pub fn new(generator: QuestionGenerator, settings: QuizSettings) -> Self {
    Self { generator, store: SessionStore::new(), settings }
  }

  pub fn generator(&self) -> &QuestionGenerator {
    &self.generator
  }

  /// Open a session and serve its first question.
  #[instrument(level = "info", skip(self))]
  pub async fn start_session(
    &self,
    total_questions: Option<u32>,
    preferred_genre: Option<String>,
    user_id: Option<String>,
  ) -> StartOutcome {
    let total = total_questions
      .unwrap_or(self.settings.default_total_questions)
      .clamp(1, self.settings.max_total_questions.max(1));
    let genre = preferred_genre.filter(|g| !g.trim().is_empty());
    let session_id = Uuid::new_v4().to_string();

    let handle = self
      .store
      .insert_session(QuizSession::new(session_id.clone(), total, genre, user_id))
      .await;
    let mut session = handle.lock().await;
    let question = self.serve_question(&mut session).await;

    info!(target: "quiz", %session_id, total, genre = ?session.preferred_genre, "Session started");
    StartOutcome {
      session_id,
      question,
      score: session.score,
      questions_remaining: session.questions_remaining(),
    }
  }

  /// Score one answer (or a timeout, `answer_index == -1`) and serve the next question
  /// unless the session is complete.
  #[instrument(level = "info", skip(self))]
  pub async fn answer_question(
    &self,
    session_id: &str,
    question_id: &str,
    answer_index: i64,
    time_left: i64,
  ) -> Result<AnswerOutcome, QuizError> {
    let Some(handle) = self.store.session(session_id).await else {
      warn!(target: "quiz", %session_id, "Answer for unknown session");
      return Err(QuizError::InvalidSession);
    };
    let Some(record) = self.store.question(question_id).await else {
      warn!(target: "quiz", %session_id, %question_id, "Answer for unknown question");
      return Err(QuizError::InvalidQuestion);
    };

    let timeout = answer_index == -1;
    let mut session = handle.lock().await;
    let level_at_answer = session.difficulty_level;
    let (correct, points) =
      session.record_answer(question_id, answer_index, record.answer_index, time_left);
    info!(
      target: "quiz",
      %session_id,
      correct,
      timeout,
      points,
      score = session.score,
      from_level = level_at_answer,
      to_level = session.difficulty_level,
      "Answer recorded"
    );

    if session.is_complete() {
      info!(target: "quiz", %session_id, score = session.score, answered = session.history.len(), "Quiz complete");
      let answered: Vec<&str> = session.history.iter().map(|h| h.question_id.as_str()).collect();
      self.store.remove_questions(&answered).await;
      return Ok(AnswerOutcome {
        correct,
        correct_index: record.answer_index,
        score: session.score,
        quiz_complete: true,
        next_question: None,
        difficulty_level: None,
        questions_remaining: None,
      });
    }

    let next = self.serve_question(&mut session).await;
    Ok(AnswerOutcome {
      correct,
      correct_index: record.answer_index,
      score: session.score,
      quiz_complete: false,
      next_question: Some(next),
      difficulty_level: Some(session.difficulty_level),
      questions_remaining: Some(session.questions_remaining()),
    })
  }

  /// Copy of a session's current state.
  pub async fn session_snapshot(&self, session_id: &str) -> Option<QuizSession> {
    let handle = self.store.session(session_id).await?;
    let session = handle.lock().await;
    Some(session.clone())
  }

  pub async fn session_count(&self) -> usize {
    self.store.session_count().await
  }

  async fn serve_question(&self, session: &mut QuizSession) -> ExposedQuestion {
    let record = self
      .generator
      .generate_question(session.difficulty(), &session.history, session.preferred_genre.as_deref())
      .await;
    let id = Uuid::new_v4().to_string();
    session.questions_served += 1;
    let exposed = ExposedQuestion::from_record(id.clone(), &record, session.questions_served, session.total_questions);
    self.store.insert_question(id, record).await;
    exposed
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::Ordering;
  use std::time::Duration;

  use crate::backend::CompletionBackend;
  use crate::catalog::tests::fixture;
  use crate::config::Prompts;
  use crate::domain::Difficulty;
  use crate::generator::tests::{FailingBackend, ScriptedBackend};

  fn manager(backend: Option<Arc<dyn CompletionBackend>>) -> QuizManager {
    let generator =
      QuestionGenerator::new(Arc::new(fixture()), backend, Prompts::default(), Duration::from_secs(1));
    QuizManager::new(generator, QuizSettings::default())
  }

  async fn correct_index(m: &QuizManager, question_id: &str) -> usize {
    m.store.question(question_id).await.unwrap().answer_index
  }

  #[tokio::test]
  async fn start_serves_first_question() {
    let m = manager(None);
    let out = m.start_session(Some(3), Some("  ".into()), Some("u1".into())).await;
    assert_eq!(out.score, 0);
    assert_eq!(out.questions_remaining, 2);
    assert_eq!(out.question.number, 1);
    assert_eq!(out.question.total, 3);
    assert_eq!(out.question.difficulty, Difficulty::Easy);

    let snap = m.session_snapshot(&out.session_id).await.unwrap();
    assert_eq!(snap.preferred_genre, None);
    assert_eq!(snap.user_id.as_deref(), Some("u1"));
    assert_eq!(snap.questions_served, 1);
  }

  #[tokio::test]
  async fn total_questions_is_clamped() {
    let m = manager(None);
    let out = m.start_session(Some(0), None, None).await;
    assert_eq!(out.question.total, 1);
    assert_eq!(out.questions_remaining, 0);
    let out = m.start_session(Some(500), None, None).await;
    assert_eq!(out.question.total, 50);
    let out = m.start_session(None, None, None).await;
    assert_eq!(out.question.total, 10);
  }

  #[tokio::test]
  async fn two_question_scenario() {
    let m = manager(None);
    let start = m.start_session(Some(2), None, None).await;
    let q1 = start.question.id.clone();
    let idx = correct_index(&m, &q1).await;

    let first = m.answer_question(&start.session_id, &q1, idx as i64, 10).await.unwrap();
    assert!(first.correct);
    assert_eq!(first.correct_index, idx);
    assert_eq!(first.score, 150);
    assert!(!first.quiz_complete);
    assert_eq!(first.difficulty_level, Some(2));
    assert_eq!(first.questions_remaining, Some(0));
    let next = first.next_question.unwrap();
    assert_eq!(next.number, 2);
    assert_eq!(next.difficulty, Difficulty::Medium);

    let second = m.answer_question(&start.session_id, &next.id, -1, 25).await.unwrap();
    assert!(!second.correct);
    assert_eq!(second.score, 150);
    assert!(second.quiz_complete);
    assert!(second.next_question.is_none());

    let snap = m.session_snapshot(&start.session_id).await.unwrap();
    assert_eq!(snap.difficulty_level, 1);
    assert_eq!(snap.history.len(), 2);
    assert!(snap.history[1].timeout);
  }

  #[tokio::test]
  async fn completed_outcome_omits_next_fields() {
    let m = manager(None);
    let start = m.start_session(Some(1), None, None).await;
    let out = m.answer_question(&start.session_id, &start.question.id, 0, 0).await.unwrap();
    let v = serde_json::to_value(&out).unwrap();
    assert_eq!(v["quiz_complete"], true);
    assert!(v.get("next_question").is_none());
    assert!(v.get("difficulty_level").is_none());
    assert!(v.get("questions_remaining").is_none());
  }

  #[tokio::test]
  async fn completed_session_releases_its_questions() {
    let m = manager(None);
    let start = m.start_session(Some(2), None, None).await;
    let first = m.answer_question(&start.session_id, &start.question.id, 0, 0).await.unwrap();
    // Still open: the first question can be answered again.
    assert!(m.store.question(&start.question.id).await.is_some());

    let next = first.next_question.unwrap();
    let done = m.answer_question(&start.session_id, &next.id, 0, 0).await.unwrap();
    assert!(done.quiz_complete);
    assert!(m.store.question(&start.question.id).await.is_none());
    assert!(m.store.question(&next.id).await.is_none());

    let err = m.answer_question(&start.session_id, &next.id, 0, 0).await.unwrap_err();
    assert_eq!(err, QuizError::InvalidQuestion);
  }

  #[tokio::test]
  async fn unknown_session_is_rejected_without_side_effects() {
    let m = manager(None);
    let start = m.start_session(Some(2), None, None).await;
    let err = m.answer_question("nope", &start.question.id, 0, 0).await.unwrap_err();
    assert_eq!(err, QuizError::InvalidSession);
    assert_eq!(err.to_string(), "Invalid session");
    assert_eq!(m.session_count().await, 1);
    assert!(m.session_snapshot("nope").await.is_none());
  }

  #[tokio::test]
  async fn unknown_question_leaves_session_untouched() {
    let m = manager(None);
    let start = m.start_session(Some(2), None, None).await;
    let err = m.answer_question(&start.session_id, "missing", 0, 10).await.unwrap_err();
    assert_eq!(err, QuizError::InvalidQuestion);

    let snap = m.session_snapshot(&start.session_id).await.unwrap();
    assert!(snap.history.is_empty());
    assert_eq!(snap.score, 0);
    assert_eq!(snap.questions_served, 1);
  }

  #[tokio::test]
  async fn wrong_answers_never_lower_score_or_level_below_one() {
    let m = manager(None);
    let start = m.start_session(Some(5), None, None).await;
    let mut qid = start.question.id;
    for _ in 0..4 {
      let idx = correct_index(&m, &qid).await;
      let wrong = ((idx + 1) % 4) as i64;
      let out = m.answer_question(&start.session_id, &qid, wrong, 30).await.unwrap();
      assert!(!out.correct);
      assert_eq!(out.score, 0);
      assert_eq!(out.difficulty_level, Some(1));
      qid = out.next_question.unwrap().id;
    }
  }

  #[tokio::test]
  async fn failing_backend_still_serves_valid_questions() {
    let backend = Arc::new(FailingBackend::default());
    let m = manager(Some(backend.clone() as Arc<dyn CompletionBackend>));
    let start = m.start_session(Some(6), Some("drama".into()), None).await;
    let mut question = start.question;
    loop {
      assert_eq!(question.options.len(), 4);
      let idx = correct_index(&m, &question.id).await;
      let out = m.answer_question(&start.session_id, &question.id, idx as i64, 0).await.unwrap();
      match out.next_question {
        Some(q) => question = q,
        None => break,
      }
    }
    assert_eq!(backend.calls.load(Ordering::SeqCst), 6);
    let snap = m.session_snapshot(&start.session_id).await.unwrap();
    assert_eq!(snap.difficulty_level, 3);
    assert_eq!(snap.score, 100 + 200 + 300 + 300 + 300 + 300);
  }

  #[tokio::test]
  async fn generated_questions_flow_through() {
    let text = "Q: Who directed the film The Dark Knight?\nA. Christopher Nolan\nB. Tim Burton\nC. Sam Raimi\nD. Zack Snyder\nAnswer: A";
    let m = manager(Some(Arc::new(ScriptedBackend(text.into())) as Arc<dyn CompletionBackend>));
    // "action" matches only The Dark Knight, so the scripted question validates.
    let start = m.start_session(Some(2), Some("action".into()), None).await;
    assert_eq!(start.question.question, "Who directed the film The Dark Knight?");
    assert_eq!(start.question.options[0], "Christopher Nolan");
    assert_eq!(correct_index(&m, &start.question.id).await, 0);
  }
}
