//! In-memory session and question stores.
//!
//! Each session sits behind its own mutex so answers on one session serialize while
//! other sessions proceed. Questions are kept by id with their correct answer and never
//! leave this store in that form.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, RwLock};
use tracing::instrument;

use crate::domain::QuestionRecord;
use crate::session::QuizSession;

#[derive(Default)]
pub struct SessionStore {
  sessions: RwLock<HashMap<String, Arc<Mutex<QuizSession>>>>,
  questions: RwLock<HashMap<String, QuestionRecord>>,
}

impl SessionStore {
  pub fn new() -> Self {
    Self::default()
  }

  #[instrument(level = "debug", skip(self, session), fields(session_id = %session.session_id))]
  pub async fn insert_session(&self, session: QuizSession) -> Arc<Mutex<QuizSession>> {
    let id = session.session_id.clone();
    let handle = Arc::new(Mutex::new(session));
    self.sessions.write().await.insert(id, handle.clone());
    handle
  }

  #[instrument(level = "debug", skip(self))]
  pub async fn session(&self, id: &str) -> Option<Arc<Mutex<QuizSession>>> {
    self.sessions.read().await.get(id).cloned()
  }

  #[instrument(level = "debug", skip(self, record))]
  pub async fn insert_question(&self, id: String, record: QuestionRecord) {
    self.questions.write().await.insert(id, record);
  }

  #[instrument(level = "debug", skip(self))]
  pub async fn question(&self, id: &str) -> Option<QuestionRecord> {
    self.questions.read().await.get(id).cloned()
  }

  /// Drop stored questions, e.g. once their session is complete.
  #[instrument(level = "debug", skip(self, ids), fields(count = ids.len()))]
  pub async fn remove_questions(&self, ids: &[&str]) {
    let mut questions = self.questions.write().await;
    for id in ids {
      questions.remove(*id);
    }
  }

  pub async fn session_count(&self) -> usize {
    self.sessions.read().await.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Difficulty;

  #[tokio::test]
  async fn sessions_are_shared_handles() {
    let store = SessionStore::new();
    store.insert_session(QuizSession::new("a".into(), 3, None, None)).await;

    let first = store.session("a").await.unwrap();
    first.lock().await.score = 40;
    let again = store.session("a").await.unwrap();
    assert_eq!(again.lock().await.score, 40);
    assert!(store.session("b").await.is_none());
    assert_eq!(store.session_count().await, 1);
  }

  #[tokio::test]
  async fn questions_round_trip_by_id() {
    let store = SessionStore::new();
    let record = QuestionRecord {
      question: "Who directed Heat?".into(),
      options: vec!["Michael Mann".into(), "a".into(), "b".into(), "c".into()],
      answer_index: 0,
      difficulty: Difficulty::Easy,
    };
    store.insert_question("q1".into(), record.clone()).await;
    assert_eq!(store.question("q1").await, Some(record));
    assert_eq!(store.question("q2").await, None);

    store.remove_questions(&["q1", "q2"]).await;
    assert_eq!(store.question("q1").await, None);
  }
}
