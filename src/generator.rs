//! Question generation: movie selection, then the generative path with validation, or
//! the offline synthesizer.
//!
//! The generator holds no per-call state. Every backend problem (not configured, HTTP
//! failure, timeout, unusable text) ends in `fallback::synthesize`, so callers always get
//! a well-formed question.

use std::{sync::Arc, time::Duration};

use tracing::{error, info, instrument, warn};

use crate::backend::{BackendKind, CompletionBackend};
use crate::catalog::MovieCatalog;
use crate::config::Prompts;
use crate::domain::{Difficulty, HistoryEntry, MovieRecord, QuestionRecord};
use crate::error::BackendError;
use crate::fallback;
use crate::parser;
use crate::prompt::build_prompt;
use crate::validator::validate;

pub struct QuestionGenerator {
  catalog: Arc<MovieCatalog>,
  backend: Option<Arc<dyn CompletionBackend>>,
  prompts: Prompts,
  timeout: Duration,
}

impl QuestionGenerator {
  pub fn new(
    catalog: Arc<MovieCatalog>,
    backend: Option<Arc<dyn CompletionBackend>>,
    prompts: Prompts,
    timeout: Duration,
  ) -> Self {
    Self { catalog, backend, prompts, timeout }
  }

  pub fn backend_kind(&self) -> BackendKind {
    self.backend.as_ref().map_or(BackendKind::Offline, |b| b.kind())
  }

  pub fn catalog(&self) -> &MovieCatalog {
    &self.catalog
  }

  #[instrument(level = "info", skip(self, history), fields(%difficulty, history_len = history.len(), genre = ?preferred_genre))]
  pub async fn generate_question(
    &self,
    difficulty: Difficulty,
    history: &[HistoryEntry],
    preferred_genre: Option<&str>,
  ) -> QuestionRecord {
    let movie = self.catalog.select(difficulty, preferred_genre);

    let Some(backend) = &self.backend else {
      return self.fallback(movie, difficulty, "offline");
    };

    let prompt = build_prompt(&self.prompts, movie, difficulty, history);
    let text = match self.call_backend(backend.as_ref(), &prompt).await {
      Ok(text) => text,
      Err(e) => {
        warn!(target: "question", backend = ?backend.kind(), error = %e, "Backend call failed");
        return self.fallback(movie, difficulty, "backend_error");
      }
    };

    let parsed = parser::parse(&text, difficulty);
    if let Some(e) = &parsed.error {
      error!(target: "question", error = %e, "Response parser unavailable");
    }
    if !validate(&parsed.record, movie) {
      warn!(target: "question", title = %movie.title, excerpt = %parsed.excerpt, "Generated question rejected");
      return self.fallback(movie, difficulty, "validation_failed");
    }

    info!(target: "question", title = %movie.title, backend = ?backend.kind(), source = "generated", "Question ready");
    parsed.record
  }

  async fn call_backend(&self, backend: &dyn CompletionBackend, prompt: &str) -> Result<String, BackendError> {
    tokio::time::timeout(self.timeout, backend.complete(prompt))
      .await
      .map_err(|_| BackendError::Timeout(self.timeout))?
  }

  fn fallback(&self, movie: &MovieRecord, difficulty: Difficulty, reason: &'static str) -> QuestionRecord {
    info!(target: "question", title = %movie.title, source = "fallback", reason, "Question ready");
    fallback::synthesize(movie, difficulty)
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use async_trait::async_trait;
  use std::collections::HashSet;
  use std::sync::atomic::{AtomicUsize, Ordering};

  use crate::util::option_key;

  /// Fails every call, counting attempts.
  #[derive(Default)]
  pub(crate) struct FailingBackend {
    pub calls: AtomicUsize,
  }

  #[async_trait]
  impl CompletionBackend for FailingBackend {
    fn kind(&self) -> BackendKind {
      BackendKind::Gemini
    }
    async fn complete(&self, _prompt: &str) -> Result<String, BackendError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Err(BackendError::Status { provider: "Gemini", status: 503, message: "unavailable".into() })
    }
  }

  /// Always answers with the same text.
  pub(crate) struct ScriptedBackend(pub String);

  #[async_trait]
  impl CompletionBackend for ScriptedBackend {
    fn kind(&self) -> BackendKind {
      BackendKind::OpenAi
    }
    async fn complete(&self, _prompt: &str) -> Result<String, BackendError> {
      Ok(self.0.clone())
    }
  }

  struct SlowBackend;

  #[async_trait]
  impl CompletionBackend for SlowBackend {
    fn kind(&self) -> BackendKind {
      BackendKind::OpenAi
    }
    async fn complete(&self, _prompt: &str) -> Result<String, BackendError> {
      tokio::time::sleep(Duration::from_secs(5)).await;
      Ok("Q: Who directed the film Heat?\nA. Michael Mann\nB. Ridley Scott\nC. Tony Scott\nD. John Woo\nAnswer: A".into())
    }
  }

  fn heat_catalog() -> Arc<MovieCatalog> {
    let csv = "movie name,Year,genre,DIRECTOR,ACTOR 1,RATING,runtime\nHeat,1995,\"Crime, Drama\",Michael Mann,Al Pacino,8.3,170 min\n";
    Arc::new(MovieCatalog::from_reader(csv.as_bytes()).unwrap())
  }

  fn generator(backend: Option<Arc<dyn CompletionBackend>>, timeout: Duration) -> QuestionGenerator {
    QuestionGenerator::new(heat_catalog(), backend, Prompts::default(), timeout)
  }

  fn assert_well_formed(r: &QuestionRecord) {
    assert_eq!(r.options.len(), 4);
    assert!(r.answer_index < 4);
    let keys: HashSet<String> = r.options.iter().map(|o| option_key(o)).collect();
    assert_eq!(keys.len(), 4);
  }

  const GOOD: &str = "Q: Which actor plays Vincent Hanna in Heat?\nA. Robert De Niro\nB. Al Pacino\nC. Val Kilmer\nD. Jon Voight\nAnswer: B";

  #[tokio::test]
  async fn offline_uses_fallback() {
    let g = generator(None, Duration::from_secs(1));
    assert_eq!(g.backend_kind(), BackendKind::Offline);
    let r = g.generate_question(Difficulty::Easy, &[], None).await;
    assert_well_formed(&r);
    assert!(r.question.contains("Heat"));
    assert_eq!(r.difficulty, Difficulty::Easy);
  }

  #[tokio::test]
  async fn valid_generated_question_is_returned() {
    let g = generator(Some(Arc::new(ScriptedBackend(GOOD.into()))), Duration::from_secs(1));
    let r = g.generate_question(Difficulty::Hard, &[], None).await;
    assert_eq!(r.question, "Which actor plays Vincent Hanna in Heat?");
    assert_eq!(r.answer_index, 1);
    assert_eq!(r.difficulty, Difficulty::Hard);
  }

  #[tokio::test]
  async fn invalid_generated_question_falls_back() {
    let off_topic = "Q: Which actor plays the lead in this film?\nA. Robert De Niro\nB. Al Pacino\nC. Val Kilmer\nD. Jon Voight\nAnswer: B";
    let g = generator(Some(Arc::new(ScriptedBackend(off_topic.into()))), Duration::from_secs(1));
    let r = g.generate_question(Difficulty::Medium, &[], None).await;
    assert_ne!(r.question, "Which actor plays the lead in this film?");
    assert!(r.question.contains("Heat"));
    assert_well_formed(&r);
  }

  #[tokio::test]
  async fn failing_backend_never_breaks_invariants() {
    let backend = Arc::new(FailingBackend::default());
    let g = generator(Some(backend.clone() as Arc<dyn CompletionBackend>), Duration::from_secs(1));
    for level in 1..=3 {
      for _ in 0..20 {
        let r = g.generate_question(Difficulty::from_level(level), &[], Some("crime")).await;
        assert_well_formed(&r);
        assert_eq!(r.difficulty.level(), level);
      }
    }
    assert_eq!(backend.calls.load(Ordering::SeqCst), 60);
  }

  #[tokio::test]
  async fn slow_backend_times_out_into_fallback() {
    let g = generator(Some(Arc::new(SlowBackend)), Duration::from_millis(50));
    let started = std::time::Instant::now();
    let r = g.generate_question(Difficulty::Easy, &[], None).await;
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_well_formed(&r);
  }
}
