//! Application state: the quiz manager and what it was built from.
//!
//! Built once at startup from:
//!   - the engine config (TOML or defaults)
//!   - the movie catalog (MOVIES_CSV_PATH)
//!   - the generative backend, if any API key is configured

use std::{sync::Arc, time::Duration};

use tracing::{info, instrument};

use crate::backend::{self, BackendKind, CompletionBackend};
use crate::catalog::MovieCatalog;
use crate::config::EngineConfig;
use crate::generator::QuestionGenerator;
use crate::manager::QuizManager;

pub struct AppState {
  pub manager: QuizManager,
}

impl AppState {
  /// Wire the engine from already-loaded parts.
  pub fn new(
    config: EngineConfig,
    catalog: MovieCatalog,
    backend: Option<Arc<dyn CompletionBackend>>,
  ) -> Self {
    let timeout = Duration::from_secs(config.quiz.backend_timeout_secs);
    let generator = QuestionGenerator::new(Arc::new(catalog), backend, config.prompts, timeout);
    Self { manager: QuizManager::new(generator, config.quiz) }
  }

  /// Build state from env: pick the backend, log the catalog inventory.
  #[instrument(level = "info", skip_all)]
  pub fn from_env(config: EngineConfig, catalog: MovieCatalog) -> Self {
    let backend = backend::from_env(&config.quiz);
    info!(target: "movie_quiz", movies = catalog.len(), genres = ?catalog.genres(), "Startup catalog inventory");
    Self::new(config, catalog, backend)
  }

  pub fn backend_kind(&self) -> BackendKind {
    self.manager.generator().backend_kind()
  }

  pub fn movie_count(&self) -> usize {
    self.manager.generator().catalog().len()
  }
}
