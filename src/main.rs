//! Movie Quiz · Adaptive Trivia Backend
//!
//! - Axum HTTP API (start a quiz, answer questions, health)
//! - Optional generative backend: Google Gemini first, then OpenAI, else offline templates
//! - Movie catalog loaded once from CSV at startup
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   MOVIES_CSV_PATH   : dataset path (default "./data/movies.csv")
//!   GOOGLE_API_KEY    : enables Gemini if present
//!   GEMINI_BASE_URL   : default "https://generativelanguage.googleapis.com/v1beta"
//!   GEMINI_MODEL      : default "gemini-1.5-flash"
//!   OPENAI_API_KEY    : enables OpenAI if present (and no Google key)
//!   OPENAI_BASE_URL   : default "https://api.openai.com/v1"
//!   OPENAI_MODEL      : default "gpt-4o-mini"
//!   QUIZ_CONFIG_PATH  : path to TOML config (prompt template + quiz settings)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod catalog;
mod prompt;
mod parser;
mod validator;
mod fallback;
mod backend;
mod gemini;
mod openai;
mod generator;
mod session;
mod store;
mod manager;
mod state;
mod protocol;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

use crate::catalog::MovieCatalog;
use crate::config::load_engine_config_from_env;
use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let config = load_engine_config_from_env();

  // The dataset is required; refuse to start without it.
  let csv_path = std::env::var("MOVIES_CSV_PATH").unwrap_or_else(|_| "./data/movies.csv".into());
  let catalog = MovieCatalog::from_path(&csv_path).map_err(|e| {
    error!(target: "movie_quiz", path = %csv_path, error = %e, "Failed to load movie dataset");
    e
  })?;

  // Build shared application state (catalog, backend, session store).
  let state = Arc::new(AppState::from_env(config, catalog));

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "movie_quiz", %addr, backend = ?state.backend_kind(), "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
