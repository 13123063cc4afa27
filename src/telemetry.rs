//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! LOG_LEVEL overrides the filter; LOG_FORMAT=json switches to structured output.
//! Log targets: `movie_quiz` (service), `catalog`, `question` (generation), `quiz` (sessions).

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str =
  "info,catalog=info,question=debug,quiz=debug,movie_quiz=debug,tower_http=info,axum=info";

#[derive(Debug, PartialEq, Eq)]
enum LogFormat {
  Pretty,
  Json,
}

impl LogFormat {
  fn from_env_value(v: Option<&str>) -> Self {
    match v.map(str::trim) {
      Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
      _ => LogFormat::Pretty,
    }
  }
}

pub fn init_tracing() {
  let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(true)
    .with_file(true)
    .with_line_number(true);

  // The two builders have different types, so init inside each arm.
  match LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref()) {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}
