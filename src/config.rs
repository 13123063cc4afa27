//! Loading engine configuration (prompt template + quiz tuning) from TOML.
//!
//! See `EngineConfig`, `Prompts` and `QuizSettings` for the expected schema. Every
//! field has a default, so an empty or partial file is fine.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct EngineConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub quiz: QuizSettings,
}

/// Prompt sent to the generative backend. `{key}` slots are filled by `prompt::build_prompt`.
///
/// Available keys: primary_genre, primary_genre_upper, difficulty, genre_focus, title,
/// year, genre, director, cast, plot, rating, metascore, certificate, runtime, performance.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub question_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      question_template: "\
You are an expert movie quiz generator specializing in {primary_genre_upper} films. Create ONE creative {difficulty} multiple-choice question about the {primary_genre} movie below.

For {primary_genre} movies, focus on:
{genre_focus}

You can also ask about:
- {primary_genre}-typical plot elements and themes
- Characteristic {primary_genre} cinematography and techniques
- Iconic {primary_genre} movie comparisons
- Cast and directors known for {primary_genre} work

Movie Information:
Title: {title}
Year: {year}
Genre: {genre} (PRIMARY: {primary_genre})
Director: {director}
Main Cast: {cast}
Plot: {plot}
Rating: {rating}/10  |  Metascore: {metascore}
Certificate: {certificate}  |  Runtime: {runtime}

User Performance: {performance}

Difficulty Guidelines for {primary_genre}:
- EASY: Basic facts (iconic scenes, main themes, lead roles)
- MEDIUM: Specific genre elements (techniques, character archetypes, plot devices)
- HARD: Deep genre knowledge (genre evolution, directorial style, cultural impact)

The question MUST mention the title \"{title}\".

Format EXACTLY as:
Q: <your question>
A. <option 1>
B. <option 2>
C. <option 3>
D. <option 4>
Answer: <LETTER>
"
      .into(),
    }
  }
}

/// Quiz and backend tuning knobs.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct QuizSettings {
  pub default_total_questions: u32,
  pub max_total_questions: u32,
  pub backend_timeout_secs: u64,
  pub temperature: f32,
  pub max_output_tokens: u32,
}

impl Default for QuizSettings {
  fn default() -> Self {
    Self {
      default_total_questions: 10,
      max_total_questions: 50,
      backend_timeout_secs: 20,
      temperature: 0.3,
      max_output_tokens: 1000,
    }
  }
}

/// Attempt to load `EngineConfig` from QUIZ_CONFIG_PATH. Missing variable or any
/// parsing/IO error yields the defaults.
pub fn load_engine_config_from_env() -> EngineConfig {
  let Ok(path) = std::env::var("QUIZ_CONFIG_PATH") else {
    return EngineConfig::default();
  };
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<EngineConfig>(&s) {
      Ok(cfg) => {
        info!(target: "movie_quiz", %path, "Loaded engine config (TOML)");
        cfg
      }
      Err(e) => {
        error!(target: "movie_quiz", %path, error = %e, "Failed to parse TOML config; using defaults");
        EngineConfig::default()
      }
    },
    Err(e) => {
      error!(target: "movie_quiz", %path, error = %e, "Failed to read TOML config file; using defaults");
      EngineConfig::default()
    }
  }
}
