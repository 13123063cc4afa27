//! Domain models used by the engine: movies, difficulty, question records and history.

use serde::{Deserialize, Serialize};

/// How hard a question is. Maps 1:1 onto the session difficulty level.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  /// Out-of-range levels clamp to the nearest valid one.
  pub fn from_level(level: u8) -> Self {
    match level {
      0 | 1 => Difficulty::Easy,
      2 => Difficulty::Medium,
      _ => Difficulty::Hard,
    }
  }

  pub fn level(self) -> u8 {
    match self {
      Difficulty::Easy => 1,
      Difficulty::Medium => 2,
      Difficulty::Hard => 3,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    }
  }
}

impl std::fmt::Display for Difficulty {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One row of the movie dataset. Immutable once loaded.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct MovieRecord {
  pub title: String,
  pub year: String,
  /// Comma-separated; the first entry is the primary genre.
  pub genre: String,
  pub director: String,
  /// Up to four names, blanks removed, billing order kept.
  pub cast: Vec<String>,
  pub plot: String,
  pub rating: Option<f32>,
  pub metascore: Option<u32>,
  pub certificate: String,
  pub runtime: String,
  pub rank: Option<f64>,
}

impl MovieRecord {
  /// Text before the first comma of the genre field, "Drama" when blank.
  pub fn primary_genre(&self) -> String {
    let first = self.genre.split(',').next().unwrap_or("").trim();
    if first.is_empty() { "Drama".to_string() } else { first.to_string() }
  }

  pub fn lead_actor(&self) -> Option<&str> {
    self.cast.first().map(String::as_str)
  }
}

/// A complete multiple-choice question, correct answer included.
/// Never leaves the server in this form.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QuestionRecord {
  pub question: String,
  pub options: Vec<String>,
  pub answer_index: usize,
  pub difficulty: Difficulty,
}

/// Player-facing view of a question (no answer).
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ExposedQuestion {
  pub id: String,
  pub question: String,
  pub options: Vec<String>,
  pub difficulty: Difficulty,
  pub number: u32,
  pub total: u32,
}

impl ExposedQuestion {
  pub fn from_record(id: String, record: &QuestionRecord, number: u32, total: u32) -> Self {
    Self {
      id,
      question: record.question.clone(),
      options: record.options.clone(),
      difficulty: record.difficulty,
      number,
      total,
    }
  }
}

/// One answered (or timed out) question in a session.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct HistoryEntry {
  pub question_id: String,
  /// -1 marks a timeout.
  pub given: i64,
  pub correct_index: usize,
  pub correct: bool,
  pub timeout: bool,
  pub difficulty_level: u8,
}
