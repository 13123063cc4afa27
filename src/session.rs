//! Per-player quiz state and the adaptive difficulty rule.

use serde::Serialize;

use crate::domain::{Difficulty, HistoryEntry};

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 3;

#[derive(Clone, Debug, Serialize)]
pub struct QuizSession {
  pub session_id: String,
  /// 1 = easy, 2 = medium, 3 = hard.
  pub difficulty_level: u8,
  pub history: Vec<HistoryEntry>,
  pub score: u64,
  pub total_questions: u32,
  pub questions_served: u32,
  pub preferred_genre: Option<String>,
  pub user_id: Option<String>,
}

impl QuizSession {
  pub fn new(
    session_id: String,
    total_questions: u32,
    preferred_genre: Option<String>,
    user_id: Option<String>,
  ) -> Self {
    Self {
      session_id,
      difficulty_level: MIN_LEVEL,
      history: Vec::new(),
      score: 0,
      total_questions,
      questions_served: 0,
      preferred_genre,
      user_id,
    }
  }

  pub fn difficulty(&self) -> Difficulty {
    Difficulty::from_level(self.difficulty_level)
  }

  pub fn is_complete(&self) -> bool {
    self.questions_served >= self.total_questions
  }

  pub fn questions_remaining(&self) -> u32 {
    self.total_questions.saturating_sub(self.questions_served)
  }

  /// Step difficulty after an answer: up after a correct one, down after a miss or timeout.
  pub fn adjust_difficulty(&mut self) {
    let Some(last) = self.history.last() else {
      return;
    };
    if last.correct && self.difficulty_level < MAX_LEVEL {
      self.difficulty_level += 1;
    } else if !last.correct && self.difficulty_level > MIN_LEVEL {
      self.difficulty_level -= 1;
    }
  }

  /// Record an answer, update the score and apply the difficulty rule.
  /// Returns (correct, points awarded).
  pub fn record_answer(
    &mut self,
    question_id: &str,
    answer_index: i64,
    correct_index: usize,
    time_left: i64,
  ) -> (bool, u64) {
    let timeout = answer_index == -1;
    let correct = !timeout && usize::try_from(answer_index).map_or(false, |i| i == correct_index);

    let points = if correct {
      let bonus = u64::try_from(time_left).unwrap_or(0).saturating_mul(5);
      (100 * u64::from(self.difficulty_level)).saturating_add(bonus)
    } else {
      0
    };
    self.score = self.score.saturating_add(points);

    self.history.push(HistoryEntry {
      question_id: question_id.to_string(),
      given: answer_index,
      correct_index,
      correct,
      timeout,
      difficulty_level: self.difficulty_level,
    });
    self.adjust_difficulty();
    (correct, points)
  }
}
