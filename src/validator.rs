//! Acceptance check for generated questions.
//!
//! A record passes only if it is well-formed and actually about the source movie.
//! Parser placeholders and sentinel texts never pass, whatever the movie title is.

use std::collections::HashSet;

use crate::domain::{MovieRecord, QuestionRecord};
use crate::parser::{placeholder_option, LETTERS, PARSE_ERROR_QUESTION, UNPARSED_QUESTION};
use crate::util::option_key;

const MIN_QUESTION_CHARS: usize = 10;
const MIN_OPTION_CHARS: usize = 2;
const MIN_TITLE_CHARS_FOR_MATCH: usize = 3;

pub fn validate(record: &QuestionRecord, movie: &MovieRecord) -> bool {
  let question = record.question.trim();
  if question.chars().count() < MIN_QUESTION_CHARS {
    return false;
  }
  if question == UNPARSED_QUESTION || question == PARSE_ERROR_QUESTION {
    return false;
  }
  if record.options.len() != LETTERS.len() {
    return false;
  }
  if record.answer_index >= record.options.len() {
    return false;
  }

  let title = movie.title.trim();
  if title.chars().count() > MIN_TITLE_CHARS_FOR_MATCH
    && !question.to_lowercase().contains(&title.to_lowercase())
  {
    return false;
  }

  let placeholders: HashSet<String> = LETTERS.iter().map(|l| option_key(&placeholder_option(*l))).collect();
  let mut seen = HashSet::new();
  for option in &record.options {
    let key = option_key(option);
    if key.chars().count() < MIN_OPTION_CHARS || placeholders.contains(&key) || !seen.insert(key) {
      return false;
    }
  }
  true
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Difficulty;
  use crate::parser::parse;

  fn movie(title: &str) -> MovieRecord {
    MovieRecord { title: title.into(), genre: "Crime".into(), ..Default::default() }
  }

  fn record(question: &str, options: [&str; 4], answer_index: usize) -> QuestionRecord {
    QuestionRecord {
      question: question.into(),
      options: options.iter().map(|s| s.to_string()).collect(),
      answer_index,
      difficulty: Difficulty::Easy,
    }
  }

  #[test]
  fn accepts_a_good_question() {
    let r = record("Who directed HEAT in 1995?", ["Michael Mann", "Ridley Scott", "Tony Scott", "Oliver Stone"], 0);
    assert!(validate(&r, &movie("Heat")));
  }

  #[test]
  fn rejects_missing_title() {
    let r = record("Who directed this 1995 film?", ["Michael Mann", "Ridley Scott", "Tony Scott", "Oliver Stone"], 0);
    assert!(!validate(&r, &movie("Heat")));
  }

  #[test]
  fn short_titles_skip_the_title_check() {
    let r = record("Which studio animated this film?", ["Pixar", "Disney", "DreamWorks", "Laika"], 0);
    assert!(validate(&r, &movie("Up")));
  }

  #[test]
  fn rejects_bad_shapes() {
    let m = movie("Heat");
    assert!(!validate(&record("Heat?", ["aa", "bb", "cc", "dd"], 0), &m));
    assert!(!validate(&record("What about Heat?", ["aa", "bb", "cc", "dd"], 4), &m));
    assert!(!validate(&record("What about Heat?", ["aa", "b", "cc", "dd"], 0), &m));
    assert!(!validate(&record("What about Heat?", ["aa", "  ", "cc", "dd"], 0), &m));
    assert!(!validate(&record("What about Heat?", ["aa", "AA ", "cc", "dd"], 0), &m));
    let mut three = record("What about Heat?", ["aa", "bb", "cc", "dd"], 0);
    three.options.pop();
    assert!(!validate(&three, &m));
  }

  #[test]
  fn parser_degraded_output_never_passes() {
    let m = movie("Up");
    let sentinel = parse("Q: Huh?\nA. aa\nB. bb\nC. cc\nD. dd\nAnswer: A", Difficulty::Easy).record;
    assert!(!validate(&sentinel, &m));
    let placeholders = parse("Q: Which studio made Up?\nA. Pixar\nAnswer: A", Difficulty::Easy).record;
    assert!(!validate(&placeholders, &m));
    let error = record(PARSE_ERROR_QUESTION, ["Option A", "Option B", "Option C", "Option D"], 0);
    assert!(!validate(&error, &m));
  }

  #[test]
  fn validation_is_idempotent() {
    let m = movie("Heat");
    let r = record("Who scored Heat?", ["Elliot Goldenthal", "Hans Zimmer", "John Williams", "Howard Shore"], 2);
    assert_eq!(validate(&r, &m), validate(&r, &m));
    let bad = record("Who scored it?", ["x", "y", "z", "w"], 2);
    assert_eq!(validate(&bad, &m), validate(&bad, &m));
  }
}
