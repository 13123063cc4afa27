//! Tolerant parser for free-text model output.
//!
//! Each piece (question, options, answer letter) is extracted by an ordered list of
//! strategies; the first one that matches wins. Parsing never fails: missing options
//! become `Option <letter>` placeholders, a missing answer defaults to `A`, and text
//! that cannot be read at all yields a fixed error record. Those degraded records are
//! rejected later by `validator::validate`, which sends the caller to the fallback path.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{Difficulty, QuestionRecord};
use crate::util::trunc_for_log;

/// Question text substituted when the extracted question is too short to use.
pub const UNPARSED_QUESTION: &str = "Unable to parse question properly";
/// Question text of the fixed record returned when parsing cannot run at all.
pub const PARSE_ERROR_QUESTION: &str = "Error parsing AI response";

pub const LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];
const MIN_QUESTION_CHARS: usize = 10;
const EXCERPT_CHARS: usize = 200;

pub fn placeholder_option(letter: char) -> String {
  format!("Option {}", letter)
}

/// Result of parsing one model response.
#[derive(Debug, Clone)]
pub struct ParsedResponse {
  pub record: QuestionRecord,
  /// Start of the raw response, for logs.
  pub excerpt: String,
  /// Set only on the fixed error record.
  pub error: Option<String>,
}

pub(crate) struct Patterns {
  question: Vec<Regex>,
  options: Vec<Regex>,
  option_stop: Regex,
  answer: Vec<Regex>,
}

impl Patterns {
  fn compile() -> Result<Self, regex::Error> {
    // Question text runs until the first option line or the end of the text.
    const UNTIL_OPTION: &str = r"(.+?)(?:\n[ \t]*(?:\*\*)?[A-D](?:\*\*)?[.:)]|\z)";
    Ok(Self {
      question: vec![
        Regex::new(&format!(r"(?is)\bQ:\s*{}", UNTIL_OPTION))?,
        Regex::new(&format!(r"(?is)\bQuestion:\s*{}", UNTIL_OPTION))?,
        Regex::new(&format!(r"(?is)\*\*Question\*\*:\s*{}", UNTIL_OPTION))?,
      ],
      options: vec![
        Regex::new(r"(?im)^[ \t]*([A-D])\.[ \t]*")?,
        Regex::new(r"(?im)^[ \t]*\*\*([A-D])(?:\*\*[.:)]?|[.:)]\*\*)[ \t]*")?,
        Regex::new(r"(?im)^[ \t]*([A-D])\)[ \t]*")?,
      ],
      option_stop: Regex::new(r"(?im)^[ \t]*(?:\*\*)?(?:answer|correct|the correct answer)\b")?,
      answer: vec![
        Regex::new(r"(?i)\bAnswer:\s*\**\s*([A-D])\b")?,
        Regex::new(r"(?i)\bCorrect[^\n]*?:\s*\**\s*([A-D])\b")?,
        Regex::new(r"(?i)\*\*Answer\*\*:\s*([A-D])\b")?,
        Regex::new(r"(?i)The correct answer is\s*:?\s*\**\s*([A-D])\b")?,
      ],
    })
  }
}

static PATTERNS: LazyLock<Result<Patterns, regex::Error>> = LazyLock::new(Patterns::compile);

/// Fold line breaks and runs of whitespace, drop markdown emphasis at the edges.
fn clean(s: &str) -> String {
  s.split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
    .trim_matches('*')
    .trim()
    .to_string()
}

pub(crate) fn extract_question(p: &Patterns, text: &str) -> String {
  for re in &p.question {
    if let Some(caps) = re.captures(text) {
      let q = clean(&caps[1]);
      if !q.is_empty() {
        return q;
      }
    }
  }
  text
    .lines()
    .map(str::trim)
    .find(|l| !l.is_empty())
    .unwrap_or("")
    .to_string()
}

/// Letter -> option text. Earlier strategies and earlier occurrences win.
pub(crate) fn extract_options(p: &Patterns, text: &str) -> HashMap<char, String> {
  // (letter, marker start, body start) per strategy, in strategy order.
  let markers: Vec<Vec<(char, usize, usize)>> = p
    .options
    .iter()
    .map(|re| {
      re.captures_iter(text)
        .filter_map(|caps| {
          let whole = caps.get(0)?;
          let letter = caps[1].chars().next()?.to_ascii_uppercase();
          Some((letter, whole.start(), whole.end()))
        })
        .collect()
    })
    .collect();

  // An option body ends at the next marker of any strategy or at an answer line.
  let mut bounds: Vec<usize> = markers.iter().flatten().map(|m| m.1).collect();
  bounds.extend(p.option_stop.find_iter(text).map(|m| m.start()));
  bounds.sort_unstable();

  let mut found: HashMap<char, String> = HashMap::new();
  for (letter, _, body_start) in markers.iter().flatten() {
    let end = bounds
      .iter()
      .copied()
      .find(|b| *b >= *body_start)
      .unwrap_or(text.len());
    let body = clean(&text[*body_start..end]);
    if !body.is_empty() {
      found.entry(*letter).or_insert(body);
    }
  }
  found
}

pub(crate) fn extract_answer_letter(p: &Patterns, text: &str) -> char {
  p.answer
    .iter()
    .find_map(|re| re.captures(text))
    .and_then(|caps| caps[1].chars().next())
    .map(|c| c.to_ascii_uppercase())
    .filter(|c| LETTERS.contains(c))
    .unwrap_or('A')
}

fn parse_with(p: &Patterns, text: &str, difficulty: Difficulty) -> ParsedResponse {
  let text = text.trim();

  let mut question = extract_question(p, text);
  if question.chars().count() < MIN_QUESTION_CHARS {
    question = UNPARSED_QUESTION.to_string();
  }

  let mut found = extract_options(p, text);
  let options = LETTERS
    .iter()
    .map(|l| found.remove(l).unwrap_or_else(|| placeholder_option(*l)))
    .collect();

  let letter = extract_answer_letter(p, text);
  let answer_index = LETTERS.iter().position(|l| *l == letter).unwrap_or(0);

  ParsedResponse {
    record: QuestionRecord { question, options, answer_index, difficulty },
    excerpt: trunc_for_log(text, EXCERPT_CHARS),
    error: None,
  }
}

fn error_response(difficulty: Difficulty, error: String, text: &str) -> ParsedResponse {
  ParsedResponse {
    record: QuestionRecord {
      question: PARSE_ERROR_QUESTION.to_string(),
      options: LETTERS.iter().map(|l| placeholder_option(*l)).collect(),
      answer_index: 0,
      difficulty,
    },
    excerpt: trunc_for_log(text, EXCERPT_CHARS),
    error: Some(error),
  }
}

/// Parse raw model output into a question record. Never fails.
pub fn parse(text: &str, difficulty: Difficulty) -> ParsedResponse {
  match PATTERNS.as_ref() {
    Ok(p) => parse_with(p, text, difficulty),
    Err(e) => error_response(difficulty, format!("pattern compilation failed: {}", e), text),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn patterns() -> &'static Patterns {
    PATTERNS.as_ref().unwrap()
  }

  const WELL_FORMED: &str = "\
Q: Who directed the crime epic 'Heat'?
A. Michael Mann
B. Martin Scorsese
C. Brian De Palma
D. Ridley Scott
Answer: A";

  #[test]
  fn parses_the_requested_format() {
    let parsed = parse(WELL_FORMED, Difficulty::Medium);
    assert!(parsed.error.is_none());
    let r = parsed.record;
    assert_eq!(r.question, "Who directed the crime epic 'Heat'?");
    assert_eq!(r.options, vec!["Michael Mann", "Martin Scorsese", "Brian De Palma", "Ridley Scott"]);
    assert_eq!(r.answer_index, 0);
    assert_eq!(r.difficulty, Difficulty::Medium);
  }

  #[test]
  fn question_label_variants() {
    let p = patterns();
    assert_eq!(
      extract_question(p, "Question: In which year was Heat released?\nA. 1995"),
      "In which year was Heat released?"
    );
    assert_eq!(
      extract_question(p, "**Question**: Which city is Heat set in?\n**A**: Los Angeles"),
      "Which city is Heat set in?"
    );
    assert_eq!(
      extract_question(p, "Q: A question that\nwraps over two lines?\nA. x"),
      "A question that wraps over two lines?"
    );
  }

  #[test]
  fn first_line_is_used_without_a_label() {
    let p = patterns();
    assert_eq!(
      extract_question(p, "\n\nWhich actor plays Neil McCauley in Heat?\nA. Robert De Niro"),
      "Which actor plays Neil McCauley in Heat?"
    );
  }

  #[test]
  fn emphasized_and_paren_options() {
    let p = patterns();
    let found = extract_options(p, "Q: x\n**A**: One\n**B**. Two\nC) Three\n**D.** Four\n**Answer**: C");
    assert_eq!(found[&'A'], "One");
    assert_eq!(found[&'B'], "Two");
    assert_eq!(found[&'C'], "Three");
    assert_eq!(found[&'D'], "Four");
  }

  #[test]
  fn option_text_stops_at_answer_line() {
    let p = patterns();
    let found = extract_options(p, "A. One\nB. Two\nC. Three\nD. Four\nThe correct answer is D because...");
    assert_eq!(found[&'D'], "Four");
  }

  #[test]
  fn missing_options_become_placeholders() {
    let r = parse("Q: What is the runtime of Heat?\nA. 170 minutes\nC. 90 minutes\nAnswer: A", Difficulty::Easy).record;
    assert_eq!(r.options, vec!["170 minutes", "Option B", "90 minutes", "Option D"]);
  }

  #[test]
  fn answer_strategies_in_order() {
    let p = patterns();
    assert_eq!(extract_answer_letter(p, "Answer: c"), 'C');
    assert_eq!(extract_answer_letter(p, "Correct option: B"), 'B');
    assert_eq!(extract_answer_letter(p, "**Answer**: D"), 'D');
    assert_eq!(extract_answer_letter(p, "The correct answer is B."), 'B');
    assert_eq!(extract_answer_letter(p, "Answer: **C**"), 'C');
    assert_eq!(extract_answer_letter(p, "no verdict here"), 'A');
    assert_eq!(extract_answer_letter(p, "Answer: E"), 'A');
  }

  #[test]
  fn short_question_is_replaced_by_sentinel() {
    let r = parse("Q: Huh?\nA. a1\nB. b1\nC. c1\nD. d1\nAnswer: B", Difficulty::Hard).record;
    assert_eq!(r.question, UNPARSED_QUESTION);
    assert_eq!(r.answer_index, 1);
  }

  #[test]
  fn garbage_still_yields_four_options() {
    let parsed = parse("", Difficulty::Easy);
    assert_eq!(parsed.record.options.len(), 4);
    assert_eq!(parsed.record.question, UNPARSED_QUESTION);
    assert_eq!(parsed.record.answer_index, 0);
  }

  #[test]
  fn error_record_shape() {
    let parsed = error_response(Difficulty::Easy, "boom".into(), "raw");
    assert_eq!(parsed.record.question, PARSE_ERROR_QUESTION);
    assert_eq!(parsed.record.options, vec!["Option A", "Option B", "Option C", "Option D"]);
    assert_eq!(parsed.error.as_deref(), Some("boom"));
  }
}
