//! Prompt construction for the generative path.
//!
//! The prompt always carries the movie facts, a genre focus block, a summary of the
//! player's performance so far and the exact `Q:` / `A.`-`D.` / `Answer:` output format.

use crate::config::Prompts;
use crate::domain::{Difficulty, HistoryEntry, MovieRecord};
use crate::util::fill_template;

const GENERIC_FOCUS: &str = "\
- Genre-specific themes and conventions
- Typical character archetypes for this genre
- Common plot devices and storytelling techniques
- Visual and auditory elements characteristic of this genre
- Cultural and historical context of the genre";

const GENRE_FOCUS: [(&str, &str); 14] = [
  ("Action", "\
- High-octane sequences, stunts, and choreography
- Weapon usage, fight scenes, and chase sequences
- Action heroes, villains, and their motivations
- Special effects, explosions, and practical stunts
- Franchise connections and action movie tropes"),
  ("Drama", "\
- Character development and emotional arcs
- Social issues, family dynamics, and relationships
- Dramatic performances and award recognition
- Real-life inspirations and biographical elements
- Dialogue quality and meaningful themes"),
  ("Comedy", "\
- Comedic timing, humor styles, and funny scenes
- Comic actors and their signature roles
- Parody elements and satirical themes
- Memorable quotes and comedic situations
- Comedy sub-genres (rom-com, dark comedy, etc.)"),
  ("Horror", "\
- Scare techniques, suspense building, and fear elements
- Horror sub-genres (slasher, psychological, supernatural)
- Iconic horror scenes and jump scares
- Horror movie villains and monsters
- Gore levels, practical effects, and makeup"),
  ("Thriller", "\
- Suspense building and tension creation
- Plot twists, mysteries, and reveals
- Psychological elements and mind games
- Chase sequences and cat-and-mouse dynamics
- Paranoia themes and conspiracy elements"),
  ("Romance", "\
- Love stories, relationship dynamics, and chemistry
- Romantic leads and their on-screen partnerships
- Meet-cute scenarios and romantic gestures
- Heartbreak, passion, and emotional moments
- Wedding scenes, proposals, and happy endings"),
  ("Sci-Fi", "\
- Futuristic concepts, technology, and scientific themes
- Space travel, aliens, and otherworldly elements
- Time travel, dystopian futures, and alternate realities
- Special effects, CGI, and visual innovation
- Scientific accuracy and theoretical concepts"),
  ("Fantasy", "\
- Magical elements, mythical creatures, and supernatural powers
- World-building, fictional realms, and fantasy races
- Quests, prophecies, and hero's journey narratives
- Magic systems, spells, and fantasy combat
- Adaptation from fantasy literature and folklore"),
  ("Crime", "\
- Criminal activities, heists, and law enforcement
- Detective work, investigations, and forensics
- Organized crime, gangs, and criminal masterminds
- Courtroom dramas and legal procedures
- Moral ambiguity and crime consequences"),
  ("Western", "\
- Old West settings, frontier life, and cowboy culture
- Gunfights, saloons, and horseback riding
- Outlaws, sheriffs, and justice themes
- Desert landscapes and small town dynamics
- Native American relations and historical context"),
  ("War", "\
- Military tactics, battles, and warfare strategies
- Historical conflicts and war periods
- Soldier experiences, camaraderie, and sacrifice
- War's impact on civilians and families
- Anti-war messages and heroism themes"),
  ("Animation", "\
- Animation techniques and visual styles
- Voice acting and character performances
- Family-friendly themes and life lessons
- Studio signatures (Disney, Pixar, Studio Ghibli)
- Technical innovation in animation"),
  ("Documentary", "\
- Real-world subjects and factual content
- Documentary filmmaking techniques
- Educational value and information presented
- Interview subjects and expert opinions
- Social impact and awareness raising"),
  ("Musical", "\
- Musical numbers, songs, and choreography
- Musical theater adaptations and original scores
- Singing performances and vocal talents
- Dance sequences and performance staging
- Broadway connections and show tunes"),
];

/// Focus bullet list for a primary genre; unknown genres get the generic block.
pub fn genre_focus(primary_genre: &str) -> &'static str {
  GENRE_FOCUS
    .iter()
    .find(|(genre, _)| *genre == primary_genre)
    .map(|(_, focus)| *focus)
    .unwrap_or(GENERIC_FOCUS)
}

/// One-paragraph description of how the player has done so far.
pub fn summarize_history(history: &[HistoryEntry]) -> String {
  let Some(last) = history.last() else {
    return "No prior answers; start with baseline difficulty.".to_string();
  };
  let correct_count = history.iter().filter(|h| h.correct).count();
  let improving = history.len() > 2 && last.correct && history[history.len() - 2].correct;
  format!(
    "Total answered: {}, correct: {}. Last answer was {}. Performance trend: {}.",
    history.len(),
    correct_count,
    if last.correct { "correct" } else { "incorrect" },
    if improving { "improving" } else { "mixed" },
  )
}

fn or_na(s: &str) -> &str {
  if s.trim().is_empty() { "N/A" } else { s }
}

pub fn build_prompt(
  prompts: &Prompts,
  movie: &MovieRecord,
  difficulty: Difficulty,
  history: &[HistoryEntry],
) -> String {
  let primary_genre = movie.primary_genre();
  let primary_upper = primary_genre.to_uppercase();
  let cast = movie.cast.join(", ");
  let rating = movie.rating.map(|r| format!("{:.1}", r)).unwrap_or_else(|| "N/A".into());
  let metascore = movie.metascore.map(|m| m.to_string()).unwrap_or_else(|| "N/A".into());
  let performance = summarize_history(history);

  fill_template(
    &prompts.question_template,
    &[
      ("primary_genre_upper", &primary_upper),
      ("primary_genre", &primary_genre),
      ("difficulty", difficulty.as_str()),
      ("genre_focus", genre_focus(&primary_genre)),
      ("title", &movie.title),
      ("year", or_na(&movie.year)),
      ("genre", or_na(&movie.genre)),
      ("director", or_na(&movie.director)),
      ("cast", or_na(&cast)),
      ("plot", or_na(&movie.plot)),
      ("rating", &rating),
      ("metascore", &metascore),
      ("certificate", or_na(&movie.certificate)),
      ("runtime", or_na(&movie.runtime)),
      ("performance", &performance),
    ],
  )
}
