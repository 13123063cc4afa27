//! Offline question synthesis from a movie row.
//!
//! Used whenever no generative backend is configured or its output is rejected, so the
//! quiz is useful without any external service. A template is picked at random from the
//! bucket for the requested difficulty; the correct answer comes from a movie field or a
//! genre trait table, and three distractors are sampled from a category pool.

use rand::{seq::SliceRandom, Rng};
use tracing::debug;

use crate::domain::{Difficulty, MovieRecord, QuestionRecord};
use crate::util::option_key;

const YEARS: &[&str] = &["1995", "2001", "2010", "2015", "1999", "2005", "1990", "2008"];
const DIRECTORS: &[&str] = &[
  "Christopher Nolan", "Steven Spielberg", "Quentin Tarantino", "Martin Scorsese", "Ridley Scott", "David Fincher",
];
const ACTORS: &[&str] = &[
  "Tom Hanks", "Leonardo DiCaprio", "Brad Pitt", "Robert De Niro", "Al Pacino", "Johnny Depp",
];
const GENRES: &[&str] = &["Drama", "Action", "Comedy", "Thriller", "Horror", "Romance", "Sci-Fi", "Adventure"];
const RUNTIME_BANDS: &[&str] = &["90-120 minutes", "120-150 minutes", "150-180 minutes", "180+ minutes"];
const GENRE_THEMES: &[&str] = &[
  "Revenge and justice", "Love and relationships", "Good vs evil", "Coming of age", "Redemption story",
];
const GENRE_ELEMENTS: &[&str] = &[
  "Visual spectacle", "Character development", "Emotional depth", "Technical mastery", "Cultural significance",
];
const GENRE_MOVIES: &[&str] = &[
  "Citizen Kane", "The Godfather", "Casablanca", "Singin' in the Rain", "2001: A Space Odyssey",
];
const GENRE_TECHNIQUES: &[&str] = &[
  "Innovative cinematography", "Masterful editing", "Exceptional sound design", "Outstanding performances", "Creative direction",
];
const GENRE_ARCHETYPES: &[&str] = &[
  "Reluctant hero", "Wise mentor", "Comic relief", "Love interest", "Villain mastermind",
];
const GENRE_CONCEPTS: &[&str] = &[
  "Groundbreaking storytelling", "Cultural phenomenon", "Technical innovation", "Artistic achievement", "Genre evolution",
];

// Genre trait tables, keyed by primary genre.
const SUBTYPES: &[(&str, &str)] = &[
  ("Action", "High-octane thriller"), ("Drama", "Character-driven story"), ("Comedy", "Situational comedy"),
  ("Horror", "Psychological thriller"), ("Romance", "Romantic drama"), ("Sci-Fi", "Science fiction adventure"),
  ("Thriller", "Suspense thriller"), ("Crime", "Crime thriller"), ("Western", "Classic western"), ("War", "War drama"),
];
const THEMES: &[(&str, &str)] = &[
  ("Action", "Good vs evil conflict"), ("Drama", "Human relationships"), ("Comedy", "Humor and life lessons"),
  ("Horror", "Fear and survival"), ("Romance", "Love conquers all"), ("Sci-Fi", "Technology and humanity"),
  ("Thriller", "Suspense and mystery"), ("Crime", "Justice and morality"), ("Western", "Frontier justice"),
  ("War", "Honor and sacrifice"),
];
const ELEMENTS: &[(&str, &str)] = &[
  ("Action", "Explosive action sequences"), ("Drama", "Emotional character arcs"), ("Comedy", "Comedic timing and wit"),
  ("Horror", "Suspenseful atmosphere"), ("Romance", "Romantic chemistry"), ("Sci-Fi", "Futuristic concepts"),
  ("Thriller", "Edge-of-seat tension"), ("Crime", "Criminal investigations"), ("Western", "Frontier landscapes"),
  ("War", "Combat realism"),
];
const COMPARABLES: &[(&str, &str)] = &[
  ("Action", "Mission Impossible series"), ("Drama", "Forrest Gump"), ("Comedy", "The Hangover"),
  ("Horror", "Halloween franchise"), ("Romance", "The Notebook"), ("Sci-Fi", "Star Wars saga"),
  ("Thriller", "North by Northwest"), ("Crime", "Goodfellas"), ("Western", "The Good, the Bad and the Ugly"),
  ("War", "Saving Private Ryan"),
];
const TECHNIQUES: &[(&str, &str)] = &[
  ("Action", "Dynamic camera work"), ("Drama", "Character-focused cinematography"), ("Comedy", "Comedic timing and editing"),
  ("Horror", "Suspenseful sound design"), ("Romance", "Intimate cinematography"), ("Sci-Fi", "Visual effects mastery"),
  ("Thriller", "Tension-building editing"), ("Crime", "Noir-style lighting"), ("Western", "Wide landscape shots"),
  ("War", "Realistic battle choreography"),
];
const ARCHETYPES: &[(&str, &str)] = &[
  ("Action", "Action hero protagonist"), ("Drama", "Complex character study"), ("Comedy", "Comedic lead character"),
  ("Horror", "Survivor protagonist"), ("Romance", "Romantic lead couple"), ("Sci-Fi", "Reluctant hero"),
  ("Thriller", "Ordinary person in danger"), ("Crime", "Antihero protagonist"), ("Western", "Lone gunslinger"),
  ("War", "Soldier protagonist"),
];
const SUBGENRES: &[(&str, &str)] = &[
  ("Action", "Superhero action"), ("Drama", "Social drama"), ("Comedy", "Romantic comedy"),
  ("Horror", "Psychological horror"), ("Thriller", "Political thriller"), ("Sci-Fi", "Space opera"),
  ("Crime", "Heist thriller"),
];

fn lookup(table: &[(&str, &str)], genre: &str, default: &str) -> String {
  table
    .iter()
    .find(|(g, _)| *g == genre)
    .map(|(_, v)| v.to_string())
    .unwrap_or_else(|| default.to_string())
}

/// Question template categories, bucketed by difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
  Year,
  Director,
  GenreIdentification,
  LeadActor,
  GenreTheme,
  GenreElements,
  GenreComparison,
  GenreTechnique,
  GenreCharacter,
  GenreRating,
  Runtime,
  GenreInnovation,
  GenreInfluence,
  GenreSubgenre,
  GenreDirectorStyle,
  GenreCulturalImpact,
}

const EASY: &[Category] = &[
  Category::Year, Category::Director, Category::GenreIdentification, Category::LeadActor, Category::GenreTheme,
];
const MEDIUM: &[Category] = &[
  Category::GenreElements, Category::GenreComparison, Category::GenreTechnique,
  Category::GenreCharacter, Category::GenreRating, Category::Runtime,
];
const HARD: &[Category] = &[
  Category::GenreInnovation, Category::GenreInfluence, Category::GenreSubgenre,
  Category::GenreDirectorStyle, Category::GenreCulturalImpact,
];

fn templates(difficulty: Difficulty) -> &'static [Category] {
  match difficulty {
    Difficulty::Easy => EASY,
    Difficulty::Medium => MEDIUM,
    Difficulty::Hard => HARD,
  }
}

/// Minutes from strings like "142 min", "2h 22min" or "142".
fn runtime_minutes(runtime: &str) -> Option<u32> {
  let numbers: Vec<u32> = runtime
    .split(|c: char| !c.is_ascii_digit())
    .filter(|s| !s.is_empty())
    .filter_map(|s| s.parse().ok())
    .collect();
  let first = *numbers.first()?;
  let lower = runtime.to_lowercase();
  if numbers.len() > 1 || (lower.contains('h') && !lower.contains("min")) {
    Some(first * 60 + numbers.get(1).copied().unwrap_or(0))
  } else {
    Some(first)
  }
}

fn runtime_band(minutes: u32) -> &'static str {
  if minutes >= 180 {
    "180+ minutes"
  } else if minutes >= 150 {
    "150-180 minutes"
  } else if minutes >= 120 {
    "120-150 minutes"
  } else {
    "90-120 minutes"
  }
}

/// Rating labels from best to worst; the correct one is picked by score.
fn rating_ladder(genre_lower: &str) -> [String; 4] {
  [
    format!("Top-tier {} film", genre_lower),
    format!("Well-regarded {} movie", genre_lower),
    format!("Decent {} entry", genre_lower),
    format!("Average {} film", genre_lower),
  ]
}

fn rating_context(rating: f32, genre_lower: &str) -> String {
  let [top, good, decent, average] = rating_ladder(genre_lower);
  if rating >= 8.5 {
    top
  } else if rating >= 7.5 {
    good
  } else if rating >= 6.5 {
    decent
  } else {
    average
  }
}

impl Category {
  pub fn tag(self) -> &'static str {
    match self {
      Category::Year => "year",
      Category::Director => "director",
      Category::GenreIdentification => "genre_identification",
      Category::LeadActor => "lead_actor",
      Category::GenreTheme => "genre_theme",
      Category::GenreElements => "genre_elements",
      Category::GenreComparison => "genre_comparison",
      Category::GenreTechnique => "genre_technique",
      Category::GenreCharacter => "genre_character",
      Category::GenreRating => "genre_rating",
      Category::Runtime => "runtime",
      Category::GenreInnovation => "genre_innovation",
      Category::GenreInfluence => "genre_influence",
      Category::GenreSubgenre => "genre_subgenre",
      Category::GenreDirectorStyle => "genre_director_style",
      Category::GenreCulturalImpact => "genre_cultural_impact",
    }
  }

  fn question(self, movie: &MovieRecord, g: &str) -> String {
    let t = &movie.title;
    match self {
      Category::Year => format!("In which year was the {g} film '{t}' released?"),
      Category::Director => format!("Who directed the {g} movie '{t}'?"),
      Category::GenreIdentification => format!("'{t}' is primarily what type of {g} film?"),
      Category::LeadActor => format!("Who stars in the {g} film '{t}'?"),
      Category::GenreTheme => format!("What {g} theme is central to '{t}'?"),
      Category::GenreElements => format!("What {g} elements make '{t}' distinctive?"),
      Category::GenreComparison => format!("'{t}' is similar to which other {g} film?"),
      Category::GenreTechnique => format!("What {g} filmmaking technique is used in '{t}'?"),
      Category::GenreCharacter => format!("What type of {g} character archetype appears in '{t}'?"),
      Category::GenreRating => format!("How does '{t}' rate among {g} films?"),
      Category::Runtime => format!("What is the typical runtime for a {g} film like '{t}'?"),
      Category::GenreInnovation => format!("How did '{t}' innovate within the {g} genre?"),
      Category::GenreInfluence => format!("What {g} films influenced '{t}'?"),
      Category::GenreSubgenre => format!("'{t}' belongs to which {g} sub-genre?"),
      Category::GenreDirectorStyle => {
        format!("What {g} directorial style does '{}' use in '{t}'?", movie.director)
      }
      Category::GenreCulturalImpact => format!("How did '{t}' impact the {g} genre?"),
    }
  }

  /// Correct answer, or None when the movie lacks the data this template needs.
  fn answer(self, movie: &MovieRecord, primary: &str) -> Option<String> {
    let g = primary.to_lowercase();
    let non_blank = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
    match self {
      Category::Year => non_blank(&movie.year),
      Category::Director => non_blank(&movie.director),
      Category::GenreIdentification => Some(lookup(SUBTYPES, primary, "Drama")),
      Category::LeadActor => movie.lead_actor().and_then(non_blank),
      Category::GenreTheme => Some(lookup(THEMES, primary, "Character development")),
      Category::GenreElements => Some(lookup(ELEMENTS, primary, "Strong storytelling")),
      Category::GenreComparison => Some(lookup(COMPARABLES, primary, "Similar acclaimed films")),
      Category::GenreTechnique => Some(lookup(TECHNIQUES, primary, "Cinematic storytelling")),
      Category::GenreCharacter => Some(lookup(ARCHETYPES, primary, "Central character")),
      Category::GenreRating => movie.rating.map(|r| rating_context(r, &g)),
      Category::Runtime => runtime_minutes(&movie.runtime).map(|m| runtime_band(m).to_string()),
      Category::GenreInnovation => Some(format!("Advanced {} filmmaking techniques", g)),
      Category::GenreInfluence => Some(format!("Classic {} cinema traditions", g)),
      Category::GenreSubgenre => Some(lookup(SUBGENRES, primary, &format!("{} drama", primary))),
      Category::GenreDirectorStyle => {
        non_blank(&movie.director).map(|_| format!("Distinctive {} direction", g))
      }
      Category::GenreCulturalImpact => Some(format!("Influenced modern {} films", g)),
    }
  }

  /// Distractor pool for this category.
  fn pool(self, movie: &MovieRecord, primary: &str) -> Vec<String> {
    let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    match self {
      Category::Year => owned(YEARS),
      Category::Director => owned(DIRECTORS),
      Category::LeadActor => ACTORS
        .iter()
        .filter(|a| !movie.cast.iter().any(|c| option_key(c) == option_key(a)))
        .map(|a| a.to_string())
        .collect(),
      Category::GenreIdentification | Category::GenreSubgenre => owned(GENRES),
      Category::GenreTheme => owned(GENRE_THEMES),
      Category::GenreElements => owned(GENRE_ELEMENTS),
      Category::GenreComparison | Category::GenreInfluence => owned(GENRE_MOVIES),
      Category::GenreTechnique | Category::GenreDirectorStyle => owned(GENRE_TECHNIQUES),
      Category::GenreCharacter => owned(GENRE_ARCHETYPES),
      Category::GenreRating => rating_ladder(&primary.to_lowercase()).to_vec(),
      Category::Runtime => owned(RUNTIME_BANDS),
      Category::GenreInnovation | Category::GenreCulturalImpact => owned(GENRE_CONCEPTS),
    }
  }
}

/// Three distractors plus the correct value, shuffled. Returns (options, answer index).
fn build_options<R: Rng + ?Sized>(rng: &mut R, correct: &str, pool: &[String]) -> (Vec<String>, usize) {
  let correct_key = option_key(correct);
  let eligible: Vec<&String> = pool.iter().filter(|o| option_key(o) != correct_key).collect();

  let mut options: Vec<String> = eligible.choose_multiple(rng, 3).map(|s| (*s).clone()).collect();
  let mut n = options.len() + 1;
  while options.len() < 3 {
    let filler = format!("Option {}", n);
    n += 1;
    let key = option_key(&filler);
    if key != correct_key && !options.iter().any(|o| option_key(o) == key) {
      options.push(filler);
    }
  }

  options.push(correct.to_string());
  options.shuffle(rng);
  let answer_index = options.iter().position(|o| o == correct).unwrap_or(0);
  (options, answer_index)
}

/// Build a question without any external service.
pub fn synthesize(movie: &MovieRecord, difficulty: Difficulty) -> QuestionRecord {
  synthesize_with(&mut rand::thread_rng(), movie, difficulty)
}

pub fn synthesize_with<R: Rng + ?Sized>(rng: &mut R, movie: &MovieRecord, difficulty: Difficulty) -> QuestionRecord {
  let (category, correct) = pick_template(rng, movie, difficulty);
  let primary = movie.primary_genre();
  let question = category.question(movie, &primary.to_lowercase());
  let (options, answer_index) = build_options(rng, &correct, &category.pool(movie, &primary));
  debug!(target: "question", title = %movie.title, category = category.tag(), %difficulty, "Synthesized fallback question");
  QuestionRecord { question, options, answer_index, difficulty }
}

pub(crate) fn pick_template<R: Rng + ?Sized>(
  rng: &mut R,
  movie: &MovieRecord,
  difficulty: Difficulty,
) -> (Category, String) {
  let primary = movie.primary_genre();
  let eligible: Vec<(Category, String)> = templates(difficulty)
    .iter()
    .filter_map(|c| c.answer(movie, &primary).map(|a| (*c, a)))
    .collect();
  // Genre-table templates are always eligible, so this only guards the impossible case.
  eligible
    .choose(rng)
    .cloned()
    .unwrap_or_else(|| (Category::GenreTheme, lookup(THEMES, &primary, "Character development")))
}
