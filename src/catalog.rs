//! Movie dataset: CSV loading, header normalization and per-question movie selection.
//!
//! Selection policy:
//!   1) restrict to the preferred genre (case-insensitive substring), unless nothing matches
//!   2) if the dataset carries a ranking column, keep the rank bucket for the difficulty
//!      (easy <= 50 < medium <= 150 < hard), unless the bucket is empty
//!   3) pick uniformly at random from what is left

use std::{collections::BTreeSet, fs::File, io::Read, path::Path};

use rand::{seq::SliceRandom, Rng};
use tracing::{info, instrument, warn};

use crate::domain::{Difficulty, MovieRecord};
use crate::error::CatalogError;

const EASY_MAX_RANK: f64 = 50.0;
const MEDIUM_MAX_RANK: f64 = 150.0;

pub struct MovieCatalog {
  movies: Vec<MovieRecord>,
  has_rank: bool,
}

/// Column positions resolved from the CSV header.
struct Columns {
  title: usize,
  year: Option<usize>,
  genre: Option<usize>,
  director: Option<usize>,
  actors: [Option<usize>; 4],
  plot: Option<usize>,
  rating: Option<usize>,
  metascore: Option<usize>,
  certificate: Option<usize>,
  runtime: Option<usize>,
  rank: Option<usize>,
}

impl Columns {
  fn resolve(headers: &csv::StringRecord) -> Result<Self, CatalogError> {
    let names: Vec<String> = headers.iter().map(normalize_header).collect();
    let find = |aliases: &[&str]| names.iter().position(|n| aliases.contains(&n.as_str()));

    let title = find(&["movie name", "title", "name", "movie"])
      .ok_or(CatalogError::MissingColumn("title"))?;
    let actors = [
      find(&["actor 1", "actor1", "star1"]),
      find(&["actor 2", "actor2", "star2"]),
      find(&["actor 3", "actor3", "star3"]),
      find(&["actor 4", "actor4", "star4"]),
    ];
    let rank = names
      .iter()
      .position(|n| n.contains("rank") || n.contains("popularity"));

    Ok(Self {
      title,
      year: find(&["year", "release year", "released"]),
      genre: find(&["genre", "genres"]),
      director: find(&["director", "directors"]),
      actors,
      plot: find(&["detail about movie", "plot", "overview", "description", "summary"]),
      rating: find(&["rating", "imdb rating"]),
      metascore: find(&["metascore", "meta score"]),
      certificate: find(&["certificate"]),
      runtime: find(&["runtime", "duration"]),
      rank,
    })
  }

  fn movie(&self, row: &csv::StringRecord) -> MovieRecord {
    let cast = self
      .actors
      .iter()
      .map(|idx| field(row, *idx))
      .filter(|name| !name.is_empty())
      .collect();

    MovieRecord {
      title: field(row, Some(self.title)),
      year: field(row, self.year).replace('-', "").trim().to_string(),
      genre: field(row, self.genre),
      director: field(row, self.director),
      cast,
      plot: field(row, self.plot),
      rating: field(row, self.rating).parse::<f32>().ok(),
      metascore: field(row, self.metascore)
        .parse::<f32>()
        .ok()
        .filter(|v| *v >= 0.0)
        .map(|v| v.round() as u32),
      certificate: field(row, self.certificate),
      runtime: field(row, self.runtime),
      rank: parse_rank(&field(row, self.rank)),
    }
  }
}

/// Trim whitespace, drop quotes and line breaks, lowercase, collapse inner whitespace.
fn normalize_header(raw: &str) -> String {
  let cleaned: String = raw
    .chars()
    .filter(|c| !matches!(c, '"' | '\'' | '\n' | '\r'))
    .collect();
  cleaned
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

fn field(row: &csv::StringRecord, idx: Option<usize>) -> String {
  idx.and_then(|i| row.get(i)).unwrap_or("").trim().to_string()
}

fn parse_rank(raw: &str) -> Option<f64> {
  let s = raw.trim().trim_start_matches('#').replace(',', "");
  s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn in_bucket(difficulty: Difficulty, rank: f64) -> bool {
  match difficulty {
    Difficulty::Easy => rank <= EASY_MAX_RANK,
    Difficulty::Medium => rank > EASY_MAX_RANK && rank <= MEDIUM_MAX_RANK,
    Difficulty::Hard => rank > MEDIUM_MAX_RANK,
  }
}

impl MovieCatalog {
  /// Load the dataset from a CSV file. Fails loudly: the engine cannot run without movies.
  #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
    let file = File::open(path.as_ref())?;
    Self::from_reader(file)
  }

  pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
      .flexible(true)
      .from_reader(reader);

    let columns = Columns::resolve(csv_reader.headers()?)?;

    let mut movies = Vec::new();
    let mut skipped = 0usize;
    for row in csv_reader.records() {
      let movie = columns.movie(&row?);
      if movie.title.is_empty() {
        skipped += 1;
        continue;
      }
      movies.push(movie);
    }

    if skipped > 0 {
      warn!(target: "catalog", skipped, "Dropped rows without a title");
    }
    if movies.is_empty() {
      return Err(CatalogError::DatasetEmpty);
    }

    let has_rank = columns.rank.is_some();
    info!(target: "catalog", movies = movies.len(), has_rank, "Movie catalog loaded");
    Ok(Self { movies, has_rank })
  }

  pub fn len(&self) -> usize {
    self.movies.len()
  }

  /// Distinct primary genres, sorted.
  pub fn genres(&self) -> Vec<String> {
    self
      .movies
      .iter()
      .map(MovieRecord::primary_genre)
      .collect::<BTreeSet<_>>()
      .into_iter()
      .collect()
  }

  /// Pick one movie for a question at `difficulty`, preferring `preferred_genre`.
  pub fn select(&self, difficulty: Difficulty, preferred_genre: Option<&str>) -> &MovieRecord {
    self.select_with(&mut rand::thread_rng(), difficulty, preferred_genre)
  }

  pub fn select_with<R: Rng + ?Sized>(
    &self,
    rng: &mut R,
    difficulty: Difficulty,
    preferred_genre: Option<&str>,
  ) -> &MovieRecord {
    let mut candidates: Vec<&MovieRecord> = match preferred_genre.map(str::trim).filter(|g| !g.is_empty()) {
      Some(genre) => {
        let needle = genre.to_lowercase();
        self
          .movies
          .iter()
          .filter(|m| m.genre.to_lowercase().contains(&needle))
          .collect()
      }
      None => Vec::new(),
    };
    if candidates.is_empty() {
      candidates = self.movies.iter().collect();
    }

    if self.has_rank {
      let bucket: Vec<&MovieRecord> = candidates
        .iter()
        .copied()
        .filter(|m| m.rank.map_or(false, |r| in_bucket(difficulty, r)))
        .collect();
      if !bucket.is_empty() {
        candidates = bucket;
      }
    }

    // Loading guarantees at least one movie, so the candidate set is never empty.
    candidates.choose(rng).copied().unwrap_or(&self.movies[0])
  }
}
