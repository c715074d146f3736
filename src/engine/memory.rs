//! In-memory engine
//!
//! A deterministic stand-in for the index-backed engine. It interprets
//! descriptors directly against a small catalog: a query token matches an
//! indexed token exactly, or within the fuzzy tolerance when one is given.
//! Scores are match counts scaled by clause boosts. Session opens and closes
//! are counted so callers can check release on every path.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::{EngineBatch, EngineError, EngineQuery, EngineSession, RecordStore, SearchEngine};
use crate::query::{
    AutocompleteProbe, FuzzyTolerance, RangeClause, SearchDescriptor, StandardSearch, TextClause,
    TitleWeightedSearch, Field,
};
use crate::search::{Movie, RankedRecord};

/// Exact prefix hits outrank fuzzy ones in autocomplete
const FUZZY_PREFIX_SCORE: f64 = 0.5;

/// Session counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub opened: usize,
    pub closed: usize,
    pub executed: usize,
}

#[derive(Debug, Default)]
struct Counters {
    opened: AtomicUsize,
    closed: AtomicUsize,
    executed: AtomicUsize,
}

/// Catalog-backed engine living in process memory
#[derive(Debug, Clone)]
pub struct MemoryEngine {
    catalog: Arc<Vec<Movie>>,
    counters: Arc<Counters>,
    failure: Option<String>,
    latency: Option<Duration>,
}

impl MemoryEngine {
    pub fn new(catalog: Vec<Movie>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            counters: Arc::new(Counters::default()),
            failure: None,
            latency: None,
        }
    }

    /// Every execute fails with `message`, after the session is opened
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Every execute waits `latency` before answering
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            opened: self.counters.opened.load(Ordering::SeqCst),
            closed: self.counters.closed.load(Ordering::SeqCst),
            executed: self.counters.executed.load(Ordering::SeqCst),
        }
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// A handful of well-known films for offline use
    pub fn demo_catalog() -> Vec<Movie> {
        vec![
            Movie::new("1", "Star Wars")
                .with_year(1977)
                .with_plot("A farm boy joins a rebellion among the stars to rescue a princess from an evil empire.")
                .with_runtime(121)
                .with_rating(8.6)
                .with_genres(&["Action", "Adventure", "Fantasy"]),
            Movie::new("2", "Star Trek")
                .with_year(2009)
                .with_plot("A young crew aboard a starship confronts a vengeful Romulan from the future.")
                .with_runtime(127)
                .with_rating(8.0)
                .with_genres(&["Action", "Adventure", "Sci-Fi"]),
            Movie::new("3", "Alien")
                .with_year(1979)
                .with_plot("The crew of a commercial spacecraft encounters a deadly lifeform after investigating a distress call.")
                .with_runtime(117)
                .with_rating(8.5)
                .with_genres(&["Horror", "Sci-Fi"]),
            Movie::new("4", "Stardust")
                .with_year(2007)
                .with_plot("A young man enters a magical realm to retrieve a fallen star for his beloved.")
                .with_runtime(127)
                .with_rating(7.6)
                .with_genres(&["Adventure", "Family", "Fantasy"]),
            Movie::new("5", "The Godfather")
                .with_year(1972)
                .with_plot("The aging patriarch of an organized crime dynasty transfers control to his reluctant son.")
                .with_runtime(175)
                .with_rating(9.2)
                .with_genres(&["Crime", "Drama"]),
            Movie::new("6", "Interstellar")
                .with_year(2014)
                .with_plot("A team of explorers travel through a wormhole in space to ensure humanity's survival.")
                .with_runtime(169)
                .with_rating(8.6)
                .with_genres(&["Adventure", "Drama", "Sci-Fi"]),
            Movie::new("7", "Starman")
                .with_year(1984)
                .with_plot("An alien takes the form of a young widow's dead husband and asks her to drive him across the country.")
                .with_runtime(115)
                .with_rating(6.5)
                .with_genres(&["Drama", "Romance", "Sci-Fi"]),
        ]
    }
}

#[async_trait]
impl SearchEngine for MemoryEngine {
    async fn connect(&self) -> Result<Box<dyn EngineSession>, EngineError> {
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySession {
            engine: self.clone(),
            open: true,
        }))
    }
}

#[async_trait]
impl RecordStore for MemoryEngine {
    async fn find_by_id(&self, id: &str) -> Result<Option<Movie>, EngineError> {
        Ok(self.catalog.iter().find(|movie| movie.id == id).cloned())
    }

    async fn count(&self) -> Result<u64, EngineError> {
        Ok(self.catalog.len() as u64)
    }
}

struct MemorySession {
    engine: MemoryEngine,
    open: bool,
}

#[async_trait]
impl EngineSession for MemorySession {
    async fn execute(&mut self, query: EngineQuery<'_>) -> Result<EngineBatch, EngineError> {
        if !self.open {
            return Err(EngineError::Unavailable("session already closed".to_string()));
        }
        self.engine.counters.executed.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.engine.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(message) = &self.engine.failure {
            return Err(EngineError::Unavailable(message.clone()));
        }

        let catalog = self.engine.catalog.as_slice();
        let batch = match query.descriptor {
            SearchDescriptor::Standard(search) => page(rank(catalog, |m| score_standard(search, m)), query),
            SearchDescriptor::TitleWeighted(search) => {
                page(rank(catalog, |m| score_title_weighted(search, m)), query)
            }
            SearchDescriptor::Autocomplete(probe) => {
                let mut records = rank(catalog, |m| score_autocomplete(probe, m));
                records.truncate(probe.candidate_cap);
                EngineBatch {
                    total: records.len() as u64,
                    records,
                }
            }
        };
        Ok(batch)
    }

    fn release(&mut self) {
        if self.open {
            self.open = false;
            self.engine.counters.closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Score every movie, keep matches, order by descending score.
/// The sort is stable, so ties keep catalog order.
fn rank<F>(catalog: &[Movie], score: F) -> Vec<RankedRecord>
where
    F: Fn(&Movie) -> Option<f64>,
{
    let mut ranked: Vec<RankedRecord> = catalog
        .iter()
        .filter_map(|movie| score(movie).map(|s| movie.clone().ranked(s)))
        .collect();
    ranked.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    ranked
}

fn page(ranked: Vec<RankedRecord>, query: EngineQuery<'_>) -> EngineBatch {
    let total = ranked.len() as u64;
    let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
    let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
    EngineBatch {
        total,
        records: ranked.into_iter().skip(skip).take(limit).collect(),
    }
}

fn score_standard(search: &StandardSearch, movie: &Movie) -> Option<f64> {
    if !search.filters.iter().all(|clause| passes(clause, movie)) {
        return None;
    }
    if let Some(genre) = &search.genre {
        if !movie.has_genre(genre) {
            return None;
        }
    }
    let score = text_score(&search.text, movie);
    (score > 0.0).then_some(score)
}

fn score_title_weighted(search: &TitleWeightedSearch, movie: &Movie) -> Option<f64> {
    let score = text_score(&search.title, movie) + text_score(&search.plot, movie);
    (score > 0.0).then_some(score)
}

fn score_autocomplete(probe: &AutocompleteProbe, movie: &Movie) -> Option<f64> {
    let clause = &probe.clause;
    let title_tokens = tokenize(field_text(movie, clause.path)?);
    let query_tokens = tokenize(&clause.query);
    if query_tokens.is_empty() {
        return None;
    }

    let mut score = 0.0;
    for query_token in &query_tokens {
        let gram_len = query_token.chars().count();
        if gram_len < usize::from(clause.min_grams) {
            continue;
        }
        let gram: String = query_token.chars().take(usize::from(clause.max_grams)).collect();
        let best = title_tokens
            .iter()
            .map(|token| {
                if token.starts_with(&gram) {
                    1.0
                } else if prefix_within(&gram, token, clause.fuzzy) {
                    FUZZY_PREFIX_SCORE
                } else {
                    0.0
                }
            })
            .fold(0.0, f64::max);
        score += best;
    }
    (score > 0.0).then_some(score)
}

fn text_score(clause: &TextClause, movie: &Movie) -> f64 {
    let query_tokens = tokenize(&clause.query);
    let hits: usize = clause
        .paths
        .iter()
        .filter_map(|field| field_text(movie, *field))
        .map(|text| {
            let tokens = tokenize(text);
            query_tokens
                .iter()
                .filter(|q| tokens.iter().any(|t| token_matches(q, t, clause.fuzzy)))
                .count()
        })
        .sum();
    hits as f64 * clause.boost.unwrap_or(1.0)
}

fn passes(clause: &RangeClause, movie: &Movie) -> bool {
    let value = match clause.field {
        Field::Year => movie.year.map(f64::from),
        Field::Runtime => movie.runtime_minutes.map(f64::from),
        Field::Rating => movie.rating,
        Field::Title | Field::Plot | Field::Genres => None,
    };
    value.is_some_and(|v| clause.contains(v))
}

fn field_text(movie: &Movie, field: Field) -> Option<&str> {
    match field {
        Field::Title => Some(movie.title.as_str()),
        Field::Plot => movie.plot.as_deref(),
        _ => None,
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn token_matches(query: &str, token: &str, fuzzy: Option<FuzzyTolerance>) -> bool {
    if query == token {
        return true;
    }
    match fuzzy {
        Some(tolerance) => {
            shares_prefix(query, token, tolerance.prefix_length)
                && strsim::levenshtein(query, token) <= usize::from(tolerance.max_edits)
        }
        None => false,
    }
}

/// `gram` is within tolerance of the same-length prefix of `token`
fn prefix_within(gram: &str, token: &str, tolerance: FuzzyTolerance) -> bool {
    let head: String = token.chars().take(gram.chars().count()).collect();
    shares_prefix(gram, &head, tolerance.prefix_length)
        && strsim::levenshtein(gram, &head) <= usize::from(tolerance.max_edits)
}

fn shares_prefix(a: &str, b: &str, length: u8) -> bool {
    let length = usize::from(length);
    let a: Vec<char> = a.chars().take(length).collect();
    let b: Vec<char> = b.chars().take(length).collect();
    a.len() == length && a == b
}
