//! Search module
//!
//! Result types plus the dispatch, shaping and orchestration stages.

mod dispatcher;
mod service;
mod shaper;

pub use dispatcher::Dispatcher;
pub use service::MovieSearch;
pub use shaper::{shape, shape_suggestions, Paging, SUGGESTION_LIMIT};

use serde::{Deserialize, Serialize};

/// A catalog record as held by the record store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
    pub plot: Option<String>,
    pub poster: Option<String>,
    #[serde(rename = "runtime")]
    pub runtime_minutes: Option<u32>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl Movie {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_plot(mut self, plot: impl Into<String>) -> Self {
        self.plot = Some(plot.into());
        self
    }

    pub fn with_runtime(mut self, minutes: u32) -> Self {
        self.runtime_minutes = Some(minutes);
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_genres(mut self, genres: &[&str]) -> Self {
        self.genres = genres.iter().map(|g| g.to_string()).collect();
        self
    }

    /// Attach an engine relevance score
    pub fn ranked(self, score: f64) -> RankedRecord {
        RankedRecord {
            id: self.id,
            title: self.title,
            year: self.year,
            plot: self.plot,
            poster: self.poster,
            runtime_minutes: self.runtime_minutes,
            rating: self.rating,
            genres: self.genres,
            relevance_score: score,
        }
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

/// A matched record with the score the engine assigned it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRecord {
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
    pub plot: Option<String>,
    pub poster: Option<String>,
    #[serde(rename = "runtime")]
    pub runtime_minutes: Option<u32>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(rename = "score")]
    pub relevance_score: f64,
}

/// Pagination metadata of a search response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

/// Response envelope for standard and title-weighted search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Top-ranked record, first page only
    pub best_match: Option<RankedRecord>,
    /// Remaining records in engine order
    pub movies: Vec<RankedRecord>,
    pub pagination: Pagination,
}

impl SearchResult {
    /// Records on this page, best match included
    pub fn len(&self) -> usize {
        self.movies.len() + usize::from(self.best_match.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One autocomplete suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub score: f64,
}
