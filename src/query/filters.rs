//! Optional search filters
//!
//! Each filter field compiles to at most one clause. The clause constructors
//! run in a fixed order so the compiled filter list is deterministic.

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::descriptor::{Field, RangeClause};

/// Genre value meaning "no genre constraint"
pub const ALL_GENRES: &str = "All";

/// Optional constraints on a standard search. Absent means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    /// Longest acceptable runtime in minutes
    #[serde(default, alias = "runtime")]
    pub max_runtime_minutes: Option<f64>,
    /// Lowest acceptable rating
    #[serde(default, alias = "rating")]
    pub min_rating: Option<f64>,
    /// Start of the release window; only the year is used
    #[serde(default)]
    pub start_date: Option<String>,
    /// End of the release window; only the year is used
    #[serde(default)]
    pub end_date: Option<String>,
    /// Exact genre, or "All"
    #[serde(default)]
    pub genre: Option<String>,
}

type ClauseConstructor = fn(&Filters) -> Option<RangeClause>;

const CLAUSE_CONSTRUCTORS: [ClauseConstructor; 3] = [runtime_clause, rating_clause, year_clause];

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_runtime(mut self, minutes: f64) -> Self {
        self.max_runtime_minutes = Some(minutes);
        self
    }

    pub fn with_min_rating(mut self, rating: f64) -> Self {
        self.min_rating = Some(rating);
        self
    }

    pub fn with_dates(mut self, start: &str, end: &str) -> Self {
        self.start_date = Some(start.to_string());
        self.end_date = Some(end.to_string());
        self
    }

    pub fn with_genre(mut self, genre: &str) -> Self {
        self.genre = Some(genre.to_string());
        self
    }

    /// Release-year window, present only when both bounds parse
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let start = parse_year(self.start_date.as_deref()?)?;
        let end = parse_year(self.end_date.as_deref()?)?;
        Some((start, end))
    }

    /// Genre to match exactly, skipping the "All" sentinel
    pub fn genre_filter(&self) -> Option<&str> {
        self.genre
            .as_deref()
            .map(str::trim)
            .filter(|genre| !genre.is_empty() && *genre != ALL_GENRES)
    }

    /// Compile the range clauses in constructor order
    pub fn compile(&self) -> Vec<RangeClause> {
        CLAUSE_CONSTRUCTORS
            .iter()
            .filter_map(|construct| construct(self))
            .collect()
    }
}

/// `runtime <= max_runtime_minutes`
pub fn runtime_clause(filters: &Filters) -> Option<RangeClause> {
    finite(filters.max_runtime_minutes).map(|minutes| RangeClause::at_most(Field::Runtime, minutes))
}

/// `imdb.rating >= min_rating`
pub fn rating_clause(filters: &Filters) -> Option<RangeClause> {
    finite(filters.min_rating).map(|rating| RangeClause::at_least(Field::Rating, rating))
}

/// `start year <= year <= end year`
pub fn year_clause(filters: &Filters) -> Option<RangeClause> {
    filters
        .year_range()
        .map(|(start, end)| RangeClause::between(Field::Year, f64::from(start), f64::from(end)))
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Calendar year of a date given as `YYYY-MM-DD`, RFC 3339 or a bare year
pub fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
        return value.parse().ok();
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.year());
    }

    match DateTime::parse_from_rfc3339(value) {
        Ok(timestamp) => Some(timestamp.year()),
        Err(_) => {
            tracing::warn!("Ignoring unparseable date filter '{}'", value);
            None
        }
    }
}
