//! Query descriptor builder
//!
//! Turns a [`SearchRequest`] into a [`SearchDescriptor`]. Performs no I/O;
//! the only failure is an invalid title weight.

use serde_json::Value;

use super::descriptor::{
    AutocompleteClause, AutocompleteProbe, Field, FuzzyTolerance, SearchDescriptor,
    StandardSearch, TextClause, TitleWeightedSearch,
};
use super::request::SearchRequest;
use crate::config::{SearchMode, DEFAULT_TITLE_WEIGHT};
use crate::error::SearchError;
use crate::indexes::{AUTOCOMPLETE_INDEX, MAX_GRAMS, MIN_GRAMS, MOVIES_INDEX, TITLE_WEIGHT_INDEX};

/// Most candidates an autocomplete probe asks the engine for
pub const AUTOCOMPLETE_CANDIDATES: usize = 30;

/// Builds search descriptors from requests
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    default_title_weight: f64,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self {
            default_title_weight: DEFAULT_TITLE_WEIGHT,
        }
    }

    /// Use a different boost when the request carries no title weight
    pub fn with_default_title_weight(mut self, weight: f64) -> Self {
        self.default_title_weight = weight;
        self
    }

    /// Build the descriptor for `mode`
    pub fn build(
        &self,
        request: &SearchRequest,
        mode: SearchMode,
    ) -> Result<SearchDescriptor, SearchError> {
        match mode {
            SearchMode::Standard => Ok(self.build_standard(request)),
            SearchMode::TitleWeighted => self.build_title_weighted(request),
            SearchMode::Autocomplete => Ok(self.build_autocomplete(&request.query_text)),
        }
    }

    /// Fuzzy match over title and plot, with compiled filters
    pub fn build_standard(&self, request: &SearchRequest) -> SearchDescriptor {
        SearchDescriptor::Standard(StandardSearch {
            index: MOVIES_INDEX,
            text: TextClause {
                query: request.query_text.clone(),
                paths: vec![Field::Title, Field::Plot],
                fuzzy: Some(FuzzyTolerance::STANDARD),
                boost: None,
            },
            filters: request.filters.compile(),
            genre: request.filters.genre_filter().map(str::to_string),
        })
    }

    /// Boosted title clause plus default-weight plot clause
    pub fn build_title_weighted(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchDescriptor, SearchError> {
        let weight = parse_title_weight(request.title_weight.as_ref(), self.default_title_weight)?;

        Ok(SearchDescriptor::TitleWeighted(TitleWeightedSearch {
            index: TITLE_WEIGHT_INDEX,
            title: TextClause {
                query: request.query_text.clone(),
                paths: vec![Field::Title],
                fuzzy: None,
                boost: Some(weight),
            },
            plot: TextClause {
                query: request.query_text.clone(),
                paths: vec![Field::Plot],
                fuzzy: None,
                boost: None,
            },
            minimum_should_match: 1,
        }))
    }

    /// Title prefix probe
    pub fn build_autocomplete(&self, prefix: &str) -> SearchDescriptor {
        SearchDescriptor::Autocomplete(AutocompleteProbe {
            index: AUTOCOMPLETE_INDEX,
            clause: AutocompleteClause {
                query: prefix.to_string(),
                path: Field::Title,
                fuzzy: FuzzyTolerance::STANDARD,
                min_grams: MIN_GRAMS,
                max_grams: MAX_GRAMS,
            },
            candidate_cap: AUTOCOMPLETE_CANDIDATES,
        })
    }
}

/// Resolve a raw title weight: absent or null gives `default`, numbers and
/// numeric strings must be finite, anything else is a validation failure.
pub fn parse_title_weight(raw: Option<&Value>, default: f64) -> Result<f64, SearchError> {
    let weight = match raw {
        None | Some(Value::Null) => return Ok(default),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    weight
        .filter(|w| w.is_finite())
        .ok_or_else(|| SearchError::validation("Title weight must be a number"))
}
