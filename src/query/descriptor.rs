//! Engine-agnostic search descriptors
//!
//! A descriptor is the full description of one engine request: which index,
//! which match clauses, which filters. Engines translate it into their own
//! wire format.

use serde::Serialize;

use crate::config::SearchMode;

/// Fuzzy matching tolerance for text tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuzzyTolerance {
    /// Maximum edit distance between query and indexed token
    pub max_edits: u8,
    /// Leading characters that must match exactly
    pub prefix_length: u8,
}

impl FuzzyTolerance {
    /// One edit, two-character exact prefix
    pub const STANDARD: FuzzyTolerance = FuzzyTolerance {
        max_edits: 1,
        prefix_length: 2,
    };
}

/// Searchable document fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Plot,
    Genres,
    Year,
    Runtime,
    Rating,
}

impl Field {
    /// Document path of the field in the catalog
    pub fn path(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Plot => "plot",
            Field::Genres => "genres",
            Field::Year => "year",
            Field::Runtime => "runtime",
            Field::Rating => "imdb.rating",
        }
    }
}

/// Full-text match over one or more fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextClause {
    pub query: String,
    pub paths: Vec<Field>,
    pub fuzzy: Option<FuzzyTolerance>,
    /// Score multiplier; `None` means the engine default
    pub boost: Option<f64>,
}

/// Edge n-gram prefix match over an autocomplete field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutocompleteClause {
    pub query: String,
    pub path: Field,
    pub fuzzy: FuzzyTolerance,
    pub min_grams: u8,
    pub max_grams: u8,
}

/// Inclusive numeric range over a field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeClause {
    pub field: Field,
    pub gte: Option<f64>,
    pub lte: Option<f64>,
}

impl RangeClause {
    pub fn at_most(field: Field, value: f64) -> Self {
        Self {
            field,
            gte: None,
            lte: Some(value),
        }
    }

    pub fn at_least(field: Field, value: f64) -> Self {
        Self {
            field,
            gte: Some(value),
            lte: None,
        }
    }

    pub fn between(field: Field, low: f64, high: f64) -> Self {
        Self {
            field,
            gte: Some(low),
            lte: Some(high),
        }
    }

    /// Whether `value` satisfies the range
    pub fn contains(&self, value: f64) -> bool {
        self.gte.map_or(true, |low| value >= low) && self.lte.map_or(true, |high| value <= high)
    }
}

/// Required fuzzy text match plus optional filters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardSearch {
    pub index: &'static str,
    pub text: TextClause,
    pub filters: Vec<RangeClause>,
    /// Exact genre membership applied after the text stage
    pub genre: Option<String>,
}

/// Title and plot clauses of which at least one must match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleWeightedSearch {
    pub index: &'static str,
    pub title: TextClause,
    pub plot: TextClause,
    pub minimum_should_match: u32,
}

/// Title prefix probe for suggestions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutocompleteProbe {
    pub index: &'static str,
    pub clause: AutocompleteClause,
    /// Most candidates the engine may return
    pub candidate_cap: usize,
}

/// One of the three canonical search shapes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SearchDescriptor {
    Standard(StandardSearch),
    TitleWeighted(TitleWeightedSearch),
    Autocomplete(AutocompleteProbe),
}

impl SearchDescriptor {
    pub fn mode(&self) -> SearchMode {
        match self {
            SearchDescriptor::Standard(_) => SearchMode::Standard,
            SearchDescriptor::TitleWeighted(_) => SearchMode::TitleWeighted,
            SearchDescriptor::Autocomplete(_) => SearchMode::Autocomplete,
        }
    }

    /// Name of the engine index the descriptor targets
    pub fn index(&self) -> &'static str {
        match self {
            SearchDescriptor::Standard(search) => search.index,
            SearchDescriptor::TitleWeighted(search) => search.index,
            SearchDescriptor::Autocomplete(probe) => probe.index,
        }
    }

    /// The user's query text as carried by the descriptor
    pub fn query_text(&self) -> &str {
        match self {
            SearchDescriptor::Standard(search) => &search.text.query,
            SearchDescriptor::TitleWeighted(search) => &search.title.query,
            SearchDescriptor::Autocomplete(probe) => &probe.clause.query,
        }
    }

    /// A blank query can match nothing
    pub fn is_blank(&self) -> bool {
        self.query_text().trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains_is_inclusive() {
        let range = RangeClause::between(Field::Year, 1990.0, 1999.0);
        assert!(range.contains(1990.0));
        assert!(range.contains(1999.0));
        assert!(!range.contains(2000.0));
    }

    #[test]
    fn test_open_ranges() {
        assert!(RangeClause::at_most(Field::Runtime, 120.0).contains(-5.0));
        assert!(!RangeClause::at_least(Field::Rating, 7.0).contains(6.9));
    }

    #[test]
    fn test_rating_path_is_nested() {
        assert_eq!(Field::Rating.path(), "imdb.rating");
    }
}
