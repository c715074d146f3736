//! Search configuration structures
//!
//! Defines the search modes and the per-service defaults applied to requests.

use serde::{Deserialize, Serialize};

/// Default page size when a request carries no limit
pub const DEFAULT_LIMIT: u64 = 30;

/// Default boost applied to title matches in title-weighted search
pub const DEFAULT_TITLE_WEIGHT: f64 = 3.0;

/// Search mode enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    /// Fuzzy text search over title and plot with optional filters
    #[default]
    Standard,
    /// Title and plot search with a boosted title clause
    TitleWeighted,
    /// Prefix probe over titles for type-ahead suggestions
    Autocomplete,
}

impl SearchMode {
    /// Stable name used in logs and events
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Standard => "standard",
            SearchMode::TitleWeighted => "title-weighted",
            SearchMode::Autocomplete => "autocomplete",
        }
    }

    /// Whether results in this mode carry a distinguished best match
    pub fn distinguishes_best_match(&self) -> bool {
        !matches!(self, SearchMode::Autocomplete)
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Page size used when the request has none
    pub default_limit: u64,
    /// Title boost used when a title-weighted request has none
    pub default_title_weight: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            default_title_weight: DEFAULT_TITLE_WEIGHT,
        }
    }
}

impl SearchConfig {
    /// Create a new search configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default page size
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    /// Set the default title boost
    pub fn with_default_title_weight(mut self, weight: f64) -> Self {
        self.default_title_weight = weight;
        self
    }
}
