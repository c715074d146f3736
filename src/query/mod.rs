//! Query module
//!
//! Request types, filters, and the builder that turns a request into an
//! engine-agnostic search descriptor.

mod builder;
mod descriptor;
mod filters;
mod request;

pub use builder::{parse_title_weight, QueryBuilder, AUTOCOMPLETE_CANDIDATES};
pub use descriptor::{
    AutocompleteClause, AutocompleteProbe, Field, FuzzyTolerance, RangeClause, SearchDescriptor,
    StandardSearch, TextClause, TitleWeightedSearch,
};
pub use filters::{parse_year, rating_clause, runtime_clause, year_clause, Filters, ALL_GENRES};
pub use request::SearchRequest;
