//! cinesearch: Movie catalog search orchestration
//!
//! This library turns free-text movie queries into structured requests for
//! an index-backed full-text engine and shapes the ranked matches into
//! paginated responses.
//!
//! # Features
//!
//! - Fuzzy title/plot search with runtime, rating, year and genre filters
//! - Title-weighted search with a caller-chosen title boost
//! - Title autocomplete over edge n-grams
//! - Count and page computed from one engine round trip
//!
//! # Modules
//!
//! - `config`: Application configuration, search modes and defaults
//! - `query`: Requests, filters and the descriptor builder
//! - `engine`: Engine capability, HTTP data API client, in-memory engine
//! - `search`: Dispatcher, result shaper and the search service
//! - `indexes`: Index definitions the engine must provide
//! - `events`: Structured lifecycle events
//! - `error`: Error taxonomy and user-facing error bodies

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod indexes;
pub mod query;
pub mod search;

// Re-export commonly used types
pub use config::{AppConfig, SearchConfig, SearchMode};
pub use error::SearchError;
pub use query::{Filters, SearchRequest};
pub use search::{MovieSearch, RankedRecord, SearchResult, Suggestion};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
