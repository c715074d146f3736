//! Search engine capability
//!
//! The engine is reached through an injected [`SearchEngine`]. Every dispatch
//! opens its own [`EngineSession`] and releases it before returning, whatever
//! the outcome, including cancellation.

mod atlas;
mod memory;
pub mod pipeline;

pub use atlas::AtlasDataApi;
pub use memory::{MemoryEngine, SessionStats};

use async_trait::async_trait;
use thiserror::Error;

use crate::query::SearchDescriptor;
use crate::search::{Movie, RankedRecord};

/// Engine-side failures
#[derive(Debug, Error)]
pub enum EngineError {
    /// Network error (connection failed, timeout, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// Engine answered with a non-success status
    #[error("Engine error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Failed to parse engine response: {0}")]
    Parse(String),

    /// Engine refused or could not run the request
    #[error("Engine unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::Network(err.to_string())
    }
}

/// One engine request: a descriptor plus the page window
#[derive(Debug, Clone, Copy)]
pub struct EngineQuery<'a> {
    pub descriptor: &'a SearchDescriptor,
    pub skip: u64,
    pub limit: u64,
}

/// Engine answer: total match count and one ranked page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineBatch {
    pub total: u64,
    pub records: Vec<RankedRecord>,
}

/// Connects to an index-backed search engine
#[async_trait]
pub trait SearchEngine: Send + Sync + std::fmt::Debug {
    /// Open a session for a single dispatch
    async fn connect(&self) -> Result<Box<dyn EngineSession>, EngineError>;
}

/// A connection scoped to one dispatch
#[async_trait]
pub trait EngineSession: Send {
    /// Run the query, returning count and page from one match set
    async fn execute(&mut self, query: EngineQuery<'_>) -> Result<EngineBatch, EngineError>;

    /// Release the connection without waiting. Must be idempotent; it also
    /// runs when a dispatch is dropped before `close` is reached.
    fn release(&mut self);

    /// Release the connection at the end of a dispatch
    async fn close(&mut self) {
        self.release();
    }
}

/// Record lookups outside of search
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Movie>, EngineError>;

    async fn count(&self) -> Result<u64, EngineError>;
}
