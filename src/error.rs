//! Search error taxonomy
//!
//! Two failure kinds reach callers: validation failures, raised before any
//! engine call, and engine failures. An empty result is never an error.

use serde::Serialize;
use thiserror::Error;

use crate::config::Environment;
use crate::engine::EngineError;

/// Message shown to users for any engine-side failure
pub const UNAVAILABLE_MESSAGE: &str = "Search is currently unavailable";

/// Errors returned by the search service
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request was rejected before reaching the engine
    #[error("{message}")]
    Validation { message: String },

    /// The engine could not be reached or failed to answer
    #[error("search engine unavailable: {0}")]
    EngineUnavailable(#[from] EngineError),
}

/// User-facing error payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl SearchError {
    pub fn validation(message: impl Into<String>) -> Self {
        SearchError::Validation {
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SearchError::Validation { .. })
    }

    /// HTTP-style status for the transport layer
    pub fn status_code(&self) -> u16 {
        match self {
            SearchError::Validation { .. } => 400,
            SearchError::EngineUnavailable(_) => 500,
        }
    }

    /// Payload for the caller; engine detail only in development
    pub fn to_error_body(&self, environment: Environment) -> ErrorBody {
        match self {
            SearchError::Validation { message } => ErrorBody {
                error: message.clone(),
                details: None,
            },
            SearchError::EngineUnavailable(source) => ErrorBody {
                error: UNAVAILABLE_MESSAGE.to_string(),
                details: environment
                    .is_development()
                    .then(|| source.to_string()),
            },
        }
    }
}
