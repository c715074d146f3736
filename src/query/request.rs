//! Incoming search request

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::filters::Filters;

/// A parsed search request as handed over by the transport layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Free-text query; may be empty
    #[serde(default, alias = "query")]
    pub query_text: String,
    /// Standard-search filters
    #[serde(default)]
    pub filters: Filters,
    /// Title boost for title-weighted search, number or numeric string
    #[serde(default)]
    pub title_weight: Option<Value>,
    /// 1-based page; coerced to at least 1
    #[serde(default)]
    pub page: Option<i64>,
    /// Page size; coerced to at least 1
    #[serde(default)]
    pub limit: Option<i64>,
}

impl SearchRequest {
    pub fn new(query_text: impl Into<String>) -> Self {
        Self {
            query_text: query_text.into(),
            ..Self::default()
        }
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_title_weight(mut self, weight: impl Into<Value>) -> Self {
        self.title_weight = Some(weight.into());
        self
    }

    pub fn with_page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}
