//! Movie search service
//!
//! Runs the builder, dispatcher and shaper for each request. Holds no state
//! between requests beyond the injected engine and its defaults.

use std::sync::Arc;
use std::time::Instant;

use super::{shape, shape_suggestions, Dispatcher, Paging, SearchResult, Suggestion};
use crate::config::{SearchConfig, SearchMode};
use crate::engine::SearchEngine;
use crate::error::SearchError;
use crate::events::{SearchEvent, EVENT_TARGET};
use crate::query::{QueryBuilder, SearchDescriptor, SearchRequest, AUTOCOMPLETE_CANDIDATES};

/// Entry point for standard, title-weighted and autocomplete search
#[derive(Debug, Clone)]
pub struct MovieSearch {
    engine: Arc<dyn SearchEngine>,
    builder: QueryBuilder,
    config: SearchConfig,
}

impl MovieSearch {
    /// Create a service over `engine` with default settings
    pub fn new(engine: Arc<dyn SearchEngine>) -> Self {
        Self::with_config(engine, SearchConfig::default())
    }

    /// Create a service with explicit defaults
    pub fn with_config(engine: Arc<dyn SearchEngine>, config: SearchConfig) -> Self {
        Self {
            engine,
            builder: QueryBuilder::new().with_default_title_weight(config.default_title_weight),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Fuzzy title/plot search with filters
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResult, SearchError> {
        self.search_paged(request, SearchMode::Standard).await
    }

    /// Title/plot search with a boosted title clause
    pub async fn search_title_weighted(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResult, SearchError> {
        self.search_paged(request, SearchMode::TitleWeighted).await
    }

    /// Up to ten title suggestions for `prefix`
    pub async fn autocomplete(&self, prefix: &str) -> Result<Vec<Suggestion>, SearchError> {
        let started = Instant::now();
        let mode = SearchMode::Autocomplete;
        tracing::info!(
            target: EVENT_TARGET,
            event = SearchEvent::RequestReceived.name(),
            mode = %mode,
            query = prefix,
            "search request received"
        );

        let descriptor = self.builder.build_autocomplete(prefix);
        descriptor_built(mode, &descriptor);

        if descriptor.is_blank() {
            return Ok(Vec::new());
        }

        let batch = Dispatcher::new(self.engine.as_ref())
            .dispatch(&descriptor, 0, AUTOCOMPLETE_CANDIDATES as u64)
            .await
            .map_err(|err| failed(mode, err))?;

        let suggestions = shape_suggestions(batch.records);
        tracing::info!(
            target: EVENT_TARGET,
            event = SearchEvent::ResultShaped.name(),
            mode = %mode,
            total = batch.total,
            returned = suggestions.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "suggestions shaped"
        );
        Ok(suggestions)
    }

    async fn search_paged(
        &self,
        request: &SearchRequest,
        mode: SearchMode,
    ) -> Result<SearchResult, SearchError> {
        let started = Instant::now();
        let requested_page = request.page.unwrap_or(1);
        let requested_limit = request
            .limit
            .unwrap_or_else(|| i64::try_from(self.config.default_limit).unwrap_or(i64::MAX));
        tracing::info!(
            target: EVENT_TARGET,
            event = SearchEvent::RequestReceived.name(),
            mode = %mode,
            query = request.query_text.as_str(),
            page = requested_page,
            limit = requested_limit,
            "search request received"
        );

        let descriptor = self
            .builder
            .build(request, mode)
            .map_err(|err| failed(mode, err))?;
        descriptor_built(mode, &descriptor);

        let paging = Paging::normalize(requested_page, requested_limit);
        let batch = if descriptor.is_blank() {
            Default::default()
        } else {
            Dispatcher::new(self.engine.as_ref())
                .dispatch(&descriptor, paging.skip(), paging.limit)
                .await
                .map_err(|err| failed(mode, err))?
        };

        let result = shape(
            batch.total,
            batch.records,
            requested_page,
            requested_limit,
            mode.distinguishes_best_match(),
        );
        tracing::info!(
            target: EVENT_TARGET,
            event = SearchEvent::ResultShaped.name(),
            mode = %mode,
            total = result.pagination.total,
            page = result.pagination.page,
            pages = result.pagination.pages,
            returned = result.len(),
            best_match = result.best_match.as_ref().map(|r| r.title.as_str()),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search result shaped"
        );
        Ok(result)
    }
}

fn descriptor_built(mode: SearchMode, descriptor: &SearchDescriptor) {
    tracing::debug!(
        target: EVENT_TARGET,
        event = SearchEvent::DescriptorBuilt.name(),
        mode = %mode,
        index = descriptor.index(),
        blank = descriptor.is_blank(),
        "search descriptor built"
    );
}

fn failed(mode: SearchMode, err: SearchError) -> SearchError {
    tracing::warn!(
        target: EVENT_TARGET,
        event = SearchEvent::SearchFailed.name(),
        mode = %mode,
        validation = err.is_validation(),
        error = %err,
        "search failed"
    );
    err
}
