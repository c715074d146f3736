//! Search service tests
//!
//! End-to-end runs of builder, dispatcher and shaper over the in-memory
//! engine:
//! 1. Best match and pagination on the first page
//! 2. Empty and non-matching queries
//! 3. Page/limit normalization
//! 4. Filters, title weighting and autocomplete
//! 5. Validation and engine failures

use std::sync::Arc;
use std::time::Duration;

use cinesearch::engine::MemoryEngine;
use cinesearch::search::{Movie, SUGGESTION_LIMIT};
use cinesearch::{Filters, MovieSearch, SearchConfig, SearchError, SearchRequest};

fn demo() -> (MovieSearch, MemoryEngine) {
    let engine = MemoryEngine::new(MemoryEngine::demo_catalog());
    (MovieSearch::new(Arc::new(engine.clone())), engine)
}

fn two_star_catalog() -> MovieSearch {
    let catalog: Vec<Movie> = MemoryEngine::demo_catalog()
        .into_iter()
        .filter(|movie| movie.title == "Star Wars" || movie.title == "Star Trek")
        .collect();
    MovieSearch::new(Arc::new(MemoryEngine::new(catalog)))
}

fn titles(result: &cinesearch::SearchResult) -> Vec<&str> {
    result.movies.iter().map(|r| r.title.as_str()).collect()
}

// =============================================================================
// Standard Search Tests
// =============================================================================

#[tokio::test]
async fn test_best_match_split_on_first_page() {
    let search = two_star_catalog();
    let request = SearchRequest::new("star").with_page(1).with_limit(30);
    let result = search.search(&request).await.unwrap();

    assert_eq!(result.best_match.as_ref().unwrap().title, "Star Wars");
    assert_eq!(titles(&result), vec!["Star Trek"]);
    assert_eq!(result.pagination.total, 2);
    assert_eq!(result.pagination.page, 1);
    assert_eq!(result.pagination.pages, 1);
}

#[tokio::test]
async fn test_later_page_has_no_best_match() {
    let search = two_star_catalog();
    let request = SearchRequest::new("star").with_page(2).with_limit(1);
    let result = search.search(&request).await.unwrap();

    assert!(result.best_match.is_none());
    assert_eq!(titles(&result), vec!["Star Trek"]);
    assert_eq!(result.pagination.total, 2);
    assert_eq!(result.pagination.page, 2);
    assert_eq!(result.pagination.pages, 2);
}

#[tokio::test]
async fn test_engine_order_preserved() {
    let (search, _) = demo();
    let result = search.search(&SearchRequest::new("star")).await.unwrap();

    assert_eq!(result.best_match.as_ref().unwrap().title, "Star Wars");
    assert_eq!(titles(&result), vec!["Star Trek", "Stardust"]);
    assert_eq!(result.pagination.total, 3);

    let scores: Vec<f64> = std::iter::once(result.best_match.as_ref().unwrap())
        .chain(result.movies.iter())
        .map(|r| r.relevance_score)
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_empty_query_is_not_an_error() {
    let (search, _) = demo();
    let result = search.search(&SearchRequest::new("")).await.unwrap();

    assert!(result.best_match.is_none());
    assert!(result.movies.is_empty());
    assert_eq!(result.pagination.total, 0);
    assert_eq!(result.pagination.pages, 0);
}

#[tokio::test]
async fn test_non_matching_query_is_not_an_error() {
    let (search, engine) = demo();
    let result = search.search(&SearchRequest::new("zzzzqqq")).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(result.pagination.total, 0);
    assert_eq!(result.pagination.pages, 0);
    assert_eq!(engine.stats().executed, 1);
}

#[tokio::test]
async fn test_negative_page_and_zero_limit_normalized() {
    let (search, _) = demo();
    let request = SearchRequest::new("star").with_page(-1).with_limit(0);
    let result = search.search(&request).await.unwrap();

    assert_eq!(result.pagination.page, 1);
    assert_eq!(result.len(), 1);
    assert_eq!(result.pagination.pages, result.pagination.total);
}

#[tokio::test]
async fn test_page_past_end_is_empty() {
    let (search, _) = demo();
    let request = SearchRequest::new("star").with_page(9).with_limit(30);
    let result = search.search(&request).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(result.pagination.total, 3);
    assert_eq!(result.pagination.page, 9);
    assert_eq!(result.pagination.pages, 1);
}

// =============================================================================
// Filter Tests
// =============================================================================

#[tokio::test]
async fn test_genre_filter() {
    let (search, _) = demo();
    let request =
        SearchRequest::new("star").with_filters(Filters::new().with_genre("Fantasy"));
    let result = search.search(&request).await.unwrap();

    assert_eq!(result.best_match.as_ref().unwrap().title, "Star Wars");
    assert_eq!(titles(&result), vec!["Stardust"]);
}

#[tokio::test]
async fn test_all_genre_means_no_filter() {
    let (search, _) = demo();
    let request = SearchRequest::new("star").with_filters(Filters::new().with_genre("All"));
    let result = search.search(&request).await.unwrap();

    assert_eq!(result.pagination.total, 3);
}

#[tokio::test]
async fn test_rating_and_runtime_filters() {
    let (search, _) = demo();

    let rated = SearchRequest::new("star").with_filters(Filters::new().with_min_rating(8.0));
    let result = search.search(&rated).await.unwrap();
    assert_eq!(result.pagination.total, 2);
    assert_eq!(titles(&result), vec!["Star Trek"]);

    let short = SearchRequest::new("star").with_filters(Filters::new().with_max_runtime(121.0));
    let result = search.search(&short).await.unwrap();
    assert_eq!(result.pagination.total, 1);
    assert_eq!(result.best_match.unwrap().title, "Star Wars");
}

#[tokio::test]
async fn test_year_range_needs_both_bounds() {
    let (search, _) = demo();

    let seventies = SearchRequest::new("star")
        .with_filters(Filters::new().with_dates("1970-01-01", "1980-12-31"));
    let result = search.search(&seventies).await.unwrap();
    assert_eq!(result.pagination.total, 1);
    assert_eq!(result.best_match.unwrap().title, "Star Wars");

    let open_ended = SearchRequest::new("star").with_filters(Filters {
        start_date: Some("1970-01-01".to_string()),
        ..Filters::default()
    });
    let result = search.search(&open_ended).await.unwrap();
    assert_eq!(result.pagination.total, 3);
}

// =============================================================================
// Title-Weighted Search Tests
// =============================================================================

#[tokio::test]
async fn test_title_weighted_default_weight() {
    let (search, _) = demo();
    let result = search
        .search_title_weighted(&SearchRequest::new("star"))
        .await
        .unwrap();

    let best = result.best_match.as_ref().unwrap();
    assert_eq!(best.title, "Star Wars");
    assert!((best.relevance_score - 3.0).abs() < 1e-9);
    assert_eq!(titles(&result).last(), Some(&"Stardust"));
}

#[tokio::test]
async fn test_title_weighted_numeric_string() {
    let (search, _) = demo();
    let request = SearchRequest::new("star").with_title_weight("5");
    let result = search.search_title_weighted(&request).await.unwrap();

    assert!((result.best_match.unwrap().relevance_score - 5.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_invalid_title_weight_is_validation_error() {
    let (search, engine) = demo();

    for raw in [serde_json::json!("abc"), serde_json::json!(""), serde_json::json!(true)] {
        let request = SearchRequest::new("star").with_title_weight(raw);
        let err = search.search_title_weighted(&request).await.unwrap_err();
        assert!(matches!(err, SearchError::Validation { .. }));
        assert_eq!(err.to_string(), "Title weight must be a number");
    }

    assert_eq!(engine.stats().opened, 0);
}

// =============================================================================
// Autocomplete Tests
// =============================================================================

#[tokio::test]
async fn test_autocomplete_two_record_catalog() {
    let search = two_star_catalog();
    let suggestions = search.autocomplete("sta").await.unwrap();

    let titles: Vec<&str> = suggestions.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Star Wars", "Star Trek"]);
    assert!(suggestions[0].score >= suggestions[1].score);
}

#[tokio::test]
async fn test_autocomplete_caps_suggestions() {
    let catalog: Vec<Movie> = (0..25)
        .map(|i| Movie::new(i.to_string(), format!("Star Story {}", i)))
        .collect();
    let search = MovieSearch::new(Arc::new(MemoryEngine::new(catalog)));

    let suggestions = search.autocomplete("sta").await.unwrap();
    assert_eq!(suggestions.len(), SUGGESTION_LIMIT);
    assert!(suggestions.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn test_autocomplete_tolerates_typo() {
    let (search, _) = demo();
    let suggestions = search.autocomplete("starr").await.unwrap();

    assert!(suggestions.iter().any(|s| s.title == "Star Wars"));
}

// =============================================================================
// Failure and Concurrency Tests
// =============================================================================

#[tokio::test]
async fn test_engine_failure_surfaces_and_releases_session() {
    let engine = MemoryEngine::new(MemoryEngine::demo_catalog()).failing("cluster paused");
    let search = MovieSearch::new(Arc::new(engine.clone()));

    let err = search.search(&SearchRequest::new("star")).await.unwrap_err();
    assert!(matches!(err, SearchError::EngineUnavailable(_)));
    assert_eq!(err.status_code(), 500);

    let err = search.autocomplete("sta").await.unwrap_err();
    assert!(!err.is_validation());

    let stats = engine.stats();
    assert_eq!(stats.opened, 2);
    assert_eq!(stats.closed, 2);
}

#[tokio::test]
async fn test_timed_out_search_releases_session() {
    let engine = MemoryEngine::new(MemoryEngine::demo_catalog())
        .with_latency(Duration::from_secs(5));
    let search = MovieSearch::new(Arc::new(engine.clone()));

    let request = SearchRequest::new("star");
    let outcome = tokio::time::timeout(Duration::from_millis(50), search.search(&request)).await;
    assert!(outcome.is_err());

    let stats = engine.stats();
    assert_eq!(stats.opened, 1);
    assert_eq!(stats.closed, stats.opened);
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let engine = MemoryEngine::new(MemoryEngine::demo_catalog());
    let search = MovieSearch::with_config(
        Arc::new(engine.clone()),
        SearchConfig::new().with_default_limit(2),
    );

    let star = SearchRequest::new("star");
    let crew = SearchRequest::new("crew");
    let (a, b, c) = tokio::join!(
        search.search(&star),
        search.search(&crew),
        search.autocomplete("sta"),
    );

    assert_eq!(a.unwrap().pagination.total, 3);
    assert_eq!(b.unwrap().pagination.total, 2);
    assert_eq!(c.unwrap().len(), 4);

    let stats = engine.stats();
    assert_eq!(stats.opened, 3);
    assert_eq!(stats.closed, 3);
}
