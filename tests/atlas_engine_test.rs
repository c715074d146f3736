//! Data API engine tests
//!
//! Drives the HTTP engine client against a mock data API:
//! 1. Request shape (action path, api-key header, namespace, pipeline)
//! 2. Facet and autocomplete response parsing
//! 3. Record lookup and count
//! 4. Failure mapping to the generic unavailable error

use std::sync::Arc;
use std::time::Duration;

use cinesearch::config::app_config::{AppConfig, Environment};
use cinesearch::engine::{AtlasDataApi, EngineError, RecordStore};
use cinesearch::error::UNAVAILABLE_MESSAGE;
use cinesearch::{Filters, MovieSearch, SearchError, SearchRequest};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine_for(server: &MockServer) -> AtlasDataApi {
    AtlasDataApi::new(server.uri())
        .with_api_key("test-api-key")
        .with_timeout(Duration::from_secs(5))
}

fn facet_response(total: u64, data: serde_json::Value) -> ResponseTemplate {
    // The engine's $count stage emits nothing when there are no matches
    let metadata = if total == 0 {
        json!([])
    } else {
        json!([{ "total": total }])
    };
    ResponseTemplate::new(200).set_body_json(json!({
        "documents": [{ "metadata": metadata, "data": data }]
    }))
}

// =============================================================================
// Client Initialization Tests
// =============================================================================

#[test]
fn test_from_config_uses_configured_endpoint() {
    let config = AppConfig::default().with_engine_url("http://engine.local:9000/");
    let api = AtlasDataApi::from_config(&config);
    assert_eq!(api.endpoint(), "http://engine.local:9000");
    assert_eq!(api.database(), "sample_mflix");
}

#[test]
fn test_from_config_test_environment() {
    let config = AppConfig::default().with_environment(Environment::Test);
    let api = AtlasDataApi::from_config(&config);
    assert_eq!(api.database(), "sample_mflix_test");
}

// =============================================================================
// Search Tests
// =============================================================================

#[tokio::test]
async fn test_standard_search_request_and_shaping() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/aggregate"))
        .and(header("api-key", "test-api-key"))
        .and(body_partial_json(json!({
            "dataSource": "Cluster0",
            "database": "sample_mflix",
            "collection": "movies",
        })))
        .respond_with(facet_response(
            2,
            json!([
                { "_id": { "$oid": "573a1397f29313caabce68f6" }, "title": "Star Wars", "year": 1977, "score": 4.2 },
                { "_id": { "$oid": "573a1398f29313caabceb0b5" }, "title": "Star Trek", "year": 2009, "score": 3.1 },
            ]),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let search = MovieSearch::new(Arc::new(engine_for(&server)));
    let result = search.search(&SearchRequest::new("star")).await.unwrap();

    let best = result.best_match.as_ref().unwrap();
    assert_eq!(best.title, "Star Wars");
    assert_eq!(best.id, "573a1397f29313caabce68f6");
    assert_eq!(result.movies.len(), 1);
    assert_eq!(result.movies[0].title, "Star Trek");
    assert_eq!(result.pagination.total, 2);
    assert_eq!(result.pagination.page, 1);
    assert_eq!(result.pagination.pages, 1);
}

#[tokio::test]
async fn test_standard_search_sends_filters_and_paging() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/aggregate"))
        .and(body_partial_json(json!({
            "pipeline": [
                {
                    "$search": {
                        "index": "movies",
                        "compound": {
                            "must": [{ "text": { "query": "star", "path": ["title", "plot"] } }],
                            "filter": [
                                { "range": { "path": "runtime", "lte": 130.0 } },
                                { "range": { "path": "imdb.rating", "gte": 7.0 } },
                            ],
                        }
                    }
                },
                { "$match": { "genres": "Action" } },
                { "$facet": { "data": [{ "$skip": 10 }, { "$limit": 5 }] } },
            ]
        })))
        .respond_with(facet_response(
            11,
            json!([{ "_id": "x", "title": "Star Wars", "score": 1.0 }]),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let search = MovieSearch::new(Arc::new(engine_for(&server)));
    let request = SearchRequest::new("star")
        .with_filters(
            Filters::new()
                .with_max_runtime(130.0)
                .with_min_rating(7.0)
                .with_genre("Action"),
        )
        .with_page(3)
        .with_limit(5);
    let result = search.search(&request).await.unwrap();

    // Page 3 never distinguishes a best match
    assert!(result.best_match.is_none());
    assert_eq!(result.movies.len(), 1);
    assert_eq!(result.pagination.total, 11);
    assert_eq!(result.pagination.page, 3);
    assert_eq!(result.pagination.pages, 3);
}

#[tokio::test]
async fn test_empty_facet_yields_zero_total() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/aggregate"))
        .respond_with(facet_response(0, json!([])))
        .mount(&server)
        .await;

    let search = MovieSearch::new(Arc::new(engine_for(&server)));
    let result = search.search(&SearchRequest::new("zzzzqqq")).await.unwrap();

    assert!(result.best_match.is_none());
    assert!(result.movies.is_empty());
    assert_eq!(result.pagination.total, 0);
    assert_eq!(result.pagination.pages, 0);
}

#[tokio::test]
async fn test_title_weighted_sends_boost() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/aggregate"))
        .and(body_partial_json(json!({
            "pipeline": [{
                "$search": {
                    "index": "movies_title_weight",
                    "compound": {
                        "should": [
                            { "text": { "query": "star", "path": "title", "score": { "boost": { "value": 5.0 } } } },
                            { "text": { "query": "star", "path": "plot" } },
                        ],
                        "minimumShouldMatch": 1,
                    }
                }
            }]
        })))
        .respond_with(facet_response(
            1,
            json!([{ "_id": "1", "title": "Star Wars", "score": 9.0 }]),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let search = MovieSearch::new(Arc::new(engine_for(&server)));
    let request = SearchRequest::new("star").with_title_weight("5");
    let result = search.search_title_weighted(&request).await.unwrap();

    assert_eq!(result.best_match.unwrap().title, "Star Wars");
    assert!(result.movies.is_empty());
}

#[tokio::test]
async fn test_invalid_title_weight_never_reaches_engine() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let search = MovieSearch::new(Arc::new(engine_for(&server)));
    let request = SearchRequest::new("star").with_title_weight("abc");
    let err = search.search_title_weighted(&request).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(err.status_code(), 400);
    assert_eq!(
        err.to_error_body(Environment::Production).error,
        "Title weight must be a number"
    );
}

#[tokio::test]
async fn test_autocomplete_parses_documents() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/aggregate"))
        .and(body_partial_json(json!({
            "pipeline": [
                {
                    "$search": {
                        "index": "movies_autocomplete",
                        "autocomplete": { "query": "sta", "path": "title" }
                    }
                },
                { "$limit": 30 },
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                { "_id": "1", "title": "Star Wars", "score": 2.5 },
                { "_id": "2", "title": "Stardust", "score": 1.5 },
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let search = MovieSearch::new(Arc::new(engine_for(&server)));
    let suggestions = search.autocomplete("sta").await.unwrap();

    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].title, "Star Wars");
    assert!(suggestions[0].score >= suggestions[1].score);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[tokio::test]
async fn test_server_error_maps_to_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/aggregate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("cluster paused"))
        .mount(&server)
        .await;

    let search = MovieSearch::new(Arc::new(engine_for(&server)));
    let err = search.search(&SearchRequest::new("star")).await.unwrap_err();

    assert!(matches!(
        err,
        SearchError::EngineUnavailable(EngineError::Api { status: 500, .. })
    ));
    assert_eq!(err.status_code(), 500);

    let production = err.to_error_body(Environment::Production);
    assert_eq!(production.error, UNAVAILABLE_MESSAGE);
    assert!(production.details.is_none());

    let development = err.to_error_body(Environment::Development);
    assert_eq!(development.error, UNAVAILABLE_MESSAGE);
    assert!(development.details.unwrap().contains("cluster paused"));
}

#[tokio::test]
async fn test_malformed_response_maps_to_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/aggregate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let search = MovieSearch::new(Arc::new(engine_for(&server)));
    let err = search.search(&SearchRequest::new("star")).await.unwrap_err();

    assert!(matches!(
        err,
        SearchError::EngineUnavailable(EngineError::Parse(_))
    ));
}

#[tokio::test]
async fn test_unreachable_engine_maps_to_unavailable() {
    let api = AtlasDataApi::new("http://127.0.0.1:9").with_timeout(Duration::from_secs(2));
    let search = MovieSearch::new(Arc::new(api));

    let err = search.search(&SearchRequest::new("star")).await.unwrap_err();
    assert!(!err.is_validation());
    assert_eq!(err.status_code(), 500);
}

// =============================================================================
// Record Store Tests
// =============================================================================

#[tokio::test]
async fn test_find_by_object_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .and(body_partial_json(json!({
            "filter": { "_id": { "$oid": "573a1397f29313caabce68f6" } },
            "collection": "movies",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "document": {
                "_id": { "$oid": "573a1397f29313caabce68f6" },
                "title": "Star Wars",
                "year": 1977,
                "runtime": 121,
                "imdb": { "rating": 8.6 },
                "genres": ["Action", "Adventure", "Fantasy"]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let movie = engine_for(&server)
        .find_by_id("573a1397f29313caabce68f6")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(movie.title, "Star Wars");
    assert_eq!(movie.runtime_minutes, Some(121));
    assert_eq!(movie.rating, Some(8.6));
    assert!(movie.has_genre("Fantasy"));
}

#[tokio::test]
async fn test_find_missing_record() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "document": null })))
        .mount(&server)
        .await;

    let movie = engine_for(&server).find_by_id("missing").await.unwrap();
    assert!(movie.is_none());
}

#[tokio::test]
async fn test_count() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/aggregate"))
        .and(body_partial_json(json!({ "pipeline": [{ "$count": "total" }] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{ "total": 23539 }]
        })))
        .mount(&server)
        .await;

    assert_eq!(engine_for(&server).count().await.unwrap(), 23539);
}
