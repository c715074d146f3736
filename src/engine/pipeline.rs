//! Aggregation pipeline rendering
//!
//! Translates descriptors into `$search` aggregation pipelines. Paged modes
//! use a `$facet` so the count and the page come from the same match set.

use serde_json::{json, Map, Value};

use crate::query::{
    AutocompleteProbe, FuzzyTolerance, RangeClause, SearchDescriptor, StandardSearch, TextClause,
    TitleWeightedSearch,
};

/// Pipeline for one engine query
pub fn render(descriptor: &SearchDescriptor, skip: u64, limit: u64) -> Vec<Value> {
    match descriptor {
        SearchDescriptor::Standard(search) => standard(search, skip, limit),
        SearchDescriptor::TitleWeighted(search) => title_weighted(search, skip, limit),
        SearchDescriptor::Autocomplete(probe) => autocomplete(probe),
    }
}

/// Pipeline counting every document in the collection
pub fn count_all() -> Vec<Value> {
    vec![json!({ "$count": "total" })]
}

fn standard(search: &StandardSearch, skip: u64, limit: u64) -> Vec<Value> {
    let filters: Vec<Value> = search.filters.iter().map(range).collect();

    let mut stages = vec![json!({
        "$search": {
            "index": search.index,
            "compound": {
                "must": [text(&search.text)],
                "filter": filters,
            }
        }
    })];

    if let Some(genre) = &search.genre {
        stages.push(json!({ "$match": { "genres": genre } }));
    }

    stages.push(facet(skip, limit));
    stages
}

fn title_weighted(search: &TitleWeightedSearch, skip: u64, limit: u64) -> Vec<Value> {
    vec![
        json!({
            "$search": {
                "index": search.index,
                "compound": {
                    "should": [text(&search.title), text(&search.plot)],
                    "minimumShouldMatch": search.minimum_should_match,
                }
            }
        }),
        facet(skip, limit),
    ]
}

fn autocomplete(probe: &AutocompleteProbe) -> Vec<Value> {
    vec![
        json!({
            "$search": {
                "index": probe.index,
                "autocomplete": {
                    "query": probe.clause.query,
                    "path": probe.clause.path.path(),
                    "fuzzy": fuzzy(probe.clause.fuzzy),
                }
            }
        }),
        json!({ "$limit": probe.candidate_cap }),
        json!({
            "$project": {
                "_id": 1,
                "title": 1,
                "score": { "$meta": "searchScore" },
            }
        }),
    ]
}

fn text(clause: &TextClause) -> Value {
    let mut body = Map::new();
    body.insert("query".to_string(), json!(clause.query));

    let path = match clause.paths.as_slice() {
        [single] => json!(single.path()),
        many => json!(many.iter().map(|field| field.path()).collect::<Vec<_>>()),
    };
    body.insert("path".to_string(), path);

    if let Some(tolerance) = clause.fuzzy {
        body.insert("fuzzy".to_string(), fuzzy(tolerance));
    }
    if let Some(boost) = clause.boost {
        body.insert("score".to_string(), json!({ "boost": { "value": boost } }));
    }

    json!({ "text": body })
}

fn fuzzy(tolerance: FuzzyTolerance) -> Value {
    json!({
        "maxEdits": tolerance.max_edits,
        "prefixLength": tolerance.prefix_length,
    })
}

fn range(clause: &RangeClause) -> Value {
    let mut body = Map::new();
    body.insert("path".to_string(), json!(clause.field.path()));
    if let Some(low) = clause.gte {
        body.insert("gte".to_string(), json!(low));
    }
    if let Some(high) = clause.lte {
        body.insert("lte".to_string(), json!(high));
    }
    json!({ "range": body })
}

fn facet(skip: u64, limit: u64) -> Value {
    json!({
        "$facet": {
            "metadata": [{ "$count": "total" }],
            "data": [
                { "$skip": skip },
                { "$limit": limit },
                {
                    "$project": {
                        "_id": 1,
                        "title": 1,
                        "year": 1,
                        "plot": 1,
                        "poster": 1,
                        "runtime": 1,
                        "imdb.rating": 1,
                        "genres": 1,
                        "score": { "$meta": "searchScore" },
                    }
                }
            ]
        }
    })
}
