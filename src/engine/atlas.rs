//! Atlas-style data API engine client
//!
//! Talks to the engine over HTTP:
//! - `POST {endpoint}/action/aggregate` for searches and counts
//! - `POST {endpoint}/action/findOne` for record lookups
//!
//! Each session builds its own HTTP client, so no connection outlives the
//! dispatch that opened it.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::{pipeline, EngineBatch, EngineError, EngineQuery, EngineSession, RecordStore, SearchEngine};
use crate::config::AppConfig;
use crate::query::SearchDescriptor;
use crate::search::{Movie, RankedRecord};

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct AggregateResponse {
    #[serde(default)]
    documents: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct FindOneResponse {
    #[serde(default)]
    document: Option<MovieDocument>,
}

#[derive(Debug, Default, Deserialize)]
struct FacetDocument {
    #[serde(default)]
    metadata: Vec<CountRow>,
    #[serde(default)]
    data: Vec<MovieDocument>,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

#[derive(Debug, Deserialize)]
struct MovieDocument {
    #[serde(rename = "_id", default)]
    id: Value,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    year: Option<Value>,
    #[serde(default)]
    plot: Option<String>,
    #[serde(default)]
    poster: Option<String>,
    #[serde(default)]
    runtime: Option<Value>,
    #[serde(default)]
    imdb: Option<ImdbDocument>,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ImdbDocument {
    #[serde(default)]
    rating: Option<Value>,
}

impl MovieDocument {
    fn into_movie(self) -> Movie {
        Movie {
            id: object_id(&self.id),
            title: self.title.unwrap_or_default(),
            year: self.year.as_ref().and_then(number).map(|y| y as i32),
            plot: self.plot,
            poster: self.poster,
            runtime_minutes: self
                .runtime
                .as_ref()
                .and_then(number)
                .filter(|m| *m >= 0.0)
                .map(|m| m as u32),
            rating: self.imdb.and_then(|imdb| imdb.rating.as_ref().and_then(number)),
            genres: self.genres,
        }
    }

    fn into_ranked(self) -> RankedRecord {
        let score = self.score.unwrap_or_default();
        self.into_movie().ranked(score)
    }
}

/// Plain or extended-JSON id (`{"$oid": ...}`) as a string
fn object_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("$oid")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Lenient numeric read: numbers, numeric strings, extended-JSON numbers,
/// and strings with trailing junk such as `"1995è"`.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            digits.parse().ok()
        }
        Value::Object(map) => ["$numberInt", "$numberLong", "$numberDouble"]
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(number),
        _ => None,
    }
}

/// Id filter for findOne: 24-hex ids are object ids
fn id_filter(id: &str) -> Value {
    if id.len() == 24 && id.bytes().all(|b| b.is_ascii_hexdigit()) {
        json!({ "_id": { "$oid": id } })
    } else {
        json!({ "_id": id })
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Data API client for an Atlas Search deployment
#[derive(Debug, Clone)]
pub struct AtlasDataApi {
    endpoint: String,
    api_key: Option<String>,
    data_source: String,
    database: String,
    collection: String,
    timeout: Duration,
}

impl AtlasDataApi {
    /// Create a client for `endpoint` with default catalog coordinates
    pub fn new(endpoint: impl Into<String>) -> Self {
        let defaults = AppConfig::default();
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: None,
            data_source: defaults.data_source().to_string(),
            database: defaults.database().to_string(),
            collection: defaults.collection().to_string(),
            timeout: defaults.request_timeout(),
        }
    }

    /// Create a client from application configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            endpoint: config.engine_url().trim_end_matches('/').to_string(),
            api_key: config.api_key(),
            data_source: config.data_source().to_string(),
            database: config.database().to_string(),
            collection: config.collection().to_string(),
            timeout: config.request_timeout(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    fn open(&self) -> Result<AtlasSession, EngineError> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        Ok(AtlasSession {
            client: Some(client),
            api: self.clone(),
        })
    }

    fn namespace(&self) -> Value {
        json!({
            "dataSource": self.data_source,
            "database": self.database,
            "collection": self.collection,
        })
    }
}

#[async_trait]
impl SearchEngine for AtlasDataApi {
    async fn connect(&self) -> Result<Box<dyn EngineSession>, EngineError> {
        let session = self.open()?;
        tracing::debug!("Opened engine session to {}", self.endpoint);
        Ok(Box::new(session))
    }
}

#[async_trait]
impl RecordStore for AtlasDataApi {
    async fn find_by_id(&self, id: &str) -> Result<Option<Movie>, EngineError> {
        let mut session = self.open()?;
        let outcome = session.find_one(id).await;
        session.close().await;
        outcome
    }

    async fn count(&self) -> Result<u64, EngineError> {
        let mut session = self.open()?;
        let outcome = session.aggregate(pipeline::count_all()).await;
        session.close().await;

        let documents = outcome?;
        match documents.into_iter().next() {
            Some(row) => {
                let row: CountRow =
                    serde_json::from_value(row).map_err(|e| EngineError::Parse(e.to_string()))?;
                Ok(row.total)
            }
            None => Ok(0),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

struct AtlasSession {
    client: Option<reqwest::Client>,
    api: AtlasDataApi,
}

impl AtlasSession {
    fn client(&self) -> Result<&reqwest::Client, EngineError> {
        self.client
            .as_ref()
            .ok_or_else(|| EngineError::Unavailable("session already closed".to_string()))
    }

    async fn post(&self, action: &str, mut body: Value) -> Result<String, EngineError> {
        if let (Some(target), Value::Object(namespace)) = (body.as_object_mut(), self.api.namespace()) {
            target.extend(namespace);
        }

        let url = format!("{}/action/{}", self.api.endpoint, action);
        let mut request = self
            .client()?
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&body);
        if let Some(api_key) = &self.api.api_key {
            request = request.header("api-key", api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(EngineError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        Ok(text)
    }

    async fn aggregate(&self, pipeline: Vec<Value>) -> Result<Vec<Value>, EngineError> {
        let text = self.post("aggregate", json!({ "pipeline": pipeline })).await?;
        let response: AggregateResponse = serde_json::from_str(&text)
            .map_err(|e| EngineError::Parse(format!("{}: {}", e, text)))?;
        Ok(response.documents)
    }

    async fn find_one(&self, id: &str) -> Result<Option<Movie>, EngineError> {
        let text = self.post("findOne", json!({ "filter": id_filter(id) })).await?;
        let response: FindOneResponse = serde_json::from_str(&text)
            .map_err(|e| EngineError::Parse(format!("{}: {}", e, text)))?;
        Ok(response.document.map(MovieDocument::into_movie))
    }
}

#[async_trait]
impl EngineSession for AtlasSession {
    async fn execute(&mut self, query: EngineQuery<'_>) -> Result<EngineBatch, EngineError> {
        let stages = pipeline::render(query.descriptor, query.skip, query.limit);
        tracing::debug!(
            "Aggregation pipeline: {}",
            serde_json::to_string(&stages).unwrap_or_default()
        );
        let documents = self.aggregate(stages).await?;

        match query.descriptor {
            SearchDescriptor::Autocomplete(_) => {
                let records = documents
                    .into_iter()
                    .map(serde_json::from_value::<MovieDocument>)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| EngineError::Parse(e.to_string()))?;
                Ok(EngineBatch {
                    total: records.len() as u64,
                    records: records.into_iter().map(MovieDocument::into_ranked).collect(),
                })
            }
            SearchDescriptor::Standard(_) | SearchDescriptor::TitleWeighted(_) => {
                let facet: FacetDocument = match documents.into_iter().next() {
                    Some(document) => serde_json::from_value(document)
                        .map_err(|e| EngineError::Parse(e.to_string()))?,
                    None => FacetDocument::default(),
                };
                Ok(EngineBatch {
                    total: facet.metadata.first().map(|row| row.total).unwrap_or(0),
                    records: facet.data.into_iter().map(MovieDocument::into_ranked).collect(),
                })
            }
        }
    }

    fn release(&mut self) {
        if self.client.take().is_some() {
            tracing::debug!("Closed engine session to {}", self.api.endpoint);
        }
    }
}
