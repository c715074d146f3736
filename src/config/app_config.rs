//! Application configuration module for cinesearch
//!
//! Provides TOML-based configuration with environment variable override support.
//! Priority: CLI args > Environment variables > Config file > Defaults

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::search_config::{SearchConfig, DEFAULT_LIMIT};

/// Deployment environment, controls how much failure detail reaches callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
    Test,
}

impl Environment {
    /// Parse an environment name, accepting the common short forms
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            "test" => Some(Environment::Test),
            _ => None,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the search engine data API
    #[serde(default = "default_engine_url")]
    engine_url: String,

    /// API key sent to the engine
    #[serde(default)]
    api_key: Option<String>,

    /// Cluster name the data API routes to
    #[serde(default = "default_data_source")]
    data_source: String,

    /// Database holding the movie catalog; unset means the environment default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database: Option<String>,

    /// Collection holding the movie catalog
    #[serde(default = "default_collection")]
    collection: String,

    /// Page size used when a request carries none
    #[serde(default = "default_limit")]
    default_limit: u64,

    /// Per-request timeout for engine calls, in seconds
    #[serde(default = "default_timeout_secs")]
    request_timeout_secs: u64,

    /// Deployment environment
    #[serde(default)]
    environment: Environment,
}

fn default_engine_url() -> String {
    "http://localhost:8080/app/data-api/v1".to_string()
}

fn default_data_source() -> String {
    "Cluster0".to_string()
}

/// Catalog database outside the test environment
const DEFAULT_DATABASE: &str = "sample_mflix";

/// Catalog database for the test environment
const TEST_DATABASE: &str = "sample_mflix_test";

fn default_collection() -> String {
    "movies".to_string()
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine_url: default_engine_url(),
            api_key: None,
            data_source: default_data_source(),
            database: None,
            collection: default_collection(),
            default_limit: default_limit(),
            request_timeout_secs: default_timeout_secs(),
            environment: Environment::default(),
        }
    }
}

impl AppConfig {
    /// Create config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file: {}", e))?;
        Ok(config)
    }

    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("CINESEARCH_ENGINE_URL") {
            config.engine_url = url;
        }

        if let Ok(api_key) = std::env::var("CINESEARCH_API_KEY") {
            config.api_key = Some(api_key);
        }

        if let Ok(data_source) = std::env::var("CINESEARCH_DATA_SOURCE") {
            config.data_source = data_source;
        }

        if let Ok(collection) = std::env::var("CINESEARCH_COLLECTION") {
            config.collection = collection;
        }

        if let Ok(limit) = std::env::var("CINESEARCH_DEFAULT_LIMIT") {
            if let Ok(n) = limit.parse() {
                config.default_limit = n;
            }
        }

        if let Ok(secs) = std::env::var("CINESEARCH_TIMEOUT_SECS") {
            if let Ok(n) = secs.parse() {
                config.request_timeout_secs = n;
            }
        }

        if let Ok(env) = std::env::var("CINESEARCH_ENV") {
            match Environment::parse(&env) {
                Some(environment) => config.environment = environment,
                None => tracing::warn!("Ignoring unknown CINESEARCH_ENV value '{}'", env),
            }
        }

        if let Ok(database) = std::env::var("CINESEARCH_DATABASE") {
            config.database = Some(database);
        }

        config
    }

    /// Merge with another config (other takes priority for non-default values)
    pub fn merge_with(&self, other: &Self) -> Self {
        Self {
            engine_url: if other.engine_url != default_engine_url() {
                other.engine_url.clone()
            } else {
                self.engine_url.clone()
            },
            api_key: other.api_key.clone().or_else(|| self.api_key.clone()),
            data_source: if other.data_source != default_data_source() {
                other.data_source.clone()
            } else {
                self.data_source.clone()
            },
            database: other.database.clone().or_else(|| self.database.clone()),
            collection: if other.collection != default_collection() {
                other.collection.clone()
            } else {
                self.collection.clone()
            },
            default_limit: if other.default_limit != default_limit() {
                other.default_limit
            } else {
                self.default_limit
            },
            request_timeout_secs: if other.request_timeout_secs != default_timeout_secs() {
                other.request_timeout_secs
            } else {
                self.request_timeout_secs
            },
            environment: if other.environment != Environment::default() {
                other.environment
            } else {
                self.environment
            },
        }
    }

    /// Override engine_url
    pub fn with_engine_url(mut self, url: &str) -> Self {
        self.engine_url = url.to_string();
        self
    }

    /// Override api_key
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    /// Override default_limit
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit;
        self
    }

    /// Override environment
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Override database
    pub fn with_database(mut self, database: &str) -> Self {
        self.database = Some(database.to_string());
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.default_limit == 0 {
            return Err(anyhow!("default_limit must be greater than 0"));
        }

        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be greater than 0"));
        }

        if !(self.engine_url.starts_with("http://") || self.engine_url.starts_with("https://")) {
            return Err(anyhow!(
                "Invalid engine_url '{}': expected an http(s) URL",
                self.engine_url
            ));
        }

        for (name, value) in [
            ("data_source", self.data_source.as_str()),
            ("database", self.database()),
            ("collection", self.collection.as_str()),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("{} must not be empty", name));
            }
        }

        Ok(())
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| anyhow!("Failed to serialize config: {}", e))
    }

    /// Search defaults derived from this configuration
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::new().with_default_limit(self.default_limit)
    }

    // Getters
    pub fn engine_url(&self) -> &str {
        &self.engine_url
    }

    pub fn api_key(&self) -> Option<String> {
        self.api_key.clone()
    }

    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    /// Explicit database, else the default for the environment
    pub fn database(&self) -> &str {
        match (&self.database, self.environment) {
            (Some(database), _) => database,
            (None, Environment::Test) => TEST_DATABASE,
            (None, _) => DEFAULT_DATABASE,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn default_limit(&self) -> u64 {
        self.default_limit
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }
}
