//! cinesearch: Command-line interface for the movie search service

use anyhow::{anyhow, Context, Result};
use cinesearch::config::{app_config::AppConfig, path_resolver};
use cinesearch::engine::{AtlasDataApi, MemoryEngine, RecordStore, SearchEngine};
use cinesearch::{indexes, Filters, MovieSearch, SearchError, SearchRequest};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ============================================================================
// CLI Definition
// ============================================================================

/// cinesearch: full-text movie search over an Atlas Search engine
#[derive(Parser)]
#[command(name = "cinesearch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (default: XDG config dir)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Engine data API base URL (overrides config and environment)
    #[arg(long, global = true)]
    engine_url: Option<String>,

    /// Use the built-in demo catalog instead of a remote engine
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize cinesearch configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
    /// Fuzzy search over titles and plots
    Search {
        /// Search query
        query: String,

        /// Maximum runtime in minutes
        #[arg(long)]
        runtime: Option<f64>,

        /// Minimum rating
        #[arg(long)]
        rating: Option<f64>,

        /// Start of release window (YYYY-MM-DD or YYYY)
        #[arg(long)]
        start_date: Option<String>,

        /// End of release window (YYYY-MM-DD or YYYY)
        #[arg(long)]
        end_date: Option<String>,

        /// Exact genre, or "All"
        #[arg(long)]
        genre: Option<String>,

        /// Page number (1-based)
        #[arg(short, long, allow_hyphen_values = true)]
        page: Option<i64>,

        /// Results per page
        #[arg(short, long, allow_hyphen_values = true)]
        limit: Option<i64>,
    },
    /// Search with a boosted title clause
    TitleSearch {
        /// Search query
        query: String,

        /// Title boost (default: 3)
        #[arg(short = 'w', long)]
        title_weight: Option<String>,

        /// Page number (1-based)
        #[arg(short, long, allow_hyphen_values = true)]
        page: Option<i64>,

        /// Results per page
        #[arg(short, long, allow_hyphen_values = true)]
        limit: Option<i64>,
    },
    /// Title suggestions for a prefix
    Autocomplete {
        /// Title prefix
        prefix: String,
    },
    /// Show one catalog record by id
    Show {
        /// Record id
        id: String,
    },
    /// Count catalog records
    Count,
    /// Print the search index definitions the engine needs
    Indexes,
}

// ============================================================================
// Helpers
// ============================================================================

/// File config (if any) < environment < CLI flags
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let file_config = match &cli.config {
        Some(path) => {
            let resolved = path_resolver::resolve_path(path)?;
            AppConfig::from_file(&resolved)?
        }
        None => {
            let default_path = path_resolver::get_default_config_path();
            if default_path.exists() {
                AppConfig::from_file(&default_path)?
            } else {
                AppConfig::default()
            }
        }
    };

    let mut config = file_config.merge_with(&AppConfig::from_env());
    if let Some(url) = &cli.engine_url {
        config = config.with_engine_url(url);
    }
    config.validate()?;
    Ok(config)
}

fn engines(cli: &Cli, config: &AppConfig) -> (Arc<dyn SearchEngine>, Arc<dyn RecordStore>) {
    if cli.demo {
        let engine = Arc::new(MemoryEngine::new(MemoryEngine::demo_catalog()));
        let store: Arc<dyn RecordStore> = engine.clone();
        let search: Arc<dyn SearchEngine> = engine;
        (search, store)
    } else {
        let engine = Arc::new(AtlasDataApi::from_config(config));
        tracing::info!("Using engine at {} (database: {})", engine.endpoint(), engine.database());
        let store: Arc<dyn RecordStore> = engine.clone();
        let search: Arc<dyn SearchEngine> = engine;
        (search, store)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the user-facing error body and turn it into a process failure
fn report(err: SearchError, config: &AppConfig) -> anyhow::Error {
    let body = err.to_error_body(config.environment());
    match serde_json::to_string_pretty(&body) {
        Ok(json) => eprintln!("{}", json),
        Err(_) => eprintln!("{}", body.error),
    }
    anyhow!(body.error)
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays pure JSON
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    match &cli.command {
        Commands::Init { force } => {
            let config_path: PathBuf = match &cli.config {
                Some(path) => path_resolver::resolve_path(path)?,
                None => path_resolver::get_default_config_path(),
            };

            eprintln!("Initializing cinesearch configuration...");

            if let Some(dir) = config_path.parent() {
                if !dir.exists() {
                    std::fs::create_dir_all(dir)
                        .with_context(|| format!("Failed to create {}", dir.display()))?;
                    eprintln!("Created config directory: {}", dir.display());
                }
            }

            if config_path.exists() && !force {
                eprintln!("Configuration file already exists: {}", config_path.display());
                eprintln!("Use --force to overwrite");
                return Ok(());
            }

            let toml_content = AppConfig::default().to_toml()?;
            std::fs::write(&config_path, &toml_content)
                .with_context(|| format!("Failed to write {}", config_path.display()))?;

            eprintln!("Created configuration file: {}", config_path.display());
            eprintln!("Edit it to point engine_url and api_key at your cluster.");
            Ok(())
        }
        Commands::Indexes => {
            let definitions: Vec<_> = indexes::definitions().iter().map(|d| d.to_json()).collect();
            print_json(&definitions)
        }
        Commands::Search {
            query,
            runtime,
            rating,
            start_date,
            end_date,
            genre,
            page,
            limit,
        } => {
            let config = load_config(&cli)?;
            let (engine, _) = engines(&cli, &config);
            let service = MovieSearch::with_config(engine, config.search_config());

            let request = SearchRequest {
                query_text: query.clone(),
                filters: Filters {
                    max_runtime_minutes: *runtime,
                    min_rating: *rating,
                    start_date: start_date.clone(),
                    end_date: end_date.clone(),
                    genre: genre.clone(),
                },
                title_weight: None,
                page: *page,
                limit: *limit,
            };

            let result = service
                .search(&request)
                .await
                .map_err(|e| report(e, &config))?;
            print_json(&result)
        }
        Commands::TitleSearch {
            query,
            title_weight,
            page,
            limit,
        } => {
            let config = load_config(&cli)?;
            let (engine, _) = engines(&cli, &config);
            let service = MovieSearch::with_config(engine, config.search_config());

            let request = SearchRequest {
                query_text: query.clone(),
                title_weight: title_weight.clone().map(serde_json::Value::String),
                page: *page,
                limit: *limit,
                ..SearchRequest::default()
            };

            let result = service
                .search_title_weighted(&request)
                .await
                .map_err(|e| report(e, &config))?;
            print_json(&result)
        }
        Commands::Autocomplete { prefix } => {
            let config = load_config(&cli)?;
            let (engine, _) = engines(&cli, &config);
            let service = MovieSearch::with_config(engine, config.search_config());

            let suggestions = service
                .autocomplete(prefix)
                .await
                .map_err(|e| report(e, &config))?;
            print_json(&suggestions)
        }
        Commands::Show { id } => {
            let config = load_config(&cli)?;
            let (_, store) = engines(&cli, &config);

            match store
                .find_by_id(id)
                .await
                .map_err(|e| report(e.into(), &config))?
            {
                Some(movie) => print_json(&movie),
                None => Err(anyhow!("No movie with id '{}'", id)),
            }
        }
        Commands::Count => {
            let config = load_config(&cli)?;
            let (_, store) = engines(&cli, &config);

            let total = store.count().await.map_err(|e| report(e.into(), &config))?;
            println!("{}", total);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_search_command() {
        let cli = Cli::try_parse_from([
            "cinesearch",
            "search",
            "star",
            "--genre",
            "Action",
            "--page",
            "-1",
            "--limit",
            "0",
        ]);
        assert!(cli.is_ok());
        if let Ok(parsed) = cli {
            if let Commands::Search { page, limit, genre, .. } = parsed.command {
                assert_eq!(page, Some(-1));
                assert_eq!(limit, Some(0));
                assert_eq!(genre.as_deref(), Some("Action"));
            }
        }
    }

    #[test]
    fn test_cli_title_search_command() {
        let cli = Cli::try_parse_from(["cinesearch", "title-search", "star", "-w", "5"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_autocomplete_with_demo() {
        let cli = Cli::try_parse_from(["cinesearch", "--demo", "autocomplete", "sta"]).unwrap();
        assert!(cli.demo);
    }

    #[test]
    fn test_cli_indexes_command() {
        let cli = Cli::try_parse_from(["cinesearch", "indexes"]);
        assert!(cli.is_ok());
    }
}
