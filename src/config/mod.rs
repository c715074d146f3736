//! Configuration module for cinesearch
//!
//! This module defines the application configuration, search modes and
//! request defaults.

pub mod app_config;
pub mod path_resolver;
mod search_config;

pub use app_config::{AppConfig, Environment};
pub use search_config::{SearchConfig, SearchMode, DEFAULT_LIMIT, DEFAULT_TITLE_WEIGHT};
