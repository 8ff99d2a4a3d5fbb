//! Configuration module for lexfind
//!
//! Application-level settings (TOML + env) and per-request search options.

pub mod app_config;
mod search_options;

pub use app_config::AppConfig;
pub use search_options::SearchOptions;
