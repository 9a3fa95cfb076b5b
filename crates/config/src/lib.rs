//! Configuration management for the response selector
//!
//! Supports loading configuration from:
//! - YAML/TOML files under `config/`
//! - Environment variables (`RESPONSE_SELECTOR__` prefix, `__` separator)
//!
//! The upstream API key and the conversation evaluator URL have no defaults.
//! Start-up fails when either is missing.

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, load_settings_from, ObservabilityConfig, ScoringConfig, ServerConfig,
    ServicesConfig, Settings, SkillsConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
