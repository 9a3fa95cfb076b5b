//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::constants::{endpoints, phrases, scoring, server, skills, timeouts};
use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream annotation services
    #[serde(default)]
    pub services: ServicesConfig,

    /// Composite score parameters
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Skills and phrases used by the override rules
    #[serde(default)]
    pub skills: SkillsConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_services()?;
        self.validate_scoring()?;
        self.validate_skills()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.request_timeout_secs".to_string(),
                message: "Request timeout must be positive".to_string(),
            });
        }
        Ok(())
    }

    fn validate_services(&self) -> Result<(), ConfigError> {
        let services = &self.services;

        services.api_key()?;
        let evaluator_url = services.evaluator_url()?;

        for (field, url) in [
            ("services.evaluator_url", evaluator_url),
            ("services.toxicity_url", services.toxicity_url.as_str()),
            ("services.blacklist_url", services.blacklist_url.as_str()),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("Must be an http(s) URL, got '{}'", url),
                });
            }
        }

        if services.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "services.timeout_secs".to_string(),
                message: "Timeout must be positive".to_string(),
            });
        }

        Ok(())
    }

    fn validate_scoring(&self) -> Result<(), ConfigError> {
        let s = &self.scoring;

        for (field, weight) in [
            ("scoring.conv_eval_weight", s.conv_eval_weight),
            ("scoring.confidence_weight", s.confidence_weight),
            ("scoring.max_score", s.max_score),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("Must be finite and non-negative, got {}", weight),
                });
            }
        }

        for (field, value) in [
            ("scoring.unsafe_toxicity_threshold", s.unsafe_toxicity_threshold),
            (
                "scoring.mid_dialogue_greeting_confidence",
                s.mid_dialogue_greeting_confidence,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("Must be between 0.0 and 1.0, got {}", value),
                });
            }
        }

        Ok(())
    }

    fn validate_skills(&self) -> Result<(), ConfigError> {
        let s = &self.skills;

        for (field, value) in [
            ("skills.chit_chat", &s.chit_chat),
            ("skills.crisis", &s.crisis),
            ("skills.fallback", &s.fallback),
            ("skills.greeting_phrase", &s.greeting_phrase),
            ("skills.how_are_you_reply", &s.how_are_you_reply),
            ("skills.psychological_help_phrase", &s.psychological_help_phrase),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "Cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    server::HOST.to_string()
}

fn default_port() -> u16 {
    server::PORT
}

fn default_request_timeout() -> u64 {
    timeouts::REQUEST_SECS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Upstream annotation services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Sent as `x-api-key` to every upstream service
    #[serde(default)]
    pub api_key: Option<String>,

    /// Conversation quality evaluator endpoint
    #[serde(default)]
    pub evaluator_url: Option<String>,

    /// Toxicity classifier endpoint
    #[serde(default = "default_toxicity_url")]
    pub toxicity_url: String,

    /// Blacklisted-words detector endpoint
    #[serde(default = "default_blacklist_url")]
    pub blacklist_url: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

fn default_toxicity_url() -> String {
    endpoints::TOXICITY_DEFAULT.to_string()
}

fn default_blacklist_url() -> String {
    endpoints::BLACKLIST_DEFAULT.to_string()
}

fn default_upstream_timeout() -> u64 {
    timeouts::UPSTREAM_SECS
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            evaluator_url: None,
            toxicity_url: default_toxicity_url(),
            blacklist_url: default_blacklist_url(),
            timeout_secs: default_upstream_timeout(),
        }
    }
}

impl ServicesConfig {
    /// Required API key
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        Self::required(self.api_key.as_deref(), "services.api_key")
    }

    /// Required evaluator URL
    pub fn evaluator_url(&self) -> Result<&str, ConfigError> {
        Self::required(self.evaluator_url.as_deref(), "services.evaluator_url")
    }

    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ConfigError> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(ConfigError::MissingField(field.to_string())),
        }
    }
}

/// Composite score parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_conv_eval_weight")]
    pub conv_eval_weight: f64,

    #[serde(default = "default_confidence_weight")]
    pub confidence_weight: f64,

    #[serde(default = "default_unsafe_toxicity_threshold")]
    pub unsafe_toxicity_threshold: f64,

    /// Score assigned by override rules
    #[serde(default = "default_max_score")]
    pub max_score: f64,

    /// Confidence given to a chit-chat greeting outside the first turn
    #[serde(default = "default_mid_dialogue_greeting_confidence")]
    pub mid_dialogue_greeting_confidence: f64,
}

fn default_conv_eval_weight() -> f64 {
    scoring::CONV_EVAL_WEIGHT
}

fn default_confidence_weight() -> f64 {
    scoring::CONFIDENCE_WEIGHT
}

fn default_unsafe_toxicity_threshold() -> f64 {
    scoring::UNSAFE_TOXICITY_THRESHOLD
}

fn default_max_score() -> f64 {
    scoring::MAX_SCORE
}

fn default_mid_dialogue_greeting_confidence() -> f64 {
    scoring::MID_DIALOGUE_GREETING_CONFIDENCE
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            conv_eval_weight: default_conv_eval_weight(),
            confidence_weight: default_confidence_weight(),
            unsafe_toxicity_threshold: default_unsafe_toxicity_threshold(),
            max_score: default_max_score(),
            mid_dialogue_greeting_confidence: default_mid_dialogue_greeting_confidence(),
        }
    }
}

/// Skills and phrases used by the override rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsConfig {
    #[serde(default = "default_chit_chat_skill")]
    pub chit_chat: String,

    #[serde(default = "default_crisis_skill")]
    pub crisis: String,

    #[serde(default = "default_fallback_skill")]
    pub fallback: String,

    #[serde(default = "default_greeting")]
    pub greeting_phrase: String,

    #[serde(default = "default_how_are_you_reply")]
    pub how_are_you_reply: String,

    #[serde(default = "default_psychological_help")]
    pub psychological_help_phrase: String,
}

fn default_chit_chat_skill() -> String {
    skills::CHIT_CHAT.to_string()
}

fn default_crisis_skill() -> String {
    skills::CRISIS.to_string()
}

fn default_fallback_skill() -> String {
    skills::FALLBACK.to_string()
}

fn default_greeting() -> String {
    phrases::GREETING.to_string()
}

fn default_how_are_you_reply() -> String {
    phrases::HOW_ARE_YOU_REPLY.to_string()
}

fn default_psychological_help() -> String {
    phrases::PSYCHOLOGICAL_HELP.to_string()
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            chit_chat: default_chit_chat_skill(),
            crisis: default_crisis_skill(),
            fallback: default_fallback_skill(),
            greeting_phrase: default_greeting(),
            how_are_you_reply: default_how_are_you_reply(),
            psychological_help_phrase: default_psychological_help(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Load settings from `config/` and the environment
///
/// Priority: env vars > config/{env}.* > config/default.* > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from an explicit config directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    let default_path = dir.join("default");
    builder = builder.add_source(File::with_name(&default_path.to_string_lossy()).required(false));

    if let Some(env_name) = env {
        let env_path = dir.join(env_name);
        builder = builder.add_source(File::with_name(&env_path.to_string_lossy()).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("RESPONSE_SELECTOR")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    tracing::debug!(
        evaluator_url = ?settings.services.evaluator_url,
        toxicity_url = %settings.services.toxicity_url,
        blacklist_url = %settings.services.blacklist_url,
        "Settings loaded"
    );

    Ok(settings)
}
