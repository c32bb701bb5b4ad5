//! Configuration loading and validation.
//!
//! Settings come from a TOML file. Secrets never do: the file only names the
//! environment variables that hold them.

use std::path::Path;
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::handler::HandlerSettings;
use crate::leaderboard::ranking::PLACE_LABELS;
use crate::slack::client::DEFAULT_API_BASE;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Environment variable {0} is not set")]
    MissingSecret(String),
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Slack API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Web API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Timeout for Web API calls, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Environment variable holding the request signing secret
    #[serde(default = "default_signing_secret_env")]
    pub signing_secret_env: String,

    /// Environment variable holding the bot token (`xoxb-...`)
    #[serde(default = "default_bot_token_env")]
    pub bot_token_env: String,

    /// Requests signed longer ago than this are rejected
    #[serde(default = "default_max_request_age")]
    pub max_request_age_seconds: u64,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_signing_secret_env() -> String {
    "SLACK_SIGNING_SECRET".to_string()
}

fn default_bot_token_env() -> String {
    "SLACK_BOT_TOKEN".to_string()
}

fn default_max_request_age() -> u64 {
    300
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            timeout_seconds: default_timeout(),
            signing_secret_env: default_signing_secret_env(),
            bot_token_env: default_bot_token_env(),
            max_request_age_seconds: default_max_request_age(),
        }
    }
}

impl SlackConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn max_request_age(&self) -> Duration {
        Duration::from_secs(self.max_request_age_seconds)
    }

    /// Read the signing secret from the environment. Required.
    pub fn signing_secret(&self) -> Result<String, ConfigError> {
        std::env::var(&self.signing_secret_env)
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingSecret(self.signing_secret_env.clone()))
    }

    /// Read the bot token from the environment, if set.
    pub fn bot_token(&self) -> Option<String> {
        std::env::var(&self.bot_token_env)
            .ok()
            .filter(|s| !s.is_empty())
    }
}

/// Leaderboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    /// IANA timezone that decides when a day ends
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Sets strictly faster than this are celebrated
    #[serde(default = "default_celebration_threshold")]
    pub celebration_threshold_seconds: f64,

    /// Emoji added to celebrated messages
    #[serde(default = "default_celebration_reaction")]
    pub celebration_reaction: String,

    /// Places shown on the leaderboard (at most 3)
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_timezone() -> String {
    "US/Pacific".to_string()
}

fn default_celebration_threshold() -> f64 {
    60.0
}

fn default_celebration_reaction() -> String {
    "fire".to_string()
}

fn default_top_n() -> usize {
    3
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            celebration_threshold_seconds: default_celebration_threshold(),
            celebration_reaction: default_celebration_reaction(),
            top_n: default_top_n(),
        }
    }
}

impl LeaderboardConfig {
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone.parse().map_err(|_| {
            ConfigError::ValidationError(format!("Unknown timezone: {}", self.timezone))
        })
    }

    pub fn handler_settings(&self) -> HandlerSettings {
        HandlerSettings {
            celebration_threshold_seconds: self.celebration_threshold_seconds,
            celebration_reaction: self.celebration_reaction.clone(),
            top_n: self.top_n,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub log_level: Option<String>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub slack: SlackConfig,

    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.slack.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Slack timeout must be greater than 0".to_string(),
            ));
        }

        url::Url::parse(&self.slack.api_base).map_err(|e| {
            ConfigError::ValidationError(format!("Invalid Slack API base: {}", e))
        })?;

        self.leaderboard.tz()?;

        if self.leaderboard.top_n == 0 || self.leaderboard.top_n > PLACE_LABELS.len() {
            return Err(ConfigError::ValidationError(format!(
                "Leaderboard top_n must be between 1 and {}",
                PLACE_LABELS.len()
            )));
        }

        if !self.leaderboard.celebration_threshold_seconds.is_finite() {
            return Err(ConfigError::ValidationError(
                "Celebration threshold must be a finite number".to_string(),
            ));
        }

        if self.leaderboard.celebration_reaction.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Celebration reaction must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
