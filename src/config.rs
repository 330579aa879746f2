//! Bot configuration.
//!
//! Settings come from an optional YAML file and are then overridden by
//! command-line flags. Every field has a default, so an empty or missing file
//! is a valid configuration.
//!
//! ```yaml
//! min_length: 100
//! max_length: 140
//! max_resample_attempts: 50
//! max_article_attempts: 10
//! base_sleep_minutes: 30
//! jitter_sleep_minutes: 300
//! ```
//!
//! Credentials are not part of this file; they are passed on the command line
//! or through the environment (see [`crate::cli::Cli`]).

use crate::cli::Cli;
use crate::markov::{DEFAULT_MAX_STEPS, DEFAULT_MIN_LENGTH};
use serde::Deserialize;
use std::error::Error;
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};

/// Runtime settings for the bot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BotConfig {
    /// Minimum length, in characters, of a generated status.
    pub min_length: usize,
    /// Hard limit imposed by the destination feed.
    pub max_length: usize,
    /// How many times to resample one article before moving to another.
    pub max_resample_attempts: usize,
    /// How many articles to try in a single cycle.
    pub max_article_attempts: usize,
    /// Word ceiling for a single Markov walk.
    pub max_walk_steps: usize,
    /// Fixed part of the pause between posts.
    pub base_sleep_minutes: u64,
    /// Upper bound of the random part added to the pause.
    pub jitter_sleep_minutes: u64,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            max_length: 140,
            max_resample_attempts: 50,
            max_article_attempts: 10,
            max_walk_steps: DEFAULT_MAX_STEPS,
            base_sleep_minutes: 30,
            jitter_sleep_minutes: 300,
            user_agent: concat!("kinda_newsy/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl BotConfig {
    /// Parse a YAML document. An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, Box<dyn Error>> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of file settings.
    pub fn apply_cli(&mut self, args: &Cli) {
        if let Some(min_length) = args.min_length {
            self.min_length = min_length;
        }
        if let Some(max_length) = args.max_length {
            self.max_length = max_length;
        }
    }

    /// Reject settings that would make every cycle fail.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.max_length == 0 {
            return Err("max_length must be greater than zero".into());
        }
        if self.min_length > self.max_length {
            return Err(format!(
                "min_length ({}) exceeds max_length ({})",
                self.min_length, self.max_length
            )
            .into());
        }
        if self.max_resample_attempts == 0 || self.max_article_attempts == 0 {
            return Err("attempt limits must be greater than zero".into());
        }
        if self.max_walk_steps == 0 {
            return Err("max_walk_steps must be greater than zero".into());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than zero".into());
        }
        Ok(())
    }

    /// Timeout applied to every HTTP request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Load the configuration file at `path`, or the defaults when `path` is `None`.
#[instrument(level = "info")]
pub async fn load_config(path: Option<&str>) -> Result<BotConfig, Box<dyn Error>> {
    match path {
        Some(path) => {
            let yaml = fs::read_to_string(path).await?;
            let config = BotConfig::from_yaml(&yaml)?;
            info!(path, "Loaded configuration");
            Ok(config)
        }
        None => {
            info!("No config file given; using defaults");
            Ok(BotConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(BotConfig::from_yaml("").unwrap(), BotConfig::default());
        assert_eq!(BotConfig::from_yaml("  \n").unwrap(), BotConfig::default());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = BotConfig::from_yaml("max_length: 280\nbase_sleep_minutes: 5\n").unwrap();

        assert_eq!(config.max_length, 280);
        assert_eq!(config.base_sleep_minutes, 5);
        assert_eq!(config.min_length, DEFAULT_MIN_LENGTH);
        assert_eq!(config.jitter_sleep_minutes, 300);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(BotConfig::from_yaml("max_lenght: 280\n").is_err());
    }

    #[test]
    fn test_min_above_max_is_rejected() {
        assert!(BotConfig::from_yaml("min_length: 200\nmax_length: 140\n").is_err());
    }

    #[test]
    fn test_zero_walk_steps_or_timeout_is_rejected() {
        assert!(BotConfig::from_yaml("max_walk_steps: 0\n").is_err());
        assert!(BotConfig::from_yaml("request_timeout_secs: 0\n").is_err());
        assert!(BotConfig::from_yaml("max_walk_steps: 1\nrequest_timeout_secs: 1\n").is_ok());
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = BotConfig::default();
        let args = Cli::parse_from(["kinda_newsy", "--max-length", "280", "--min-length", "60"]);
        config.apply_cli(&args);

        assert_eq!(config.max_length, 280);
        assert_eq!(config.min_length, 60);
    }

    #[tokio::test]
    async fn test_load_config_without_path() {
        let config = load_config(None).await.unwrap();
        assert_eq!(config, BotConfig::default());
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let path = std::env::temp_dir().join(format!("kinda_newsy_{}.yaml", std::process::id()));
        tokio::fs::write(&path, "max_article_attempts: 3\n").await.unwrap();

        let config = load_config(path.to_str()).await.unwrap();
        assert_eq!(config.max_article_attempts, 3);

        let _ = tokio::fs::remove_file(&path).await;
    }
}
