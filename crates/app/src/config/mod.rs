use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const TOKEN_ENV: &str = "BOT_UPKEEP_TOKEN";

const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";
const DEFAULT_PLAN_ID: &str = "triviabot-premium-monthly";
const DEFAULT_PROCESS_PATTERN: &str = r"^\./bot\b";

/// Settings for both jobs, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub discord: DiscordConfig,
    #[serde(default)]
    pub billing: BillingConfig,
    #[serde(default)]
    pub sampler: SamplerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub application_id: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    pub plan_id: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            plan_id: DEFAULT_PLAN_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Live,
    /// No credentials or network; latency probes report zero.
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub environment: Environment,
    pub shard_count: u32,
    pub process_pattern: String,
    pub log_files: Vec<PathBuf>,
    pub log_window_minutes: u32,
    pub retention_hours: u32,
    pub internal_api_url: Option<String>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Live,
            shard_count: 1,
            process_pattern: DEFAULT_PROCESS_PATTERN.to_string(),
            log_files: Vec::new(),
            log_window_minutes: 15,
            retention_hours: 24,
            internal_api_url: None,
        }
    }
}

impl SamplerConfig {
    pub fn process_regex(&self) -> Result<Regex> {
        Regex::new(&self.process_pattern).map_err(|err| {
            AppError::Config(format!(
                "invalid sampler.process_pattern {:?}: {}",
                self.process_pattern, err
            ))
        })
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl AppConfig {
    /// Reads the TOML file at `path`, applies the token override from the
    /// environment and validates the result.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("read config {}: {}", path.display(), err)))?;
        let mut config = Self::from_toml(&contents)
            .map_err(|err| AppError::Config(format!("config {}: {}", path.display(), err)))?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(TOKEN_ENV).filter(|value| !value.trim().is_empty()) {
            self.discord.token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.discord.application_id.trim().is_empty() {
            return Err(AppError::Config(
                "discord.application_id must not be empty".to_string(),
            ));
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(AppError::Config("database.path must not be empty".to_string()));
        }
        if self.sampler.log_window_minutes == 0 {
            return Err(AppError::Config(
                "sampler.log_window_minutes must be at least 1".to_string(),
            ));
        }
        self.sampler.process_regex()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [database]
        path = "/var/lib/triviabot/ops.sqlite"

        [discord]
        application_id = "1019370614521200640"
    "#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = AppConfig::from_toml(MINIMAL).expect("parse");
        config.validate().expect("valid");
        assert_eq!(config.discord.api_base, DEFAULT_API_BASE);
        assert_eq!(config.discord.token, None);
        assert_eq!(config.billing.plan_id, DEFAULT_PLAN_ID);
        assert_eq!(config.sampler.environment, Environment::Live);
        assert_eq!(config.sampler.log_window_minutes, 15);
        assert_eq!(config.sampler.retention_hours, 24);
        assert!(config.sampler.process_regex().expect("regex").is_match("./bot --members"));
    }

    #[test]
    fn sampler_section_overrides_defaults() {
        let raw = format!(
            "{MINIMAL}\n[sampler]\nenvironment = \"local\"\nshard_count = 16\nlog_files = [\"logs/triviabot00.log\", \"logs/triviabot01.log\"]\n"
        );
        let config = AppConfig::from_toml(&raw).expect("parse");
        assert_eq!(config.sampler.environment, Environment::Local);
        assert_eq!(config.sampler.shard_count, 16);
        assert_eq!(config.sampler.log_files.len(), 2);
        assert_eq!(config.sampler.retention_hours, 24);
    }

    #[test]
    fn token_env_overrides_file() {
        let raw = format!("{MINIMAL}token = \"from-file\"\n");
        let mut config = AppConfig::from_toml(&raw).expect("parse");
        assert_eq!(config.discord.token.as_deref(), Some("from-file"));

        config.apply_env(|key| (key == TOKEN_ENV).then(|| "from-env".to_string()));
        assert_eq!(config.discord.token.as_deref(), Some("from-env"));

        config.apply_env(|_| Some("   ".to_string()));
        assert_eq!(config.discord.token.as_deref(), Some("from-env"));
    }

    #[test]
    fn invalid_process_pattern_is_config_error() {
        let mut config = AppConfig::from_toml(MINIMAL).expect("parse");
        config.sampler.process_pattern = "(".to_string();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn missing_discord_section_fails_to_parse() {
        let raw = "[database]\npath = \"ops.sqlite\"\n";
        assert!(AppConfig::from_toml(raw).is_err());
    }

    #[test]
    fn shipped_example_config_is_valid() {
        let config = AppConfig::from_toml(include_str!("../../../../config.example.toml"))
            .expect("parse example");
        config.validate().expect("valid");
        assert_eq!(config.sampler.shard_count, 16);
        assert!(config.sampler.internal_api_url.is_some());
    }

    #[test]
    fn load_reports_missing_file_as_config_error() {
        let err = AppConfig::load(Path::new("/nonexistent/bot-upkeep.toml")).expect_err("missing");
        assert_eq!(err.exit_code(), 2);
    }
}
