use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::GatewaySettings;
use crate::scoring::rubric::Rubric;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,

    /// Absent credential is not a startup error; the gateway reports it on first use.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_temperature: f32,
    pub openai_max_tokens: u32,
    pub openai_timeout_s: u64,
    pub openai_retries: u32,

    pub llm_cache_enabled: bool,
    pub llm_cache_ttl_s: u64,

    pub scoring_version: String,
    pub prompts_dir: Option<PathBuf>,
    pub max_upload_mb: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            port: parse_env("PORT", 8080)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),

            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            openai_model: optional_env("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            openai_temperature: parse_env("OPENAI_TEMPERATURE", 0.2)?,
            openai_max_tokens: parse_env("OPENAI_MAX_TOKENS", 900)?,
            openai_timeout_s: parse_env("OPENAI_TIMEOUT_S", 30)?,
            openai_retries: parse_env("OPENAI_RETRIES", 2)?,

            llm_cache_enabled: bool_env("LLM_CACHE_ENABLED", true),
            llm_cache_ttl_s: parse_env("LLM_CACHE_TTL_S", 86_400)?,

            scoring_version: optional_env("SCORING_VERSION").unwrap_or_else(|| "v1".to_string()),
            prompts_dir: optional_env("PROMPTS_DIR").map(PathBuf::from),
            max_upload_mb: parse_env("MAX_UPLOAD_MB", 5)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        Rubric::for_version(&self.scoring_version)
            .with_context(|| format!("Invalid SCORING_VERSION '{}'", self.scoring_version))?;
        if !(0.0..=2.0).contains(&self.openai_temperature) {
            bail!("OPENAI_TEMPERATURE must be between 0.0 and 2.0");
        }
        if self.openai_timeout_s == 0 {
            bail!("OPENAI_TIMEOUT_S must be at least 1 second");
        }
        Ok(())
    }

    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            api_key: self.openai_api_key.clone(),
            base_url: self.openai_base_url.clone(),
            default_model: self.openai_model.clone(),
            default_temperature: self.openai_temperature,
            default_max_tokens: self.openai_max_tokens,
            timeout: Duration::from_secs(self.openai_timeout_s),
            retries: self.openai_retries,
            cache_enabled: self.llm_cache_enabled,
            cache_ttl: Duration::from_secs(self.llm_cache_ttl_s),
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

fn require_env(key: &str) -> Result<String> {
    optional_env(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Blank values count as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn bool_env(key: &str, default: bool) -> bool {
    match optional_env(key) {
        Some(raw) => parse_flag(&raw),
        None => default,
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            database_url: "postgres://localhost/cvscore".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_temperature: 0.2,
            openai_max_tokens: 900,
            openai_timeout_s: 30,
            openai_retries: 2,
            llm_cache_enabled: true,
            llm_cache_ttl_s: 86_400,
            scoring_version: "v1".to_string(),
            prompts_dir: None,
            max_upload_mb: 5,
        }
    }

    #[test]
    fn test_parse_flag_accepts_truthy_spellings() {
        for raw in ["1", "true", "TRUE", "yes", "y", "On"] {
            assert!(parse_flag(raw), "{raw} should be truthy");
        }
        for raw in ["0", "false", "no", "off", "maybe"] {
            assert!(!parse_flag(raw), "{raw} should be falsy");
        }
    }

    #[test]
    fn test_validate_rejects_unknown_scoring_version() {
        let mut config = base_config();
        config.scoring_version = "v9".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_reports_rubric_error() {
        let mut config = base_config();
        config.scoring_version = "v9".to_string();
        let err = config.validate().unwrap_err();
        assert!(format!("{err:#}").contains("Unknown rubric version 'v9'"), "{err:#}");
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_gateway_settings_carry_timeouts_and_cache() {
        let settings = base_config().gateway_settings();
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.cache_ttl, Duration::from_secs(86_400));
        assert_eq!(settings.retries, 2);
        assert!(settings.cache_enabled);
        assert!(settings.api_key.is_none());
    }

    #[test]
    fn test_max_upload_bytes() {
        assert_eq!(base_config().max_upload_bytes(), 5 * 1024 * 1024);
    }
}
