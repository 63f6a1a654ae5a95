//! Layered application configuration.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `./portfolio.toml`
//! 3. `PORTFOLIO_*` environment variables, with `__` separating sections
//!    (`PORTFOLIO_API_BASE`, `PORTFOLIO_LOADING__MINIMUM_MS`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the REST API, e.g. `https://api.example.com`.
    pub api_base: String,
    pub request_timeout_secs: u64,
    pub session: SessionConfig,
    pub loading: LoadingConfig,
    pub status: StatusConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Key the token is persisted under.
    pub token_key: String,
    /// File backing the persisted token.
    pub token_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Minimum time the overlay stays up after a navigation.
    pub minimum_ms: u64,
    /// Upper bound on waiting for a destination that never reports readiness.
    pub max_wait_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// How long a status message stays visible.
    pub duration_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:5000".to_string(),
            request_timeout_secs: 30,
            session: SessionConfig::default(),
            loading: LoadingConfig::default(),
            status: StatusConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_key: "adminToken".to_string(),
            token_file: dirs::data_dir()
                .map(|d| d.join("portfolio-admin").join("session.json"))
                .unwrap_or_else(|| PathBuf::from(".portfolio-session.json")),
        }
    }
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            minimum_ms: 1000,
            max_wait_ms: 10_000,
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self { duration_ms: 3000 }
    }
}

impl AppConfig {
    /// Base URL without a trailing slash, ready for `{base}{endpoint}`.
    pub fn api_base(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl LoadingConfig {
    pub fn minimum(&self) -> Duration {
        Duration::from_millis(self.minimum_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

impl StatusConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Load configuration from `./portfolio.toml` with env var overrides.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    Ok(base_figment()
        .merge(Toml::file("portfolio.toml"))
        .merge(env_provider())
        .extract()?)
}

/// Load configuration from an explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    Ok(base_figment()
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()?)
}

/// Defaults plus an inline TOML document, nothing else. Used by tests.
pub fn load_config_from_str(toml_content: &str) -> Result<AppConfig, ConfigError> {
    Ok(base_figment().merge(Toml::string(toml_content)).extract()?)
}

fn base_figment() -> Figment {
    Figment::new().merge(Serialized::defaults(AppConfig::default()))
}

fn env_provider() -> Env {
    Env::prefixed("PORTFOLIO_").split("__")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_site() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.session.token_key, "adminToken");
        assert_eq!(config.loading.minimum(), Duration::from_secs(1));
        assert_eq!(config.status.duration(), Duration::from_secs(3));
    }

    #[test]
    fn file_values_override_defaults() {
        let config = load_config_from_str(
            r#"
            api_base = "https://api.example.com/"

            [loading]
            minimum_ms = 800

            [session]
            token_file = "/tmp/token.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base(), "https://api.example.com");
        assert_eq!(config.loading.minimum_ms, 800);
        assert_eq!(config.loading.max_wait_ms, 10_000);
        assert_eq!(config.session.token_file, PathBuf::from("/tmp/token.json"));
        assert_eq!(config.session.token_key, "adminToken");
    }

    #[test]
    fn rejects_wrong_types() {
        let err = load_config_from_str("request_timeout_secs = \"soon\"");
        assert!(err.is_err());
    }
}
