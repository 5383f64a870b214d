//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! section and field has a default, so a missing file still yields a
//! runnable config. Secrets (the agent token) are referenced by env-var name
//! and resolved at runtime.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::engine::{ScheduleConfig, DEFAULT_SCAN_PROMPT};
use crate::types::DeckError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub dashboard: DashboardConfig,
    pub agent: AgentConfig,
    pub scanner: ScannerConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl DashboardConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, DeckError> {
        let ip: IpAddr = self
            .bind
            .trim()
            .parse()
            .map_err(|_| DeckError::Config(format!("invalid dashboard.bind address: {}", self.bind)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    /// Endpoint that accepts `{prompt, state}` POSTs.
    pub url: String,
    /// Name of the env var holding the bearer token, if any.
    pub token_env: Option<String>,
    pub timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8000/agent".to_string(),
            token_env: Some("FORTUNE_AGENT_TOKEN".to_string()),
            timeout_secs: 120,
        }
    }
}

impl AgentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// The bearer token, when `token_env` names a set, non-empty variable.
    pub fn token(&self) -> Option<SecretString> {
        let name = self.token_env.as_deref()?;
        match AppConfig::resolve_env(name) {
            Ok(v) if !v.trim().is_empty() => Some(SecretString::new(v)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScannerConfig {
    pub enabled: bool,
    pub initial_delay_secs: u64,
    pub interval_secs: u64,
    pub prompt: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        let schedule = ScheduleConfig::default();
        Self {
            enabled: true,
            initial_delay_secs: schedule.initial_delay.as_secs(),
            interval_secs: schedule.interval.as_secs(),
            prompt: DEFAULT_SCAN_PROMPT.to_string(),
        }
    }
}

impl ScannerConfig {
    pub fn schedule(&self) -> ScheduleConfig {
        ScheduleConfig {
            initial_delay: Duration::from_secs(self.initial_delay_secs),
            interval: Duration::from_secs(self.interval_secs.max(1)),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file. A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read config file: {}", path.display()))
            }
        };
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), DeckError> {
        self.dashboard.socket_addr()?;
        let url = self.agent.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(DeckError::Config(format!("agent.url must be http(s): {url}")));
        }
        Ok(())
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name).with_context(|| format!("Environment variable not set: {env_name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.dashboard.port, 8080);
        assert!(cfg.scanner.enabled);
        assert_eq!(cfg.scanner.schedule(), ScheduleConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let cfg = AppConfig::from_toml(
            r#"
            [dashboard]
            port = 9000

            [scanner]
            interval_secs = 60
            prompt = "Look for edges"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.dashboard.port, 9000);
        assert_eq!(cfg.dashboard.bind, "127.0.0.1");
        assert_eq!(cfg.scanner.initial_delay_secs, 2);
        assert_eq!(cfg.scanner.schedule().interval, Duration::from_secs(60));
        assert_eq!(cfg.scanner.prompt, "Look for edges");
        assert_eq!(cfg.agent.timeout_secs, 120);
    }

    #[test]
    fn test_invalid_bind_rejected() {
        let err = AppConfig::from_toml("[dashboard]\nbind = \"not an ip\"").unwrap_err();
        assert!(err.to_string().contains("dashboard.bind"));
    }

    #[test]
    fn test_invalid_agent_url_rejected() {
        let err = AppConfig::from_toml("[agent]\nurl = \"ftp://x\"").unwrap_err();
        assert!(err.to_string().contains("agent.url"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let cfg = AppConfig::load("definitely/not/here/config.toml").unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_socket_addr() {
        let cfg = DashboardConfig {
            bind: "0.0.0.0".into(),
            port: 3000,
        };
        assert_eq!(cfg.socket_addr().unwrap().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_token_from_env() {
        std::env::set_var("FORTUNE_TEST_TOKEN_PRESENT", "s3cret");
        let cfg = AgentConfig {
            token_env: Some("FORTUNE_TEST_TOKEN_PRESENT".into()),
            ..Default::default()
        };
        assert_eq!(cfg.token().unwrap().expose_secret(), "s3cret");

        let cfg = AgentConfig {
            token_env: Some("FORTUNE_TEST_TOKEN_ABSENT".into()),
            ..Default::default()
        };
        assert!(cfg.token().is_none());
    }

    #[test]
    fn test_zero_interval_clamped() {
        let cfg = ScannerConfig {
            interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(cfg.schedule().interval, Duration::from_secs(1));
    }
}
