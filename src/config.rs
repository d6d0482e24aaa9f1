//! Session and collaborator tuning.
//!
//! Values come from defaults, optionally a JSON file, and finally `BOOKFLOW_*`
//! environment variables.

use crate::error::ConfigError;
use crate::services::CallPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_RESET_DELAY_MS: &str = "BOOKFLOW_RESET_DELAY_MS";
pub const ENV_MOCK_DELAY_MS: &str = "BOOKFLOW_MOCK_DELAY_MS";
pub const ENV_CALL_TIMEOUT_MS: &str = "BOOKFLOW_CALL_TIMEOUT_MS";
pub const ENV_MAX_RETRIES: &str = "BOOKFLOW_MAX_RETRIES";
pub const ENV_RETRY_BACKOFF_MS: &str = "BOOKFLOW_RETRY_BACKOFF_MS";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct BookflowConfig {
    pub session: SessionConfig,
    pub services: ServiceConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// How long the closing animation runs before the draft is discarded.
    pub reset_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reset_delay_ms: 300,
        }
    }
}

impl SessionConfig {
    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Simulated latency of every mock collaborator call.
    pub mock_delay_ms: u64,
    pub call_timeout_ms: u64,
    pub max_retries: u32,
    /// Multiplied by the attempt number between retries.
    pub retry_backoff_ms: u64,
    /// The only code the mock verification service accepts.
    pub verification_code: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            mock_delay_ms: 400,
            call_timeout_ms: 5_000,
            max_retries: 2,
            retry_backoff_ms: 250,
            verification_code: "123456".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn mock_delay(&self) -> Duration {
        Duration::from_millis(self.mock_delay_ms)
    }

    pub fn policy(&self) -> CallPolicy {
        CallPolicy::new(
            Duration::from_millis(self.call_timeout_ms),
            self.max_retries,
            Duration::from_millis(self.retry_backoff_ms),
        )
    }
}

impl BookflowConfig {
    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Defaults with the process environment applied on top.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `BOOKFLOW_*` overrides, reading each variable through `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = parse_var(&lookup, ENV_RESET_DELAY_MS)? {
            self.session.reset_delay_ms = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_MOCK_DELAY_MS)? {
            self.services.mock_delay_ms = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_CALL_TIMEOUT_MS)? {
            self.services.call_timeout_ms = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_MAX_RETRIES)? {
            self.services.max_retries = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_RETRY_BACKOFF_MS)? {
            self.services.retry_backoff_ms = value;
        }
        Ok(self)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: AHashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = BookflowConfig::default();
        assert_eq!(config.session.reset_delay(), Duration::from_millis(300));
        assert_eq!(config.services.call_timeout_ms, 5_000);
        assert_eq!(config.services.max_retries, 2);
        assert_eq!(config.services.retry_backoff_ms, 250);
        assert_eq!(config.services.verification_code, "123456");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = BookflowConfig::from_json(r#"{ "services": { "max_retries": 5 } }"#).unwrap();
        assert_eq!(config.services.max_retries, 5);
        assert_eq!(config.services.call_timeout_ms, 5_000);
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn env_overrides_apply() {
        let config = BookflowConfig::default()
            .with_env_overrides(env(&[
                (ENV_RESET_DELAY_MS, "0"),
                (ENV_MAX_RETRIES, " 4 "),
            ]))
            .unwrap();
        assert_eq!(config.session.reset_delay_ms, 0);
        assert_eq!(config.services.max_retries, 4);
        assert_eq!(config.services.mock_delay_ms, 400);
    }

    #[test]
    fn bad_env_value_is_reported() {
        let err = BookflowConfig::default()
            .with_env_overrides(env(&[(ENV_CALL_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_CALL_TIMEOUT_MS.to_string(),
                value: "soon".to_string(),
            }
        );
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let err = BookflowConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
