//! Client configuration.
//!
//! Settings come from a small JSON file (`~/.config/bullpen/config.json` on
//! most platforms, or the path in `BULLPEN_CONFIG_PATH`) with environment
//! overrides for the values that usually differ per shell.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use bullpen_util::expand_tilde;
use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use url::Url;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "BULLPEN_CONFIG_PATH";
/// Environment variable overriding the API base URL.
pub const API_BASE_ENV: &str = "BULLPEN_API_BASE";
/// Environment variable carrying the session cookie.
pub const SESSION_ENV: &str = "BULLPEN_SESSION";

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
/// Name used when the configured session value is a bare cookie value.
pub const DEFAULT_SESSION_COOKIE_NAME: &str = "connect.sid";

/// Hostnames allowed to use plain HTTP.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("poll_interval_ms must be greater than zero")]
    ZeroPollInterval,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Session cookie, either `name=value` or a bare value for `connect.sid`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
    /// Delay between assessment status polls.
    pub poll_interval_ms: u64,
    /// Extra attempts for reads that fail at the transport level.
    pub read_retries: u32,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_cookie: None,
            poll_interval_ms: 2_000,
            read_retries: 2,
            request_timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Load the config file (if any), apply environment overrides and validate.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_path(&default_config_path())
    }

    /// Like [`ClientConfig::load`] with an explicit file location.
    pub fn load_path(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides();
        validate_base_url(&config.base_url)?;
        if config.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(config)
    }

    /// Read a config file. A missing file yields defaults; an unparseable one
    /// is logged and also yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(config) => Ok(config),
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "Failed to parse client config; using defaults"
                    );
                    Ok(Self::default())
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(ConfigError::Io(error)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Some(base_url) = non_blank_env(API_BASE_ENV) {
            self.base_url = base_url;
        }
        if let Some(session) = non_blank_env(SESSION_ENV) {
            self.session_cookie = Some(session);
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The session cookie as a `name=value` pair.
    pub fn session_cookie_pair(&self) -> Option<String> {
        let raw = self.session_cookie.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.contains('=') {
            Some(raw.to_string())
        } else {
            Some(format!("{DEFAULT_SESSION_COOKIE_NAME}={raw}"))
        }
    }
}

/// Get the default path for the client configuration file.
pub fn default_config_path() -> PathBuf {
    if let Some(path) = non_blank_env(CONFIG_PATH_ENV) {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bullpen")
        .join("config.json")
}

fn non_blank_env(name: &str) -> Option<String> {
    env::var(name).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS, since the session cookie travels with every call
pub fn validate_base_url(base: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: base.to_string(),
        reason,
    };
    let parsed = Url::parse(base).map_err(|error| invalid(error.to_string()))?;
    let host_name = parsed.host_str().ok_or_else(|| invalid("URL must include a host".into()))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed.scheme() != "https" {
        return Err(invalid(format!(
            "must use https for non-localhost hosts; got '{}://'",
            parsed.scheme()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = ClientConfig::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.poll_interval(), Duration::from_millis(2_000));
    }

    #[test]
    fn unparseable_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(ClientConfig::load_from(&path).unwrap(), ClientConfig::default());
    }

    #[test]
    fn file_values_fill_in_over_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "base_url": "https://bullpen.example.com", "poll_interval_ms": 500 }"#).unwrap();

        temp_env::with_vars([(API_BASE_ENV, None::<&str>), (SESSION_ENV, None::<&str>)], || {
            let loaded = ClientConfig::load_path(&path).unwrap();
            assert_eq!(loaded.base_url, "https://bullpen.example.com");
            assert_eq!(loaded.poll_interval(), Duration::from_millis(500));
            assert_eq!(loaded.read_retries, 2);
        });
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "poll_interval_ms": 0 }"#).unwrap();

        temp_env::with_vars([(API_BASE_ENV, None::<&str>), (SESSION_ENV, None::<&str>)], || {
            assert!(matches!(ClientConfig::load_path(&path), Err(ConfigError::ZeroPollInterval)));
        });
    }

    #[test]
    fn environment_overrides_file_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "base_url": "https://file.example.com" }"#).unwrap();

        temp_env::with_vars(
            [
                (CONFIG_PATH_ENV, Some(path.to_str().unwrap())),
                (API_BASE_ENV, Some("http://127.0.0.1:5000")),
                (SESSION_ENV, Some("s%3Aabc")),
            ],
            || {
                let config = ClientConfig::load().unwrap();
                assert_eq!(config.base_url, "http://127.0.0.1:5000");
                assert_eq!(config.session_cookie_pair().as_deref(), Some("connect.sid=s%3Aabc"));
            },
        );
    }

    #[test]
    fn base_url_requires_https_off_localhost() {
        assert!(validate_base_url("http://localhost:5000").is_ok());
        assert!(validate_base_url("https://coach.example.com").is_ok());
        assert!(validate_base_url("http://coach.example.com").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn explicit_cookie_pairs_are_kept() {
        let config = ClientConfig {
            session_cookie: Some("sid=xyz".into()),
            ..Default::default()
        };
        assert_eq!(config.session_cookie_pair().as_deref(), Some("sid=xyz"));
    }
}
