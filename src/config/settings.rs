//! Server settings loaded from the environment.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{DEFAULT_LOCKOUT_SECS, DEFAULT_MAX_LOGIN_ATTEMPTS};

/// Runtime settings for the HTTP backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the categories JSON document.
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Shared admin password.
    #[serde(skip_serializing)]
    pub admin_password: String,

    /// Telegram user ids allowed to modify the catalog.
    pub allowed_admin_ids: Vec<i64>,

    /// Failed logins tolerated before a user id is locked out.
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,

    /// Lockout window in seconds.
    #[serde(default = "default_lockout_secs")]
    pub lockout_secs: u64,
}

fn default_port() -> u16 {
    8000
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/posts.json")
}

fn default_max_login_attempts() -> u32 {
    DEFAULT_MAX_LOGIN_ATTEMPTS
}

fn default_lockout_secs() -> u64 {
    DEFAULT_LOCKOUT_SECS
}

impl ServerSettings {
    /// Creates settings with defaults for everything except the credentials.
    #[must_use]
    pub fn new(admin_password: String, allowed_admin_ids: Vec<i64>) -> Self {
        Self {
            port: default_port(),
            data_path: default_data_path(),
            admin_password,
            allowed_admin_ids,
            max_login_attempts: default_max_login_attempts(),
            lockout_secs: default_lockout_secs(),
        }
    }

    /// Creates settings from environment variables.
    ///
    /// Expects `ADMIN_PASSWORD` and `ALLOWED_ADMIN_IDS` to be set; `PORT`,
    /// `DATA_PATH`, `MAX_LOGIN_ATTEMPTS` and `LOCKOUT_SECS` fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or any value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let admin_password = lookup("ADMIN_PASSWORD")
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingEnvVar("ADMIN_PASSWORD"))?;

        let allowed_admin_ids = parse_admin_ids(
            &lookup("ALLOWED_ADMIN_IDS").ok_or(ConfigError::MissingEnvVar("ALLOWED_ADMIN_IDS"))?,
        )?;

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: raw,
            })?,
            None => default_port(),
        };

        let max_login_attempts = match lookup("MAX_LOGIN_ATTEMPTS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "MAX_LOGIN_ATTEMPTS",
                        value: raw,
                    });
                }
            },
            None => default_max_login_attempts(),
        };

        let lockout_secs = match lookup("LOCKOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "LOCKOUT_SECS",
                value: raw,
            })?,
            None => default_lockout_secs(),
        };

        Ok(Self {
            port,
            data_path: lookup("DATA_PATH").map_or_else(default_data_path, PathBuf::from),
            admin_password,
            allowed_admin_ids,
            max_login_attempts,
            lockout_secs,
        })
    }

    /// Returns the lockout window as a [`Duration`].
    #[must_use]
    pub const fn lockout_window(&self) -> Duration {
        Duration::from_secs(self.lockout_secs)
    }
}

/// Parses a comma-separated list of Telegram user ids.
fn parse_admin_ids(raw: &str) -> Result<Vec<i64>, ConfigError> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().map_err(|_| ConfigError::InvalidAdminId(s.to_owned())))
        .collect::<Result<Vec<_>, _>>()?;

    if ids.is_empty() {
        return Err(ConfigError::NoAdmins);
    }

    Ok(ids)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid admin id '{0}' (must be a numeric Telegram user id)")]
    InvalidAdminId(String),

    #[error("ALLOWED_ADMIN_IDS must list at least one user id")]
    NoAdmins,

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let settings = ServerSettings::from_lookup(lookup_from(&[
            ("ADMIN_PASSWORD", "secret"),
            ("ALLOWED_ADMIN_IDS", "959805916"),
        ]))
        .unwrap();

        assert_eq!(settings.port, 8000);
        assert_eq!(settings.data_path, PathBuf::from("data/posts.json"));
        assert_eq!(settings.allowed_admin_ids, vec![959_805_916]);
        assert_eq!(settings.max_login_attempts, 5);
        assert_eq!(settings.lockout_window(), Duration::from_secs(300));
    }

    #[test]
    fn test_overrides() {
        let settings = ServerSettings::from_lookup(lookup_from(&[
            ("ADMIN_PASSWORD", "secret"),
            ("ALLOWED_ADMIN_IDS", " 1, 2 ,3,"),
            ("PORT", "9090"),
            ("DATA_PATH", "/tmp/posts.json"),
            ("MAX_LOGIN_ATTEMPTS", "3"),
            ("LOCKOUT_SECS", "60"),
        ]))
        .unwrap();

        assert_eq!(settings.port, 9090);
        assert_eq!(settings.data_path, PathBuf::from("/tmp/posts.json"));
        assert_eq!(settings.allowed_admin_ids, vec![1, 2, 3]);
        assert_eq!(settings.max_login_attempts, 3);
        assert_eq!(settings.lockout_secs, 60);
    }

    #[test]
    fn test_missing_password() {
        let result = ServerSettings::from_lookup(lookup_from(&[("ALLOWED_ADMIN_IDS", "1")]));
        assert!(matches!(result, Err(ConfigError::MissingEnvVar("ADMIN_PASSWORD"))));
    }

    #[test]
    fn test_invalid_admin_id() {
        let result = ServerSettings::from_lookup(lookup_from(&[
            ("ADMIN_PASSWORD", "secret"),
            ("ALLOWED_ADMIN_IDS", "12,abc"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidAdminId(id)) if id == "abc"));
    }

    #[test]
    fn test_empty_admin_list() {
        let result = ServerSettings::from_lookup(lookup_from(&[
            ("ADMIN_PASSWORD", "secret"),
            ("ALLOWED_ADMIN_IDS", " , "),
        ]));
        assert!(matches!(result, Err(ConfigError::NoAdmins)));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let result = ServerSettings::from_lookup(lookup_from(&[
            ("ADMIN_PASSWORD", "secret"),
            ("ALLOWED_ADMIN_IDS", "1"),
            ("MAX_LOGIN_ATTEMPTS", "0"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { key: "MAX_LOGIN_ATTEMPTS", .. })));
    }

    #[test]
    fn test_new_uses_defaults() {
        let settings = ServerSettings::new("secret".to_owned(), vec![42]);
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.allowed_admin_ids, vec![42]);
        assert_eq!(settings.lockout_secs, 300);
    }
}
