//! Configuration Management
//!
//! Resolves the Boost API host and token from the command line, the
//! persistent config file and the environment, in that order.

use crate::error::{Error, MissingSetting, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable holding the API endpoint
pub const HOST_ENV: &str = "BOOST_HOST";
/// Environment variable holding the API token
pub const TOKEN_ENV: &str = "BOOST_TOKEN";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// GraphQL endpoint of the Boost API
    #[serde(default)]
    pub host: Option<String>,
    /// API token
    #[serde(default)]
    pub token: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("boostsec").join("config.json"))
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from disk, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unparsable config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Layer `other` on top of this config, keeping our values where `other` has none
    pub fn overridden_by(self, other: Config) -> Config {
        Config {
            host: other.host.or(self.host),
            token: other.token.or(self.token),
        }
    }
}

/// Resolved connection settings
#[derive(Clone)]
pub struct Settings {
    pub host: Url,
    pub token: String,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("host", &self.host.as_str())
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl Settings {
    /// Merge explicit configuration with the process environment
    pub fn resolve(explicit: &Config) -> Result<Self> {
        Self::from_sources(explicit, |key| std::env::var(key).ok())
    }

    /// Merge explicit configuration with an environment lookup
    ///
    /// Explicit values win. Empty strings count as unset. Every missing
    /// setting is reported at once.
    pub fn from_sources(explicit: &Config, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let pick = |value: &Option<String>, key: &str| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .or_else(|| env(key).filter(|v| !v.is_empty()))
        };

        let host = pick(&explicit.host, HOST_ENV);
        let token = pick(&explicit.token, TOKEN_ENV);

        let mut missing = Vec::new();
        if host.is_none() {
            missing.push(MissingSetting::Host);
        }
        if token.is_none() {
            missing.push(MissingSetting::Token);
        }

        let (Some(host), Some(token)) = (host, token) else {
            return Err(Error::MissingConfig(missing));
        };

        let url = Url::parse(&host).map_err(|source| Error::InvalidHost {
            host: host.clone(),
            source,
        })?;

        Ok(Self { host: url, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_explicit_config_wins_over_env() {
        let explicit = Config {
            host: Some("https://api.example.com/graphql".to_string()),
            token: None,
        };
        let env = env_of(&[
            (HOST_ENV, "https://env.example.com/graphql"),
            (TOKEN_ENV, "env-token"),
        ]);

        let settings = Settings::from_sources(&explicit, env).unwrap();
        assert_eq!(settings.host.as_str(), "https://api.example.com/graphql");
        assert_eq!(settings.token, "env-token");
    }

    #[test]
    fn test_empty_values_fall_back_to_env() {
        let explicit = Config {
            host: Some(String::new()),
            token: Some(String::new()),
        };
        let env = env_of(&[(HOST_ENV, "https://env.example.com"), (TOKEN_ENV, "t")]);

        let settings = Settings::from_sources(&explicit, env).unwrap();
        assert_eq!(settings.host.host_str(), Some("env.example.com"));
    }

    #[test]
    fn test_missing_both_reports_both() {
        let err = Settings::from_sources(&Config::default(), env_of(&[])).unwrap_err();
        match err {
            Error::MissingConfig(missing) => {
                assert_eq!(missing, vec![MissingSetting::Host, MissingSetting::Token]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_host_rejected() {
        let explicit = Config {
            host: Some("not a url".to_string()),
            token: Some("t".to_string()),
        };
        let err = Settings::from_sources(&explicit, env_of(&[])).unwrap_err();
        assert!(matches!(err, Error::InvalidHost { .. }));
    }

    #[test]
    fn test_debug_redacts_token() {
        let explicit = Config {
            host: Some("https://api.example.com".to_string()),
            token: Some("super-secret".to_string()),
        };
        let settings = Settings::from_sources(&explicit, env_of(&[])).unwrap();
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn test_load_from_file_and_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"host": "https://file.example.com", "token": "file-token"}"#)
            .unwrap();

        let file = Config::load_from(&path);
        assert_eq!(file.token.as_deref(), Some("file-token"));

        let merged = file.overridden_by(Config {
            host: None,
            token: Some("cli-token".to_string()),
        });
        assert_eq!(merged.host.as_deref(), Some("https://file.example.com"));
        assert_eq!(merged.token.as_deref(), Some("cli-token"));
    }

    #[test]
    fn test_unparsable_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let config = Config::load_from(&path);
        assert!(config.host.is_none());
        assert!(config.token.is_none());
    }
}
