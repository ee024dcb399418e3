//! Runtime configuration.
//!
//! Settings come from three places, later ones winning:
//!
//! 1. built-in defaults,
//! 2. an optional TOML file,
//! 3. `AUTHLINE_*` environment variables.
//!
//! ```toml
//! api_url = "https://auth.example.com"
//! token_key = "authline_token"
//! token_dir = "/var/lib/myapp"
//! timeout_secs = 30
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TOKEN_KEY: &str = "authline_token";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_API_URL: &str = "AUTHLINE_API_URL";
const ENV_TOKEN_KEY: &str = "AUTHLINE_TOKEN_KEY";
const ENV_TOKEN_DIR: &str = "AUTHLINE_TOKEN_DIR";
const ENV_TIMEOUT_SECS: &str = "AUTHLINE_TIMEOUT_SECS";

/// Where the auth service lives and where the token is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthlineConfig {
    /// Base URL of the auth service; endpoint paths are appended to it.
    pub api_url: String,
    /// Name of the persisted token entry.
    pub token_key: String,
    /// Directory for the token file. `None` → the platform config dir.
    pub token_dir: Option<PathBuf>,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for AuthlineConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            token_dir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AuthlineConfig {
    /// Defaults, then `file` if given, then the environment; validated.
    ///
    /// # Errors
    /// - [`ConfigError::Read`] / [`ConfigError::Parse`] if `file` is
    ///   given but unreadable or not valid TOML
    /// - [`ConfigError::InvalidValue`] if any resulting setting is unusable
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file. Missing keys keep their defaults. Not validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `AUTHLINE_*` overrides fetched through `lookup`.
    ///
    /// Empty values are ignored so an exported-but-blank variable doesn't
    /// wipe a setting.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = var(ENV_API_URL) {
            self.api_url = url.trim().to_string();
        }
        if let Some(key) = var(ENV_TOKEN_KEY) {
            self.token_key = key.trim().to_string();
        }
        if let Some(dir) = var(ENV_TOKEN_DIR) {
            self.token_dir = Some(PathBuf::from(dir));
        }
        if let Some(secs) = var(ENV_TIMEOUT_SECS) {
            self.timeout_secs = secs.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "timeout_secs",
                reason: format!("{ENV_TIMEOUT_SECS}={secs:?}: {e}"),
            })?;
        }
        Ok(())
    }

    /// Checks the settings without touching the network or the disk.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "api_url",
                reason: format!("{url:?} must start with http:// or https://"),
            });
        }
        if self.token_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "token_key",
                reason: "must not be empty".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AuthlineConfig::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.token_key, "authline_token");
        assert_eq!(config.token_dir, None);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        config.validate().unwrap();
    }

    #[test]
    fn test_from_file_partial_keeps_defaults() {
        let file = write_config("api_url = \"https://auth.example.com\"\n");
        let config = AuthlineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api_url, "https://auth.example.com");
        assert_eq!(config.token_key, DEFAULT_TOKEN_KEY);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_from_file_all_keys() {
        let file = write_config(
            r#"
api_url = "https://auth.example.com/api"
token_key = "myapp_token"
token_dir = "/tmp/myapp"
timeout_secs = 5
"#,
        );
        let config = AuthlineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.token_key, "myapp_token");
        assert_eq!(config.token_dir, Some(PathBuf::from("/tmp/myapp")));
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = AuthlineConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_from_file_bad_toml() {
        let file = write_config("api_url = \n");
        let err = AuthlineConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_from_file_wrong_type() {
        let file = write_config("timeout_secs = \"soon\"\n");
        let err = AuthlineConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides_win() {
        let mut config = AuthlineConfig::default();
        config
            .apply_overrides(lookup(&[
                ("AUTHLINE_API_URL", "https://override.example.com"),
                ("AUTHLINE_TOKEN_KEY", "other"),
                ("AUTHLINE_TOKEN_DIR", "/srv/tokens"),
                ("AUTHLINE_TIMEOUT_SECS", " 12 "),
            ]))
            .unwrap();

        assert_eq!(config.api_url, "https://override.example.com");
        assert_eq!(config.token_key, "other");
        assert_eq!(config.token_dir, Some(PathBuf::from("/srv/tokens")));
        assert_eq!(config.timeout_secs, 12);
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let mut config = AuthlineConfig::default();
        config
            .apply_overrides(lookup(&[("AUTHLINE_API_URL", "  ")]))
            .unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_bad_timeout_override() {
        let mut config = AuthlineConfig::default();
        let err = config
            .apply_overrides(lookup(&[("AUTHLINE_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "timeout_secs",
                ..
            }
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = AuthlineConfig {
            api_url: "localhost:8000".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key: "api_url", .. })
        ));

        let config = AuthlineConfig {
            token_key: " ".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                key: "token_key",
                ..
            })
        ));

        let config = AuthlineConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                key: "timeout_secs",
                ..
            })
        ));
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = AuthlineConfig {
            token_dir: Some(PathBuf::from("/tmp/tokens")),
            ..Default::default()
        };
        let text = toml::to_string(&config).unwrap();
        let back: AuthlineConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
