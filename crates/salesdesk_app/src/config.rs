//! Driver configuration loaded from a RON file.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use desk_logging::desk_info;
use salesdesk_core::ViewSettings;
use salesdesk_engine::BackendSettings;
use serde::{Deserialize, Serialize};

use crate::logging::LogDestination;

pub const CONFIG_FILENAME: &str = "salesdesk.ron";
pub const CONFIG_ENV_VAR: &str = "SALESDESK_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    /// Label prefixed to log lines for this operator session.
    pub operator: Option<String>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_response_bytes: u64,
    pub page_size: usize,
    pub page_step: usize,
    pub search_debounce_ms: u64,
    pub min_search_len: usize,
    pub log_destination: LogDestination,
    pub debug_logging: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let backend = BackendSettings::default();
        let view = ViewSettings::default();
        Self {
            base_url: backend.base_url,
            api_token: None,
            operator: None,
            connect_timeout_ms: backend.connect_timeout.as_millis() as u64,
            request_timeout_ms: backend.request_timeout.as_millis() as u64,
            max_response_bytes: backend.max_bytes,
            page_size: view.page_size,
            page_step: view.page_step,
            search_debounce_ms: view.search_debounce.as_millis() as u64,
            min_search_len: view.min_search_len,
            log_destination: LogDestination::File,
            debug_logging: false,
        }
    }
}

impl AppConfig {
    /// Loads from `$SALESDESK_CONFIG`, falling back to `./salesdesk.ron`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = resolve_path(std::env::var_os(CONFIG_ENV_VAR));
        Self::load_from(&path)
    }

    /// A missing file yields defaults; anything unreadable or malformed is
    /// an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                desk_info!("No config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: AppConfig = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        desk_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "page_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_response_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "max_response_bytes",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            base_url: self.base_url.clone(),
            api_token: self.api_token.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            max_bytes: self.max_response_bytes,
            ..BackendSettings::default()
        }
    }

    pub fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            page_size: self.page_size,
            page_step: self.page_step,
            search_debounce: Duration::from_millis(self.search_debounce_ms),
            min_search_len: self.min_search_len,
        }
    }
}

fn resolve_path(from_env: Option<OsString>) -> PathBuf {
    match from_env {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => PathBuf::from(CONFIG_FILENAME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.page_size, 25);
        assert_eq!(config.page_step, 25);
        assert_eq!(config.search_debounce_ms, 300);
        assert_eq!(config.min_search_len, 2);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"(
                base_url: "https://crm.test/api",
                api_token: Some("secret"),
                page_size: 50,
                log_destination: Both,
            )"#,
        );

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.base_url, "https://crm.test/api");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.page_size, 50);
        assert_eq!(config.page_step, 25);
        assert_eq!(config.log_destination, LogDestination::Both);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "(page_size: \"many\")");
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "(page_size: 0)");
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "page_size",
                ..
            }
        ));
    }

    #[test]
    fn settings_carry_config_values() {
        let config = AppConfig {
            request_timeout_ms: 1500,
            search_debounce_ms: 120,
            min_search_len: 3,
            ..AppConfig::default()
        };
        assert_eq!(
            config.backend_settings().request_timeout,
            Duration::from_millis(1500)
        );
        let view = config.view_settings();
        assert_eq!(view.search_debounce, Duration::from_millis(120));
        assert_eq!(view.min_search_len, 3);
    }

    #[test]
    fn env_override_wins_over_default_path() {
        assert_eq!(resolve_path(None), PathBuf::from(CONFIG_FILENAME));
        assert_eq!(resolve_path(Some(OsString::new())), PathBuf::from(CONFIG_FILENAME));
        assert_eq!(
            resolve_path(Some(OsString::from("/etc/salesdesk.ron"))),
            PathBuf::from("/etc/salesdesk.ron")
        );
    }
}
