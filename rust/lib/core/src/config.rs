use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConsoleError;

/// Console engine configuration.
///
/// Loaded from a TOML file. Every field has a default so an absent file is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Directory holding the local persisted state.
    pub data_dir: Option<PathBuf>,

    /// Path to the redb file backing the local key-value store.
    /// Defaults to `{data_dir}/console.redb` if not specified.
    pub db_path: Option<PathBuf>,

    /// Initial UI locale.
    pub locale: String,

    /// Base URL of the remote API (used when `use_mock` is false).
    pub api_base_url: String,

    /// Serve data from the built-in mock collaborator.
    pub use_mock: bool,

    /// Simulated latency of the mock collaborator, in milliseconds.
    pub mock_delay_ms: u64,

    /// Default page size for list tables. `0` disables pagination.
    pub page_size: usize,

    /// Allow switching the session role from the header (development aid).
    pub dev_role_switch: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            db_path: None,
            locale: "zh-CN".to_string(),
            api_base_url: String::new(),
            use_mock: true,
            mock_delay_ms: 400,
            page_size: 20,
            dev_role_switch: true,
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from a TOML file, or return defaults if the file
    /// doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ConsoleError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConsoleError::Config(format!("read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConsoleError> {
        toml::from_str(content).map_err(|e| ConsoleError::Config(e.to_string()))
    }

    /// Resolve the redb database path, falling back to `{data_dir}/console.redb`.
    pub fn resolve_db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(|| {
            self.data_dir
                .as_ref()
                .map(|d| d.join("console.redb"))
                .unwrap_or_else(|| PathBuf::from("console.redb"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ConsoleConfig::default();
        assert_eq!(config.locale, "zh-CN");
        assert!(config.use_mock);
        assert_eq!(config.page_size, 20);
        assert_eq!(config.resolve_db_path(), PathBuf::from("console.redb"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ConsoleConfig::from_toml(
            r#"
locale = "en-US"
data_dir = "/var/lib/opsconsole"
"#,
        )
        .unwrap();
        assert_eq!(config.locale, "en-US");
        assert_eq!(config.mock_delay_ms, 400);
        assert_eq!(
            config.resolve_db_path(),
            PathBuf::from("/var/lib/opsconsole/console.redb")
        );
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = ConsoleConfig::from_toml("page_size = \"many\"").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConsoleConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.page_size, 20);
    }
}
