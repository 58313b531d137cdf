//! CLI configuration: `~/.opsconsole/config.toml`.
//!
//! The file holds a plain [`ConsoleConfig`]. When it names no data
//! directory, state lives next to it in `~/.opsconsole`.

use std::path::{Path, PathBuf};

use opsconsole_core::ConsoleConfig;

/// Default config file path: ~/.opsconsole/config.toml.
pub fn default_path() -> PathBuf {
    dirs_path().join("config.toml")
}

/// Command-line settings that win over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub data_dir: Option<String>,
    pub api: Option<String>,
    pub locale: Option<String>,
}

/// Load config from disk, or defaults if the file doesn't exist, then
/// apply command-line overrides.
pub fn load(path: &Path, overrides: Overrides) -> anyhow::Result<ConsoleConfig> {
    let mut config = ConsoleConfig::load(path)?;
    if let Some(dir) = overrides.data_dir {
        config.data_dir = Some(PathBuf::from(dir));
        config.db_path = None;
    }
    if let Some(api) = overrides.api {
        config.api_base_url = api;
        config.use_mock = false;
    }
    if let Some(locale) = overrides.locale {
        config.locale = locale;
    }
    if config.data_dir.is_none() && config.db_path.is_none() {
        config.data_dir = Some(
            path.parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(dirs_path),
        );
    }
    Ok(config)
}

/// Return the console config directory (~/.opsconsole).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".opsconsole")
}
