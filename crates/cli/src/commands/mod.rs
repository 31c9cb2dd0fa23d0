pub mod assist;
pub mod config_cmd;
pub mod inspect;
pub mod render;
pub mod serve;

use std::path::{Path, PathBuf};

use panelforge_config::{AppConfig, ConfigError};

/// The explicit `--config` file, or the default location.
pub fn config_file(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => {
            let mut config = AppConfig::load_from(path)?;
            config.apply_env();
            config.validate()?;
            Ok(config)
        }
        None => AppConfig::load(),
    }
}

pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    load(path).map_err(|e| format!("Failed to load config: {e}").into())
}
