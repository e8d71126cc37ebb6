use std::fs;
use std::path::{Path, PathBuf};

use devrank_types::{ConfigError, LeaderboardConfig};
use validator::Validate;

use crate::utils::paths::get_data_dir;

const CONFIG_FILE: &str = "leaderboard_config.json";

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Load pipeline configuration from the data directory.
///
/// A missing file yields defaults; a present file must parse and validate.
pub fn load_config() -> Result<LeaderboardConfig, ConfigError> {
    let data_dir = get_data_dir()?;
    load_config_from(&config_path(&data_dir))
}

/// Load configuration from an explicit path.
pub fn load_config_from(path: &Path) -> Result<LeaderboardConfig, ConfigError> {
    if !path.exists() {
        return Ok(LeaderboardConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
        message: format!("Failed to read {}: {}", path.display(), e),
    })?;
    let config: LeaderboardConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::from_json_error(&e))?;

    validate(&config)?;
    Ok(config)
}

/// Save pipeline configuration to the data directory.
pub fn save_config(config: &LeaderboardConfig) -> Result<(), ConfigError> {
    let data_dir = get_data_dir()?;
    save_config_to(config, &config_path(&data_dir))
}

/// Save configuration to an explicit path.
pub fn save_config_to(config: &LeaderboardConfig, path: &Path) -> Result<(), ConfigError> {
    validate(config)?;

    let content =
        serde_json::to_string_pretty(config).map_err(|e| ConfigError::from_json_error(&e))?;

    // Atomic write
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, content).map_err(|e| ConfigError::from_io_error(&e))?;
    fs::rename(&temp_path, path).map_err(|e| ConfigError::from_io_error(&e))
}

fn validate(config: &LeaderboardConfig) -> Result<(), ConfigError> {
    config.validate().map_err(|errors| {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .or_else(|| errors.errors().keys().next().map(|k| k.to_string()))
            .unwrap_or_else(|| "config".to_string());
        ConfigError::ValidationError { field, message: errors.to_string() }
    })
}
