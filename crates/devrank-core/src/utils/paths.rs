use std::fs;
use std::path::PathBuf;

use devrank_types::ConfigError;

const DATA_DIR: &str = ".devrank";

/// Get data directory path.
///
/// Priority:
/// 1. `DEVRANK_DATA_DIR` environment variable
/// 2. `~/.devrank`
pub fn get_data_dir() -> Result<PathBuf, ConfigError> {
    let data_dir = if let Ok(custom_dir) = std::env::var("DEVRANK_DATA_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = dirs::home_dir().ok_or_else(|| ConfigError::DataDir {
            message: "Cannot get home directory".to_string(),
        })?;
        home.join(DATA_DIR)
    };

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir).map_err(|e| ConfigError::DataDir {
            message: format!("Failed to create data directory: {}", e),
        })?;
    }

    Ok(data_dir)
}
