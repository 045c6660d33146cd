use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::types::GantryConfig;
use crate::errors::ConfigError;

/// Default location of the user config file.
///
/// Falls back to the system temp directory when no home directory can be
/// resolved (matching what the rest of the tool does for its state dir).
pub fn default_config_path() -> PathBuf {
    let base = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
    base.join(".gantry").join("config.toml")
}

/// Load configuration from the default path.
///
/// A missing file is not an error: it yields `GantryConfig::default()`.
/// A present-but-invalid file is an error so misconfiguration is never
/// silently ignored.
pub fn load_config() -> Result<GantryConfig, ConfigError> {
    load_config_from(&default_config_path())
}

/// Load configuration from an explicit path.
pub fn load_config_from(path: &Path) -> Result<GantryConfig, ConfigError> {
    if !path.exists() {
        debug!(
            event = "config.load.missing_file",
            path = %path.display(),
            "No config file, using defaults"
        );
        return Ok(GantryConfig::default());
    }

    let raw = std::fs::read_to_string(path)?;
    let config: GantryConfig =
        toml::from_str(&raw).map_err(|e| ConfigError::ConfigParseError {
            message: e.to_string(),
        })?;

    if config.terminal.scrollback_lines == 0 {
        warn!(
            event = "config.load.zero_scrollback",
            "scrollback_lines = 0 is clamped to 1 line of scrollback"
        );
    }

    debug!(event = "config.load.loaded", path = %path.display());
    Ok(config)
}
