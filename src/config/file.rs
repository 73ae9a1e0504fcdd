//! Configuration file loading.

use crate::config::types::{ConfigError, ToolstepConfig};
use std::path::{Path, PathBuf};

/// Project-local configuration file name.
const LOCAL_CONFIG_NAME: &str = "toolstep.toml";

/// File name within the user config directory.
const USER_CONFIG_NAME: &str = "config.toml";

/// Application directory name.
const APP_NAME: &str = "toolstep";

/// Loads configuration from the first file found on [`search_paths`].
///
/// Returns the defaults if no file exists.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read, parsed or
/// validated.
pub fn load() -> Result<ToolstepConfig, ConfigError> {
    match search_paths().into_iter().find(|path| path.exists()) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading configuration");
            from_path(&path)
        }
        None => Ok(ToolstepConfig::default()),
    }
}

/// Loads configuration from a specific file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn from_path(path: &Path) -> Result<ToolstepConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::read(path.display().to_string(), e.to_string()))?;

    from_str(&contents).map_err(|e| match e.kind {
        crate::config::ConfigErrorKind::Parse { reason } => {
            ConfigError::parse(format!("{}: {}", path.display(), reason))
        }
        _ => e,
    })
}

/// Parses and validates configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid, does not match the schema, or
/// holds an unusable value.
pub fn from_str(toml_str: &str) -> Result<ToolstepConfig, ConfigError> {
    let config: ToolstepConfig =
        toml::from_str(toml_str).map_err(|e| ConfigError::parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Returns the paths searched for configuration files, in order.
#[must_use]
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_NAME)];

    if let Some(dir) = config_dir() {
        paths.push(dir.join(USER_CONFIG_NAME));
    }

    paths
}

/// Returns the user config directory for toolstep, `~/.config/toolstep` on
/// most systems.
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_NAME))
}
