//! Path utilities for the mut8 configuration file

use std::path::PathBuf;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "MUT8_CONFIG";

/// Get the default config file path
///
/// Returns: `<config dir>/mut8/config.yaml` (e.g. `~/.config/mut8/config.yaml`)
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mut8")
        .join("config.yaml")
}

/// Config path from `MUT8_CONFIG`, falling back to the default
pub fn config_path_from_env() -> PathBuf {
    std::env::var_os(CONFIG_ENV_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}
