//! Engine settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Factory presets root of the host application
pub const DEFAULT_PRESETS_ROOT: &str = "/Library/Application Support/Minimal/Current/SubPresets/";

/// Categories never offered for generation (no compatible default template)
pub const DEFAULT_EXCLUDED_CATEGORIES: &[&str] = &[
    "Effect Rack",
    "Curve Shapes",
    "Chord Bank",
    "Rift Distortion",
    "Morph EQ",
];

/// Engine configuration (stored as YAML)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mut8Config {
    /// Root holding `<category>/<condition>/*.xml`
    pub presets_root: PathBuf,
    /// Category folder names skipped by the taxonomy loader
    pub excluded_categories: Vec<String>,
}

impl Default for Mut8Config {
    fn default() -> Self {
        Self {
            presets_root: PathBuf::from(DEFAULT_PRESETS_ROOT),
            excluded_categories: DEFAULT_EXCLUDED_CATEGORIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Mut8Config = serde_yaml::from_str("presets_root: /data/presets\n").unwrap();
        assert_eq!(config.presets_root, PathBuf::from("/data/presets"));
        assert_eq!(config.excluded_categories.len(), DEFAULT_EXCLUDED_CATEGORIES.len());
        assert!(config.excluded_categories.contains(&"Morph EQ".to_string()));
    }
}
