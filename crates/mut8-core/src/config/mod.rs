//! Configuration for the preset engine
//!
//! - Generic YAML config loading/saving
//! - Default config location
//! - `Mut8Config`: presets root and excluded categories
//!
//! # Usage
//!
//! ```ignore
//! use mut8_core::config::{default_config_path, load_config, Mut8Config};
//!
//! let config: Mut8Config = load_config(&default_config_path());
//! let taxonomy = Taxonomy::load(&config.presets_root, &config.excluded_categories)?;
//! ```

mod io;
mod paths;
mod settings;

pub use io::{load_config, save_config};
pub use paths::{config_path_from_env, default_config_path, CONFIG_ENV_VAR};
pub use settings::{Mut8Config, DEFAULT_EXCLUDED_CATEGORIES, DEFAULT_PRESETS_ROOT};
