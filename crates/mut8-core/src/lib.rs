//! mut8 Core - preset blending and categorized generation
//!
//! ```text
//! Taxonomy::load ──▶ Generator::generate ──▶ blend_pair ──▶ resolve_in_dir ──▶ save_new
//!   (once)              (per request)         (numeric)       (naming)         (single write)
//! ```

pub mod blend;
pub mod config;
pub mod error;
pub mod generator;
pub mod naming;
pub mod preset;
pub mod taxonomy;

pub use blend::{
    blend, blend_pair, blend_weighted, interpolate_pair, normalize_weights, Blend, BlendReport,
    ParameterOutcome, WeightedSource,
};
pub use error::{PresetError, PresetResult};
pub use generator::{GeneratedPreset, Generator, OverrideRegistry, OverrideRule};
pub use preset::{Parameter, ParameterIssue, PresetRecord};
pub use taxonomy::{CatalogEntry, LoadSkip, Taxonomy};
