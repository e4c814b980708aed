//! Collision-free output names
//!
//! Generated presets are named `<base>_<N>` with the lowest `N >= 1` not yet
//! taken. Directory lookups always read the directory at call time since
//! outputs accumulate between generations.

use std::collections::HashSet;
use std::path::Path;

use crate::error::PresetResult;

/// A resolved output name and its file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueName {
    pub name: String,
    pub file_name: String,
}

/// Base name for a categorized blend
pub fn generated_base_name(category: &str, condition: &str) -> String {
    format!("blended_{}_{}", category, condition)
}

/// Lowest `<base>_<N>` for which `is_taken` returns false
fn first_free(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    (1u64..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| format!("{}_{}", base, u64::MAX))
}

/// Resolve against a set of existing entry names
pub fn resolve_unique_name<'a>(base: &str, existing: impl IntoIterator<Item = &'a str>) -> String {
    let existing: HashSet<&str> = existing.into_iter().collect();
    first_free(base, |candidate| existing.contains(candidate))
}

/// Resolve against the files currently in `dir`
///
/// A missing directory counts as empty.
pub fn resolve_in_dir(dir: &Path, base: &str, extension: &str) -> PresetResult<UniqueName> {
    let mut existing = HashSet::new();
    if dir.exists() {
        for entry in std::fs::read_dir(dir)? {
            existing.insert(entry?.file_name().to_string_lossy().into_owned());
        }
    }

    let name = first_free(base, |candidate| {
        existing.contains(&format!("{}.{}", candidate, extension))
    });
    let file_name = format!("{}.{}", name, extension);
    log::debug!("resolve_in_dir: {:?} -> {}", dir, file_name);

    Ok(UniqueName { name, file_name })
}
