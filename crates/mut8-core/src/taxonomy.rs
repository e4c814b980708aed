//! Taxonomy loader - scans the presets root for factory presets
//!
//! Loading happens once at startup. The expected layout is:
//!
//! ```text
//! <root>/
//!   <category>/
//!     User/              # generated output + DEFAULT.xml template (never scanned)
//!     <condition>/
//!       *.xml            # factory presets
//! ```
//!
//! A file that fails to read or parse is logged and left out of the catalog;
//! it never aborts the rest of the load.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{PresetError, PresetResult};
use crate::preset::PresetRecord;

/// Reserved per-category folder holding generated output and the template
pub const USER_FOLDER: &str = "User";

/// File extension of preset documents
pub const PRESET_EXTENSION: &str = "xml";

/// A factory preset in the catalog
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Root `name` attribute, or the file stem when absent
    pub name: String,
    pub path: PathBuf,
    pub record: PresetRecord,
}

/// A file or folder left out of the catalog
#[derive(Debug, Clone)]
pub struct LoadSkip {
    pub path: PathBuf,
    pub reason: String,
}

/// One category: its conditions and where generated presets go
#[derive(Debug, Clone)]
pub struct Category {
    name: String,
    output_dir: PathBuf,
    conditions: BTreeMap<String, Vec<CatalogEntry>>,
}

impl Category {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The category's user bucket
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn condition_names(&self) -> impl Iterator<Item = &str> {
        self.conditions.keys().map(String::as_str)
    }

    pub fn presets(&self, condition: &str) -> &[CatalogEntry] {
        self.conditions.get(condition).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Read-only catalog of factory presets: category → condition → presets
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    root: PathBuf,
    categories: BTreeMap<String, Category>,
    skipped: Vec<LoadSkip>,
}

impl Taxonomy {
    /// Scan `root`, leaving out any category named in `exclusions`
    pub fn load(root: &Path, exclusions: &[String]) -> PresetResult<Self> {
        if !root.is_dir() {
            return Err(PresetError::RootNotFound(root.to_path_buf()));
        }

        log::info!("Taxonomy: loading factory presets from {}", root.display());

        let mut categories = BTreeMap::new();
        let mut skipped = Vec::new();

        for (category_name, category_path) in subdirectories(root)? {
            if exclusions.iter().any(|e| *e == category_name) {
                log::debug!("Taxonomy: skipping excluded category '{}'", category_name);
                continue;
            }

            let condition_dirs = match subdirectories(&category_path) {
                Ok(dirs) => dirs,
                Err(e) => {
                    log::warn!("Taxonomy: failed to read category '{}': {}", category_name, e);
                    skipped.push(LoadSkip {
                        path: category_path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let mut conditions = BTreeMap::new();
            for (condition_name, condition_path) in condition_dirs {
                if condition_name == USER_FOLDER {
                    continue;
                }
                let presets = load_condition(&condition_path, &mut skipped);
                log::debug!(
                    "Taxonomy: {}/{} has {} presets",
                    category_name,
                    condition_name,
                    presets.len()
                );
                conditions.insert(condition_name, presets);
            }

            let output_dir = category_path.join(USER_FOLDER);
            categories.insert(
                category_name.clone(),
                Category {
                    name: category_name,
                    output_dir,
                    conditions,
                },
            );
        }

        let taxonomy = Self {
            root: root.to_path_buf(),
            categories,
            skipped,
        };

        log::info!(
            "Taxonomy load complete: {} categories, {} presets, {} skipped",
            taxonomy.categories.len(),
            taxonomy.preset_count(),
            taxonomy.skipped.len()
        );

        Ok(taxonomy)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.get(name)
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Conditions of a category (empty for unknown categories)
    pub fn condition_names(&self, category: &str) -> Vec<&str> {
        self.category(category)
            .map(|c| c.condition_names().collect())
            .unwrap_or_default()
    }

    /// Factory presets in a bucket (empty for unknown category or condition)
    pub fn presets(&self, category: &str, condition: &str) -> &[CatalogEntry] {
        self.category(category)
            .map(|c| c.presets(condition))
            .unwrap_or(&[])
    }

    pub fn output_dir(&self, category: &str) -> Option<&Path> {
        self.category(category).map(Category::output_dir)
    }

    /// Category → user bucket, for every loaded category
    pub fn output_dirs(&self) -> BTreeMap<&str, &Path> {
        self.categories
            .values()
            .map(|c| (c.name(), c.output_dir()))
            .collect()
    }

    /// Files and folders left out during loading
    pub fn skipped(&self) -> &[LoadSkip] {
        &self.skipped
    }

    pub fn preset_count(&self) -> usize {
        self.categories
            .values()
            .flat_map(|c| c.conditions.values())
            .map(Vec::len)
            .sum()
    }
}

/// Immediate subdirectories of `path`, sorted by name
fn subdirectories(path: &Path) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(path)?.flatten() {
        let entry_path = entry.path();
        if !entry_path.is_dir() {
            continue;
        }
        let Some(name) = entry_path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        dirs.push((name.to_string(), entry_path));
    }
    dirs.sort();
    Ok(dirs)
}

/// Parse every preset file in a condition folder, sorted by file name
fn load_condition(dir: &Path, skipped: &mut Vec<LoadSkip>) -> Vec<CatalogEntry> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Taxonomy: failed to read {}: {}", dir.display(), e);
            skipped.push(LoadSkip {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            });
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(PRESET_EXTENSION))
        .collect();
    files.sort();

    let mut presets = Vec::with_capacity(files.len());
    for path in files {
        match PresetRecord::from_file(&path) {
            Ok(record) => {
                let name = record
                    .display_name()
                    .map(str::to_string)
                    .or_else(|| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
                    .unwrap_or_default();
                presets.push(CatalogEntry { name, path, record });
            }
            Err(e) => {
                log::warn!("Error loading {}: {}", path.display(), e);
                skipped.push(LoadSkip {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }
    presets
}
