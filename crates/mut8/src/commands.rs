//! Command execution

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rand::RngCore;

use mut8_core::blend::{blend_weighted, interpolate_pair, normalize_weights, WeightedSource};
use mut8_core::config::{config_path_from_env, load_config, save_config, Mut8Config};
use mut8_core::preset::format_value;
use mut8_core::{GeneratedPreset, Generator, PresetRecord, Taxonomy};

use crate::cli_args::{BatchArgs, Cli, Commands};

/// Run a parsed command line, returning the message to show the user
pub(crate) fn run(cli: Cli) -> Result<String> {
    match cli.command {
        Some(Commands::List) => list(&load_settings()),
        Some(Commands::Generate {
            category,
            condition,
        }) => {
            let config = load_settings();
            let generated = run_generate(&config, &category, &condition, rand::thread_rng())?;
            Ok(format!("Preset saved to: {}", generated.path.display()))
        }
        Some(Commands::Blend(args)) => {
            let sources = args.sources()?;
            run_blend(&args.output, &sources, args.normalize)?;
            Ok(format!("Preset saved to {}", args.output.display()))
        }
        Some(Commands::Config {
            presets_root,
            exclude,
        }) => update_config(&config_path_from_env(), presets_root, exclude),
        None => {
            let BatchArgs {
                first: Some(first),
                second: Some(second),
                amount: Some(amount),
            } = cli.batch
            else {
                bail!("Batch mode needs <source1> <source2> <amount>");
            };
            let path = run_batch(&first, &second, amount, Path::new("."))?;
            Ok(format!("Created new preset: {}", path.display()))
        }
    }
}

fn load_settings() -> Mut8Config {
    load_config(&config_path_from_env())
}

fn load_preset(path: &Path) -> Result<PresetRecord> {
    PresetRecord::from_file(path).with_context(|| format!("Failed to load preset {}", path.display()))
}

/// Interpolate two presets into `out_dir/interpolated_<amount>.xml`
pub fn run_batch(first: &Path, second: &Path, amount: f64, out_dir: &Path) -> Result<PathBuf> {
    let a = load_preset(first)?;
    let b = load_preset(second)?;

    let blend = interpolate_pair(&a, &b, amount)?;
    let path = out_dir.join(format!("interpolated_{}.xml", format_value(amount)));
    blend
        .record
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    log::info!(
        "Batch: {} parameters interpolated, {} skipped",
        blend.report.blended().count(),
        blend.report.skipped_count()
    );
    Ok(path)
}

/// Weighted blend of 2-4 files written to `output`
pub fn run_blend(output: &Path, sources: &[(PathBuf, f64)], normalize: bool) -> Result<PresetRecord> {
    let records = sources
        .iter()
        .map(|(path, _)| load_preset(path))
        .collect::<Result<Vec<_>>>()?;

    let mut weights: Vec<f64> = sources.iter().map(|(_, w)| *w).collect();
    if normalize {
        weights = normalize_weights(&weights);
        log::info!("Blend: normalized weights {:?}", weights);
    }

    let weighted: Vec<WeightedSource<'_>> = records
        .iter()
        .zip(&weights)
        .map(|(record, &weight)| WeightedSource::new(record, weight))
        .collect();

    let blend = blend_weighted(&weighted)?;
    blend
        .record
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(blend.record)
}

/// Categorized generation against the configured presets root
pub fn run_generate<R: RngCore>(
    config: &Mut8Config,
    category: &str,
    condition: &str,
    rng: R,
) -> Result<GeneratedPreset> {
    let taxonomy = Taxonomy::load(&config.presets_root, &config.excluded_categories)?;
    if taxonomy.category(category).is_none() {
        bail!("Unknown or excluded category '{}'", category);
    }

    let mut generator = Generator::new(&taxonomy, rng);
    let generated = generator.generate(category, condition)?;
    Ok(generated)
}

/// Categories and their conditions, one category per line
pub fn list(config: &Mut8Config) -> Result<String> {
    let taxonomy = Taxonomy::load(&config.presets_root, &config.excluded_categories)?;

    let mut out = String::new();
    for category in taxonomy.categories() {
        let conditions: Vec<&str> = category.condition_names().collect();
        let _ = writeln!(out, "{}: {}", category.name(), conditions.join(", "));
    }
    if !taxonomy.skipped().is_empty() {
        let _ = writeln!(out, "({} files could not be loaded)", taxonomy.skipped().len());
    }
    Ok(out.trim_end().to_string())
}

/// Show the config at `path`, applying and saving any requested changes first
pub fn update_config(path: &Path, presets_root: Option<PathBuf>, exclude: Vec<String>) -> Result<String> {
    let mut config: Mut8Config = load_config(path);

    let changed = presets_root.is_some() || !exclude.is_empty();
    if let Some(root) = presets_root {
        config.presets_root = root;
    }
    if !exclude.is_empty() {
        config.excluded_categories = exclude;
    }
    if changed {
        save_config(&config, path)?;
    }

    let mut out = String::new();
    let _ = writeln!(out, "Config: {}", path.display());
    let _ = writeln!(out, "presets_root: {}", config.presets_root.display());
    let _ = write!(out, "excluded_categories: {}", config.excluded_categories.join(", "));
    Ok(out)
}
