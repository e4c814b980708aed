//! Categorized preset generation
//!
//! Given a category and condition, picks two factory presets at random
//! (with replacement, so the same preset can be picked twice), blends them
//! 50/50 onto the category's `DEFAULT` template, names the result, runs the
//! category's override rule and writes it into the category's user bucket.
//!
//! The whole record is built in memory first; nothing is written when any
//! step fails.

mod rules;

use std::path::{Path, PathBuf};

use rand::{Rng, RngCore};

pub use rules::{
    NoOverride, OverrideContext, OverrideRegistry, OverrideRule, PolarDistortionRule,
    DISTORTION_TYPE_FIELDS, POLAR_DISTORTION_CATEGORY,
};

use crate::blend::{blend_pair, Blend, BlendReport};
use crate::error::{PresetError, PresetResult};
use crate::naming::{generated_base_name, resolve_in_dir};
use crate::preset::PresetRecord;
use crate::taxonomy::{Taxonomy, PRESET_EXTENSION};

/// File stem of each category's template in its user bucket
pub const TEMPLATE_FILE_STEM: &str = "DEFAULT";

/// Path of the template inside a user bucket
pub fn template_path(output_dir: &Path) -> PathBuf {
    output_dir.join(format!("{}.{}", TEMPLATE_FILE_STEM, PRESET_EXTENSION))
}

/// Result of a successful generation
#[derive(Debug, Clone)]
pub struct GeneratedPreset {
    /// Display name, also the file stem
    pub name: String,
    pub path: PathBuf,
    /// The two factory presets that were blended
    pub sources: [PathBuf; 2],
    pub report: BlendReport,
}

/// Generates blended presets from a loaded taxonomy
///
/// The random source is injected so callers (and tests) control selection.
pub struct Generator<'t, R> {
    taxonomy: &'t Taxonomy,
    rules: OverrideRegistry,
    rng: R,
}

impl<'t, R: RngCore> Generator<'t, R> {
    /// Generator with the built-in override rules
    pub fn new(taxonomy: &'t Taxonomy, rng: R) -> Self {
        Self::with_rules(taxonomy, OverrideRegistry::with_defaults(), rng)
    }

    pub fn with_rules(taxonomy: &'t Taxonomy, rules: OverrideRegistry, rng: R) -> Self {
        Self {
            taxonomy,
            rules,
            rng,
        }
    }

    pub fn rules_mut(&mut self) -> &mut OverrideRegistry {
        &mut self.rules
    }

    /// Generate and write one preset for `category` / `condition`
    pub fn generate(&mut self, category: &str, condition: &str) -> PresetResult<GeneratedPreset> {
        let taxonomy = self.taxonomy;
        let insufficient = |found| PresetError::InsufficientSources {
            category: category.to_string(),
            condition: condition.to_string(),
            found,
        };
        let output_dir = taxonomy.output_dir(category).ok_or_else(|| insufficient(0))?;
        let bucket = taxonomy.presets(category, condition);
        if bucket.len() < 2 {
            return Err(insufficient(bucket.len()));
        }

        let first = &bucket[self.rng.gen_range(0..bucket.len())];
        let second = &bucket[self.rng.gen_range(0..bucket.len())];
        log::info!(
            "Generator: {}/{} blending '{}' + '{}'",
            category,
            condition,
            first.name,
            second.name
        );

        let template_path = template_path(output_dir);
        if !template_path.is_file() {
            return Err(PresetError::MissingTemplate(template_path));
        }
        let template = PresetRecord::from_file(&template_path)?;

        let Blend { mut record, report } = blend_pair(&template, &first.record, &second.record);
        if report.skipped_count() > 0 {
            log::warn!(
                "Generator: {} of {} parameters kept template values",
                report.skipped_count(),
                report.outcomes().len()
            );
        }

        let unique = resolve_in_dir(output_dir, &generated_base_name(category, condition), PRESET_EXTENSION)?;
        record.set_display_name(&unique.name);

        self.rules.rule_for(category).apply(
            OverrideContext {
                category,
                output: &mut record,
                first: &first.record,
                second: &second.record,
            },
            &mut self.rng,
        );

        let path = output_dir.join(&unique.file_name);
        record.save_new(&path)?;
        log::info!("Generator: preset saved to {}", path.display());

        Ok(GeneratedPreset {
            name: unique.name,
            path,
            sources: [first.path.clone(), second.path.clone()],
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::tests::preset_xml;
    use crate::preset::SUB_PRESET_NAME_ATTRIBUTE;
    use crate::taxonomy::USER_FOLDER;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, file: &str, xml: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(file), xml).unwrap();
    }

    /// Delay/Dark with two factory presets and a template
    fn setup_delay(temp_dir: &TempDir) -> PathBuf {
        let root = temp_dir.path().to_path_buf();
        let dark = root.join("Delay").join("Dark");
        write(&dark, "a.xml", &preset_xml("A", "uuid-a", &[("Cutoff", 100.0, 50.0), ("Mix", 1.0, 1.0)]));
        write(&dark, "b.xml", &preset_xml("B", "uuid-b", &[("Cutoff", 200.0, 150.0), ("Mix", 3.0, 3.0)]));
        write(
            &root.join("Delay").join(USER_FOLDER),
            "DEFAULT.xml",
            &preset_xml("DEFAULT", "uuid-t", &[("Cutoff", 0.0, 0.0), ("Mix", 0.0, 0.0)]),
        );
        root
    }

    fn cutoff(record: &PresetRecord) -> (f64, f64) {
        let p = record.parameter("Cutoff").unwrap();
        (p.unmapped_value, p.mapped_value)
    }

    #[test]
    fn test_generate_writes_blended_preset() {
        let temp_dir = TempDir::new().unwrap();
        let root = setup_delay(&temp_dir);
        let taxonomy = Taxonomy::load(&root, &[]).unwrap();
        let mut generator = Generator::new(&taxonomy, Pcg32::seed_from_u64(1));

        let generated = generator.generate("Delay", "Dark").unwrap();

        assert_eq!(generated.name, "blended_Delay_Dark_1");
        assert_eq!(generated.path, root.join("Delay").join(USER_FOLDER).join("blended_Delay_Dark_1.xml"));

        let written = PresetRecord::from_file(&generated.path).unwrap();
        assert_eq!(written.display_name(), Some("blended_Delay_Dark_1"));
        assert_eq!(
            written.node_properties().unwrap().attribute(SUB_PRESET_NAME_ATTRIBUTE),
            Some("blended_Delay_Dark_1")
        );

        let a = PresetRecord::from_file(&generated.sources[0]).unwrap();
        let b = PresetRecord::from_file(&generated.sources[1]).unwrap();
        let (ua, ma) = cutoff(&a);
        let (ub, mb) = cutoff(&b);
        assert_eq!(cutoff(&written), ((ua + ub) / 2.0, (ma + mb) / 2.0));

        let id = written.identity().unwrap();
        assert!(!["uuid-a", "uuid-b", "uuid-t"].contains(&id));
    }

    #[test]
    fn test_generate_names_accumulate() {
        let temp_dir = TempDir::new().unwrap();
        let root = setup_delay(&temp_dir);
        let taxonomy = Taxonomy::load(&root, &[]).unwrap();
        let mut generator = Generator::new(&taxonomy, Pcg32::seed_from_u64(2));

        let first = generator.generate("Delay", "Dark").unwrap();
        let second = generator.generate("Delay", "Dark").unwrap();
        assert_eq!(first.name, "blended_Delay_Dark_1");
        assert_eq!(second.name, "blended_Delay_Dark_2");

        // Outputs never enter the catalog
        assert_eq!(taxonomy.presets("Delay", "Dark").len(), 2);
    }

    #[test]
    fn test_selection_is_deterministic_for_seed() {
        let temp_dir = TempDir::new().unwrap();
        let root = setup_delay(&temp_dir);
        let taxonomy = Taxonomy::load(&root, &[]).unwrap();

        let picks: Vec<[PathBuf; 2]> = (0..2)
            .map(|_| {
                let mut generator = Generator::new(&taxonomy, Pcg32::seed_from_u64(42));
                generator.generate("Delay", "Dark").unwrap().sources
            })
            .collect();
        assert_eq!(picks[0], picks[1]);
    }

    #[test]
    fn test_same_preset_picked_twice() {
        let temp_dir = TempDir::new().unwrap();
        let root = setup_delay(&temp_dir);
        let taxonomy = Taxonomy::load(&root, &[]).unwrap();
        // A constant zero stream selects the first catalog entry for both picks
        let mut generator = Generator::new(&taxonomy, StepRng::new(0, 0));

        let generated = generator.generate("Delay", "Dark").unwrap();
        assert_eq!(generated.sources[0], generated.sources[1]);
        assert_eq!(generated.report.skipped_count(), 0);

        let source = PresetRecord::from_file(&generated.sources[0]).unwrap();
        let written = PresetRecord::from_file(&generated.path).unwrap();
        assert_eq!(cutoff(&written), cutoff(&source));
        assert_ne!(written.identity(), source.identity());
        assert_ne!(written.identity(), Some("uuid-t"));
    }

    #[test]
    fn test_insufficient_sources() {
        let temp_dir = TempDir::new().unwrap();
        let root = setup_delay(&temp_dir);
        write(&root.join("Delay").join("Solo"), "only.xml", &preset_xml("Only", "u", &[("Cutoff", 1.0, 1.0)]));
        let taxonomy = Taxonomy::load(&root, &[]).unwrap();
        let mut generator = Generator::new(&taxonomy, Pcg32::seed_from_u64(0));

        let err = generator.generate("Delay", "Solo").unwrap_err();
        assert!(matches!(err, PresetError::InsufficientSources { found: 1, .. }));

        let err = generator.generate("Reverb", "Hall").unwrap_err();
        assert!(matches!(err, PresetError::InsufficientSources { found: 0, .. }));
    }

    #[test]
    fn test_missing_template_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let root = setup_delay(&temp_dir);
        let user = root.join("Delay").join(USER_FOLDER);
        fs::remove_file(user.join("DEFAULT.xml")).unwrap();
        let taxonomy = Taxonomy::load(&root, &[]).unwrap();
        let mut generator = Generator::new(&taxonomy, Pcg32::seed_from_u64(0));

        let err = generator.generate("Delay", "Dark").unwrap_err();
        assert!(matches!(err, PresetError::MissingTemplate(_)));
        assert_eq!(fs::read_dir(&user).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_parameter_does_not_abort_generation() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        let dark = root.join("Delay").join("Dark");
        // Neither source defines Mix
        write(&dark, "a.xml", &preset_xml("A", "a", &[("Cutoff", 100.0, 50.0)]));
        write(&dark, "b.xml", &preset_xml("B", "b", &[("Cutoff", 100.0, 50.0)]));
        write(
            &root.join("Delay").join(USER_FOLDER),
            "DEFAULT.xml",
            &preset_xml("DEFAULT", "t", &[("Cutoff", 0.0, 0.0), ("Mix", 0.7, 7.0)]),
        );
        let taxonomy = Taxonomy::load(&root, &[]).unwrap();
        let mut generator = Generator::new(&taxonomy, Pcg32::seed_from_u64(5));

        let generated = generator.generate("Delay", "Dark").unwrap();
        assert_eq!(generated.report.skipped_count(), 1);

        let written = PresetRecord::from_file(&generated.path).unwrap();
        assert_eq!(cutoff(&written), (100.0, 50.0));
        let mix = written.parameter("Mix").unwrap();
        assert_eq!((mix.unmapped_value, mix.mapped_value), (0.7, 7.0));
    }

    #[test]
    fn test_polar_distortion_types_come_from_sources() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        let with_types = |name: &str, pos: u8, neg: u8| {
            format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<SubPreset name=\"{name}\"><Meta UUID=\"{name}\"/><Node_Properties SubPresetName=\"{name}\" PositiveDistType=\"{pos}\" NegativeDistType=\"{neg}\"/><Parameters><Drive unmapped_value=\"0.5\" mapped_value=\"1.0\"/></Parameters></SubPreset>"
            )
        };
        let warm = root.join(POLAR_DISTORTION_CATEGORY).join("Warm");
        write(&warm, "a.xml", &with_types("A", 1, 4));
        write(&warm, "b.xml", &with_types("B", 2, 5));
        write(&root.join(POLAR_DISTORTION_CATEGORY).join(USER_FOLDER), "DEFAULT.xml", &with_types("DEFAULT", 0, 0));

        let taxonomy = Taxonomy::load(&root, &[]).unwrap();
        let mut generator = Generator::new(&taxonomy, Pcg32::seed_from_u64(9));

        for _ in 0..4 {
            let generated = generator.generate(POLAR_DISTORTION_CATEGORY, "Warm").unwrap();
            let written = PresetRecord::from_file(&generated.path).unwrap();
            let props = written.node_properties().unwrap();
            assert!(matches!(props.attribute("PositiveDistType"), Some("1") | Some("2")));
            assert!(matches!(props.attribute("NegativeDistType"), Some("4") | Some("5")));
            assert_eq!(props.attribute(SUB_PRESET_NAME_ATTRIBUTE), Some(generated.name.as_str()));
        }
    }

    #[test]
    fn test_custom_rule_runs_for_its_category() {
        let temp_dir = TempDir::new().unwrap();
        let root = setup_delay(&temp_dir);
        let taxonomy = Taxonomy::load(&root, &[]).unwrap();
        let mut generator = Generator::new(&taxonomy, Pcg32::seed_from_u64(3));
        generator
            .rules_mut()
            .register("Delay", |ctx: OverrideContext<'_>, _rng: &mut dyn RngCore| {
                if let Some(props) = ctx.output.node_properties_mut() {
                    props.set_attribute("Tag", "custom");
                }
            });

        let generated = generator.generate("Delay", "Dark").unwrap();
        let written = PresetRecord::from_file(&generated.path).unwrap();
        assert_eq!(written.node_properties().unwrap().attribute("Tag"), Some("custom"));
    }
}
