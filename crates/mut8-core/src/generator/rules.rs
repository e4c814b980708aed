//! Category-specific override rules
//!
//! Rules run after the standard blend and may rewrite non-numeric fields
//! using the two source records. The registry maps a category name to its
//! rule; categories without one get `NoOverride`.

use std::collections::HashMap;

use rand::{Rng, RngCore};

use crate::preset::PresetRecord;

/// Category whose distortion-type codes are picked rather than blended
pub const POLAR_DISTORTION_CATEGORY: &str = "Polar Distortion";

/// Discrete `Node_Properties` fields chosen from one source each
pub const DISTORTION_TYPE_FIELDS: [&str; 2] = ["PositiveDistType", "NegativeDistType"];

/// Inputs handed to an override rule
pub struct OverrideContext<'a> {
    pub category: &'a str,
    /// The blended record, named but not yet written
    pub output: &'a mut PresetRecord,
    pub first: &'a PresetRecord,
    pub second: &'a PresetRecord,
}

/// A post-blend transformation for one category
pub trait OverrideRule {
    fn apply(&self, ctx: OverrideContext<'_>, rng: &mut dyn RngCore);
}

impl<F> OverrideRule for F
where
    F: Fn(OverrideContext<'_>, &mut dyn RngCore),
{
    fn apply(&self, ctx: OverrideContext<'_>, rng: &mut dyn RngCore) {
        self(ctx, rng)
    }
}

/// Leaves the blended record as is
pub struct NoOverride;

impl OverrideRule for NoOverride {
    fn apply(&self, _ctx: OverrideContext<'_>, _rng: &mut dyn RngCore) {}
}

static NO_OVERRIDE: NoOverride = NoOverride;

/// Picks each distortion-type code from one of the two sources at random
///
/// Needs `Node_Properties` on the output and both sources; does nothing
/// otherwise. A source without the field contributes `0`.
pub struct PolarDistortionRule;

impl OverrideRule for PolarDistortionRule {
    fn apply(&self, ctx: OverrideContext<'_>, rng: &mut dyn RngCore) {
        let (Some(first), Some(second)) = (ctx.first.node_properties(), ctx.second.node_properties()) else {
            log::warn!(
                "{}: source presets have no Node_Properties, keeping template distortion types",
                ctx.category
            );
            return;
        };

        let picks: Vec<(&str, String)> = DISTORTION_TYPE_FIELDS
            .iter()
            .map(|&field| {
                let source = if rng.gen_bool(0.5) { first } else { second };
                (field, source.attribute(field).unwrap_or("0").to_string())
            })
            .collect();

        let Some(props) = ctx.output.node_properties_mut() else {
            log::warn!("{}: template has no Node_Properties, skipping distortion types", ctx.category);
            return;
        };
        for (field, value) in picks {
            log::debug!("{}: {} = {}", ctx.category, field, value);
            props.set_attribute(field, value);
        }
    }
}

/// Category name → override rule
pub struct OverrideRegistry {
    rules: HashMap<String, Box<dyn OverrideRule>>,
}

impl Default for OverrideRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl OverrideRegistry {
    /// An empty registry (every category resolves to `NoOverride`)
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Registry with the built-in rules
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(POLAR_DISTORTION_CATEGORY, PolarDistortionRule);
        registry
    }

    /// Add or replace the rule for a category
    pub fn register(&mut self, category: impl Into<String>, rule: impl OverrideRule + 'static) {
        self.rules.insert(category.into(), Box::new(rule));
    }

    pub fn has_rule(&self, category: &str) -> bool {
        self.rules.contains_key(category)
    }

    pub fn rule_for(&self, category: &str) -> &dyn OverrideRule {
        match self.rules.get(category) {
            Some(rule) => rule.as_ref(),
            None => &NO_OVERRIDE,
        }
    }
}
