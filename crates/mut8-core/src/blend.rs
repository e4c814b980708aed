//! Weighted parameter blending
//!
//! Every blend starts from a copy of a template record. For each parameter
//! the template defines, the value is resolved by name in every source and
//! replaced with `Σ value_i * weight_i` (both `unmapped_value` and
//! `mapped_value`). Parameters that exist only in sources are ignored.
//!
//! A parameter that cannot be resolved in some source keeps the template's
//! value and is reported as skipped; it never fails the blend.
//!
//! Weights are used as given. `normalize_weights` is a separate, caller-side
//! step.

use crate::error::{PresetError, PresetResult};
use crate::preset::{Parameter, ParameterIssue, PresetRecord};

/// Weight applied to each source in a pairwise blend
pub const PAIRWISE_WEIGHT: f64 = 0.5;

/// Fewest sources accepted by the weighted blend
pub const MIN_SOURCES: usize = 2;

/// Most sources accepted by the weighted blend
pub const MAX_SOURCES: usize = 4;

/// A source record and its blend weight
#[derive(Debug, Clone, Copy)]
pub struct WeightedSource<'a> {
    pub record: &'a PresetRecord,
    pub weight: f64,
}

impl<'a> WeightedSource<'a> {
    pub fn new(record: &'a PresetRecord, weight: f64) -> Self {
        Self { record, weight }
    }
}

/// What happened to one template parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterOutcome {
    /// Value replaced with the weighted combination
    Blended(Parameter),
    /// Left at the template's value
    Skipped { name: String, reason: ParameterIssue },
}

impl ParameterOutcome {
    pub fn name(&self) -> &str {
        match self {
            Self::Blended(p) => &p.name,
            Self::Skipped { name, .. } => name,
        }
    }
}

/// Per-parameter outcomes of a blend, in template order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlendReport {
    outcomes: Vec<ParameterOutcome>,
}

impl BlendReport {
    pub fn outcomes(&self) -> &[ParameterOutcome] {
        &self.outcomes
    }

    pub fn blended(&self) -> impl Iterator<Item = &Parameter> {
        self.outcomes.iter().filter_map(|o| match o {
            ParameterOutcome::Blended(p) => Some(p),
            ParameterOutcome::Skipped { .. } => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, &ParameterIssue)> {
        self.outcomes.iter().filter_map(|o| match o {
            ParameterOutcome::Skipped { name, reason } => Some((name.as_str(), reason)),
            ParameterOutcome::Blended(_) => None,
        })
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped().count()
    }
}

/// A freshly built record plus the report of how it was built
#[derive(Debug, Clone)]
pub struct Blend {
    pub record: PresetRecord,
    pub report: BlendReport,
}

/// Blend `sources` onto a copy of `template`
///
/// The copy always gets a new identity, distinct from the template's and
/// every source's, even when all inputs are the same record.
pub fn blend(template: &PresetRecord, sources: &[WeightedSource<'_>]) -> Blend {
    let mut record = template.clone();

    let avoid: Vec<&str> = sources
        .iter()
        .filter_map(|s| s.record.identity())
        .chain(template.identity())
        .collect();
    record.regenerate_identity(&avoid);

    let mut outcomes = Vec::new();
    for name in template.parameter_names() {
        match weighted_parameter(name, sources) {
            Ok(parameter) => {
                record.set_parameter(&parameter);
                outcomes.push(ParameterOutcome::Blended(parameter));
            }
            Err(reason) => {
                log::warn!("Couldn't interpolate parameter {}: {}", name, reason);
                outcomes.push(ParameterOutcome::Skipped {
                    name: name.to_string(),
                    reason,
                });
            }
        }
    }

    let report = BlendReport { outcomes };
    log::debug!(
        "blend: {} sources, {} parameters blended, {} skipped",
        sources.len(),
        report.blended().count(),
        report.skipped_count()
    );

    Blend { record, report }
}

/// Two-source blend at a fixed 50/50 ratio
pub fn blend_pair(template: &PresetRecord, first: &PresetRecord, second: &PresetRecord) -> Blend {
    blend(
        template,
        &[
            WeightedSource::new(first, PAIRWISE_WEIGHT),
            WeightedSource::new(second, PAIRWISE_WEIGHT),
        ],
    )
}

/// Weighted blend of 2 to 4 sources, using the first source as template
///
/// Weights must be finite and non-negative. They are not required to sum
/// to 1 and are not rescaled here.
pub fn blend_weighted(sources: &[WeightedSource<'_>]) -> PresetResult<Blend> {
    if !(MIN_SOURCES..=MAX_SOURCES).contains(&sources.len()) {
        return Err(PresetError::SourceCount {
            found: sources.len(),
        });
    }
    if let Some(bad) = sources.iter().find(|s| !s.weight.is_finite() || s.weight < 0.0) {
        return Err(PresetError::InvalidWeights(format!(
            "weight {} is not a finite non-negative number",
            bad.weight
        )));
    }

    Ok(blend(sources[0].record, sources))
}

/// Linear interpolation `first + (second - first) * amount`
///
/// Equivalent to weights `(1 - amount, amount)` with `first` as template.
/// Amounts outside `0..=1` extrapolate.
pub fn interpolate_pair(first: &PresetRecord, second: &PresetRecord, amount: f64) -> PresetResult<Blend> {
    if !amount.is_finite() {
        return Err(PresetError::InvalidWeights(format!(
            "interpolation amount {} is not finite",
            amount
        )));
    }

    Ok(blend(
        first,
        &[
            WeightedSource::new(first, 1.0 - amount),
            WeightedSource::new(second, amount),
        ],
    ))
}

/// Rescale the active (> 0) weights so they sum to 1
///
/// Inactive weights are returned unchanged. When no weight is active the
/// input is returned as is.
pub fn normalize_weights(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 {
        return weights.to_vec();
    }
    weights
        .iter()
        .map(|&w| if w > 0.0 { w / total } else { w })
        .collect()
}

fn weighted_parameter(name: &str, sources: &[WeightedSource<'_>]) -> Result<Parameter, ParameterIssue> {
    let mut unmapped_value = 0.0;
    let mut mapped_value = 0.0;
    for source in sources {
        let parameter = source.record.parameter(name)?;
        unmapped_value += parameter.unmapped_value * source.weight;
        mapped_value += parameter.mapped_value * source.weight;
    }
    Ok(Parameter {
        name: name.to_string(),
        unmapped_value,
        mapped_value,
    })
}
