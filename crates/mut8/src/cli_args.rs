//! Command-line argument definitions
//!
//! With no subcommand name the three positionals run batch interpolation,
//! so `mut8 a.xml b.xml 0.5` keeps working alongside the subcommands.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use mut8_core::blend::{MAX_SOURCES, MIN_SOURCES};

/// mut8 - blend and generate effect presets
#[derive(Parser, Debug)]
#[command(name = "mut8")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
#[command(subcommand_negates_reqs = true)]
#[command(arg_required_else_help = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub batch: BatchArgs,
}

/// Interpolate two presets into interpolated_<amount>.xml
#[derive(Args, Debug, PartialEq)]
pub(crate) struct BatchArgs {
    /// First preset (amount 0.0)
    #[arg(required = true, value_name = "SOURCE1")]
    pub first: Option<PathBuf>,

    /// Second preset (amount 1.0)
    #[arg(required = true, value_name = "SOURCE2")]
    pub second: Option<PathBuf>,

    /// Interpolation amount; values outside 0..1 extrapolate
    #[arg(required = true, allow_negative_numbers = true, value_parser = parse_amount)]
    pub amount: Option<f64>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub(crate) enum Commands {
    /// List categories and their conditions
    List,

    /// Blend two random factory presets into the category's User folder
    Generate {
        /// Category folder, e.g. "Polar Distortion"
        category: String,

        /// Condition folder inside the category
        condition: String,
    },

    /// Weighted blend of 2 to 4 presets; the first file is the template
    Blend(BlendArgs),

    /// Show the active configuration, or update it
    Config {
        /// Folder holding the category tree
        #[arg(long)]
        presets_root: Option<PathBuf>,

        /// Category to leave out (repeat for several; replaces the current list)
        #[arg(long = "exclude", value_name = "CATEGORY")]
        exclude: Vec<String>,
    },
}

#[derive(Args, Debug, PartialEq)]
pub(crate) struct BlendArgs {
    /// File to write
    pub output: PathBuf,

    /// Preset files each followed by its weight
    #[arg(
        required = true,
        num_args = MIN_SOURCES * 2..=MAX_SOURCES * 2,
        value_name = "FILE WEIGHT",
        allow_negative_numbers = true
    )]
    pub pairs: Vec<String>,

    /// Rescale the active weights to sum to 1 before blending
    #[arg(long)]
    pub normalize: bool,
}

impl BlendArgs {
    /// The `<file> <weight>` pairs as paths and numbers
    pub fn sources(&self) -> Result<Vec<(PathBuf, f64)>> {
        if self.pairs.len() % 2 != 0 {
            bail!("blend expects <file> <weight> pairs, got {} values", self.pairs.len());
        }
        self.pairs
            .chunks_exact(2)
            .map(|pair| {
                let weight: f64 = pair[1]
                    .parse()
                    .with_context(|| format!("Invalid weight '{}' for {}", pair[1], pair[0]))?;
                Ok((PathBuf::from(&pair[0]), weight))
            })
            .collect()
    }
}

fn parse_amount(value: &str) -> Result<f64, String> {
    let amount: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if !amount.is_finite() {
        return Err(format!("'{}' is not a finite number", value));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_is_the_default_form() {
        let cli = Cli::try_parse_from(["mut8", "a.xml", "b.xml", "0.5"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(
            cli.batch,
            BatchArgs {
                first: Some(PathBuf::from("a.xml")),
                second: Some(PathBuf::from("b.xml")),
                amount: Some(0.5),
            }
        );

        let cli = Cli::try_parse_from(["mut8", "a.xml", "b.xml", "-0.25"]).unwrap();
        assert_eq!(cli.batch.amount, Some(-0.25));
    }

    #[test]
    fn test_batch_rejects_bad_amounts() {
        assert!(Cli::try_parse_from(["mut8", "a.xml", "b.xml", "half"]).is_err());
        assert!(Cli::try_parse_from(["mut8", "a.xml", "b.xml", "inf"]).is_err());
        assert!(Cli::try_parse_from(["mut8", "a.xml", "b.xml"]).is_err());
        assert!(Cli::try_parse_from(["mut8"]).is_err());
    }

    #[test]
    fn test_subcommand_with_extra_arguments_is_an_error() {
        let cli = Cli::try_parse_from(["mut8", "list"]).unwrap();
        assert_eq!(cli.command, Some(Commands::List));

        // Never falls through to a batch run with a file named "list"
        assert!(Cli::try_parse_from(["mut8", "list", "x", "y"]).is_err());
    }

    #[test]
    fn test_generate() {
        let cli = Cli::try_parse_from(["mut8", "generate", "Polar Distortion", "Warm"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Generate {
                category: "Polar Distortion".to_string(),
                condition: "Warm".to_string(),
            })
        );
        assert!(Cli::try_parse_from(["mut8", "generate", "Delay"]).is_err());
    }

    #[test]
    fn test_blend_pairs() {
        let cli =
            Cli::try_parse_from(["mut8", "blend", "out.xml", "a.xml", "1", "b.xml", "3", "--normalize"]).unwrap();
        let Some(Commands::Blend(args)) = cli.command else {
            panic!("expected blend");
        };
        assert_eq!(args.output, PathBuf::from("out.xml"));
        assert!(args.normalize);
        assert_eq!(
            args.sources().unwrap(),
            vec![(PathBuf::from("a.xml"), 1.0), (PathBuf::from("b.xml"), 3.0)]
        );
    }

    #[test]
    fn test_blend_rejects_bad_pairs() {
        // Fewer than two presets
        assert!(Cli::try_parse_from(["mut8", "blend", "out.xml", "a.xml", "1"]).is_err());
        // More than four presets
        let many = ["a", "1", "b", "1", "c", "1", "d", "1", "e", "1"];
        assert!(Cli::try_parse_from(["mut8", "blend", "out.xml"].into_iter().chain(many)).is_err());

        let cli = Cli::try_parse_from(["mut8", "blend", "out.xml", "a.xml", "1", "b.xml", "2", "c.xml"]).unwrap();
        let Some(Commands::Blend(args)) = cli.command else {
            panic!("expected blend");
        };
        assert!(args.sources().is_err());

        let cli = Cli::try_parse_from(["mut8", "blend", "out.xml", "a.xml", "x", "b.xml", "1"]).unwrap();
        let Some(Commands::Blend(args)) = cli.command else {
            panic!("expected blend");
        };
        assert!(args.sources().is_err());
    }

    #[test]
    fn test_config_options() {
        let cli = Cli::try_parse_from([
            "mut8",
            "config",
            "--presets-root",
            "/data/SubPresets",
            "--exclude",
            "Morph EQ",
            "--exclude",
            "Chord Bank",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Config {
                presets_root: Some(PathBuf::from("/data/SubPresets")),
                exclude: vec!["Morph EQ".to_string(), "Chord Bank".to_string()],
            })
        );
    }
}
