use clap::{Args, Parser};
use cif2pdb::workflows::confidence::ConfidenceSource;
use std::path::PathBuf;

pub const DEFAULT_INPUT: &str = "fold_gtru_dcr_model_0.cif";
pub const DEFAULT_OUTPUT: &str = "fold_gtru_dcr__model_0.pdb";

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "cif2pdb - Convert a predicted mmCIF structure to PDB format, writing per-atom plDDT confidence into the B-factor column.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    #[command(flatten)]
    pub convert: ConvertArgs,

    /// Increase verbosity level (INFO by default, -v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output (at least DEBUG)
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Arguments for a conversion.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Path to the input mmCIF structure file.
    #[arg(value_name = "INPUT", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Path for the output PDB structure file.
    #[arg(value_name = "OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Where to read each atom's confidence from, overriding the config file.
    #[arg(long, value_name = "SOURCE", value_parser = parse_confidence_source)]
    pub confidence_source: Option<ConfidenceSource>,

    /// B-factor for atoms without a confidence value, overriding the config file.
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub default_confidence: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S confidence.default=50
    #[arg(
        short = 'S',
        long = "set",
        value_name = "KEY=VALUE",
        num_args = 1,
        action = clap::ArgAction::Append
    )]
    pub set_values: Vec<String>,
}

fn parse_confidence_source(value: &str) -> Result<ConfidenceSource, String> {
    value.parse::<ConfidenceSource>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reproduce_the_fixed_file_names() {
        let cli = Cli::parse_from(["cif2pdb"]);
        assert_eq!(cli.convert.input, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(cli.convert.output, PathBuf::from(DEFAULT_OUTPUT));
        assert!(cli.convert.config.is_none());
        assert!(cli.convert.confidence_source.is_none());
        assert!(cli.convert.set_values.is_empty());
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
    }

    #[test]
    fn positional_paths_and_overrides_are_parsed() {
        let cli = Cli::parse_from([
            "cif2pdb",
            "model.cif",
            "model.pdb",
            "--confidence-source",
            "qa-metric-local",
            "--default-confidence",
            "-1.5",
            "-S",
            "confidence.source=atom-site",
            "-vv",
        ]);
        assert_eq!(cli.convert.input, PathBuf::from("model.cif"));
        assert_eq!(cli.convert.output, PathBuf::from("model.pdb"));
        assert_eq!(
            cli.convert.confidence_source,
            Some(ConfidenceSource::QaMetricLocal)
        );
        assert_eq!(cli.convert.default_confidence, Some(-1.5));
        assert_eq!(cli.convert.set_values, vec!["confidence.source=atom-site"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn set_takes_one_value_and_leaves_positionals_alone() {
        let cli = Cli::try_parse_from([
            "cif2pdb",
            "-S",
            "confidence.default=5",
            "in.cif",
            "out.pdb",
        ])
        .unwrap();
        assert_eq!(cli.convert.input, PathBuf::from("in.cif"));
        assert_eq!(cli.convert.output, PathBuf::from("out.pdb"));
        assert_eq!(cli.convert.set_values, vec!["confidence.default=5"]);
    }

    #[test]
    fn set_can_be_repeated() {
        let cli = Cli::try_parse_from([
            "cif2pdb",
            "--set",
            "confidence.default=5",
            "in.cif",
            "--set",
            "confidence.source=qa-metric-local",
        ])
        .unwrap();
        assert_eq!(cli.convert.input, PathBuf::from("in.cif"));
        assert_eq!(cli.convert.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(
            cli.convert.set_values,
            vec!["confidence.default=5", "confidence.source=qa-metric-local"]
        );
    }

    #[test]
    fn set_without_a_value_is_rejected() {
        assert!(Cli::try_parse_from(["cif2pdb", "in.cif", "-S"]).is_err());
    }

    #[test]
    fn unknown_confidence_source_is_rejected() {
        let result = Cli::try_parse_from(["cif2pdb", "--confidence-source", "b-factor"]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["cif2pdb", "-q", "-v"]);
        assert!(result.is_err());
    }
}
