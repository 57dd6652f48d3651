use crate::cli::ConvertArgs;
use crate::error::{CliError, Result};
use cif2pdb::workflows::confidence::ConfidenceSource;
use cif2pdb::workflows::config::{ConvertConfig, ConvertConfigBuilder};
use cif2pdb::workflows::error::WorkflowError;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialConfidenceConfig {
    source: Option<ConfidenceSource>,
    default: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialConvertConfig {
    confidence: Option<PartialConfidenceConfig>,
}

impl PartialConvertConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Resolves the final configuration: CLI flags, then `--set` values, then
    /// the file, then built-in defaults.
    pub fn merge_with_cli(mut self, args: &ConvertArgs) -> Result<ConvertConfig> {
        self.apply_set_values(&args.set_values)?;
        let confidence = self.confidence.take().unwrap_or_default();

        let mut builder = ConvertConfigBuilder::new()
            .input_path(&args.input)
            .output_path(&args.output);
        if let Some(source) = args.confidence_source.or(confidence.source) {
            builder = builder.confidence_source(source);
        }
        if let Some(value) = args.default_confidence.or(confidence.default) {
            builder = builder.default_confidence(value);
        }

        let config = builder.build().map_err(WorkflowError::from)?;
        debug!("Final conversion configuration: {:?}", config);
        Ok(config)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();
            let value_str = value_str.trim();

            match key {
                "confidence.source" => {
                    self.confidence
                        .get_or_insert_with(Default::default)
                        .source = Some(value_str.parse::<ConfidenceSource>().map_err(|e| {
                        CliError::Config(format!("Invalid value for {}: {}", key, e))
                    })?);
                }
                "confidence.default" => {
                    self.confidence
                        .get_or_insert_with(Default::default)
                        .default = Some(value_str.parse::<f64>().map_err(|_| {
                        CliError::Config(format!("Invalid float value for {}: {}", key, value_str))
                    })?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use cif2pdb::workflows::config::ConfigError;
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_config_file(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("cif2pdb.toml");
        fs::write(&path, content).unwrap();
        path
    }

    fn parse_args(extra: &[&str]) -> ConvertArgs {
        let mut args = vec!["cif2pdb", "in.cif", "out.pdb"];
        args.extend_from_slice(extra);
        Cli::parse_from(args).convert
    }

    #[test]
    fn defaults_apply_without_a_config_file() {
        let config = PartialConvertConfig::default()
            .merge_with_cli(&parse_args(&[]))
            .unwrap();
        assert_eq!(config.input_path, PathBuf::from("in.cif"));
        assert_eq!(config.output_path, PathBuf::from("out.pdb"));
        assert_eq!(config.remap.source, ConfidenceSource::AtomSite);
        assert_eq!(config.remap.default_confidence, 0.0);
    }

    #[test]
    fn file_values_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
        [confidence]
        source = "qa-metric-local"
        default = 12.5
        "#,
        );

        let config = PartialConvertConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&parse_args(&[]))
            .unwrap();
        assert_eq!(config.remap.source, ConfidenceSource::QaMetricLocal);
        assert_eq!(config.remap.default_confidence, 12.5);
    }

    #[test]
    fn set_values_override_file_and_cli_flags_override_both() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
        [confidence]
        source = "qa-metric-local"
        default = 12.5
        "#,
        );

        let args = parse_args(&[
            "--default-confidence",
            "99",
            "-S",
            "confidence.default=40",
            "-S",
            "confidence.source=atom-site",
        ]);
        let config = PartialConvertConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();
        assert_eq!(config.remap.source, ConfidenceSource::AtomSite);
        assert_eq!(config.remap.default_confidence, 99.0);
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(&dir, "[confidence]\nscale = 2.0\n");
        let err = PartialConvertConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, CliError::FileParsing { .. }));
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PartialConvertConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        for set in ["confidence.default", "confidence.default=high", "output.width=3"] {
            let err = PartialConvertConfig::default()
                .merge_with_cli(&parse_args(&["-S", set]))
                .unwrap_err();
            assert!(matches!(err, CliError::Config(_)), "accepted '{}'", set);
        }
    }

    #[test]
    fn non_finite_default_is_a_configuration_error() {
        let err = PartialConvertConfig::default()
            .merge_with_cli(&parse_args(&["-S", "confidence.default=inf"]))
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Conversion(WorkflowError::Config {
                source: ConfigError::InvalidParameter { .. }
            })
        ));
    }
}
