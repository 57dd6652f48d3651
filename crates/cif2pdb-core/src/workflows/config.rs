use super::confidence::{ConfidenceSource, RemapOptions};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub remap: RemapOptions,
}

#[derive(Default)]
pub struct ConvertConfigBuilder {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    confidence_source: Option<ConfidenceSource>,
    default_confidence: Option<f64>,
}

impl ConvertConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }
    pub fn confidence_source(mut self, source: ConfidenceSource) -> Self {
        self.confidence_source = Some(source);
        self
    }
    pub fn default_confidence(mut self, value: f64) -> Self {
        self.default_confidence = Some(value);
        self
    }

    pub fn build(self) -> Result<ConvertConfig, ConfigError> {
        let defaults = RemapOptions::default();
        let default_confidence = self
            .default_confidence
            .unwrap_or(defaults.default_confidence);
        if !default_confidence.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "default_confidence",
                reason: format!("expected a finite number, got {}", default_confidence),
            });
        }

        Ok(ConvertConfig {
            input_path: self
                .input_path
                .ok_or(ConfigError::MissingParameter("input_path"))?,
            output_path: self
                .output_path
                .ok_or(ConfigError::MissingParameter("output_path"))?,
            remap: RemapOptions {
                source: self.confidence_source.unwrap_or(defaults.source),
                default_confidence,
            },
        })
    }
}
