//! Evaluation configuration.
//!
//! Configuration is layered in order:
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. environment variables with the `CLUSTER_NMI__` prefix
//!    (e.g. `CLUSTER_NMI__SETTINGS__NORMALIZATION=observation_count`)
//!
//! Command-line options are applied on top by the binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};

pub use crate::metrics::counts::Normalization;
pub use crate::metrics::entropy::EntropyFormula;

/// Directory scanned for model artifacts when none is configured.
pub const DEFAULT_MODELS_DIR: &str = "output";

/// File suffix identifying model artifacts.
pub const DEFAULT_MODEL_SUFFIX: &str = ".cm";

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "CLUSTER_NMI";

/// Knobs that change the numbers produced for a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalSettings {
    /// Denominator used for every probability.
    pub normalization: Normalization,
    /// Formula used for the clustering and category entropies.
    pub entropy: EntropyFormula,
    /// Compare item and vector identifiers position by position.
    pub strict_alignment: bool,
    /// Score models concurrently (report order is unaffected).
    pub parallel_models: bool,
}

/// Full configuration for a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Directory holding the serialized models.
    pub models_dir: PathBuf,
    /// Only entries ending with this suffix are treated as models.
    pub model_suffix: String,
    /// Scoring settings.
    pub settings: EvalSettings,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            model_suffix: DEFAULT_MODEL_SUFFIX.to_string(),
            settings: EvalSettings::default(),
        }
    }
}

impl EvalConfig {
    /// Load configuration from defaults, an optional TOML file and the environment.
    pub fn load(path: Option<&Path>) -> EvalResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(EvalError::Config(format!(
                    "config file does not exist: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: EvalConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> EvalResult<Self> {
        let config: EvalConfig = toml::from_str(content)
            .map_err(|e| EvalError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> EvalResult<()> {
        if self.models_dir.as_os_str().is_empty() {
            return Err(EvalError::Config("models_dir must not be empty".into()));
        }

        if self.model_suffix.is_empty() {
            return Err(EvalError::Config("model_suffix must not be empty".into()));
        }

        Ok(())
    }
}
