//! Engine configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit override file, when one is passed in
//! 2. The defaults embedded in the binary (`config/default.toml`)

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::core::{CohortCatalog, CohortDefinition, ScoringPolicy, validate_weights};

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

const DEFAULT_PORT: u16 = 8080;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub scoring: ScoringPolicy,
    #[serde(default)]
    pub cohorts: Vec<CohortDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl EngineConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                tracing::info!(path = %path.display(), "loading config override");
                Self::from_toml_str(&raw)
            }
            None => Self::embedded(),
        }
    }

    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn cohort_catalog(&self) -> CohortCatalog {
        CohortCatalog::new(self.cohorts.clone())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_weights(self.scoring.factors().iter().map(|f| f.weight))
            .map_err(|e| ConfigError::Invalid(format!("scoring: {e}")))?;

        for factor in self.scoring.factors() {
            if !factor.worst.is_finite() || !factor.best.is_finite() || factor.worst == factor.best
            {
                return Err(ConfigError::Invalid(format!(
                    "scoring factor '{}' needs distinct finite worst and best bounds",
                    factor.name
                )));
            }
        }

        let mut seen = HashSet::new();
        for cohort in &self.cohorts {
            let key = (cohort.age_band.as_str(), cohort.income_band.as_str());
            if !seen.insert(key) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate cohort for age band '{}' and income band '{}'",
                    cohort.age_band, cohort.income_band
                )));
            }
            if cohort.values.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "cohort '{}'/'{}' has no values",
                    cohort.age_band, cohort.income_band
                )));
            }
            if cohort.values.iter().any(|v| !v.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "cohort '{}'/'{}' contains a non-finite value",
                    cohort.age_band, cohort.income_band
                )));
            }
        }
        Ok(())
    }
}
