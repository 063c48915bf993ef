//! Configuration for cross-validation runs
//!
//! A [`CrossValidationConfig`] can be built in code, parsed from TOML, YAML or
//! JSON, and overridden from `FOLDSCORE_*` environment variables.

use crate::error::{ensure_same_length, Error, Result};
use crate::ml::metrics::classification::Scores;
use crate::ml::model_selection::{
    cross_validation_scores_with, par_cross_validation_scores_with, KFold, DEFAULT_N_SPLITS,
};
use crate::ml::models::Estimator;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Cross-validation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossValidationConfig {
    /// Number of folds
    pub n_splits: usize,
    /// Draw fold contents at random
    pub shuffle: bool,
    /// Seed for the fold draw (None = seeded from the OS)
    pub random_state: Option<u64>,
    /// Evaluate folds on the rayon thread pool
    pub parallel: bool,
}

impl Default for CrossValidationConfig {
    fn default() -> Self {
        CrossValidationConfig {
            n_splits: DEFAULT_N_SPLITS,
            shuffle: true,
            random_state: None,
            parallel: false,
        }
    }
}

/// Builder for CrossValidationConfig
pub struct CrossValidationConfigBuilder {
    config: CrossValidationConfig,
}

impl CrossValidationConfigBuilder {
    pub fn new() -> Self {
        CrossValidationConfigBuilder {
            config: CrossValidationConfig::default(),
        }
    }

    pub fn n_splits(mut self, n_splits: usize) -> Self {
        self.config.n_splits = n_splits;
        self
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.config.shuffle = shuffle;
        self
    }

    pub fn random_state(mut self, seed: u64) -> Self {
        self.config.random_state = Some(seed);
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn build(self) -> Result<CrossValidationConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for CrossValidationConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CrossValidationConfig {
    /// Check that the settings describe a usable partitioner
    pub fn validate(&self) -> Result<()> {
        if self.n_splits == 0 {
            return Err(Error::InvalidConfiguration(
                "n_splits must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse from a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a YAML document
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a JSON document
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file (format chosen by extension)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            Some(ext) => Err(Error::Format(format!(
                "Unsupported config file format: {}",
                ext
            ))),
            None => Err(Error::Format(format!(
                "Config file has no extension: {}",
                path.display()
            ))),
        }
    }

    /// Override settings from `FOLDSCORE_N_SPLITS`, `FOLDSCORE_SHUFFLE`,
    /// `FOLDSCORE_RANDOM_STATE` and `FOLDSCORE_PARALLEL`
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
        where
            T::Err: std::fmt::Display,
        {
            value
                .trim()
                .parse()
                .map_err(|e| Error::InvalidConfiguration(format!("Invalid {}: {}", key, e)))
        }

        if let Some(v) = lookup("FOLDSCORE_N_SPLITS") {
            self.n_splits = parse("FOLDSCORE_N_SPLITS", &v)?;
        }
        if let Some(v) = lookup("FOLDSCORE_SHUFFLE") {
            self.shuffle = parse("FOLDSCORE_SHUFFLE", &v)?;
        }
        if let Some(v) = lookup("FOLDSCORE_RANDOM_STATE") {
            self.random_state = Some(parse("FOLDSCORE_RANDOM_STATE", &v)?);
        }
        if let Some(v) = lookup("FOLDSCORE_PARALLEL") {
            self.parallel = parse("FOLDSCORE_PARALLEL", &v)?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Build the partitioner described by this configuration
    pub fn to_kfold(&self) -> Result<KFold> {
        let kfold = KFold::new(self.n_splits)?.with_shuffle(self.shuffle);
        Ok(match self.random_state {
            Some(seed) => kfold.with_random_state(seed),
            None => kfold,
        })
    }

    /// Cross-validate `estimator`, sequentially or in parallel
    pub fn run<M, R, L>(
        &self,
        estimator: &mut M,
        x: &[R],
        y: &[L],
    ) -> std::result::Result<Vec<Scores>, M::Error>
    where
        M: Estimator<R, L> + Clone + Send + Sync,
        M::Error: Send,
        R: Clone + Sync,
        L: Clone + Sync,
    {
        ensure_same_length(x.len(), y.len())?;
        let kfold = self.to_kfold()?;
        log::info!(
            "cross-validating {} rows over {} folds (shuffle: {}, parallel: {})",
            x.len(),
            kfold.n_splits(),
            kfold.shuffle(),
            self.parallel
        );

        if self.parallel {
            par_cross_validation_scores_with(&*estimator, x, y, &kfold)
        } else {
            cross_validation_scores_with(estimator, x, y, &kfold)
        }
    }
}
