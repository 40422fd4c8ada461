// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

//! Configuration file parsing and environment overrides.
//!
//! Sections: `[validation]`, `[optimizer]`, `[seasons]` and `[synthetic]`.
//! Keys inside each section are camelCase, matching the JSON data files.

use anyhow::{Context, Result};
use fluxion_validation::{
    AdjustedReadings, CalibratedPredictions, ParameterAdapter, SharedSeasonClassifier,
};
use fluxion_validation_types::{
    AnalysisConfig, ComparisonPeriod, Hemisphere, MetricKind, OptimizerOptions, ParameterSet,
    SeasonConfig, ValidationSettings,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::validation::ValidationResult;

/// Picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "fluxion-validate.toml";

pub const ENV_PERIOD: &str = "FLUXION_VALIDATE_PERIOD";
pub const ENV_MAX_ITERATIONS: &str = "FLUXION_VALIDATE_MAX_ITERATIONS";
pub const ENV_HEMISPHERE: &str = "FLUXION_VALIDATE_HEMISPHERE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub validation: ValidationSettings,
    pub optimizer: OptimizerConfig,
    pub seasons: SeasonConfig,
    pub synthetic: SyntheticConfig,
}

/// Which side of the comparison the optimizer rescales
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdapterKind {
    #[default]
    CalibratePredictions,
    AdjustReadings,
}

impl AdapterKind {
    /// The adapter `analyze` and `optimize` apply parameters through
    #[must_use]
    pub fn build(self, seasons: &SharedSeasonClassifier) -> Box<dyn ParameterAdapter> {
        match self {
            Self::CalibratePredictions => {
                Box::new(CalibratedPredictions::new(SharedSeasonClassifier::clone(seasons)))
            }
            Self::AdjustReadings => {
                Box::new(AdjustedReadings::new(SharedSeasonClassifier::clone(seasons)))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizerConfig {
    pub max_iterations: usize,
    pub convergence_threshold: f64,
    pub max_adjustment_per_iteration: f64,
    pub optimize_for: Vec<MetricKind>,
    pub adapter: AdapterKind,
    pub analysis: AnalysisConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        let defaults = OptimizerOptions::default();
        Self {
            max_iterations: defaults.max_iterations,
            convergence_threshold: defaults.convergence_threshold,
            max_adjustment_per_iteration: defaults.max_adjustment_per_iteration,
            optimize_for: defaults.optimize_for,
            adapter: AdapterKind::default(),
            analysis: defaults.analysis,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyntheticConfig {
    /// Maximum relative noise (0.1 = ±10 %)
    pub noise: f64,
    /// Systematic relative offset
    pub bias: f64,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            noise: 0.1,
            bias: 0.0,
            seed: 42,
        }
    }
}

impl AppConfig {
    /// Loads `path`, or `fluxion-validate.toml` if present, or defaults; then
    /// applies environment overrides and validates.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = Self::load_unchecked(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`AppConfig::load`] without the validation step
    pub fn load_unchecked(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// TOML unless the file extension is `.json`
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        };

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Applies `FLUXION_VALIDATE_*` overrides through `lookup`.
    /// Unparseable values are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(period) = lookup(ENV_PERIOD) {
            self.validation.comparison_period = ComparisonPeriod::parse(&period);
        }

        if let Some(value) = lookup(ENV_MAX_ITERATIONS) {
            match value.trim().parse::<usize>() {
                Ok(n) => self.optimizer.max_iterations = n,
                Err(_) => warn!(%value, "Ignoring invalid {ENV_MAX_ITERATIONS}"),
            }
        }

        if let Some(value) = lookup(ENV_HEMISPHERE) {
            match value.trim().to_ascii_lowercase().as_str() {
                "northern" | "north" => self.seasons.hemisphere = Hemisphere::Northern,
                "southern" | "south" => self.seasons.hemisphere = Hemisphere::Southern,
                _ => warn!(%value, "Ignoring invalid {ENV_HEMISPHERE}"),
            }
        }
    }

    /// Optimizer options for this configuration. The optimizer compares
    /// with the `[validation]` settings.
    #[must_use]
    pub fn optimizer_options(&self, initial_parameters: Option<ParameterSet>) -> OptimizerOptions {
        OptimizerOptions {
            max_iterations: self.optimizer.max_iterations,
            convergence_threshold: self.optimizer.convergence_threshold,
            max_adjustment_per_iteration: self.optimizer.max_adjustment_per_iteration,
            optimize_for: self.optimizer.optimize_for.clone(),
            initial_parameters,
            settings: self.validation.clone(),
            analysis: self.optimizer.analysis,
        }
    }

    /// Validate configuration with field-level reporting
    #[must_use]
    pub fn validate_detailed(&self) -> ValidationResult {
        let mut result = ValidationResult::success();

        // ============= [validation] =============
        let validation = &self.validation;
        if let ComparisonPeriod::Other(name) = &validation.comparison_period {
            result.add_warning(
                "validation.comparisonPeriod",
                format!("'{name}' matches no reading granularity; comparisons will be empty"),
            );
        }
        if validation.metrics.is_empty() {
            result.add_error("validation.metrics", "At least one metric must be selected");
        }
        if !validation.tariff_per_kwh.is_finite() || validation.tariff_per_kwh < 0.0 {
            result.add_error("validation.tariffPerKwh", "Tariff must be a non-negative number");
        }
        let factor = validation.outlier_threshold_factor;
        if !factor.is_finite() || factor <= 0.0 {
            result.add_error(
                "validation.outlierThresholdFactor",
                "Outlier factor must be a positive number",
            );
        } else if !(ParameterSet::OUTLIER_THRESHOLD_MIN..=ParameterSet::OUTLIER_THRESHOLD_MAX)
            .contains(&factor)
        {
            result.add_warning(
                "validation.outlierThresholdFactor",
                format!(
                    "{factor} is outside the optimizer range {}-{}",
                    ParameterSet::OUTLIER_THRESHOLD_MIN,
                    ParameterSet::OUTLIER_THRESHOLD_MAX
                ),
            );
        }

        // ============= [optimizer] =============
        let optimizer = &self.optimizer;
        if optimizer.max_iterations == 0 {
            result.add_error("optimizer.maxIterations", "Must be at least 1");
        } else if optimizer.max_iterations > 1000 {
            result.add_warning("optimizer.maxIterations", "More than 1000 iterations is rarely useful");
        }
        if !optimizer.convergence_threshold.is_finite() || optimizer.convergence_threshold < 0.0 {
            result.add_error("optimizer.convergenceThreshold", "Must be a non-negative number");
        }
        let step = optimizer.max_adjustment_per_iteration;
        if !step.is_finite() || step <= 0.0 || step >= 1.0 {
            result.add_error("optimizer.maxAdjustmentPerIteration", "Must be between 0 and 1 (exclusive)");
        }
        if optimizer.optimize_for.is_empty() {
            result.add_error("optimizer.optimizeFor", "At least one metric must be selected");
        }

        // ============= [seasons] =============
        for (field, months) in [
            ("seasons.winterMonths", &self.seasons.winter_months),
            ("seasons.summerMonths", &self.seasons.summer_months),
        ] {
            if let Some(months) = months
                && months.iter().any(|m| !(1..=12).contains(m))
            {
                result.add_error(field, "Months must be between 1 and 12");
            }
        }
        if let (Some(winter), Some(summer)) = (&self.seasons.winter_months, &self.seasons.summer_months)
            && winter.iter().any(|m| summer.contains(m))
        {
            result.add_warning(
                "seasons",
                "Winter and summer share months; shared months count as winter",
            );
        }

        // ============= [synthetic] =============
        let noise = self.synthetic.noise;
        if !noise.is_finite() || !(0.0..1.0).contains(&noise) {
            result.add_error("synthetic.noise", "Noise must be in [0, 1)");
        }
        if !self.synthetic.bias.is_finite() || self.synthetic.bias <= -1.0 {
            result.add_error("synthetic.bias", "Bias must be greater than -1");
        }

        result
    }

    /// Errors become an `anyhow` error; warnings are logged
    pub fn validate(&self) -> Result<()> {
        let result = self.validate_detailed();
        for warning in &result.warnings {
            warn!(field = %warning.field, "{}", warning.message);
        }
        if !result.is_valid() {
            let messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            anyhow::bail!("Invalid configuration:\n  {}", messages.join("\n  "));
        }
        Ok(())
    }
}
