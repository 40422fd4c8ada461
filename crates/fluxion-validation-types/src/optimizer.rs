// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use serde::{Deserialize, Serialize};

use crate::parameters::ParameterSet;
use crate::settings::{ComparisonPeriod, MetricKind, ValidationSettings};

/// Thresholds for the weather deviation analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    /// Points with a smaller |signed deviation| (%) are ignored
    pub significant_deviation_pct: f64,
    pub reference_temperature: f64,
    pub reference_irradiance: f64,
    /// Minimum |T - reference| (°C) for a point to count
    pub min_temperature_delta: f64,
    /// Minimum |G - reference| (W/m²) for a point to count
    pub min_irradiance_delta: f64,
    /// Minimum cloud cover (%) for a point to count
    pub min_cloud_cover: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            significant_deviation_pct: 5.0,
            reference_temperature: 25.0,
            reference_irradiance: 1000.0,
            min_temperature_delta: 5.0,
            min_irradiance_delta: 100.0,
            min_cloud_cover: 20.0,
        }
    }
}

/// Options for the parameter optimization loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizerOptions {
    pub max_iterations: usize,
    /// Stop once aggregate deviation changes by less than this (percentage points)
    pub convergence_threshold: f64,
    /// Largest relative change of any parameter in one iteration (0.1 = 10 %)
    pub max_adjustment_per_iteration: f64,
    pub optimize_for: Vec<MetricKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_parameters: Option<ParameterSet>,
    pub settings: ValidationSettings,
    pub analysis: AnalysisConfig,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            convergence_threshold: 0.1,
            max_adjustment_per_iteration: 0.1,
            optimize_for: vec![MetricKind::Consumption, MetricKind::Production],
            initial_parameters: None,
            settings: ValidationSettings::for_period(ComparisonPeriod::Hourly),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl OptimizerOptions {
    /// Starting point of the search
    #[must_use]
    pub fn starting_parameters(&self) -> ParameterSet {
        self.initial_parameters.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimizer_defaults() {
        let options = OptimizerOptions::default();
        assert_eq!(options.max_iterations, 50);
        assert_eq!(options.settings.comparison_period, ComparisonPeriod::Hourly);
        assert_eq!(options.starting_parameters(), ParameterSet::default());
    }

    #[test]
    fn test_optimizer_options_from_partial_json() {
        let json = r#"{ "maxIterations": 5, "optimizeFor": ["consumption"], "initialParameters": { "peakHoursConsumptionFactor": 1.0 } }"#;
        let options: OptimizerOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.max_iterations, 5);
        assert_eq!(options.optimize_for, vec![MetricKind::Consumption]);
        let start = options.starting_parameters();
        assert!((start.peak_hours_consumption_factor - 1.0).abs() < f64::EPSILON);
        assert!((options.convergence_threshold - 0.1).abs() < f64::EPSILON);
    }
}
