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

//! Parameter optimizer
//!
//! Bounded iterative search: apply the current parameters, compare every
//! installation against its predicted series, score the batch, then nudge
//! each parameter by its deviation signal. The lowest-scoring parameter set
//! seen is returned alongside the final one.

use std::sync::Arc;

use fluxion_validation_types::{
    Hemisphere, InstallationData, OptimizerOptions, ParameterSet, PredictedSeries,
    ValidationComparison, ValidationSettings,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::DeviationSignals;
use crate::comparison::{Comparator, ComparisonEngine};
use crate::error::{Result, ValidationError};
use crate::parameters::{CalibratedPredictions, ParameterAdapter};
use crate::season::SharedSeasonClassifier;
use crate::summary::aggregate_deviation;

/// One evaluated parameter set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationRecord {
    pub iteration: usize,
    pub deviation: f64,
    pub parameters: ParameterSet,
    /// Absent on the iteration that converged
    pub signals: Option<DeviationSignals>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationOutcome {
    /// Lowest aggregate deviation seen
    pub parameters: ParameterSet,
    pub best_deviation: f64,
    pub best_iteration: usize,
    /// Parameters the loop ended on; not evaluated if iterations ran out
    pub final_parameters: ParameterSet,
    pub final_deviation: f64,
    pub iterations: usize,
    pub converged: bool,
    pub history: Vec<IterationRecord>,
}

/// Multiplies `value` by `1 ± min(|signal| / 100, max_step)`, the sign
/// following `signal`
#[must_use]
pub fn scale_parameter(value: f64, signal: f64, max_step: f64) -> f64 {
    let step = (signal.abs() / 100.0).min(max_step);
    value * (1.0 + signal.signum() * step)
}

#[derive(Debug)]
pub struct ParameterOptimizer<A = CalibratedPredictions, C = ComparisonEngine> {
    options: OptimizerOptions,
    adapter: A,
    comparator: C,
    seasons: SharedSeasonClassifier,
}

impl ParameterOptimizer {
    /// Calibrates predictions with the default engine and northern seasons
    #[must_use]
    pub fn new(options: OptimizerOptions) -> Self {
        Self::with_seasons(options, Arc::new(Hemisphere::Northern))
    }

    #[must_use]
    pub fn with_seasons(options: OptimizerOptions, seasons: SharedSeasonClassifier) -> Self {
        Self {
            options,
            adapter: CalibratedPredictions::new(Arc::clone(&seasons)),
            comparator: ComparisonEngine::default(),
            seasons,
        }
    }
}

impl<A: ParameterAdapter, C: Comparator> ParameterOptimizer<A, C> {
    #[must_use]
    pub fn with_components(
        options: OptimizerOptions,
        adapter: A,
        comparator: C,
        seasons: SharedSeasonClassifier,
    ) -> Self {
        Self {
            options,
            adapter,
            comparator,
            seasons,
        }
    }

    #[must_use]
    pub fn options(&self) -> &OptimizerOptions {
        &self.options
    }

    #[must_use]
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    fn validate(&self) -> Result<ParameterSet> {
        let options = &self.options;
        if options.max_iterations == 0 {
            return Err(ValidationError::InvalidOptions(
                "maxIterations must be at least 1".to_owned(),
            ));
        }
        if !options.convergence_threshold.is_finite() || options.convergence_threshold < 0.0 {
            return Err(ValidationError::InvalidOptions(format!(
                "convergenceThreshold must be a non-negative number, got {}",
                options.convergence_threshold
            )));
        }
        let max_step = options.max_adjustment_per_iteration;
        if !max_step.is_finite() || max_step <= 0.0 || max_step >= 1.0 {
            return Err(ValidationError::InvalidOptions(format!(
                "maxAdjustmentPerIteration must be in (0, 1), got {max_step}"
            )));
        }
        if options.optimize_for.is_empty() {
            return Err(ValidationError::InvalidOptions(
                "optimizeFor must name at least one metric".to_owned(),
            ));
        }

        let initial = options.starting_parameters();
        if let Some(name) = initial.first_non_finite() {
            return Err(ValidationError::InvalidParameters(format!(
                "{name} is not finite"
            )));
        }
        Ok(initial.with_outlier_threshold_clamped())
    }

    fn evaluate(
        &self,
        installations: &[InstallationData],
        predictions: &[PredictedSeries],
        params: &ParameterSet,
    ) -> Vec<ValidationComparison> {
        let settings = ValidationSettings {
            outlier_threshold_factor: params.outlier_threshold_factor,
            ..self.options.settings.clone()
        };

        installations
            .iter()
            .zip(predictions)
            .map(|(installation, predicted)| {
                let pair = self.adapter.apply(
                    installation,
                    predicted,
                    params,
                    &settings.comparison_period,
                );
                self.comparator
                    .compare(&pair.installation, &pair.predicted, &settings)
            })
            .collect()
    }

    /// Next parameter set from this iteration's signals.
    ///
    /// Every nudge follows the sign of its signal, scaled by the sign of the
    /// parameter so negative coefficients grow in magnitude on a positive
    /// signal. Cloud impact lowers production and takes the negated signal.
    fn step(
        &self,
        params: &ParameterSet,
        signals: &DeviationSignals,
        deviation_change: Option<f64>,
    ) -> ParameterSet {
        let max_step = self.options.max_adjustment_per_iteration;
        let nudge = |value: f64, signal: Option<f64>| {
            signal.map_or(value, |s| scale_parameter(value, s * value.signum(), max_step))
        };

        let seasonal = &signals.seasonal;
        let time_of_day = &signals.time_of_day;
        let weather = &signals.weather;

        // Only tightens, and only when outliers are being filtered
        let outlier_threshold_factor = match deviation_change {
            Some(change) if change > 0.0 && self.options.settings.exclude_outliers => {
                scale_parameter(params.outlier_threshold_factor, -change, max_step)
            }
            Some(_) | None => params.outlier_threshold_factor,
        };

        ParameterSet {
            temperature_coefficient: nudge(params.temperature_coefficient, weather.temperature),
            irradiance_linear_factor: nudge(params.irradiance_linear_factor, weather.irradiance),
            irradiance_quadratic_factor: nudge(
                params.irradiance_quadratic_factor,
                weather.irradiance_curvature,
            ),
            // More impact lowers the multiplier
            cloud_cover_impact: nudge(params.cloud_cover_impact, weather.cloud_cover.map(|s| -s)),
            winter_consumption_factor: nudge(
                params.winter_consumption_factor,
                seasonal.winter_consumption,
            ),
            winter_production_factor: nudge(
                params.winter_production_factor,
                seasonal.winter_production,
            ),
            summer_consumption_factor: nudge(
                params.summer_consumption_factor,
                seasonal.summer_consumption,
            ),
            summer_production_factor: nudge(
                params.summer_production_factor,
                seasonal.summer_production,
            ),
            peak_hours_consumption_factor: nudge(
                params.peak_hours_consumption_factor,
                time_of_day.peak_hours,
            ),
            night_hours_consumption_factor: nudge(
                params.night_hours_consumption_factor,
                time_of_day.night_hours,
            ),
            outlier_threshold_factor,
        }
        .with_outlier_threshold_clamped()
    }

    /// Runs the search over paired installations and predictions
    pub fn run(
        &self,
        installations: &[InstallationData],
        predictions: &[PredictedSeries],
    ) -> Result<OptimizationOutcome> {
        let mut current = self.validate()?;
        if installations.len() != predictions.len() {
            return Err(ValidationError::MismatchedInputs {
                installations: installations.len(),
                predictions: predictions.len(),
            });
        }

        info!(
            installations = installations.len(),
            max_iterations = self.options.max_iterations,
            "Starting parameter optimization"
        );

        let mut previous: Option<f64> = None;
        let mut best_parameters = current;
        let mut best_deviation = f64::INFINITY;
        let mut best_iteration = 0;
        let mut final_deviation = f64::NAN;
        let mut converged = false;
        let mut history = Vec::new();

        for iteration in 1..=self.options.max_iterations {
            let results = self.evaluate(installations, predictions, &current);
            let deviation = aggregate_deviation(&results, &self.options.optimize_for);
            if !deviation.is_finite() {
                return Err(ValidationError::NonFiniteDeviation { iteration });
            }
            final_deviation = deviation;

            if deviation < best_deviation {
                best_deviation = deviation;
                best_parameters = current;
                best_iteration = iteration;
            }

            debug!(iteration, deviation, best_deviation, "Optimizer iteration");

            if previous.is_some_and(|p| (p - deviation).abs() < self.options.convergence_threshold) {
                history.push(IterationRecord {
                    iteration,
                    deviation,
                    parameters: current,
                    signals: None,
                });
                converged = true;
                break;
            }

            let signals =
                DeviationSignals::analyze(&results, self.seasons.as_ref(), &self.options.analysis);
            let change = previous.map(|p| deviation - p);
            let next = self.step(&current, &signals, change);
            if let Some(name) = next.first_non_finite() {
                return Err(ValidationError::NonFiniteParameter { iteration, name });
            }

            history.push(IterationRecord {
                iteration,
                deviation,
                parameters: current,
                signals: Some(signals),
            });
            current = next;
            previous = Some(deviation);
        }

        info!(
            iterations = history.len(),
            converged,
            best_deviation,
            best_iteration,
            "Parameter optimization finished"
        );

        Ok(OptimizationOutcome {
            parameters: best_parameters,
            best_deviation,
            best_iteration,
            final_parameters: current,
            final_deviation,
            iterations: history.len(),
            converged,
            history,
        })
    }
}

/// Optimizes with the default adapter, engine and northern seasons
pub fn optimize_parameters(
    installations: &[InstallationData],
    predictions: &[PredictedSeries],
    options: OptimizerOptions,
) -> Result<OptimizationOutcome> {
    ParameterOptimizer::new(options).run(installations, predictions)
}
