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

//! FluxION Prediction Validation Engine
//!
//! Compares predicted against measured consumption/production and tunes the
//! prediction model's coefficients to reduce the gap.
//!
//! ## Pipeline
//!
//! - **Deviation Metrics**: percentage deviation and IQR outlier filtering
//! - **Weather Normalizer**: production corrected to reference conditions
//! - **Comparison Engine**: aggregate and per-point predicted vs actual metrics
//! - **Parameter Model**: seasonal, time-of-day and weather coefficients applied to readings
//! - **Deviation Analyzers**: signed deviation by season, hour and weather
//! - **Optimizer**: bounded iterative search over the parameter set
//!
//! Everything is synchronous and free of shared state.

pub mod analyzers;
pub mod comparison;
pub mod error;
pub mod metrics;
pub mod optimizer;
pub mod parameters;
pub mod season;
pub mod summary;
pub mod synthetic;
pub mod weather;

pub use analyzers::{
    DeviationSignals, SeasonalDeviations, TimeOfDayDeviations, WeatherDeviations,
    analyze_seasonal_deviations, analyze_time_of_day_deviations, analyze_weather_deviations,
};
pub use comparison::{Comparator, ComparisonEngine, compare_with_predictions};
pub use error::{Result, ValidationError};
pub use metrics::{
    calculate_deviation, calculate_signed_deviation, filter_outliers, filter_outliers_with_factor,
};
pub use optimizer::{IterationRecord, OptimizationOutcome, ParameterOptimizer, optimize_parameters};
pub use parameters::{
    AdjustedPair, AdjustedReadings, CalibratedPredictions, DayPart,
    ParameterAdapter, apply_parameters_to_data,
};
pub use season::{MonthSeasons, SeasonClassifier, SharedSeasonClassifier, classifier_for};
pub use summary::{ValidationSummary, aggregate_deviation, summarize};
pub use synthetic::SyntheticPredictionGenerator;
pub use weather::{WeatherNormalizer, normalize_weather_conditions};

pub use fluxion_validation_types as types;
