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

//! Data model shared by the FluxION prediction-validation engine and its tools.
//!
//! Everything here is plain data: readings and installations supplied by the
//! caller, predicted series, per-call settings, comparison results and the
//! tunable parameter set. The engine itself lives in `fluxion-validation`.

pub mod comparison;
pub mod installation;
pub mod optimizer;
pub mod parameters;
pub mod prediction;
pub mod reading;
pub mod season;
pub mod settings;

// Re-export common types for convenience
pub use comparison::{
    ComparisonMetrics, ComparisonPoint, MetricComparison, PeriodBounds, ValidationComparison,
};
pub use installation::{InstallationData, InstallationType};
pub use optimizer::{AnalysisConfig, OptimizerOptions};
pub use parameters::ParameterSet;
pub use prediction::PredictedSeries;
pub use reading::{Reading, ReadingPeriod, WeatherConditions};
pub use season::{Hemisphere, Season, SeasonConfig};
pub use settings::{AlignmentMode, ComparisonPeriod, MetricKind, ValidationSettings};
