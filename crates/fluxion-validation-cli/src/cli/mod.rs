// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

//! CLI module for the prediction validation command-line interface.

pub mod args;
pub mod config;
pub mod data_loaders;
pub mod formatters;
pub mod validation;

pub use args::{AnalyzeArgs, CheckConfigArgs, Cli, Commands, CompareArgs, InputArgs, OptimizeArgs, OutputFormat};
pub use config::{AdapterKind, AppConfig, OptimizerConfig, SyntheticConfig};
pub use data_loaders::{
    DataLoader, JsonInstallationLoader, JsonPredictionLoader, PredictionSource,
    SqliteInstallationLoader, SyntheticPredictionSource,
};
pub use formatters::{CsvFormatter, JsonFormatter, TableFormatter};
pub use validation::{ValidationIssue, ValidationResult, ValidationSeverity};
