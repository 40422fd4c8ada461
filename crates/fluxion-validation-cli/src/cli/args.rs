// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fluxion-validate")]
#[command(author, version, about = "FluxION Prediction Validation CLI")]
#[command(
    long_about = "Validate consumption/production predictions against measured readings\n\
    and tune the prediction model's coefficients.\n\
    \nInstallations come from JSON files or a SQLite database; predictions from JSON\n\
    files or a seeded synthetic generator.\n\
    \nExamples:\n  \
    fluxion-validate compare --installations homes.json --predictions forecast.json\n  \
    fluxion-validate analyze --from-db readings.db --synthetic\n  \
    fluxion-validate optimize --installations homes.json --predictions forecast.json --save params.json\n  \
    fluxion-validate check-config --config fluxion-validate.toml"
)]
pub struct Cli {
    /// Configuration file (TOML, or JSON by extension)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare predictions with measured readings
    #[command(
        long_about = "Compare each installation's predicted series with its readings.\n\
        \nReports consumption, production, self-consumption and cost-savings deviations.\n\
        Production metrics are omitted for installations without production data.\n\
        \nExamples:\n  \
        fluxion-validate compare --installations homes.json --predictions forecast.json\n  \
        fluxion-validate compare --from-db readings.db --synthetic --output csv --csv-path points.csv"
    )]
    Compare(CompareArgs),

    /// Show signed deviations by season, time of day and weather
    Analyze(AnalyzeArgs),

    /// Search for parameters that reduce prediction deviation
    #[command(
        long_about = "Iteratively adjust the model parameters to reduce aggregate deviation.\n\
        \nReturns the best parameter set seen, which may differ from the last one evaluated.\n\
        \nExamples:\n  \
        fluxion-validate optimize --installations homes.json --predictions forecast.json\n  \
        fluxion-validate optimize --from-db readings.db --synthetic --max-iterations 20 --save params.json"
    )]
    Optimize(OptimizeArgs),

    /// Validate the configuration and print the effective settings
    CheckConfig(CheckConfigArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Where installations and predictions come from
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// JSON file with one installation or an array of installations
    #[arg(long, value_name = "PATH", required_unless_present = "from_db")]
    pub installations: Option<PathBuf>,

    /// SQLite database with `installations` and `readings` tables
    #[arg(long, value_name = "PATH", conflicts_with = "installations")]
    pub from_db: Option<PathBuf>,

    /// Only load this installation from the database
    #[arg(long, value_name = "ID", requires = "from_db")]
    pub installation: Option<String>,

    /// JSON file with predicted series (array, or object keyed by installation id)
    #[arg(long, value_name = "PATH", required_unless_present = "synthetic")]
    pub predictions: Option<PathBuf>,

    /// Generate predictions by perturbing the readings
    #[arg(long, default_value_t = false, conflicts_with = "predictions")]
    pub synthetic: bool,

    /// Seed for --synthetic (overrides [synthetic].seed)
    #[arg(long, requires = "synthetic")]
    pub seed: Option<u64>,

    /// Comparison period: hourly, daily, weekly, monthly, yearly
    #[arg(long)]
    pub period: Option<String>,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Where to write per-point rows with --output csv (stdout if omitted)
    #[arg(long, value_name = "PATH")]
    pub csv_path: Option<PathBuf>,

    /// Also print a cross-installation summary
    #[arg(long, default_value_t = false)]
    pub summary: bool,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Apply this parameter file to the predictions before analyzing
    #[arg(long, value_name = "PATH")]
    pub params: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[derive(Args, Debug)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Initial parameter file (JSON); missing keys take defaults
    #[arg(long, value_name = "PATH", conflicts_with = "neutral")]
    pub params: Option<PathBuf>,

    /// Start from neutral seasonal and time-of-day factors
    #[arg(long, default_value_t = false)]
    pub neutral: bool,

    /// Overrides [optimizer].maxIterations
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Write the best parameter set to this file (JSON)
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[derive(Args, Debug)]
pub struct CheckConfigArgs {
    /// Print the effective configuration as TOML
    #[arg(long, default_value_t = false)]
    pub show: bool,
}
