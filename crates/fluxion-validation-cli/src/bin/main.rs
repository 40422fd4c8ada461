// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

//! CLI entry point for FluxION prediction validation

use anyhow::{Context, Result};
use clap::Parser;
use fluxion_validation::{
    AdjustedReadings, Comparator, ComparisonEngine, DeviationSignals, OptimizationOutcome,
    ParameterAdapter, ParameterOptimizer, SharedSeasonClassifier, classifier_for, summarize,
};
use fluxion_validation_cli::cli::{
    AdapterKind, AnalyzeArgs, AppConfig, CheckConfigArgs, Cli, Commands, CompareArgs,
    CsvFormatter, DataLoader, InputArgs, JsonFormatter, JsonInstallationLoader,
    JsonPredictionLoader, OptimizeArgs, OutputFormat, PredictionSource,
    SqliteInstallationLoader, SyntheticPredictionSource, TableFormatter,
};
use fluxion_validation_types::{
    ComparisonPeriod, InstallationData, ParameterSet, PredictedSeries, ValidationComparison,
    ValidationSettings,
};
use std::fs;
use std::io;
use std::path::Path;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    // check-config reports problems instead of failing on them
    match &cli.command {
        Commands::Compare(args) => compare_command(&AppConfig::load(config_path)?, args),
        Commands::Analyze(args) => analyze_command(&AppConfig::load(config_path)?, args),
        Commands::Optimize(args) => optimize_command(&AppConfig::load(config_path)?, args),
        Commands::CheckConfig(args) => check_config_command(config_path, args),
    }
}

fn settings_for(config: &AppConfig, input: &InputArgs) -> ValidationSettings {
    let mut settings = config.validation.clone();
    if let Some(period) = &input.period {
        settings.comparison_period = ComparisonPeriod::parse(period);
    }
    settings
}

fn load_installations(input: &InputArgs) -> Result<Vec<InstallationData>> {
    let loader: Box<dyn DataLoader> = if let Some(db_path) = &input.from_db {
        let loader = SqliteInstallationLoader::new(db_path);
        match &input.installation {
            Some(id) => Box::new(loader.only(id.as_str())),
            None => Box::new(loader),
        }
    } else if let Some(path) = &input.installations {
        Box::new(JsonInstallationLoader::new(path))
    } else {
        anyhow::bail!("Either --installations or --from-db is required");
    };

    let installations = loader.load()?;
    if installations.is_empty() {
        anyhow::bail!("No installations to validate");
    }
    Ok(installations)
}

fn load_predictions(
    config: &AppConfig,
    input: &InputArgs,
    installations: &[InstallationData],
    period: &ComparisonPeriod,
) -> Result<Vec<PredictedSeries>> {
    let source: Box<dyn PredictionSource> = if input.synthetic {
        let mut synthetic = config.synthetic;
        if let Some(seed) = input.seed {
            synthetic.seed = seed;
        }
        info!(seed = synthetic.seed, noise = synthetic.noise, "Generating synthetic predictions");
        Box::new(SyntheticPredictionSource { config: synthetic })
    } else if let Some(path) = &input.predictions {
        Box::new(JsonPredictionLoader::new(path))
    } else {
        anyhow::bail!("Either --predictions or --synthetic is required");
    };

    source.predictions(installations, period)
}

fn read_parameters(path: &Path) -> Result<ParameterSet> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameter file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse parameter file {}", path.display()))
}

fn compare_all(
    installations: &[InstallationData],
    predictions: &[PredictedSeries],
    settings: &ValidationSettings,
    adapter: Option<(&dyn ParameterAdapter, &ParameterSet)>,
) -> Vec<ValidationComparison> {
    let engine = ComparisonEngine::default();
    installations
        .iter()
        .zip(predictions)
        .map(|(installation, predicted)| match adapter {
            Some((adapter, params)) => {
                let pair =
                    adapter.apply(installation, predicted, params, &settings.comparison_period);
                engine.compare(&pair.installation, &pair.predicted, settings)
            }
            None => engine.compare(installation, predicted, settings),
        })
        .collect()
}

fn compare_command(config: &AppConfig, args: &CompareArgs) -> Result<()> {
    let settings = settings_for(config, &args.input);
    let installations = load_installations(&args.input)?;
    let predictions =
        load_predictions(config, &args.input, &installations, &settings.comparison_period)?;

    let results = compare_all(&installations, &predictions, &settings, None);
    let summary = summarize(&results);

    match args.output {
        OutputFormat::Table => {
            print!("{}", TableFormatter::format_comparisons(&results, &settings.metrics));
            if args.summary {
                println!();
                print!("{}", TableFormatter::format_summary(&summary));
            }
        }
        OutputFormat::Json => {
            if args.summary {
                let combined = serde_json::json!({ "results": results, "summary": summary });
                println!("{}", JsonFormatter::format(&combined)?);
            } else {
                println!("{}", JsonFormatter::format(&results)?);
            }
        }
        OutputFormat::Csv => match &args.csv_path {
            Some(path) => {
                CsvFormatter::write_points_to_path(&results, path)?;
                info!(path = %path.display(), "Wrote comparison points");
            }
            None => CsvFormatter::write_points(&results, io::stdout().lock())?,
        },
    }
    Ok(())
}

fn analyze_command(config: &AppConfig, args: &AnalyzeArgs) -> Result<()> {
    if args.output == OutputFormat::Csv {
        anyhow::bail!("CSV output is only available for the compare command");
    }

    let settings = settings_for(config, &args.input);
    let seasons = classifier_for(&config.seasons);
    let installations = load_installations(&args.input)?;
    let predictions =
        load_predictions(config, &args.input, &installations, &settings.comparison_period)?;

    let params = args.params.as_deref().map(read_parameters).transpose()?;
    let adapter = config.optimizer.adapter.build(&seasons);
    let results = compare_all(
        &installations,
        &predictions,
        &settings,
        params.as_ref().map(|p| (adapter.as_ref(), p)),
    );

    let signals = DeviationSignals::analyze(&results, seasons.as_ref(), &config.optimizer.analysis);
    match args.output {
        OutputFormat::Json => println!("{}", JsonFormatter::format(&signals)?),
        OutputFormat::Table | OutputFormat::Csv => print!("{}", TableFormatter::format_signals(&signals)),
    }
    Ok(())
}

fn optimize_command(config: &AppConfig, args: &OptimizeArgs) -> Result<()> {
    if args.output == OutputFormat::Csv {
        anyhow::bail!("CSV output is only available for the compare command");
    }

    let initial = match (&args.params, args.neutral) {
        (Some(path), _) => Some(read_parameters(path)?),
        (None, true) => Some(ParameterSet::neutral()),
        (None, false) => None,
    };

    let mut options = config.optimizer_options(initial);
    options.settings = settings_for(config, &args.input);
    if let Some(max_iterations) = args.max_iterations {
        options.max_iterations = max_iterations;
    }
    let starting = options.starting_parameters();

    let installations = load_installations(&args.input)?;
    let predictions = load_predictions(
        config,
        &args.input,
        &installations,
        &options.settings.comparison_period,
    )?;

    let seasons = classifier_for(&config.seasons);
    let outcome: OptimizationOutcome = match config.optimizer.adapter {
        AdapterKind::CalibratePredictions => {
            ParameterOptimizer::with_seasons(options, seasons).run(&installations, &predictions)
        }
        AdapterKind::AdjustReadings => ParameterOptimizer::with_components(
            options,
            AdjustedReadings::new(SharedSeasonClassifier::clone(&seasons)),
            ComparisonEngine::default(),
            seasons,
        )
        .run(&installations, &predictions),
    }
    .context("Optimization failed")?;

    match args.output {
        OutputFormat::Json => println!("{}", JsonFormatter::format(&outcome)?),
        OutputFormat::Table | OutputFormat::Csv => {
            print!("{}", TableFormatter::format_outcome(&outcome, &starting));
        }
    }

    if let Some(path) = &args.save {
        fs::write(path, JsonFormatter::format(&outcome.parameters)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Saved optimized parameters");
    }
    Ok(())
}

fn check_config_command(path: Option<&Path>, args: &CheckConfigArgs) -> Result<()> {
    let config = AppConfig::load_unchecked(path)?;
    let result = config.validate_detailed();

    for issue in result.errors.iter().chain(&result.warnings) {
        println!("{:?}: {} - {}", issue.severity, issue.field, issue.message);
    }

    if args.show {
        let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
        println!("{rendered}");
    }

    if result.is_valid() {
        println!("Configuration OK ({} warnings)", result.warnings.len());
        Ok(())
    } else {
        anyhow::bail!("Configuration has {} errors", result.errors.len())
    }
}
