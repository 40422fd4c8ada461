// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

//! Output formatters for CLI validation results.

use anyhow::{Context, Result};
use comfy_table::{Attribute, Cell, Color, Table, presets::UTF8_FULL};
use fluxion_validation::analyzers::DeviationSignals;
use fluxion_validation::optimizer::OptimizationOutcome;
use fluxion_validation::summary::{MetricSummary, ValidationSummary};
use fluxion_validation_types::{MetricComparison, MetricKind, ParameterSet, ValidationComparison};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Deviations at or below this are shown green
const GOOD_DEVIATION_PCT: f64 = 5.0;
/// Deviations above this are shown red
const POOR_DEVIATION_PCT: f64 = 15.0;

/// Formatter for pretty terminal tables
#[derive(Debug)]
pub struct TableFormatter;

/// Formatter for pretty-printed JSON
#[derive(Debug)]
pub struct JsonFormatter;

/// Formatter for per-point CSV export
#[derive(Debug)]
pub struct CsvFormatter;

fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(label).add_attribute(Attribute::Bold))
        .collect()
}

fn new_table(labels: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(header(labels));
    table
}

fn deviation_cell(deviation: f64) -> Cell {
    let cell = Cell::new(format!("{deviation:.2}"));
    if deviation <= GOOD_DEVIATION_PCT {
        cell.fg(Color::Green)
    } else if deviation > POOR_DEVIATION_PCT {
        cell.fg(Color::Red)
    } else {
        cell.fg(Color::Yellow)
    }
}

fn signal_cell(signal: Option<f64>) -> Cell {
    match signal {
        Some(value) => Cell::new(format!("{value:+.2}")),
        None => Cell::new("-"),
    }
}

impl TableFormatter {
    /// One row per installation and metric
    #[must_use]
    pub fn format_comparisons(results: &[ValidationComparison], metrics: &[MetricKind]) -> String {
        let mut table = new_table(&[
            "Installation",
            "Metric",
            "Predicted",
            "Actual",
            "Deviation\n(%)",
        ]);

        for result in results {
            let mut rows: Vec<(&str, &MetricComparison)> = metrics
                .iter()
                .filter_map(|metric| result.metrics.get(*metric).map(|m| (metric.as_str(), m)))
                .collect();
            if let Some(savings) = &result.metrics.cost_savings {
                rows.push(("costSavings", savings));
            }

            for (name, metric) in rows {
                table.add_row(vec![
                    Cell::new(&result.installation_id),
                    Cell::new(name),
                    Cell::new(format!("{:.2}", metric.predicted)),
                    Cell::new(format!("{:.2}", metric.actual)),
                    deviation_cell(metric.deviation),
                ]);
            }
        }

        let mut output = table.to_string();
        output.push('\n');
        for result in results {
            output.push_str(&format!(
                "{}: {} {} readings",
                result.installation_id, result.reading_count, result.comparison_period
            ));
            if let Some(period) = &result.period {
                output.push_str(&format!(
                    " ({} - {})",
                    period.start.format("%Y-%m-%d %H:%M"),
                    period.end.format("%Y-%m-%d %H:%M")
                ));
            }
            output.push_str(&format!(", {} paired points\n", result.points().len()));
        }
        output
    }

    #[must_use]
    pub fn format_summary(summary: &ValidationSummary) -> String {
        let mut table = new_table(&["Metric", "Mean deviation\n(%)", "Max deviation\n(%)", "Installations"]);

        let rows: [(&str, Option<&MetricSummary>); 4] = [
            ("consumption", summary.consumption.as_ref()),
            ("production", summary.production.as_ref()),
            ("selfConsumption", summary.self_consumption.as_ref()),
            ("costSavings", summary.cost_savings.as_ref()),
        ];
        for (name, metric) in rows {
            if let Some(metric) = metric {
                table.add_row(vec![
                    Cell::new(name),
                    deviation_cell(metric.mean_deviation),
                    deviation_cell(metric.max_deviation),
                    Cell::new(metric.installations),
                ]);
            }
        }

        let mut output = table.to_string();
        output.push('\n');
        output.push_str(&format!(
            "Validated {} installations over {} readings\n",
            summary.installations, summary.readings
        ));
        if let Some(worst) = &summary.worst {
            output.push_str(&format!(
                "Largest deviation: {} ({:.2}%)\n",
                worst.installation_id, worst.deviation
            ));
        }
        output
    }

    /// Signed bucket deviations; positive means predictions run low
    #[must_use]
    pub fn format_signals(signals: &DeviationSignals) -> String {
        let mut table = new_table(&["Bucket", "Signed deviation\n(%)"]);
        let rows = [
            ("Winter consumption", signals.seasonal.winter_consumption),
            ("Winter production", signals.seasonal.winter_production),
            ("Summer consumption", signals.seasonal.summer_consumption),
            ("Summer production", signals.seasonal.summer_production),
            ("Peak hours", signals.time_of_day.peak_hours),
            ("Night hours", signals.time_of_day.night_hours),
            ("Temperature", signals.weather.temperature),
            ("Irradiance", signals.weather.irradiance),
            ("Irradiance curvature", signals.weather.irradiance_curvature),
            ("Cloud cover", signals.weather.cloud_cover),
        ];
        for (name, signal) in rows {
            table.add_row(vec![Cell::new(name), signal_cell(signal)]);
        }
        let mut output = table.to_string();
        output.push('\n');
        output
    }

    /// Initial vs optimized parameters
    #[must_use]
    pub fn format_outcome(outcome: &OptimizationOutcome, initial: &ParameterSet) -> String {
        let mut table = new_table(&["Parameter", "Initial", "Optimized", "Change\n(%)"]);

        for ((name, before), (_, after)) in initial.entries().into_iter().zip(outcome.parameters.entries()) {
            let change = if before == 0.0 {
                0.0
            } else {
                (after - before) / before.abs() * 100.0
            };
            let name_cell = if (after - before).abs() > f64::EPSILON {
                Cell::new(name).add_attribute(Attribute::Bold)
            } else {
                Cell::new(name)
            };
            table.add_row(vec![
                name_cell,
                Cell::new(format!("{before:.4}")),
                Cell::new(format!("{after:.4}")),
                Cell::new(format!("{change:+.2}")),
            ]);
        }

        let mut output = table.to_string();
        output.push('\n');
        output.push_str(&format!(
            "{} after {} iterations; best deviation {:.3}% at iteration {} (final {:.3}%)\n",
            if outcome.converged { "Converged" } else { "Stopped" },
            outcome.iterations,
            outcome.best_deviation,
            outcome.best_iteration,
            outcome.final_deviation
        ));
        output
    }
}

impl JsonFormatter {
    pub fn format<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        serde_json::to_string_pretty(value).context("Failed to serialize output")
    }
}

/// One CSV row per comparison point
#[derive(Debug, Serialize)]
struct PointRow<'a> {
    installation_id: &'a str,
    timestamp: String,
    period: &'static str,
    predicted_consumption: f64,
    actual_consumption: f64,
    predicted_production: Option<f64>,
    actual_production: Option<f64>,
    temperature: Option<f64>,
    irradiance: Option<f64>,
    cloud_cover: Option<f64>,
}

impl CsvFormatter {
    /// Writes every paired point of every result
    pub fn write_points<W: Write>(results: &[ValidationComparison], writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for result in results {
            for point in result.points() {
                let weather = point.weather.unwrap_or_default();
                csv_writer.serialize(PointRow {
                    installation_id: &result.installation_id,
                    timestamp: point.timestamp.to_rfc3339(),
                    period: point.period.as_str(),
                    predicted_consumption: point.predicted_consumption,
                    actual_consumption: point.actual_consumption,
                    predicted_production: point.predicted_production,
                    actual_production: point.actual_production,
                    temperature: weather.temperature,
                    irradiance: weather.irradiance,
                    cloud_cover: weather.cloud_cover,
                })?;
            }
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_points_to_path(results: &[ValidationComparison], path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Self::write_points(results, file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use fluxion_validation::{compare_with_predictions, summarize};
    use fluxion_validation_types::{
        ComparisonPeriod, InstallationData, PredictedSeries, Reading, ReadingPeriod,
        ValidationSettings,
    };

    fn result() -> ValidationComparison {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let readings = (0..3)
            .map(|h| Reading::new(start + Duration::hours(h), ReadingPeriod::Hourly, 2.0).with_production(1.0))
            .collect();
        let installation = InstallationData::new("roof", "Roof", readings);
        let predicted = PredictedSeries {
            consumption: vec![1.8, 2.1, 2.0],
            production: Some(vec![1.0, 1.2, 0.9]),
            timestamps: (0..3).map(|h| start + Duration::hours(h)).collect(),
        };
        compare_with_predictions(
            &installation,
            &predicted,
            &ValidationSettings::for_period(ComparisonPeriod::Hourly),
        )
    }

    #[test]
    fn test_comparison_table_lists_metrics() {
        let output = TableFormatter::format_comparisons(&[result()], &MetricKind::ALL);
        assert!(output.contains("roof"));
        assert!(output.contains("consumption"));
        assert!(output.contains("selfConsumption"));
        assert!(output.contains("costSavings"));
        assert!(output.contains("3 paired points"));
    }

    #[test]
    fn test_comparison_trailer_lines() {
        let output = TableFormatter::format_comparisons(&[result()], &MetricKind::ALL);
        let trailer = output.lines().last().unwrap();
        assert!(trailer.starts_with("roof: 3 hourly readings (2024-02-01 00:00 - "));
        assert!(trailer.ends_with(", 3 paired points"));
        assert!(output.ends_with("paired points\n"));
    }

    #[test]
    fn test_summary_table() {
        let output = TableFormatter::format_summary(&summarize(&[result()]));
        assert!(output.contains("Validated 1 installations over 3 readings"));
        assert!(output.contains("Largest deviation: roof"));
    }

    #[test]
    fn test_csv_rows() {
        let mut buffer = Vec::new();
        CsvFormatter::write_points(&[result()], &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("installation_id,timestamp,period"));
        assert!(lines[1].starts_with("roof,2024-02-01T00:00:00+00:00,hourly,1.8,2.0,"));
    }

    #[test]
    fn test_json_output() {
        let json = JsonFormatter::format(&[result()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["installationId"], "roof");
        assert!(value[0]["metrics"]["totalProduction"].is_object());
    }
}
