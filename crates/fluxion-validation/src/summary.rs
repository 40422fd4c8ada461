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

use fluxion_validation_types::{MetricKind, ValidationComparison};
use serde::Serialize;

use crate::metrics::MeanAccumulator;

/// Mean deviation over every (result, metric) pair present in `results`.
///
/// Metrics a result does not carry (production on a consumption-only site)
/// are skipped rather than counted as zero. No data at all scores 0.
#[must_use]
pub fn aggregate_deviation(results: &[ValidationComparison], metrics: &[MetricKind]) -> f64 {
    let mut acc = MeanAccumulator::default();
    for result in results {
        for metric in metrics {
            if let Some(comparison) = result.metrics.get(*metric) {
                acc.push(comparison.deviation);
            }
        }
    }
    acc.mean().unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub mean_deviation: f64,
    pub max_deviation: f64,
    /// Results that reported this metric
    pub installations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationDeviation {
    pub installation_id: String,
    pub deviation: f64,
}

/// Cross-installation overview of a batch of comparisons
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub installations: usize,
    pub readings: usize,
    pub consumption: Option<MetricSummary>,
    pub production: Option<MetricSummary>,
    pub self_consumption: Option<MetricSummary>,
    pub cost_savings: Option<MetricSummary>,
    /// Highest mean deviation across the installation's metrics
    pub worst: Option<InstallationDeviation>,
}

fn metric_summary<'a>(deviations: impl Iterator<Item = f64> + 'a) -> Option<MetricSummary> {
    let mut acc = MeanAccumulator::default();
    let mut max = f64::NEG_INFINITY;
    let mut count = 0;
    for deviation in deviations {
        acc.push(deviation);
        max = max.max(deviation);
        count += 1;
    }
    acc.mean().map(|mean_deviation| MetricSummary {
        mean_deviation,
        max_deviation: max,
        installations: count,
    })
}

#[must_use]
pub fn summarize(results: &[ValidationComparison]) -> ValidationSummary {
    let worst = results
        .iter()
        .map(|r| InstallationDeviation {
            installation_id: r.installation_id.clone(),
            deviation: aggregate_deviation(std::slice::from_ref(r), &MetricKind::ALL),
        })
        .max_by(|a, b| a.deviation.total_cmp(&b.deviation));

    ValidationSummary {
        installations: results.len(),
        readings: results.iter().map(|r| r.reading_count).sum(),
        consumption: metric_summary(results.iter().map(|r| r.metrics.total_consumption.deviation)),
        production: metric_summary(
            results
                .iter()
                .filter_map(|r| r.metrics.total_production.map(|m| m.deviation)),
        ),
        self_consumption: metric_summary(
            results
                .iter()
                .filter_map(|r| r.metrics.self_consumption.map(|m| m.deviation)),
        ),
        cost_savings: metric_summary(
            results
                .iter()
                .filter_map(|r| r.metrics.cost_savings.map(|m| m.deviation)),
        ),
        worst,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxion_validation_types::{ComparisonMetrics, ComparisonPeriod, MetricComparison};

    fn metric(deviation: f64) -> MetricComparison {
        MetricComparison {
            predicted: 0.0,
            actual: 0.0,
            deviation,
        }
    }

    fn result(id: &str, consumption: f64, production: Option<f64>) -> ValidationComparison {
        ValidationComparison {
            installation_id: id.to_owned(),
            comparison_period: ComparisonPeriod::Daily,
            reading_count: 10,
            metrics: ComparisonMetrics {
                total_consumption: metric(consumption),
                total_production: production.map(metric),
                self_consumption: None,
                cost_savings: None,
            },
            hourly_comparison: None,
            period: None,
        }
    }

    #[test]
    fn test_aggregate_skips_missing_metrics() {
        let results = [result("a", 10.0, Some(20.0)), result("b", 30.0, None)];
        let metrics = [MetricKind::Consumption, MetricKind::Production];
        // (10 + 20 + 30) / 3
        assert!((aggregate_deviation(&results, &metrics) - 20.0).abs() < 1e-12);
        assert!(aggregate_deviation(&[], &metrics).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary() {
        let results = [result("a", 10.0, Some(20.0)), result("b", 30.0, None)];
        let summary = summarize(&results);

        assert_eq!(summary.installations, 2);
        assert_eq!(summary.readings, 20);
        let consumption = summary.consumption.unwrap();
        assert!((consumption.mean_deviation - 20.0).abs() < 1e-12);
        assert!((consumption.max_deviation - 30.0).abs() < 1e-12);
        assert_eq!(summary.production.unwrap().installations, 1);
        assert!(summary.self_consumption.is_none());
        assert_eq!(summary.worst.unwrap().installation_id, "b");
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.installations, 0);
        assert!(summary.consumption.is_none());
        assert!(summary.worst.is_none());
    }
}
