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

//! Comparison engine
//!
//! Compares one installation's measured readings with one predicted
//! series. Outlier filtering applies to measured sums only; predictions
//! are the baseline being judged and are never filtered.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use fluxion_validation_types::{
    AlignmentMode, ComparisonMetrics, ComparisonPoint, InstallationData, MetricComparison,
    PeriodBounds, PredictedSeries, Reading, ValidationComparison, ValidationSettings,
};
use tracing::{debug, trace};

use crate::metrics::{calculate_deviation, filter_outliers_with_factor};
use crate::weather::WeatherNormalizer;

/// Anything that can turn an installation and a prediction into a
/// comparison. The optimizer is generic over this seam.
pub trait Comparator {
    fn compare(
        &self,
        installation: &InstallationData,
        predicted: &PredictedSeries,
        settings: &ValidationSettings,
    ) -> ValidationComparison;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonEngine {
    normalizer: WeatherNormalizer,
}

impl ComparisonEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_normalizer(normalizer: WeatherNormalizer) -> Self {
        Self { normalizer }
    }
}

impl Comparator for ComparisonEngine {
    fn compare(
        &self,
        installation: &InstallationData,
        predicted: &PredictedSeries,
        settings: &ValidationSettings,
    ) -> ValidationComparison {
        let filtered: Vec<Reading> = installation
            .readings_for(&settings.comparison_period)
            .cloned()
            .collect();

        if filtered.is_empty() {
            debug!(
                installation = %installation.id,
                period = %settings.comparison_period,
                "No readings match comparison period"
            );
        }

        let readings = if settings.normalize_weather {
            self.normalizer.normalize(&filtered)
        } else {
            filtered
        };

        let (actual_consumption, actual_production) = actual_totals(&readings, settings);
        let predicted_consumption = predicted.total_consumption();
        let predicted_production = predicted.total_production();

        let total_consumption = metric(predicted_consumption, actual_consumption);
        let total_production = actual_production.map(|actual| metric(predicted_production, actual));
        let self_consumption = actual_production.map(|actual| {
            metric(
                predicted_consumption.min(predicted_production),
                actual_consumption.min(actual),
            )
        });
        let cost_savings = self_consumption.map(|sc| {
            metric(
                sc.predicted * settings.tariff_per_kwh,
                sc.actual * settings.tariff_per_kwh,
            )
        });

        let hourly_comparison = match settings.alignment {
            AlignmentMode::Timestamp => align_by_timestamp(&readings, predicted),
            AlignmentMode::Positional => align_by_position(&readings, predicted),
        };

        trace!(
            installation = %installation.id,
            readings = readings.len(),
            consumption_deviation = total_consumption.deviation,
            "Comparison complete"
        );

        ValidationComparison {
            installation_id: installation.id.clone(),
            comparison_period: settings.comparison_period.clone(),
            reading_count: readings.len(),
            metrics: ComparisonMetrics {
                total_consumption,
                total_production,
                self_consumption,
                cost_savings,
            },
            hourly_comparison,
            period: period_bounds(&readings),
        }
    }
}

/// Compares with the default engine
#[must_use]
pub fn compare_with_predictions(
    installation: &InstallationData,
    predicted: &PredictedSeries,
    settings: &ValidationSettings,
) -> ValidationComparison {
    ComparisonEngine::default().compare(installation, predicted, settings)
}

fn metric(predicted: f64, actual: f64) -> MetricComparison {
    MetricComparison {
        predicted,
        actual,
        deviation: calculate_deviation(predicted, actual),
    }
}

/// Measured consumption and production sums; production is `None` when no
/// reading carries it.
fn actual_totals(readings: &[Reading], settings: &ValidationSettings) -> (f64, Option<f64>) {
    let consumption: Vec<f64> = readings.iter().map(|r| r.consumption).collect();
    let production: Vec<f64> = readings.iter().filter_map(|r| r.production).collect();
    let has_production = readings.iter().any(|r| r.production.is_some());

    let sum = |values: &[f64]| -> f64 {
        if settings.exclude_outliers {
            filter_outliers_with_factor(values, settings.outlier_threshold_factor)
                .iter()
                .sum()
        } else {
            values.iter().sum()
        }
    };

    (sum(&consumption), has_production.then(|| sum(&production)))
}

fn point(reading: &Reading, predicted: &PredictedSeries, index: usize) -> Option<ComparisonPoint> {
    Some(ComparisonPoint {
        timestamp: reading.timestamp,
        period: reading.period,
        predicted_consumption: predicted.consumption_at(index)?,
        actual_consumption: reading.consumption,
        predicted_production: predicted.production_at(index),
        actual_production: reading.production,
        weather: reading.weather_conditions,
    })
}

/// Joins readings to predictions on identical timestamps
fn align_by_timestamp(
    readings: &[Reading],
    predicted: &PredictedSeries,
) -> Option<Vec<ComparisonPoint>> {
    let index: HashMap<DateTime<Utc>, usize> = predicted
        .timestamps
        .iter()
        .enumerate()
        .map(|(i, ts)| (*ts, i))
        .collect();

    let points: Vec<ComparisonPoint> = readings
        .iter()
        .filter_map(|r| index.get(&r.timestamp).and_then(|&i| point(r, predicted, i)))
        .collect();

    (!points.is_empty()).then_some(points)
}

/// Pairs by array index, only when both sides have the same length
fn align_by_position(
    readings: &[Reading],
    predicted: &PredictedSeries,
) -> Option<Vec<ComparisonPoint>> {
    if readings.len() != predicted.timestamps.len() {
        debug!(
            readings = readings.len(),
            predictions = predicted.timestamps.len(),
            "Length mismatch, skipping positional pairing"
        );
        return None;
    }

    readings
        .iter()
        .enumerate()
        .map(|(i, r)| point(r, predicted, i))
        .collect()
}

fn period_bounds(readings: &[Reading]) -> Option<PeriodBounds> {
    let start = readings.iter().map(|r| r.timestamp).min()?;
    let end = readings.iter().map(|r| r.timestamp).max()?;
    Some(PeriodBounds { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use fluxion_validation_types::{ComparisonPeriod, ReadingPeriod, WeatherConditions};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    fn hourly_installation(consumption: &[f64], production: Option<&[f64]>) -> InstallationData {
        let readings = consumption
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let r = Reading::new(
                    start() + Duration::hours(i64::try_from(i).unwrap()),
                    ReadingPeriod::Hourly,
                    c,
                );
                match production {
                    Some(p) => r.with_production(p[i]),
                    None => r,
                }
            })
            .collect();
        InstallationData::new("inst-1", "Test", readings)
    }

    fn series(consumption: &[f64], production: Option<&[f64]>) -> PredictedSeries {
        PredictedSeries {
            consumption: consumption.to_vec(),
            production: production.map(<[f64]>::to_vec),
            timestamps: (0..consumption.len())
                .map(|i| start() + Duration::hours(i64::try_from(i).unwrap()))
                .collect(),
        }
    }

    fn hourly() -> ValidationSettings {
        ValidationSettings::for_period(ComparisonPeriod::Hourly)
    }

    #[test]
    fn test_totals_and_deviation() {
        let installation = hourly_installation(&[1.0, 1.0, 2.0], None);
        let predicted = series(&[1.0, 1.0, 1.0], None);
        let result = compare_with_predictions(&installation, &predicted, &hourly());

        let c = result.metrics.total_consumption;
        assert!((c.actual - 4.0).abs() < 1e-12);
        assert!((c.predicted - 3.0).abs() < 1e-12);
        assert!((c.deviation - 25.0).abs() < 1e-9);
        assert_eq!(result.reading_count, 3);
    }

    #[test]
    fn test_production_metrics_omitted_without_production() {
        let installation = hourly_installation(&[1.0, 2.0], None);
        let predicted = series(&[1.0, 2.0], Some(&[0.5, 0.5]));
        let result = compare_with_predictions(&installation, &predicted, &hourly());

        assert!(result.metrics.total_production.is_none());
        assert!(result.metrics.self_consumption.is_none());
        assert!(result.metrics.cost_savings.is_none());
    }

    #[test]
    fn test_self_consumption_is_min_of_totals() {
        let installation = hourly_installation(&[3.0, 3.0], Some(&[1.0, 1.5]));
        let predicted = series(&[2.0, 2.0], Some(&[4.0, 4.0]));
        let result = compare_with_predictions(&installation, &predicted, &hourly());

        let sc = result.metrics.self_consumption.unwrap();
        assert!((sc.actual - 2.5).abs() < 1e-12);
        assert!((sc.predicted - 4.0).abs() < 1e-12);

        let savings = result.metrics.cost_savings.unwrap();
        assert!((savings.actual - 2.5 * 0.15).abs() < 1e-12);
        assert!((savings.predicted - 4.0 * 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_period_yields_zero_readings() {
        let installation = hourly_installation(&[1.0, 2.0], None);
        let predicted = series(&[1.0, 2.0], None);
        let settings = ValidationSettings::for_period(ComparisonPeriod::parse("fortnightly"));
        let result = compare_with_predictions(&installation, &predicted, &settings);

        assert_eq!(result.reading_count, 0);
        assert!(result.metrics.total_consumption.actual.abs() < f64::EPSILON);
        assert!((result.metrics.total_consumption.deviation - 100.0).abs() < f64::EPSILON);
        assert!(result.hourly_comparison.is_none());
        assert!(result.period.is_none());
    }

    #[test]
    fn test_outliers_filtered_from_actuals_only() {
        let consumption = [1.0, 2.0, 2.0, 3.0, 4.0, 5.0, 5.0, 6.0, 100.0];
        let installation = hourly_installation(&consumption, None);
        let predicted = series(&consumption, None);
        let settings = ValidationSettings {
            exclude_outliers: true,
            ..hourly()
        };
        let result = compare_with_predictions(&installation, &predicted, &settings);

        let c = result.metrics.total_consumption;
        assert!((c.actual - 28.0).abs() < 1e-12);
        assert!((c.predicted - 128.0).abs() < 1e-12);
    }

    #[test]
    fn test_positional_alignment_requires_equal_lengths() {
        let installation = hourly_installation(&[1.0, 2.0, 3.0], None);
        let settings = ValidationSettings {
            alignment: AlignmentMode::Positional,
            ..hourly()
        };

        let equal = compare_with_predictions(&installation, &series(&[1.0, 2.0, 3.0], None), &settings);
        assert_eq!(equal.points().len(), 3);

        let shorter = compare_with_predictions(&installation, &series(&[1.0, 2.0], None), &settings);
        assert!(shorter.hourly_comparison.is_none());
    }

    #[test]
    fn test_timestamp_alignment_handles_gaps() {
        let installation = hourly_installation(&[1.0, 2.0, 3.0], None);
        let mut predicted = series(&[1.5, 2.5, 3.5], None);
        // Drop the middle prediction
        predicted.consumption.remove(1);
        predicted.timestamps.remove(1);

        let result = compare_with_predictions(&installation, &predicted, &hourly());
        let points = result.points();
        assert_eq!(points.len(), 2);
        assert!((points[1].actual_consumption - 3.0).abs() < f64::EPSILON);
        assert!((points[1].predicted_consumption - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weather_normalization_applies_to_actuals() {
        let weather = WeatherConditions {
            temperature: Some(30.0),
            irradiance: Some(800.0),
            cloud_cover: None,
        };
        let mut installation = hourly_installation(&[1.0], Some(&[10.0]));
        installation.readings[0].weather_conditions = Some(weather);
        let predicted = series(&[1.0], Some(&[7.84]));
        let settings = ValidationSettings {
            normalize_weather: true,
            ..hourly()
        };

        let result = compare_with_predictions(&installation, &predicted, &settings);
        let production = result.metrics.total_production.unwrap();
        assert!((production.actual - 7.84).abs() < 1e-9);
        assert!(production.deviation < 1e-6);
        assert_eq!(result.points()[0].weather, Some(weather));
    }

    #[test]
    fn test_compare_is_deterministic() {
        let installation = hourly_installation(&[1.0, 4.0, 2.0], Some(&[0.0, 3.0, 1.0]));
        let predicted = series(&[1.2, 3.8, 2.1], Some(&[0.1, 2.9, 1.3]));
        let a = compare_with_predictions(&installation, &predicted, &hourly());
        let b = compare_with_predictions(&installation, &predicted, &hourly());
        assert_eq!(a, b);
    }

    #[test]
    fn test_period_bounds() {
        let installation = hourly_installation(&[1.0, 1.0, 1.0], None);
        let result = compare_with_predictions(&installation, &series(&[1.0], None), &hourly());
        let bounds = result.period.unwrap();
        assert_eq!(bounds.start, start());
        assert_eq!(bounds.end, start() + Duration::hours(2));
    }
}
