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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reading::{ReadingPeriod, WeatherConditions};
use crate::settings::{ComparisonPeriod, MetricKind};

/// Predicted vs actual totals for one metric. `deviation` is a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub predicted: f64,
    pub actual: f64,
    pub deviation: f64,
}

/// Aggregate metrics of a comparison. Production-derived groups are absent
/// (not zero) when the installation reported no production.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonMetrics {
    pub total_consumption: MetricComparison,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_production: Option<MetricComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_consumption: Option<MetricComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_savings: Option<MetricComparison>,
}

impl ComparisonMetrics {
    #[must_use]
    pub fn get(&self, metric: MetricKind) -> Option<&MetricComparison> {
        match metric {
            MetricKind::Consumption => Some(&self.total_consumption),
            MetricKind::Production => self.total_production.as_ref(),
            MetricKind::SelfConsumption => self.self_consumption.as_ref(),
        }
    }
}

/// One reading paired with its predicted counterpart.
///
/// Carries the reading's granularity and weather so downstream analysis
/// never has to look the original reading up again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonPoint {
    pub timestamp: DateTime<Utc>,
    pub period: ReadingPeriod,
    pub predicted_consumption: f64,
    pub actual_consumption: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_production: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_production: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherConditions>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Result of validating one installation against one predicted series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationComparison {
    pub installation_id: String,
    pub comparison_period: ComparisonPeriod,
    /// Readings that survived period filtering
    pub reading_count: usize,
    pub metrics: ComparisonMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_comparison: Option<Vec<ComparisonPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<PeriodBounds>,
}

impl ValidationComparison {
    /// Comparison points, empty when none could be paired
    #[must_use]
    pub fn points(&self) -> &[ComparisonPoint] {
        self.hourly_comparison.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(predicted: f64, actual: f64) -> MetricComparison {
        MetricComparison {
            predicted,
            actual,
            deviation: 0.0,
        }
    }

    #[test]
    fn test_metrics_get_respects_absent_groups() {
        let metrics = ComparisonMetrics {
            total_consumption: metric(10.0, 12.0),
            total_production: None,
            self_consumption: None,
            cost_savings: None,
        };

        assert!(metrics.get(MetricKind::Consumption).is_some());
        assert!(metrics.get(MetricKind::Production).is_none());
        assert!(metrics.get(MetricKind::SelfConsumption).is_none());
    }

    #[test]
    fn test_absent_groups_are_not_serialized() {
        let comparison = ValidationComparison {
            installation_id: "x".to_owned(),
            comparison_period: ComparisonPeriod::Daily,
            reading_count: 0,
            metrics: ComparisonMetrics {
                total_consumption: metric(0.0, 0.0),
                total_production: None,
                self_consumption: None,
                cost_savings: None,
            },
            hourly_comparison: None,
            period: None,
        };

        let json = serde_json::to_string(&comparison).unwrap();
        assert!(json.contains("totalConsumption"));
        assert!(!json.contains("totalProduction"));
        assert!(!json.contains("hourlyComparison"));
        assert!(comparison.points().is_empty());
    }
}
