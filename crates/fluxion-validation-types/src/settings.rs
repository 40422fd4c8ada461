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

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::reading::ReadingPeriod;

/// Granularity a comparison runs at.
///
/// Parsing never fails: unknown names are kept verbatim in `Other` and match
/// no reading, so a misconfigured period yields an empty comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComparisonPeriod {
    Hourly,
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Other(String),
}

impl ComparisonPeriod {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "hourly" => Self::Hourly,
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "monthly" => Self::Monthly,
            "yearly" => Self::Yearly,
            _ => Self::Other(value.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Other(raw) => raw,
        }
    }

    /// Case-insensitive match against a reading's own granularity
    #[must_use]
    pub fn matches(&self, period: ReadingPeriod) -> bool {
        self.as_str().trim().eq_ignore_ascii_case(period.as_str())
    }
}

impl From<String> for ComparisonPeriod {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ComparisonPeriod> for String {
    fn from(period: ComparisonPeriod) -> Self {
        period.as_str().to_owned()
    }
}

impl FromStr for ComparisonPeriod {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(value))
    }
}

impl fmt::Display for ComparisonPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metric groups a comparison or optimization can be scored on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    Consumption,
    Production,
    SelfConsumption,
}

impl MetricKind {
    pub const ALL: [Self; 3] = [Self::Consumption, Self::Production, Self::SelfConsumption];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Consumption => "consumption",
            Self::Production => "production",
            Self::SelfConsumption => "selfConsumption",
        }
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "consumption" => Ok(Self::Consumption),
            "production" => Ok(Self::Production),
            "selfconsumption" => Ok(Self::SelfConsumption),
            other => Err(format!("unknown metric '{other}'")),
        }
    }
}

/// How readings are paired with predicted values for per-point comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentMode {
    /// Join on identical timestamps
    #[default]
    Timestamp,
    /// Zip by index, only when both sides have the same length
    Positional,
}

/// Per-invocation comparison settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSettings {
    #[serde(default)]
    pub comparison_period: ComparisonPeriod,

    #[serde(default = "default_metrics")]
    pub metrics: Vec<MetricKind>,

    /// Normalize production to reference weather before summing
    #[serde(default)]
    pub normalize_weather: bool,

    /// Sum IQR-filtered actual series instead of raw ones
    #[serde(default)]
    pub exclude_outliers: bool,

    /// Tariff used to value self-consumed energy (currency/kWh)
    #[serde(default = "default_tariff_per_kwh")]
    pub tariff_per_kwh: f64,

    /// IQR multiplier for the outlier fences
    #[serde(default = "default_outlier_threshold_factor")]
    pub outlier_threshold_factor: f64,

    #[serde(default)]
    pub alignment: AlignmentMode,
}

fn default_metrics() -> Vec<MetricKind> {
    MetricKind::ALL.to_vec()
}

fn default_tariff_per_kwh() -> f64 {
    0.15
}

fn default_outlier_threshold_factor() -> f64 {
    1.5
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            comparison_period: ComparisonPeriod::default(),
            metrics: default_metrics(),
            normalize_weather: false,
            exclude_outliers: false,
            tariff_per_kwh: default_tariff_per_kwh(),
            outlier_threshold_factor: default_outlier_threshold_factor(),
            alignment: AlignmentMode::default(),
        }
    }
}

impl ValidationSettings {
    #[must_use]
    pub fn for_period(period: ComparisonPeriod) -> Self {
        Self {
            comparison_period: period,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn includes(&self, metric: MetricKind) -> bool {
        self.metrics.contains(&metric)
    }
}
