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

use serde::{Deserialize, Serialize};

/// Tunable coefficients of the consumption/production model.
///
/// Missing keys in serialized form fall back to the defaults, so partial
/// parameter files are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParameterSet {
    // ============= Weather sensitivity =============
    /// Production change per °C away from 25 °C (negative: PV derating)
    pub temperature_coefficient: f64,
    /// Production sensitivity to irradiance relative to 1000 W/m²
    pub irradiance_linear_factor: f64,
    /// Second-order irradiance term (diminishing returns at high irradiance)
    pub irradiance_quadratic_factor: f64,
    /// Fraction of production lost at 100 % cloud cover
    pub cloud_cover_impact: f64,

    // ============= Seasonal =============
    pub winter_consumption_factor: f64,
    pub winter_production_factor: f64,
    pub summer_consumption_factor: f64,
    pub summer_production_factor: f64,

    // ============= Time of day (hourly data only) =============
    pub peak_hours_consumption_factor: f64,
    pub night_hours_consumption_factor: f64,

    // ============= Outliers =============
    /// IQR multiplier used for outlier fences
    pub outlier_threshold_factor: f64,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            temperature_coefficient: -0.004,
            irradiance_linear_factor: 1.0,
            irradiance_quadratic_factor: -0.05,
            cloud_cover_impact: 0.3,
            winter_consumption_factor: 1.3,
            winter_production_factor: 0.7,
            summer_consumption_factor: 1.1,
            summer_production_factor: 1.2,
            peak_hours_consumption_factor: 1.2,
            night_hours_consumption_factor: 0.8,
            outlier_threshold_factor: 1.5,
        }
    }
}

impl ParameterSet {
    /// Lower bound for `outlier_threshold_factor`
    pub const OUTLIER_THRESHOLD_MIN: f64 = 1.1;
    /// Upper bound for `outlier_threshold_factor`
    pub const OUTLIER_THRESHOLD_MAX: f64 = 3.0;

    /// Seasonal and time-of-day factors at 1.0; weather and outlier settings at defaults
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            winter_consumption_factor: 1.0,
            winter_production_factor: 1.0,
            summer_consumption_factor: 1.0,
            summer_production_factor: 1.0,
            peak_hours_consumption_factor: 1.0,
            night_hours_consumption_factor: 1.0,
            ..Self::default()
        }
    }

    /// Named view over all coefficients, in declaration order
    #[must_use]
    pub fn entries(&self) -> [(&'static str, f64); 11] {
        [
            ("temperatureCoefficient", self.temperature_coefficient),
            ("irradianceLinearFactor", self.irradiance_linear_factor),
            ("irradianceQuadraticFactor", self.irradiance_quadratic_factor),
            ("cloudCoverImpact", self.cloud_cover_impact),
            ("winterConsumptionFactor", self.winter_consumption_factor),
            ("winterProductionFactor", self.winter_production_factor),
            ("summerConsumptionFactor", self.summer_consumption_factor),
            ("summerProductionFactor", self.summer_production_factor),
            ("peakHoursConsumptionFactor", self.peak_hours_consumption_factor),
            ("nightHoursConsumptionFactor", self.night_hours_consumption_factor),
            ("outlierThresholdFactor", self.outlier_threshold_factor),
        ]
    }

    /// Name of the first coefficient that is NaN or infinite
    #[must_use]
    pub fn first_non_finite(&self) -> Option<&'static str> {
        self.entries()
            .into_iter()
            .find(|(_, value)| !value.is_finite())
            .map(|(name, _)| name)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.first_non_finite().is_none()
    }

    #[must_use]
    pub fn with_outlier_threshold_clamped(self) -> Self {
        Self {
            outlier_threshold_factor: self
                .outlier_threshold_factor
                .clamp(Self::OUTLIER_THRESHOLD_MIN, Self::OUTLIER_THRESHOLD_MAX),
            ..self
        }
    }
}
