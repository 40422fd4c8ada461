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

//! Deviation analyzers
//!
//! Signed deviations (positive = prediction too low) bucketed by season,
//! time of day and weather. A bucket with no data yields `None`, which the
//! optimizer treats as "leave this parameter alone".

use chrono::Timelike;
use fluxion_validation_types::{
    AnalysisConfig, ComparisonPoint, ReadingPeriod, Season, ValidationComparison,
};
use serde::Serialize;

use crate::metrics::{MeanAccumulator, calculate_signed_deviation};
use crate::parameters::DayPart;
use crate::season::SeasonClassifier;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalDeviations {
    pub winter_consumption: Option<f64>,
    pub winter_production: Option<f64>,
    pub summer_consumption: Option<f64>,
    pub summer_production: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOfDayDeviations {
    pub peak_hours: Option<f64>,
    pub night_hours: Option<f64>,
}

/// Weather signals: mean of signed production deviation scaled by how far
/// each point's weather sits from reference conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDeviations {
    /// Weight `(T - Tref) / 10`
    pub temperature: Option<f64>,
    /// Weight `(G - Gref) / Gref`
    pub irradiance: Option<f64>,
    /// Weight `((G - Gref) / Gref)²`
    pub irradiance_curvature: Option<f64>,
    /// Weight `cloud / 100`
    pub cloud_cover: Option<f64>,
}

/// All three analyses of one optimizer iteration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviationSignals {
    pub seasonal: SeasonalDeviations,
    pub time_of_day: TimeOfDayDeviations,
    pub weather: WeatherDeviations,
}

impl DeviationSignals {
    #[must_use]
    pub fn analyze(
        results: &[ValidationComparison],
        seasons: &dyn SeasonClassifier,
        config: &AnalysisConfig,
    ) -> Self {
        Self {
            seasonal: analyze_seasonal_deviations(results, seasons),
            time_of_day: analyze_time_of_day_deviations(results),
            weather: analyze_weather_deviations(results, config),
        }
    }
}

fn points(results: &[ValidationComparison]) -> impl Iterator<Item = &ComparisonPoint> {
    results.iter().flat_map(ValidationComparison::points)
}

fn production_deviation(point: &ComparisonPoint) -> Option<f64> {
    Some(calculate_signed_deviation(
        point.predicted_production?,
        point.actual_production?,
    ))
}

fn consumption_deviation(point: &ComparisonPoint) -> f64 {
    calculate_signed_deviation(point.predicted_consumption, point.actual_consumption)
}

#[must_use]
pub fn analyze_seasonal_deviations(
    results: &[ValidationComparison],
    seasons: &dyn SeasonClassifier,
) -> SeasonalDeviations {
    let mut winter_consumption = MeanAccumulator::default();
    let mut winter_production = MeanAccumulator::default();
    let mut summer_consumption = MeanAccumulator::default();
    let mut summer_production = MeanAccumulator::default();

    for point in points(results) {
        let (consumption, production) = match seasons.classify(point.timestamp) {
            Season::Winter => (&mut winter_consumption, &mut winter_production),
            Season::Summer => (&mut summer_consumption, &mut summer_production),
            Season::Transition => continue,
        };

        consumption.push(consumption_deviation(point));
        if let Some(deviation) = production_deviation(point) {
            production.push(deviation);
        }
    }

    SeasonalDeviations {
        winter_consumption: winter_consumption.mean(),
        winter_production: winter_production.mean(),
        summer_consumption: summer_consumption.mean(),
        summer_production: summer_production.mean(),
    }
}

/// Only hourly points carry a meaningful hour of day
#[must_use]
pub fn analyze_time_of_day_deviations(results: &[ValidationComparison]) -> TimeOfDayDeviations {
    let mut peak = MeanAccumulator::default();
    let mut night = MeanAccumulator::default();

    for point in points(results).filter(|p| p.period == ReadingPeriod::Hourly) {
        match DayPart::from_hour(point.timestamp.hour()) {
            DayPart::Peak => peak.push(consumption_deviation(point)),
            DayPart::Night => night.push(consumption_deviation(point)),
            DayPart::Other => {}
        }
    }

    TimeOfDayDeviations {
        peak_hours: peak.mean(),
        night_hours: night.mean(),
    }
}

/// Production points whose |signed deviation| reaches the significance
/// threshold, bucketed by which weather measurement is far enough from
/// reference to matter.
#[must_use]
pub fn analyze_weather_deviations(
    results: &[ValidationComparison],
    config: &AnalysisConfig,
) -> WeatherDeviations {
    let mut temperature = MeanAccumulator::default();
    let mut irradiance = MeanAccumulator::default();
    let mut curvature = MeanAccumulator::default();
    let mut cloud = MeanAccumulator::default();

    for point in points(results) {
        let (Some(weather), Some(deviation)) = (point.weather, production_deviation(point)) else {
            continue;
        };
        if deviation.abs() < config.significant_deviation_pct {
            continue;
        }

        if let Some(t) = weather.temperature {
            let delta = t - config.reference_temperature;
            if delta.abs() >= config.min_temperature_delta {
                temperature.push(deviation * delta / 10.0);
            }
        }

        if let Some(g) = weather.irradiance {
            let delta = g - config.reference_irradiance;
            if delta.abs() >= config.min_irradiance_delta {
                let weight = delta / config.reference_irradiance;
                irradiance.push(deviation * weight);
                curvature.push(deviation * weight * weight);
            }
        }

        if let Some(c) = weather.cloud_cover.filter(|c| *c >= config.min_cloud_cover) {
            cloud.push(deviation * c / 100.0);
        }
    }

    WeatherDeviations {
        temperature: temperature.mean(),
        irradiance: irradiance.mean(),
        irradiance_curvature: curvature.mean(),
        cloud_cover: cloud.mean(),
    }
}
