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

//! Parameter model
//!
//! Applies a [`ParameterSet`] to readings. Factors compose multiplicatively
//! in a fixed order: seasonal, time of day (hourly readings only), weather
//! (production only).

use std::borrow::Cow;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use fluxion_validation_types::{
    ComparisonPeriod, InstallationData, ParameterSet, PredictedSeries, Reading, ReadingPeriod,
    Season, WeatherConditions,
};

use crate::season::{SeasonClassifier, SharedSeasonClassifier};
use crate::weather::{REFERENCE_IRRADIANCE, REFERENCE_TEMPERATURE};

/// Time-of-day bucket of an hourly reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayPart {
    /// 06-09 and 17-21
    Peak,
    /// 22-05
    Night,
    Other,
}

impl DayPart {
    #[must_use]
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=9 | 17..=21 => Self::Peak,
            22..=23 | 0..=5 => Self::Night,
            _ => Self::Other,
        }
    }
}

/// Combined weather multiplier for production. Each component applies only
/// when its measurement is present.
#[must_use]
pub fn weather_multiplier(weather: &WeatherConditions, params: &ParameterSet) -> f64 {
    let mut multiplier = 1.0;

    if let Some(temperature) = weather.temperature {
        multiplier *= 1.0 + params.temperature_coefficient * (temperature - REFERENCE_TEMPERATURE);
    }

    if let Some(irradiance) = weather.irradiance {
        let delta = irradiance / REFERENCE_IRRADIANCE - 1.0;
        multiplier *= 1.0
            + params.irradiance_linear_factor * delta
            + params.irradiance_quadratic_factor * delta * delta;
    }

    if let Some(cloud_cover) = weather.cloud_cover {
        multiplier *= (1.0 - params.cloud_cover_impact * cloud_cover / 100.0).max(0.0);
    }

    multiplier
}

/// One reading with all factors applied
#[must_use]
pub fn adjust_reading(
    reading: &Reading,
    params: &ParameterSet,
    seasons: &dyn SeasonClassifier,
) -> Reading {
    let mut consumption = reading.consumption;
    let mut production = reading.production;

    match seasons.classify(reading.timestamp) {
        Season::Winter => {
            consumption *= params.winter_consumption_factor;
            production = production.map(|p| p * params.winter_production_factor);
        }
        Season::Summer => {
            consumption *= params.summer_consumption_factor;
            production = production.map(|p| p * params.summer_production_factor);
        }
        Season::Transition => {}
    }

    if reading.period == ReadingPeriod::Hourly {
        match DayPart::from_hour(reading.hour()) {
            DayPart::Peak => consumption *= params.peak_hours_consumption_factor,
            DayPart::Night => consumption *= params.night_hours_consumption_factor,
            DayPart::Other => {}
        }
    }

    if let Some(weather) = &reading.weather_conditions {
        production = production.map(|p| p * weather_multiplier(weather, params));
    }

    Reading {
        consumption,
        production,
        ..reading.clone()
    }
}

/// Copy of `installation` with every reading adjusted by `params`
#[must_use]
pub fn apply_parameters_to_data(
    installation: &InstallationData,
    params: &ParameterSet,
    seasons: &dyn SeasonClassifier,
) -> InstallationData {
    installation.with_readings(
        installation
            .readings
            .iter()
            .map(|r| adjust_reading(r, params, seasons))
            .collect(),
    )
}

/// Installation and prediction after parameter application. Untouched sides
/// stay borrowed.
#[derive(Debug, Clone)]
pub struct AdjustedPair<'a> {
    pub installation: Cow<'a, InstallationData>,
    pub predicted: Cow<'a, PredictedSeries>,
}

/// Applies a parameter set to one installation/prediction pair before
/// it is compared at `period`
pub trait ParameterAdapter {
    fn apply<'a>(
        &self,
        installation: &'a InstallationData,
        predicted: &'a PredictedSeries,
        params: &ParameterSet,
        period: &ComparisonPeriod,
    ) -> AdjustedPair<'a>;
}

/// Rescales the measured readings and leaves predictions alone.
///
/// Raising a factor raises the measured side, so signal-following nudges
/// push readings further from predictions that were too low.
#[derive(Debug, Clone)]
pub struct AdjustedReadings {
    seasons: SharedSeasonClassifier,
}

impl AdjustedReadings {
    #[must_use]
    pub fn new(seasons: SharedSeasonClassifier) -> Self {
        Self { seasons }
    }
}

impl ParameterAdapter for AdjustedReadings {
    fn apply<'a>(
        &self,
        installation: &'a InstallationData,
        predicted: &'a PredictedSeries,
        params: &ParameterSet,
        _period: &ComparisonPeriod,
    ) -> AdjustedPair<'a> {
        AdjustedPair {
            installation: Cow::Owned(apply_parameters_to_data(
                installation,
                params,
                self.seasons.as_ref(),
            )),
            predicted: Cow::Borrowed(predicted),
        }
    }
}

/// Rescales the predicted series as if each value were a reading.
///
/// Each prediction borrows granularity and weather from the measured
/// reading of the compared period with the same timestamp; predictions
/// without one are kept as-is.
#[derive(Debug, Clone)]
pub struct CalibratedPredictions {
    seasons: SharedSeasonClassifier,
}

impl CalibratedPredictions {
    #[must_use]
    pub fn new(seasons: SharedSeasonClassifier) -> Self {
        Self { seasons }
    }

    fn calibrate(
        &self,
        installation: &InstallationData,
        predicted: &PredictedSeries,
        params: &ParameterSet,
        period: &ComparisonPeriod,
    ) -> PredictedSeries {
        let mut observed: HashMap<DateTime<Utc>, &Reading> = HashMap::new();
        for reading in installation.readings_for(period) {
            observed.entry(reading.timestamp).or_insert(reading);
        }

        let mut consumption = predicted.consumption.clone();
        let mut production = predicted.production.clone();

        for (i, timestamp) in predicted.timestamps.iter().enumerate() {
            let (Some(reading), Some(value)) = (observed.get(timestamp), consumption.get(i).copied())
            else {
                continue;
            };

            let lifted = Reading {
                timestamp: *timestamp,
                period: reading.period,
                consumption: value,
                production: predicted.production_at(i),
                grid_import: None,
                grid_export: None,
                battery_charge: None,
                battery_discharge: None,
                weather_conditions: reading.weather_conditions,
            };
            let adjusted = adjust_reading(&lifted, params, self.seasons.as_ref());

            consumption[i] = adjusted.consumption;
            if let (Some(series), Some(p)) = (production.as_mut(), adjusted.production) {
                series[i] = p;
            }
        }

        PredictedSeries {
            consumption,
            production,
            timestamps: predicted.timestamps.clone(),
        }
    }
}

impl ParameterAdapter for CalibratedPredictions {
    fn apply<'a>(
        &self,
        installation: &'a InstallationData,
        predicted: &'a PredictedSeries,
        params: &ParameterSet,
        period: &ComparisonPeriod,
    ) -> AdjustedPair<'a> {
        AdjustedPair {
            installation: Cow::Borrowed(installation),
            predicted: Cow::Owned(self.calibrate(installation, predicted, params, period)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fluxion_validation_types::Hemisphere;
    use std::sync::Arc;

    fn hourly(month: u32, hour: u32, consumption: f64) -> Reading {
        Reading::new(
            Utc.with_ymd_and_hms(2024, month, 10, hour, 0, 0).unwrap(),
            ReadingPeriod::Hourly,
            consumption,
        )
    }

    #[test]
    fn test_day_parts() {
        for hour in [6, 9, 17, 21] {
            assert_eq!(DayPart::from_hour(hour), DayPart::Peak, "hour {hour}");
        }
        for hour in [22, 23, 0, 5] {
            assert_eq!(DayPart::from_hour(hour), DayPart::Night, "hour {hour}");
        }
        for hour in [10, 12, 16] {
            assert_eq!(DayPart::from_hour(hour), DayPart::Other, "hour {hour}");
        }
    }

    #[test]
    fn test_winter_peak_factors_compose() {
        let params = ParameterSet::default();
        let reading = hourly(1, 7, 10.0);
        let adjusted = adjust_reading(&reading, &params, &Hemisphere::Northern);
        // 10 × 1.3 (winter) × 1.2 (peak)
        assert!((adjusted.consumption - 15.6).abs() < 1e-9);
    }

    #[test]
    fn test_time_of_day_only_for_hourly() {
        let params = ParameterSet::neutral();
        let params = ParameterSet {
            night_hours_consumption_factor: 0.5,
            ..params
        };
        let mut reading = hourly(4, 2, 10.0);
        assert!((adjust_reading(&reading, &params, &Hemisphere::Northern).consumption - 5.0).abs() < 1e-12);

        reading.period = ReadingPeriod::Daily;
        assert!((adjust_reading(&reading, &params, &Hemisphere::Northern).consumption - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_weather_applies_to_production_only() {
        let params = ParameterSet::neutral();
        let weather = WeatherConditions {
            temperature: Some(35.0),
            irradiance: Some(1000.0),
            cloud_cover: Some(50.0),
        };
        let reading = hourly(4, 12, 2.0).with_production(10.0).with_weather(weather);
        let adjusted = adjust_reading(&reading, &params, &Hemisphere::Northern);

        // (1 - 0.004×10) × 1 × (1 - 0.3×0.5)
        let expected = 10.0 * 0.96 * 0.85;
        assert!((adjusted.production.unwrap() - expected).abs() < 1e-9);
        assert!((adjusted.consumption - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cloud_multiplier_never_negative() {
        let params = ParameterSet {
            cloud_cover_impact: 2.0,
            ..ParameterSet::neutral()
        };
        let weather = WeatherConditions {
            cloud_cover: Some(100.0),
            ..WeatherConditions::default()
        };
        assert!(weather_multiplier(&weather, &params).abs() < f64::EPSILON);
    }

    #[test]
    fn test_irradiance_terms() {
        let params = ParameterSet {
            irradiance_linear_factor: 1.0,
            irradiance_quadratic_factor: -0.5,
            ..ParameterSet::neutral()
        };
        let weather = WeatherConditions {
            irradiance: Some(500.0),
            ..WeatherConditions::default()
        };
        // 1 + 1×(-0.5) - 0.5×0.25
        assert!((weather_multiplier(&weather, &params) - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_apply_does_not_mutate_input() {
        let installation = InstallationData::new(
            "a",
            "A",
            vec![hourly(1, 8, 3.0).with_production(1.0), hourly(7, 23, 2.0)],
        );
        let snapshot = installation.clone();
        let adjusted =
            apply_parameters_to_data(&installation, &ParameterSet::default(), &Hemisphere::Northern);

        assert_eq!(installation, snapshot);
        assert_ne!(adjusted.readings, installation.readings);
        assert_eq!(adjusted.id, installation.id);
    }

    #[test]
    fn test_calibrated_predictions_use_observed_context() {
        let installation = InstallationData::new(
            "a",
            "A",
            vec![hourly(1, 12, 5.0), hourly(4, 12, 5.0)],
        );
        let extra = Utc.with_ymd_and_hms(2024, 1, 11, 12, 0, 0).unwrap();
        let predicted = PredictedSeries {
            consumption: vec![4.0, 4.0, 4.0],
            production: None,
            timestamps: vec![
                installation.readings[0].timestamp,
                installation.readings[1].timestamp,
                extra,
            ],
        };
        let params = ParameterSet {
            winter_consumption_factor: 1.5,
            ..ParameterSet::neutral()
        };

        let adapter = CalibratedPredictions::new(Arc::new(Hemisphere::Northern));
        let pair = adapter.apply(&installation, &predicted, &params, &ComparisonPeriod::Hourly);

        assert!(matches!(pair.installation, Cow::Borrowed(_)));
        let consumption = &pair.predicted.consumption;
        assert!((consumption[0] - 6.0).abs() < 1e-12);
        assert!((consumption[1] - 4.0).abs() < 1e-12);
        // No observed reading at this timestamp
        assert!((consumption[2] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_adjusted_readings_leave_predictions() {
        let installation = InstallationData::new("a", "A", vec![hourly(7, 12, 5.0)]);
        let predicted = PredictedSeries::default();
        let adapter = AdjustedReadings::new(Arc::new(Hemisphere::Northern));
        let pair = adapter.apply(
            &installation,
            &predicted,
            &ParameterSet::default(),
            &ComparisonPeriod::Hourly,
        );

        assert!(matches!(pair.predicted, Cow::Borrowed(_)));
        assert!((pair.installation.readings[0].consumption - 5.5).abs() < 1e-12);
    }

    #[test]
    fn test_calibration_uses_readings_of_compared_period() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let installation = InstallationData::new(
            "a",
            "A",
            vec![
                Reading::new(midnight, ReadingPeriod::Daily, 48.0),
                Reading::new(midnight, ReadingPeriod::Hourly, 2.0),
            ],
        );
        let predicted = PredictedSeries {
            consumption: vec![2.0],
            production: None,
            timestamps: vec![midnight],
        };
        let params = ParameterSet {
            night_hours_consumption_factor: 0.5,
            ..ParameterSet::neutral()
        };
        let adapter = CalibratedPredictions::new(Arc::new(Hemisphere::Northern));

        let hourly = adapter.apply(&installation, &predicted, &params, &ComparisonPeriod::Hourly);
        assert!((hourly.predicted.consumption[0] - 1.0).abs() < 1e-12);

        let daily = adapter.apply(&installation, &predicted, &params, &ComparisonPeriod::Daily);
        assert!((daily.predicted.consumption[0] - 2.0).abs() < 1e-12);
    }
}
