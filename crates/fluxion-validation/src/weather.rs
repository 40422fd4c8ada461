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

//! Weather normalization of measured production.
//!
//! Readings are rescaled to standard test conditions so plants can be
//! compared across days with different sun and temperature.

use fluxion_validation_types::{Reading, WeatherConditions};

/// Standard test conditions temperature (°C)
pub const REFERENCE_TEMPERATURE: f64 = 25.0;

/// Standard test conditions irradiance (W/m²)
pub const REFERENCE_IRRADIANCE: f64 = 1000.0;

/// Crystalline silicon PV power derating per °C above reference
pub const PV_TEMPERATURE_COEFFICIENT: f64 = -0.004;

/// Scales measured production to what it would be under given weather
/// relative to reference conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherNormalizer {
    pub reference_temperature: f64,
    pub reference_irradiance: f64,
    pub temperature_coefficient: f64,
}

impl Default for WeatherNormalizer {
    fn default() -> Self {
        Self {
            reference_temperature: REFERENCE_TEMPERATURE,
            reference_irradiance: REFERENCE_IRRADIANCE,
            temperature_coefficient: PV_TEMPERATURE_COEFFICIENT,
        }
    }
}

impl WeatherNormalizer {
    #[must_use]
    pub fn with_references(reference_temperature: f64, reference_irradiance: f64) -> Self {
        Self {
            reference_temperature,
            reference_irradiance,
            ..Self::default()
        }
    }

    /// Weather-corrected production, `None` unless both temperature and
    /// irradiance were recorded.
    #[must_use]
    pub fn normalize_production(&self, production: f64, weather: &WeatherConditions) -> Option<f64> {
        let temperature = weather.temperature?;
        let irradiance = weather.irradiance?;

        let thermal =
            1.0 + self.temperature_coefficient * (temperature - self.reference_temperature);
        Some(production * thermal * (irradiance / self.reference_irradiance))
    }

    /// Returns a new series; readings without production or full weather
    /// data are copied unchanged.
    #[must_use]
    pub fn normalize(&self, readings: &[Reading]) -> Vec<Reading> {
        readings
            .iter()
            .map(|reading| {
                let normalized = reading.production.zip(reading.weather_conditions.as_ref()).and_then(
                    |(production, weather)| self.normalize_production(production, weather),
                );
                match normalized {
                    Some(production) => Reading {
                        production: Some(production),
                        ..reading.clone()
                    },
                    None => reading.clone(),
                }
            })
            .collect()
    }
}

/// Normalizes with the default 25 °C / 1000 W/m² references
#[must_use]
pub fn normalize_weather_conditions(readings: &[Reading]) -> Vec<Reading> {
    WeatherNormalizer::default().normalize(readings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fluxion_validation_types::ReadingPeriod;

    fn reading(production: Option<f64>, weather: Option<WeatherConditions>) -> Reading {
        let mut reading = Reading::new(
            Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap(),
            ReadingPeriod::Hourly,
            1.0,
        );
        reading.production = production;
        reading.weather_conditions = weather;
        reading
    }

    fn weather(temperature: Option<f64>, irradiance: Option<f64>) -> WeatherConditions {
        WeatherConditions {
            temperature,
            irradiance,
            cloud_cover: None,
        }
    }

    #[test]
    fn test_normalization_hot_dim_day() {
        let input = vec![reading(Some(10.0), Some(weather(Some(30.0), Some(800.0))))];
        let output = normalize_weather_conditions(&input);
        let production = output[0].production.unwrap();
        assert!((production - 7.84).abs() < 1e-9, "got {production}");
    }

    #[test]
    fn test_reference_conditions_are_identity() {
        let input = vec![reading(Some(4.2), Some(weather(Some(25.0), Some(1000.0))))];
        let output = normalize_weather_conditions(&input);
        assert!((output[0].production.unwrap() - 4.2).abs() < 1e-12);
    }

    #[test]
    fn test_incomplete_weather_passes_through() {
        let input = vec![
            reading(Some(5.0), None),
            reading(Some(5.0), Some(weather(Some(10.0), None))),
            reading(Some(5.0), Some(weather(None, Some(500.0)))),
            reading(None, Some(weather(Some(10.0), Some(500.0)))),
        ];
        let output = normalize_weather_conditions(&input);
        assert_eq!(output, input);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let input = vec![reading(Some(10.0), Some(weather(Some(30.0), Some(800.0))))];
        let snapshot = input.clone();
        let _ = normalize_weather_conditions(&input);
        assert_eq!(input, snapshot);
    }

    #[test]
    fn test_custom_references() {
        let normalizer = WeatherNormalizer::with_references(20.0, 800.0);
        let result = normalizer
            .normalize_production(10.0, &weather(Some(20.0), Some(800.0)))
            .unwrap();
        assert!((result - 10.0).abs() < 1e-12);
    }
}
