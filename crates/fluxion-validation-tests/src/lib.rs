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

//! Fixture builders shared by the integration tests

use chrono::{DateTime, Duration, TimeZone, Utc};
use fluxion_validation_types::{
    InstallationData, PredictedSeries, Reading, ReadingPeriod, WeatherConditions,
};

/// Midnight UTC on the given date
#[must_use]
pub fn midnight(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Measured values for one timestamp
#[derive(Debug, Clone, Copy, Default)]
pub struct Sample {
    pub consumption: f64,
    pub production: Option<f64>,
    pub weather: Option<WeatherConditions>,
}

impl Sample {
    #[must_use]
    pub fn consumption(consumption: f64) -> Self {
        Self {
            consumption,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_production(self, production: f64) -> Self {
        Self {
            production: Some(production),
            ..self
        }
    }

    #[must_use]
    pub fn with_weather(self, temperature: f64, irradiance: f64, cloud_cover: f64) -> Self {
        Self {
            weather: Some(WeatherConditions {
                temperature: Some(temperature),
                irradiance: Some(irradiance),
                cloud_cover: Some(cloud_cover),
            }),
            ..self
        }
    }
}

fn series(
    id: &str,
    period: ReadingPeriod,
    timestamps: impl Iterator<Item = DateTime<Utc>>,
    sample: impl Fn(DateTime<Utc>) -> Sample,
) -> InstallationData {
    let readings = timestamps
        .map(|ts| {
            let s = sample(ts);
            Reading {
                production: s.production,
                weather_conditions: s.weather,
                ..Reading::new(ts, period, s.consumption)
            }
        })
        .collect();
    InstallationData::new(id, id, readings)
}

/// `hours` hourly readings starting at `start`
#[must_use]
pub fn hourly_installation(
    id: &str,
    start: DateTime<Utc>,
    hours: i64,
    sample: impl Fn(DateTime<Utc>) -> Sample,
) -> InstallationData {
    series(
        id,
        ReadingPeriod::Hourly,
        (0..hours).map(|h| start + Duration::hours(h)),
        sample,
    )
}

/// `days` daily readings starting at `start`
#[must_use]
pub fn daily_installation(
    id: &str,
    start: DateTime<Utc>,
    days: i64,
    sample: impl Fn(DateTime<Utc>) -> Sample,
) -> InstallationData {
    series(
        id,
        ReadingPeriod::Daily,
        (0..days).map(|d| start + Duration::days(d)),
        sample,
    )
}

/// One prediction per reading, derived from the reading itself
#[must_use]
pub fn predict(
    installation: &InstallationData,
    consumption: impl Fn(&Reading) -> f64,
    production: impl Fn(&Reading) -> Option<f64>,
) -> PredictedSeries {
    let produced: Vec<Option<f64>> = installation.readings.iter().map(&production).collect();
    let has_production = produced.iter().any(Option::is_some);

    PredictedSeries {
        consumption: installation.readings.iter().map(consumption).collect(),
        production: has_production.then(|| produced.iter().map(|p| p.unwrap_or(0.0)).collect()),
        timestamps: installation.readings.iter().map(|r| r.timestamp).collect(),
    }
}
