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

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Granularity of a single reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum ReadingPeriod {
    Hourly,
    Daily,
    Monthly,
}

impl ReadingPeriod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }
}

impl FromStr for ReadingPeriod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            other => Err(format!("unknown reading period '{other}'")),
        }
    }
}

impl TryFrom<String> for ReadingPeriod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReadingPeriod> for &'static str {
    fn from(period: ReadingPeriod) -> Self {
        period.as_str()
    }
}

impl fmt::Display for ReadingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weather observed alongside a reading. Every field is optional because
/// upstream sources rarely report all three.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherConditions {
    /// Ambient temperature (°C)
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Global irradiance (W/m²)
    #[serde(default)]
    pub irradiance: Option<f64>,
    /// Cloud cover (0-100 %)
    #[serde(default)]
    pub cloud_cover: Option<f64>,
}

/// One consumption/production observation. Energies are kWh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub period: ReadingPeriod,
    pub consumption: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_import: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_export: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_charge: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_discharge: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_conditions: Option<WeatherConditions>,
}

impl Reading {
    /// Minimal reading with only consumption set
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, period: ReadingPeriod, consumption: f64) -> Self {
        Self {
            timestamp,
            period,
            consumption,
            production: None,
            grid_import: None,
            grid_export: None,
            battery_charge: None,
            battery_discharge: None,
            weather_conditions: None,
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
    pub fn with_weather(self, weather: WeatherConditions) -> Self {
        Self {
            weather_conditions: Some(weather),
            ..self
        }
    }

    /// Hour of day (UTC) the reading starts at
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_period_is_case_insensitive() {
        assert_eq!("Hourly".parse::<ReadingPeriod>(), Ok(ReadingPeriod::Hourly));
        assert_eq!(" DAILY ".parse::<ReadingPeriod>(), Ok(ReadingPeriod::Daily));
        assert!("weekly".parse::<ReadingPeriod>().is_err());
    }

    #[test]
    fn test_reading_deserializes_dashboard_format() {
        let json = r#"{
            "timestamp": "2024-01-15T12:00:00Z",
            "period": "hourly",
            "consumption": 1.5,
            "production": 2.25,
            "gridExport": 0.75,
            "weatherConditions": { "temperature": 21.0, "irradiance": 640.0, "cloudCover": 35.0 }
        }"#;

        let reading: Reading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.period, ReadingPeriod::Hourly);
        assert_eq!(reading.production, Some(2.25));
        assert_eq!(reading.grid_export, Some(0.75));
        assert!(reading.grid_import.is_none());
        let weather = reading.weather_conditions.unwrap();
        assert_eq!(weather.cloud_cover, Some(35.0));
        assert_eq!(reading.hour(), 12);
    }

    #[test]
    fn test_reading_serialization_skips_absent_fields() {
        let ts = DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let json = serde_json::to_string(&Reading::new(ts, ReadingPeriod::Daily, 12.0)).unwrap();
        assert!(json.contains("\"period\":\"daily\""));
        assert!(!json.contains("production"));
    }
}
