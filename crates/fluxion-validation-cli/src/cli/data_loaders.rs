// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

//! Data loaders for installations and predicted series.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use fluxion_validation::SyntheticPredictionGenerator;
use fluxion_validation_types::{
    ComparisonPeriod, InstallationData, InstallationType, PredictedSeries, Reading,
    ReadingPeriod, WeatherConditions,
};
use rusqlite::{Connection, OptionalExtension};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::config::SyntheticConfig;

/// Source of measured installation data
pub trait DataLoader {
    fn load(&self) -> Result<Vec<InstallationData>>;
}

/// Source of predicted series, one per installation and in the same order
pub trait PredictionSource {
    fn predictions(
        &self,
        installations: &[InstallationData],
        period: &ComparisonPeriod,
    ) -> Result<Vec<PredictedSeries>>;
}

/// A single object or an array of objects
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Installations from a JSON file holding one installation or an array
#[derive(Debug, Clone)]
pub struct JsonInstallationLoader {
    path: PathBuf,
}

impl JsonInstallationLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataLoader for JsonInstallationLoader {
    fn load(&self) -> Result<Vec<InstallationData>> {
        let installations = read_json::<OneOrMany<InstallationData>>(&self.path)?.into_vec();
        info!(
            path = %self.path.display(),
            installations = installations.len(),
            "Loaded installations"
        );
        Ok(installations)
    }
}

/// Schema read by [`SqliteInstallationLoader`]. Timestamps are Unix seconds.
pub const SQLITE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS installations (
    id           TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    type         TEXT NOT NULL DEFAULT 'residential',
    location     TEXT NOT NULL DEFAULT '',
    capacity     REAL NOT NULL DEFAULT 0,
    install_date TEXT
);
CREATE TABLE IF NOT EXISTS readings (
    installation_id   TEXT NOT NULL REFERENCES installations(id),
    timestamp         INTEGER NOT NULL,
    period            TEXT NOT NULL,
    consumption       REAL NOT NULL,
    production        REAL,
    grid_import       REAL,
    grid_export       REAL,
    battery_charge    REAL,
    battery_discharge REAL,
    temperature       REAL,
    irradiance        REAL,
    cloud_cover       REAL
);
CREATE INDEX IF NOT EXISTS idx_readings_installation
    ON readings(installation_id, timestamp);
";

/// Installations from a SQLite database (see [`SQLITE_SCHEMA`])
#[derive(Debug, Clone)]
pub struct SqliteInstallationLoader {
    db_path: PathBuf,
    installation_id: Option<String>,
}

struct InstallationRow {
    id: String,
    name: String,
    installation_type: String,
    location: String,
    capacity: f64,
    install_date: Option<String>,
}

struct ReadingRow {
    timestamp: i64,
    period: String,
    values: [Option<f64>; 8],
    consumption: f64,
}

impl SqliteInstallationLoader {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            installation_id: None,
        }
    }

    /// Restrict loading to one installation
    #[must_use]
    pub fn only(self, installation_id: impl Into<String>) -> Self {
        Self {
            installation_id: Some(installation_id.into()),
            ..self
        }
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open database at {}", self.db_path.display()))
    }

    fn installation_rows(&self, conn: &Connection) -> Result<Vec<InstallationRow>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, type, location, capacity, install_date
             FROM installations
             WHERE ?1 IS NULL OR id = ?1
             ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map([self.installation_id.as_deref()], |row| {
                Ok(InstallationRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    installation_type: row.get(2)?,
                    location: row.get(3)?,
                    capacity: row.get(4)?,
                    install_date: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn readings(conn: &Connection, installation_id: &str) -> Result<Vec<Reading>> {
        let mut stmt = conn.prepare(
            "SELECT timestamp, period, consumption, production, grid_import, grid_export,
                    battery_charge, battery_discharge, temperature, irradiance, cloud_cover
             FROM readings
             WHERE installation_id = ?1
             ORDER BY timestamp ASC",
        )?;
        let rows = stmt
            .query_map([installation_id], |row| {
                Ok(ReadingRow {
                    timestamp: row.get(0)?,
                    period: row.get(1)?,
                    consumption: row.get(2)?,
                    values: [
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                        row.get(7)?,
                        row.get(8)?,
                        row.get(9)?,
                        row.get(10)?,
                    ],
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(reading_from_row).collect()
    }
}

fn reading_from_row(row: ReadingRow) -> Result<Reading> {
    let timestamp = DateTime::from_timestamp(row.timestamp, 0)
        .with_context(|| format!("Timestamp {} out of range", row.timestamp))?;
    let period: ReadingPeriod = row.period.parse().map_err(anyhow::Error::msg)?;
    let [production, grid_import, grid_export, battery_charge, battery_discharge, temperature, irradiance, cloud_cover] =
        row.values;

    let weather = WeatherConditions {
        temperature,
        irradiance,
        cloud_cover,
    };
    let has_weather = temperature.is_some() || irradiance.is_some() || cloud_cover.is_some();

    Ok(Reading {
        timestamp,
        period,
        consumption: row.consumption,
        production,
        grid_import,
        grid_export,
        battery_charge,
        battery_discharge,
        weather_conditions: has_weather.then_some(weather),
    })
}

fn installation_type(value: &str) -> Result<InstallationType> {
    match value.trim().to_ascii_lowercase().as_str() {
        "residential" => Ok(InstallationType::Residential),
        "commercial" => Ok(InstallationType::Commercial),
        "industrial" => Ok(InstallationType::Industrial),
        other => anyhow::bail!("Unknown installation type '{other}'"),
    }
}

impl DataLoader for SqliteInstallationLoader {
    fn load(&self) -> Result<Vec<InstallationData>> {
        let conn = self.connect()?;
        if let Some(id) = &self.installation_id
            && !installation_exists(&conn, id)?
        {
            anyhow::bail!("Installation '{id}' not found in {}", self.db_path.display());
        }

        let rows = self.installation_rows(&conn)?;

        let mut installations = Vec::with_capacity(rows.len());
        for row in rows {
            let readings = Self::readings(&conn, &row.id)
                .with_context(|| format!("Failed to load readings for '{}'", row.id))?;
            let install_date = row
                .install_date
                .as_deref()
                .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
                .transpose()
                .with_context(|| format!("Invalid install_date for '{}'", row.id))?;

            debug!(installation = %row.id, readings = readings.len(), "Loaded installation");
            installations.push(InstallationData {
                installation_type: installation_type(&row.installation_type)?,
                id: row.id,
                name: row.name,
                location: row.location,
                capacity: row.capacity,
                install_date,
                readings,
            });
        }

        info!(
            path = %self.db_path.display(),
            installations = installations.len(),
            "Loaded installations from database"
        );
        Ok(installations)
    }
}

/// Creates the loader schema in `conn`
pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SQLITE_SCHEMA)
        .context("Failed to create schema")
}

/// Whether the database already has an installation with this id
pub fn installation_exists(conn: &Connection, id: &str) -> Result<bool> {
    let found: Option<String> = conn
        .query_row("SELECT id FROM installations WHERE id = ?1", [id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PredictionFile {
    Many(Vec<PredictedSeries>),
    ById(HashMap<String, PredictedSeries>),
    One(PredictedSeries),
}

/// Predicted series from JSON: an array paired by position, an object
/// keyed by installation id, or a single series for a single installation.
#[derive(Debug, Clone)]
pub struct JsonPredictionLoader {
    path: PathBuf,
}

impl JsonPredictionLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PredictionSource for JsonPredictionLoader {
    fn predictions(
        &self,
        installations: &[InstallationData],
        _period: &ComparisonPeriod,
    ) -> Result<Vec<PredictedSeries>> {
        let series = match read_json::<PredictionFile>(&self.path)? {
            PredictionFile::Many(series) => series,
            PredictionFile::One(series) => vec![series],
            PredictionFile::ById(mut by_id) => installations
                .iter()
                .map(|inst| {
                    by_id.remove(&inst.id).with_context(|| {
                        format!("No predictions for installation '{}'", inst.id)
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        };

        if series.len() != installations.len() {
            anyhow::bail!(
                "{} predicted series for {} installations in {}",
                series.len(),
                installations.len(),
                self.path.display()
            );
        }
        Ok(series)
    }
}

/// Predictions generated from the readings themselves
#[derive(Debug, Clone, Copy)]
pub struct SyntheticPredictionSource {
    pub config: SyntheticConfig,
}

impl PredictionSource for SyntheticPredictionSource {
    fn predictions(
        &self,
        installations: &[InstallationData],
        period: &ComparisonPeriod,
    ) -> Result<Vec<PredictedSeries>> {
        let mut generator = SyntheticPredictionGenerator::new(self.config.noise, self.config.seed)
            .with_bias(self.config.bias);
        Ok(installations
            .iter()
            .map(|inst| generator.generate(inst, period))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Write;

    fn json_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const INSTALLATION: &str = r#"{
        "id": "home-1",
        "name": "Home",
        "type": "residential",
        "capacity": 5.5,
        "readings": [
            { "timestamp": "2024-01-01T00:00:00Z", "period": "hourly", "consumption": 1.2 },
            { "timestamp": "2024-01-01T01:00:00Z", "period": "hourly", "consumption": 0.9, "production": 0.0 }
        ]
    }"#;

    #[test]
    fn test_json_single_and_array() {
        let single = json_file(INSTALLATION);
        let loaded = JsonInstallationLoader::new(single.path()).load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].readings.len(), 2);

        let array = json_file(&format!("[{INSTALLATION}, {INSTALLATION}]"));
        assert_eq!(JsonInstallationLoader::new(array.path()).load().unwrap().len(), 2);
    }

    #[test]
    fn test_json_predictions_by_id() {
        let file = json_file(
            r#"{ "home-1": { "consumption": [1.0, 1.0], "timestamps": ["2024-01-01T00:00:00Z", "2024-01-01T01:00:00Z"] } }"#,
        );
        let installations = JsonInstallationLoader::new(json_file(INSTALLATION).path())
            .load()
            .unwrap();
        let series = JsonPredictionLoader::new(file.path())
            .predictions(&installations, &ComparisonPeriod::Hourly)
            .unwrap();
        assert_eq!(series[0].len(), 2);
    }

    #[test]
    fn test_json_prediction_count_mismatch() {
        let file = json_file(r#"[]"#);
        let installations = JsonInstallationLoader::new(json_file(INSTALLATION).path())
            .load()
            .unwrap();
        assert!(
            JsonPredictionLoader::new(file.path())
                .predictions(&installations, &ComparisonPeriod::Hourly)
                .is_err()
        );
    }

    #[test]
    fn test_sqlite_loader() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("readings.db");
        let conn = Connection::open(&db_path).unwrap();
        create_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO installations (id, name, type, capacity, install_date)
             VALUES ('plant', 'Plant', 'commercial', 30.0, '2022-04-01')",
            [],
        )
        .unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap().timestamp();
        conn.execute(
            "INSERT INTO readings (installation_id, timestamp, period, consumption, production, temperature, irradiance)
             VALUES ('plant', ?1, 'hourly', 4.0, 9.5, 28.0, 850.0)",
            [ts],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO readings (installation_id, timestamp, period, consumption)
             VALUES ('plant', ?1, 'hourly', 3.0)",
            [ts + 3600],
        )
        .unwrap();
        assert!(installation_exists(&conn, "plant").unwrap());
        drop(conn);

        let loaded = SqliteInstallationLoader::new(&db_path).load().unwrap();
        assert_eq!(loaded.len(), 1);
        let plant = &loaded[0];
        assert_eq!(plant.installation_type, InstallationType::Commercial);
        assert_eq!(plant.install_date, NaiveDate::from_ymd_opt(2022, 4, 1));
        assert_eq!(plant.readings.len(), 2);
        assert_eq!(plant.readings[0].production, Some(9.5));
        assert_eq!(
            plant.readings[0].weather_conditions.and_then(|w| w.irradiance),
            Some(850.0)
        );
        assert!(plant.readings[1].weather_conditions.is_none());

        let missing = SqliteInstallationLoader::new(&db_path).only("nope").load();
        assert!(missing.is_err());
    }

    #[test]
    fn test_synthetic_source_is_deterministic() {
        let installations = JsonInstallationLoader::new(json_file(INSTALLATION).path())
            .load()
            .unwrap();
        let source = SyntheticPredictionSource {
            config: SyntheticConfig::default(),
        };
        let a = source
            .predictions(&installations, &ComparisonPeriod::Hourly)
            .unwrap();
        let b = source
            .predictions(&installations, &ComparisonPeriod::Hourly)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].len(), 2);
    }
}
