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

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::reading::Reading;
use crate::settings::ComparisonPeriod;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallationType {
    #[default]
    Residential,
    Commercial,
    Industrial,
}

/// An installation and its ordered reading history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationData {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub installation_type: InstallationType,
    #[serde(default)]
    pub location: String,
    /// Installed PV capacity (kW)
    #[serde(default)]
    pub capacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_date: Option<NaiveDate>,
    pub readings: Vec<Reading>,
}

impl InstallationData {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, readings: Vec<Reading>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            installation_type: InstallationType::default(),
            location: String::new(),
            capacity: 0.0,
            install_date: None,
            readings,
        }
    }

    /// Same metadata, different reading series
    #[must_use]
    pub fn with_readings(&self, readings: Vec<Reading>) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            installation_type: self.installation_type,
            location: self.location.clone(),
            capacity: self.capacity,
            install_date: self.install_date,
            readings,
        }
    }

    /// Readings whose granularity matches the requested comparison period
    pub fn readings_for<'a>(
        &'a self,
        period: &'a ComparisonPeriod,
    ) -> impl Iterator<Item = &'a Reading> + 'a {
        self.readings.iter().filter(|r| period.matches(r.period))
    }

    #[must_use]
    pub fn has_production(&self) -> bool {
        self.readings.iter().any(|r| r.production.is_some())
    }
}
