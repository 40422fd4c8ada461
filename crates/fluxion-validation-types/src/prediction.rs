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

/// Model output to validate against observed readings.
///
/// Arrays are parallel: `consumption[i]` and `production[i]` belong to
/// `timestamps[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictedSeries {
    pub consumption: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production: Option<Vec<f64>>,
    pub timestamps: Vec<DateTime<Utc>>,
}

impl PredictedSeries {
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    #[must_use]
    pub fn total_consumption(&self) -> f64 {
        self.consumption.iter().sum()
    }

    /// Zero when no production forecast exists
    #[must_use]
    pub fn total_production(&self) -> f64 {
        self.production.as_ref().map_or(0.0, |p| p.iter().sum())
    }

    #[must_use]
    pub fn consumption_at(&self, index: usize) -> Option<f64> {
        self.consumption.get(index).copied()
    }

    #[must_use]
    pub fn production_at(&self, index: usize) -> Option<f64> {
        self.production.as_ref().and_then(|p| p.get(index).copied())
    }
}
