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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Summer,
    /// Spring and autumn; no seasonal factor applies
    Transition,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    /// December-February winter, June-August summer
    #[default]
    Northern,
    /// June-August winter, December-February summer
    Southern,
}

/// Season boundaries. Explicit month lists (1-12) override the hemisphere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeasonConfig {
    pub hemisphere: Hemisphere,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winter_months: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summer_months: Option<Vec<u32>>,
}

impl SeasonConfig {
    #[must_use]
    pub fn for_hemisphere(hemisphere: Hemisphere) -> Self {
        Self {
            hemisphere,
            ..Self::default()
        }
    }
}
