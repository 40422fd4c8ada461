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

//! Calendar season classification
//!
//! Seasonal factors and seasonal deviation buckets both go through a
//! [`SeasonClassifier`], so hemisphere or custom month ranges are a
//! configuration concern rather than a code change.

use std::fmt::Debug;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use fluxion_validation_types::{Hemisphere, Season, SeasonConfig};

pub trait SeasonClassifier: Debug + Send + Sync {
    fn classify(&self, timestamp: DateTime<Utc>) -> Season;
}

pub type SharedSeasonClassifier = Arc<dyn SeasonClassifier>;

impl SeasonClassifier for Hemisphere {
    fn classify(&self, timestamp: DateTime<Utc>) -> Season {
        let month = timestamp.month();
        let (winter, summer) = match self {
            Hemisphere::Northern => (Season::Winter, Season::Summer),
            Hemisphere::Southern => (Season::Summer, Season::Winter),
        };
        match month {
            12 | 1 | 2 => winter,
            6..=8 => summer,
            _ => Season::Transition,
        }
    }
}

/// Explicit month lists (1-12). A month in both lists counts as winter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSeasons {
    winter: Vec<u32>,
    summer: Vec<u32>,
}

impl MonthSeasons {
    #[must_use]
    pub fn new(winter: Vec<u32>, summer: Vec<u32>) -> Self {
        Self { winter, summer }
    }
}

impl SeasonClassifier for MonthSeasons {
    fn classify(&self, timestamp: DateTime<Utc>) -> Season {
        let month = timestamp.month();
        if self.winter.contains(&month) {
            Season::Winter
        } else if self.summer.contains(&month) {
            Season::Summer
        } else {
            Season::Transition
        }
    }
}

/// Builds the classifier described by `config`.
///
/// Month lists override the hemisphere; a missing list takes the
/// hemisphere's months for that season.
#[must_use]
pub fn classifier_for(config: &SeasonConfig) -> SharedSeasonClassifier {
    if config.winter_months.is_none() && config.summer_months.is_none() {
        return Arc::new(config.hemisphere);
    }

    let (default_winter, default_summer) = match config.hemisphere {
        Hemisphere::Northern => (vec![12, 1, 2], vec![6, 7, 8]),
        Hemisphere::Southern => (vec![6, 7, 8], vec![12, 1, 2]),
    };
    Arc::new(MonthSeasons::new(
        config.winter_months.clone().unwrap_or(default_winter),
        config.summer_months.clone().unwrap_or(default_summer),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, month, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_northern_hemisphere() {
        let h = Hemisphere::Northern;
        assert_eq!(h.classify(at(1)), Season::Winter);
        assert_eq!(h.classify(at(12)), Season::Winter);
        assert_eq!(h.classify(at(7)), Season::Summer);
        assert_eq!(h.classify(at(4)), Season::Transition);
        assert_eq!(h.classify(at(10)), Season::Transition);
    }

    #[test]
    fn test_southern_hemisphere_swaps() {
        let h = Hemisphere::Southern;
        assert_eq!(h.classify(at(1)), Season::Summer);
        assert_eq!(h.classify(at(7)), Season::Winter);
        assert_eq!(h.classify(at(3)), Season::Transition);
    }

    #[test]
    fn test_month_lists_override() {
        let config = SeasonConfig {
            winter_months: Some(vec![11, 12, 1, 2, 3]),
            ..SeasonConfig::default()
        };
        let classifier = classifier_for(&config);
        assert_eq!(classifier.classify(at(11)), Season::Winter);
        assert_eq!(classifier.classify(at(3)), Season::Winter);
        // Summer falls back to the hemisphere months
        assert_eq!(classifier.classify(at(6)), Season::Summer);
        assert_eq!(classifier.classify(at(9)), Season::Transition);
    }

    #[test]
    fn test_default_config_is_northern() {
        let classifier = classifier_for(&SeasonConfig::default());
        assert_eq!(classifier.classify(at(2)), Season::Winter);
        assert_eq!(classifier.classify(at(8)), Season::Summer);
    }
}
