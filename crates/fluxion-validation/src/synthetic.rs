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

//! Synthetic predictions for demos and tests
//!
//! Perturbs observed readings by a bounded random factor. Seeded, so the
//! same seed always yields the same series.

use fluxion_validation_types::{ComparisonPeriod, InstallationData, PredictedSeries};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct SyntheticPredictionGenerator {
    /// Maximum relative noise, e.g. 0.1 for ±10 %
    noise: f64,
    /// Systematic relative offset added to every value
    bias: f64,
    rng: StdRng,
}

impl SyntheticPredictionGenerator {
    #[must_use]
    pub fn new(noise: f64, seed: u64) -> Self {
        Self {
            noise: noise.abs(),
            bias: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn with_bias(self, bias: f64) -> Self {
        Self { bias, ..self }
    }

    fn perturb(&mut self, value: f64) -> f64 {
        let noise = if self.noise > 0.0 {
            self.rng.gen_range(-self.noise..=self.noise)
        } else {
            0.0
        };
        (value * (1.0 + self.bias + noise)).max(0.0)
    }

    /// One prediction per reading of the requested granularity. Production
    /// is predicted only for installations that report it.
    pub fn generate(
        &mut self,
        installation: &InstallationData,
        period: &ComparisonPeriod,
    ) -> PredictedSeries {
        let readings: Vec<_> = installation.readings_for(period).collect();
        let has_production = readings.iter().any(|r| r.production.is_some());

        let mut consumption = Vec::with_capacity(readings.len());
        let mut production = Vec::with_capacity(readings.len());
        let mut timestamps = Vec::with_capacity(readings.len());

        for reading in readings {
            consumption.push(self.perturb(reading.consumption));
            if has_production {
                let value = reading.production.unwrap_or(0.0);
                production.push(self.perturb(value));
            }
            timestamps.push(reading.timestamp);
        }

        PredictedSeries {
            consumption,
            production: has_production.then_some(production),
            timestamps,
        }
    }
}
