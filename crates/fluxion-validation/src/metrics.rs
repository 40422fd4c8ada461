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

//! Deviation metrics
//!
//! Percentage deviations between predicted and actual values, and
//! interquartile-range outlier filtering for measured series.

/// IQR multiplier used by [`filter_outliers`]
pub const DEFAULT_OUTLIER_FACTOR: f64 = 1.5;

/// Series shorter than this are returned unfiltered; quartiles are meaningless
const MIN_OUTLIER_SAMPLE: usize = 4;

/// Absolute percentage deviation of `predicted` from `actual`.
///
/// Zero actual has no relative scale: exact agreement is 0 %, anything
/// else is a full 100 % miss.
#[must_use]
pub fn calculate_deviation(predicted: f64, actual: f64) -> f64 {
    if actual == 0.0 {
        return if predicted == 0.0 { 0.0 } else { 100.0 };
    }
    ((predicted - actual) / actual).abs() * 100.0
}

/// Signed percentage deviation, positive when the prediction is too low.
///
/// `(actual - predicted) / actual * 100`; with zero actual the result is
/// 0 for zero prediction and ±100 opposite to the prediction's sign.
#[must_use]
pub fn calculate_signed_deviation(predicted: f64, actual: f64) -> f64 {
    if actual == 0.0 {
        if predicted == 0.0 {
            return 0.0;
        }
        return -100.0 * predicted.signum();
    }
    (actual - predicted) / actual * 100.0
}

/// Drops values outside `[Q1 - 1.5·IQR, Q3 + 1.5·IQR]`
#[must_use]
pub fn filter_outliers(values: &[f64]) -> Vec<f64> {
    filter_outliers_with_factor(values, DEFAULT_OUTLIER_FACTOR)
}

/// Drops values outside `[Q1 - k·IQR, Q3 + k·IQR]`, keeping input order.
///
/// Quartiles are taken by index on the sorted copy: Q1 at `⌊n/4⌋`, Q3 at
/// `⌊3n/4⌋`. Fewer than four values come back unchanged.
#[must_use]
#[expect(clippy::integer_division)]
pub fn filter_outliers_with_factor(values: &[f64], factor: f64) -> Vec<f64> {
    if values.len() < MIN_OUTLIER_SAMPLE {
        return values.to_vec();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let q1 = sorted[n / 4];
    let q3 = sorted[n * 3 / 4];
    let iqr = q3 - q1;
    let lower = q1 - factor * iqr;
    let upper = q3 + factor * iqr;

    values
        .iter()
        .copied()
        .filter(|v| (lower..=upper).contains(v))
        .collect()
}

/// Arithmetic mean, `None` for an empty slice
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[expect(clippy::cast_precision_loss)]
    let count = values.len() as f64;
    Some(values.iter().sum::<f64>() / count)
}

/// Running mean that never materializes its samples
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MeanAccumulator {
    sum: f64,
    count: u32,
}

impl MeanAccumulator {
    pub(crate) fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub(crate) fn mean(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}
