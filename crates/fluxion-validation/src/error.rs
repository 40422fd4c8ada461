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

//! Error types for the validation engine

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid optimizer options: {0}")]
    InvalidOptions(String),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("{installations} test installations but {predictions} predicted series")]
    MismatchedInputs {
        installations: usize,
        predictions: usize,
    },

    #[error("aggregate deviation became non-finite at iteration {iteration}")]
    NonFiniteDeviation { iteration: usize },

    #[error("parameter {name} became non-finite at iteration {iteration}")]
    NonFiniteParameter {
        iteration: usize,
        name: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ValidationError>;
