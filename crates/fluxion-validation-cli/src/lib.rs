// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

//! Library half of the `fluxion-validate` binary: argument definitions,
//! configuration, data loading and output formatting.

pub mod cli;
