// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

//! Field-level configuration validation results.

use serde::{Deserialize, Serialize};

/// Validation result with field-level errors and warnings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    /// Usable, but probably not what was intended
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
            severity: ValidationSeverity::Error,
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
            severity: ValidationSeverity::Warning,
        });
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Field path, e.g. `optimizer.maxIterations`
    pub field: String,
    pub message: String,
    pub severity: ValidationSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_keep_result_valid() {
        let mut result = ValidationResult::success();
        result.add_warning("validation.tariffPerKwh", "unusually high");
        assert!(result.is_valid());

        result.add_error("optimizer.maxIterations", "must be at least 1");
        assert!(!result.is_valid());
        assert_eq!(result.errors[0].severity, ValidationSeverity::Error);
        assert_eq!(result.warnings.len(), 1);
    }
}
