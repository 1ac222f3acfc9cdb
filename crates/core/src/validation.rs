// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema validation for metadata documents.
//!
//! Validation never throws: it produces a list of structured errors that
//! callers record, display, or turn into a refused save.

use std::fmt;

/// When a document is being validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationContext {
    /// A document just read from disk; structural checks only
    Load,
    /// A document about to be written; everything `Load` checks plus
    /// semantic consistency between fields
    Save,
}

impl fmt::Display for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationContext::Load => f.write_str("load"),
            ValidationContext::Save => f.write_str("save"),
        }
    }
}

/// A single validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Document version differs from the version this build writes
    UnsupportedVersion { found: u32, expected: u32 },
    /// Missing or empty required field
    MissingRequired { field: &'static str },
    /// Field holds a value the schema does not allow
    InvalidValue { field: &'static str, message: String },
    /// A field is required because of another field's value
    RequiredFor {
        field: &'static str,
        because: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnsupportedVersion { found, expected } => {
                write!(f, "unsupported version {} (expected {})", found, expected)
            }
            ValidationError::MissingRequired { field } => {
                write!(f, "missing required field '{}'", field)
            }
            ValidationError::InvalidValue { field, message } => {
                write!(f, "invalid value for '{}': {}", field, message)
            }
            ValidationError::RequiredFor { field, because } => {
                write!(f, "field '{}' is required when {}", field, because)
            }
        }
    }
}

/// Collection of validation errors
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    pub context: Option<ValidationContext>,
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new(context: ValidationContext, errors: Vec<ValidationError>) -> Self {
        Self {
            context: Some(context),
            errors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.context {
            Some(ctx) => write!(
                f,
                "{} validation failed with {} error(s)",
                ctx,
                self.errors.len()
            )?,
            None => write!(f, "validation failed with {} error(s)", self.errors.len())?,
        }
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n  {}: {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Push `MissingRequired` when `value` is empty or whitespace
pub(crate) fn require(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::MissingRequired { field });
    }
}

/// Push `UnsupportedVersion` when `found` is not `expected`
pub(crate) fn require_version(errors: &mut Vec<ValidationError>, found: u32, expected: u32) {
    if found != expected {
        errors.push(ValidationError::UnsupportedVersion { found, expected });
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
