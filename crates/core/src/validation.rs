//! Field-level violation reporting shared by processors and definition settings.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A single field-level rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Dotted path of the offending field, e.g. `p1.entries[0].from_key`.
    pub field: String,
    pub rule_type: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(
        field: impl Into<String>,
        rule_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            rule_type: rule_type.into(),
            message: message.into(),
        }
    }
}

/// Aggregated result of validating a document before serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<FieldViolation>,
}

impl ValidationReport {
    pub fn from_violations(errors: Vec<FieldViolation>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Convert a failing report into a [`CoreError::Validation`].
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_valid {
            return Ok(());
        }
        let joined = self
            .errors
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect::<Vec<_>>()
            .join("; ");
        Err(CoreError::Validation(joined))
    }
}

/// Flatten `validator` derive errors into [`FieldViolation`]s under `prefix`.
pub fn from_validation_errors(
    prefix: &str,
    errors: &validator::ValidationErrors,
) -> Vec<FieldViolation> {
    let mut out: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {field}"));
                FieldViolation::new(format!("{prefix}.{field}"), e.code.to_string(), message)
            })
        })
        .collect();
    // field_errors() iterates a HashMap.
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}
