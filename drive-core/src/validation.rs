use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

/// One human-readable problem with one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// Flatten `validator` output into one message per field, in form order.
///
/// Only the first failing rule of a field is reported.
pub fn collect_field_errors(errors: &ValidationErrors, field_order: &[&str]) -> Vec<FieldError> {
    let by_field = errors.field_errors();
    let mut out = Vec::new();

    for field in field_order {
        let Some(list) = by_field.get(*field) else { continue };
        let Some(first) = list.first() else { continue };
        let message = first
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("{} is invalid.", field));
        out.push(FieldError::new(*field, message));
    }

    out
}
