//! Validation Utilities
//!
//! Glue between `validator` derive output and [`AppError`].

use validator::ValidationErrors;

use super::error::{AppError, FieldError};

/// Flatten validation errors into one entry per failed rule, ordered by field.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// Convert validation errors to a single 400 response
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let message = field_errors(&errors)
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    if message.is_empty() {
        AppError::Validation("Validation failed".into())
    } else {
        AppError::Validation(message)
    }
}
