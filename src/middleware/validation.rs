use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Validation error: {0}")]
    InvalidInput(String),
}

impl From<ValidationError> for AppError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::InvalidInput(msg) => AppError::InvalidInput(msg),
        }
    }
}

/// Validate a deserialized request body, flattening field errors into one message
pub fn validate_payload<T: Validate>(value: &T) -> Result<(), ValidationError> {
    value
        .validate()
        .map_err(|e| ValidationError::InvalidInput(format!("Validation failed: {}", describe(&e))))
}

fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect();
    fields.sort();
    fields.join("; ")
}
