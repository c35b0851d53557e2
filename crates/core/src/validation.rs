//! Input validation helpers.
//!
//! DTOs derive [`validator::Validate`]; handlers call [`validate_input`] to
//! turn the collected field errors into a single [`CoreError::Validation`].

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::CoreError;

/// Run `validator` rules and map failures to [`CoreError::Validation`].
pub fn validate_input<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|errors| CoreError::Validation(describe(&errors)))
}

/// Flatten validation errors into `field: message` pairs, sorted by field.
fn describe(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .errors()
        .iter()
        .flat_map(|(field, kind)| match kind {
            ValidationErrorsKind::Field(errs) => errs
                .iter()
                .map(|e| match &e.message {
                    Some(msg) => format!("{field}: {msg}"),
                    None => format!("{field}: invalid ({})", e.code),
                })
                .collect::<Vec<_>>(),
            ValidationErrorsKind::Struct(inner) => vec![format!("{field}: {}", describe(inner))],
            ValidationErrorsKind::List(_) => vec![format!("{field}: invalid list")],
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

/// Reject strings that are empty after trimming.
pub fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Reject strings containing control characters (names and titles are
/// single-line display text).
pub fn no_control_chars(value: &str) -> Result<(), validator::ValidationError> {
    if value.chars().any(char::is_control) {
        let mut err = validator::ValidationError::new("control_chars");
        err.message = Some("must not contain control characters".into());
        return Err(err);
    }
    Ok(())
}

/// Names and titles: not blank and free of control characters.
pub fn display_text(value: &str) -> Result<(), validator::ValidationError> {
    not_blank(value)?;
    no_control_chars(value)
}
