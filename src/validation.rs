use serde_json::Value;
use validator::ValidateEmail;

use crate::error::AppError;

pub const MAX_STRING_CHARS: usize = 255;

fn label(field: &str) -> String {
    field.replace('_', " ")
}

/// A present, non-blank string of at most 255 characters, returned trimmed.
pub fn required_string(field: &'static str, value: Option<&Value>) -> Result<String, AppError> {
    let text = match value {
        None | Some(Value::Null) => return Err(required(field)),
        Some(Value::String(text)) => text.trim(),
        Some(_) => {
            return Err(AppError::validation(
                field,
                format!("The {} field must be a string.", label(field)),
            ));
        }
    };

    if text.is_empty() {
        return Err(required(field));
    }
    if text.chars().count() > MAX_STRING_CHARS {
        return Err(AppError::validation(
            field,
            format!(
                "The {} field must not be greater than {MAX_STRING_CHARS} characters.",
                label(field)
            ),
        ));
    }
    Ok(text.to_string())
}

pub fn required_email(field: &'static str, value: Option<&Value>) -> Result<String, AppError> {
    let email = required_string(field, value)?;
    if !email.validate_email() {
        return Err(AppError::validation(
            field,
            format!("The {} field must be a valid email address.", label(field)),
        ));
    }
    Ok(email)
}

/// Integers may arrive as JSON numbers or numeric strings, as form posts send them.
pub fn required_integer(field: &'static str, value: Option<&Value>) -> Result<i64, AppError> {
    let not_integer = || {
        AppError::validation(
            field,
            format!("The {} field must be an integer.", label(field)),
        )
    };

    match value {
        None | Some(Value::Null) => Err(required(field)),
        Some(Value::Number(number)) => number.as_i64().ok_or_else(not_integer),
        Some(Value::String(text)) if text.trim().is_empty() => Err(required(field)),
        Some(Value::String(text)) => text.trim().parse::<i64>().map_err(|_| not_integer()),
        Some(_) => Err(not_integer()),
    }
}

pub fn required(field: &'static str) -> AppError {
    AppError::validation(field, format!("The {} field is required.", label(field)))
}
