//! Field-level input contracts shared by the list and task mutation
//! endpoints.
//!
//! Each function checks one field and either passes the parsed value through
//! or fails with a `BadRequest`. They are plain functions rather than
//! `validator` derives because the rules here need trimming semantics, a
//! database lookup, and a boolean coercion set.

use crate::error::AppError;
use crate::models::Priority;
use chrono::NaiveDate;
use serde_json::Value;
use sqlx::PgPool;

pub const TITLE_MIN_LENGTH: usize = 3;
pub const TITLE_MAX_LENGTH: usize = 150;
pub const DESCRIPTION_MAX_LENGTH: usize = 500;

/// Validates an optional title. An absent or all-whitespace title yields
/// `None`; a present one is trimmed and bounds-checked.
pub fn validate_optional_title(title: Option<&str>) -> Result<Option<String>, AppError> {
    let trimmed = match title.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return Ok(None),
    };

    let len = trimmed.chars().count();
    if !(TITLE_MIN_LENGTH..=TITLE_MAX_LENGTH).contains(&len) {
        return Err(AppError::BadRequest(format!(
            "Title must be between {} and {} characters",
            TITLE_MIN_LENGTH, TITLE_MAX_LENGTH
        )));
    }

    Ok(Some(trimmed.to_string()))
}

/// Validates a required title.
pub fn validate_title(title: Option<&str>) -> Result<String, AppError> {
    validate_optional_title(title)?
        .ok_or_else(|| AppError::BadRequest("Title is required".to_string()))
}

/// Validates an optional description. Empty-after-trim counts as absent.
pub fn validate_description(description: Option<&str>) -> Result<Option<String>, AppError> {
    let trimmed = match description.map(str::trim) {
        Some(d) if !d.is_empty() => d,
        _ => return Ok(None),
    };

    if trimmed.chars().count() > DESCRIPTION_MAX_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Description must be less than {} characters",
            DESCRIPTION_MAX_LENGTH
        )));
    }

    Ok(Some(trimmed.to_string()))
}

/// Validates that a priority id, when present, references an existing
/// priority row.
pub async fn validate_priority_id(
    pool: &PgPool,
    priority_id: Option<i32>,
) -> Result<(), AppError> {
    let priority_id = match priority_id {
        Some(id) => id,
        None => return Ok(()),
    };

    match Priority::find_by_id(pool, priority_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::BadRequest("Invalid priority ID".to_string())),
    }
}

/// Parses an optional due date in `YYYY-MM-DD` form.
pub fn validate_due_date(due_date: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    let raw = match due_date {
        Some(d) if !d.trim().is_empty() => d.trim(),
        _ => return Ok(None),
    };

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(Some).map_err(|_| {
        AppError::BadRequest("Due date must be a valid date (YYYY-MM-DD)".to_string())
    })
}

/// Checks that an `is_completed` value belongs to the accepted set
/// {true, false, "true", "false", 1, 0, "1", "0"}.
pub fn validate_is_completed(value: &Value) -> Result<(), AppError> {
    let accepted = match value {
        Value::Bool(_) => true,
        Value::Number(n) => matches!(n.as_i64(), Some(0) | Some(1)),
        Value::String(s) => matches!(s.as_str(), "true" | "false" | "0" | "1"),
        _ => false,
    };

    if accepted {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "is_completed must be a boolean value".to_string(),
        ))
    }
}

/// Coerces an accepted `is_completed` value to a boolean. Truthy forms are
/// `true`, `"true"`, `1` and `"1"`; everything else in the accepted set is
/// false. Call [`validate_is_completed`] first.
pub fn parse_is_completed(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(s.as_str(), "true" | "1"),
        _ => false,
    }
}
