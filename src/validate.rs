//! Submission validation
//!
//! Rejects malformed feedback before it reaches storage. The validator is
//! a pure function over the raw JSON body: fields may be missing,
//! wrong-typed, or empty, and exactly one specific error is produced per
//! failure. On success it returns a normalized submission with trimmed
//! text fields and the rating coerced to an integer.

use crate::types::NewFeedback;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Accepted email shape: local@domain.tld, no whitespace, one dot after the @
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

/// Reasons a submission is rejected
///
/// The Display strings are surfaced verbatim to clients in 400 responses.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// name, email, or message absent / empty after trimming, or rating absent
    #[error("All fields are required")]
    MissingField,

    /// Email present but not matching the accepted pattern
    #[error("Invalid email format")]
    InvalidEmail,

    /// Rating present but not an integer in [1, 5]
    #[error("Rating must be an integer between 1 and 5")]
    InvalidRating,
}

/// Validate a raw submission body and normalize it for insertion
///
/// Checks run in a fixed order so each failure yields one specific error:
/// missing fields first, then email format, then rating range.
pub fn validate_submission(payload: &Value) -> Result<NewFeedback, ValidationError> {
    let name = trimmed_text(payload, "name").ok_or(ValidationError::MissingField)?;
    let email = trimmed_text(payload, "email").ok_or(ValidationError::MissingField)?;
    let message = trimmed_text(payload, "message").ok_or(ValidationError::MissingField)?;

    let rating_value = match payload.get("rating") {
        Some(Value::Null) | None => return Err(ValidationError::MissingField),
        Some(value) => value,
    };

    if !EMAIL_RE.is_match(&email) {
        return Err(ValidationError::InvalidEmail);
    }

    let rating = coerce_rating(rating_value).ok_or(ValidationError::InvalidRating)?;
    if !(1..=5).contains(&rating) {
        return Err(ValidationError::InvalidRating);
    }

    Ok(NewFeedback {
        name,
        email,
        message,
        rating,
    })
}

/// Extract a string field, trimmed; None if absent, wrong-typed, or empty
fn trimmed_text(payload: &Value, field: &str) -> Option<String> {
    let text = payload.get(field)?.as_str()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Coerce a JSON value to an integer rating
///
/// Accepts integers, floats (truncated toward zero), and numeric strings.
fn coerce_rating(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}
