//! Field-level and form-level validators.
//!
//! Each validator returns `Ok(())` or a `KurasiError::Validation` carrying a
//! message ready to show next to the field. Text checks run on the trimmed
//! value and count characters, not bytes.

use crate::error::{KurasiError, Result};

pub fn validate_required(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(KurasiError::validation(format!("{} is required", field)));
    }
    Ok(())
}

pub fn validate_min_length(value: &str, min: usize, field: &str) -> Result<()> {
    if value.trim().chars().count() < min {
        return Err(KurasiError::validation(format!(
            "{} must be at least {} characters",
            field, min
        )));
    }
    Ok(())
}

pub fn validate_max_length(value: &str, max: usize, field: &str) -> Result<()> {
    if value.trim().chars().count() > max {
        return Err(KurasiError::validation(format!(
            "{} must be less than {} characters",
            field, max
        )));
    }
    Ok(())
}

/// Rejects zero, negatives and NaN.
pub fn validate_positive_number(value: f64, field: &str) -> Result<()> {
    if value.is_nan() || value <= 0.0 {
        return Err(KurasiError::validation(format!(
            "{} must be a positive number",
            field
        )));
    }
    Ok(())
}

/// Case-insensitive uniqueness check of `new_value` against `items`.
///
/// # Arguments
///
/// * `items` - Existing entities
/// * `get_value` - Extracts the compared field from an entity
/// * `new_value` - Candidate value
/// * `field` - Field label used in the message
pub fn validate_no_duplicate<T, F>(items: &[T], get_value: F, new_value: &str, field: &str) -> Result<()>
where
    F: Fn(&T) -> &str,
{
    let candidate = new_value.to_lowercase();
    if items.iter().any(|item| get_value(item).to_lowercase() == candidate) {
        return Err(KurasiError::validation(format!(
            "A {} with this value already exists",
            field
        )));
    }
    Ok(())
}

/// Returns the first failure among `results`, or `Ok(())`.
pub fn validate_all<I>(results: I) -> Result<()>
where
    I: IntoIterator<Item = Result<()>>,
{
    results.into_iter().collect()
}
