//! Validation module for user-supplied inputs
//!
//! Raw meal text, user ids and calorie targets are checked here before they reach
//! the pipeline or the log store.

use crate::errors::{AppError, AppResult};

/// Default upper bound on meal text length, in characters
pub const DEFAULT_MAX_MEAL_TEXT_CHARS: usize = 1000;

/// Validates raw meal text
///
/// # Returns
/// * `Ok(&str)` - The trimmed text if valid
/// * `Err(&str)` - Error type: "empty" or "too_long"
///
/// # Examples
/// ```
/// use physique_needs::validation::validate_meal_text;
///
/// assert_eq!(validate_meal_text("  2 idlis ", 100), Ok("2 idlis"));
/// assert_eq!(validate_meal_text("   ", 100), Err("empty"));
/// assert_eq!(validate_meal_text(&"a".repeat(101), 100), Err("too_long"));
/// ```
pub fn validate_meal_text(text: &str, max_chars: usize) -> Result<&str, &'static str> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    if trimmed.chars().count() > max_chars {
        return Err("too_long");
    }

    Ok(trimmed)
}

/// Validates a user id coming from the caller
pub fn validate_user_id(user_id: i64) -> AppResult<i64> {
    if user_id <= 0 {
        return Err(AppError::Validation(format!(
            "user_id must be positive, got {}",
            user_id
        )));
    }
    Ok(user_id)
}

/// Validates a daily calorie target
///
/// # Examples
/// ```
/// use physique_needs::validation::validate_calorie_target;
///
/// assert!(validate_calorie_target(2000.0).is_ok());
/// assert!(validate_calorie_target(0.0).is_err());
/// assert!(validate_calorie_target(f64::NAN).is_err());
/// ```
pub fn validate_calorie_target(target: f64) -> AppResult<f64> {
    if !target.is_finite() || target <= 0.0 {
        return Err(AppError::Validation(
            "Target calories must be greater than zero".to_string(),
        ));
    }
    if target > 20000.0 {
        return Err(AppError::Validation(
            "Target calories cannot exceed 20000".to_string(),
        ));
    }
    Ok(target)
}
