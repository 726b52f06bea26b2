//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every write path enforces the same rules.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

/// Lowercase, accent-free, single-spaced key used for search and uniqueness.
///
/// `"  Placa  de Yeso ÁGUA "` becomes `"placa de yeso agua"`.
pub fn normalize_search_key(value: &str) -> String {
    let stripped: String = value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim `value` and require at least `min_chars` characters.
pub(crate) fn require_text(value: &str, min_chars: usize, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!("{label} must not be empty")));
    }
    if trimmed.chars().count() < min_chars {
        return Err(EngineError::InvalidName(format!(
            "{label} must be at least {min_chars} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Accepts `None`/blank, otherwise requires a `local@domain.tld` shape.
pub(crate) fn optional_email(value: Option<&str>) -> ResultEngine<Option<String>> {
    let Some(email) = optional_text(value) else {
        return Ok(None);
    };
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(EngineError::InvalidInput(format!("invalid email: {email}")));
    }
    Ok(Some(email))
}

pub(crate) fn require_positive(value: f64, label: &str) -> ResultEngine<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EngineError::InvalidAmount(format!("{label} must be > 0")));
    }
    Ok(value)
}

pub(crate) fn require_non_negative(value: f64, label: &str) -> ResultEngine<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::InvalidAmount(format!("{label} must be >= 0")));
    }
    Ok(value)
}

pub(crate) fn require_percentage(value: f64, label: &str) -> ResultEngine<f64> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(EngineError::InvalidAmount(format!(
            "{label} must be between 0 and 100"
        )));
    }
    Ok(value)
}
