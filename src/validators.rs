use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

pub const MAX_PRICE: f64 = 1_000_000.0;

/// Invalid user input, tied to the query parameter that carried it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub field: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: field.into(),
        }
    }
}

fn dangerous_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)<script|javascript:|onclick=|onerror=").expect("static pattern compiles")
    })
}

/// Validate and trim search keywords.
pub fn validate_keywords(
    keywords: Option<&str>,
    min_length: usize,
    max_length: usize,
) -> Result<String, ValidationError> {
    let keywords = keywords
        .ok_or_else(|| ValidationError::new("Missing required parameter: q", "q"))?
        .trim();

    let length = keywords.chars().count();

    if length < min_length.max(1) {
        return Err(ValidationError::new("Search keywords cannot be empty", "q"));
    }

    if length > max_length {
        return Err(ValidationError::new(
            format!(
                "Search keywords exceed maximum length of {} characters",
                max_length
            ),
            "q",
        ));
    }

    if dangerous_pattern().is_match(keywords) {
        return Err(ValidationError::new("Invalid characters in search keywords", "q"));
    }

    Ok(keywords.to_string())
}

/// Parse an optional price filter. Blank values are treated as absent.
pub fn validate_price(value: Option<&str>, field: &str) -> Result<Option<f64>, ValidationError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let price: f64 = raw
        .parse()
        .ok()
        .filter(|p: &f64| p.is_finite())
        .ok_or_else(|| ValidationError::new(format!("{} must be a number", field), field))?;

    if price < 0.0 {
        return Err(ValidationError::new(format!("{} must be at least 0", field), field));
    }

    if price > MAX_PRICE {
        return Err(ValidationError::new(
            format!("{} cannot exceed {}", field, MAX_PRICE),
            field,
        ));
    }

    Ok(Some(price))
}

/// Parse an optional vocabulary value (condition or sort).
pub fn validate_choice<T: std::str::FromStr>(
    value: Option<&str>,
    field: &str,
) -> Result<Option<T>, ValidationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ValidationError::new(format!("Invalid {}: {}", field, raw), field)),
    }
}
