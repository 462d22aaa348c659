use anyhow::{anyhow, Result};
use regex::Regex;
use std::sync::OnceLock;

fn email_pattern() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
}

/// Emails are compared and stored lowercase
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Email validation
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(anyhow!("Email cannot be empty"));
    }

    if email.len() > 255 {
        return Err(anyhow!("Email cannot be longer than 255 characters"));
    }

    match email_pattern() {
        Some(pattern) if pattern.is_match(email) => Ok(()),
        _ => Err(anyhow!("Invalid email format")),
    }
}

/// Display names and titles
pub fn validate_name(field: &str, value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{} cannot be empty", field));
    }

    if trimmed.chars().count() > 120 {
        return Err(anyhow!("{} cannot be longer than 120 characters", field));
    }

    Ok(())
}

/// Three-letter ISO 4217 style code, e.g. `USD`
pub fn validate_currency(currency: &str) -> Result<()> {
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(anyhow!("Currency must be a three-letter uppercase code"));
    }

    Ok(())
}

pub fn validate_positive(field: &str, value: i32) -> Result<()> {
    if value < 1 {
        return Err(anyhow!("{} must be at least 1", field));
    }

    Ok(())
}

pub fn validate_non_negative(field: &str, value: i64) -> Result<()> {
    if value < 0 {
        return Err(anyhow!("{} cannot be negative", field));
    }

    Ok(())
}
