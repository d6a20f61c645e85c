//! Custom validation functions for configuration.
//!
//! Shared validation logic used across multiple configuration modules.

use validator::ValidationError;

/// Validate that an interface name follows Linux naming conventions.
pub fn validate_interface(name: &str) -> Result<(), ValidationError> {
    let valid = !name.is_empty()
        && name.len() <= 15
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_interface"))
    }
}

/// Validate a band selector string.
pub fn validate_band(band: &str) -> Result<(), ValidationError> {
    let re =
        regex::Regex::new("^(2g|5g)$").map_err(|_| ValidationError::new("invalid_regex"))?;
    if re.is_match(band) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_band"))
    }
}

/// Validate a vendor OUI given as six hex digits.
pub fn validate_oui(oui: &str) -> Result<(), ValidationError> {
    let re = regex::Regex::new("^[0-9a-fA-F]{6}$")
        .map_err(|_| ValidationError::new("invalid_regex"))?;
    if re.is_match(oui) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_oui"))
    }
}

/// Validate a log level string.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid = ["trace", "debug", "info", "warn", "error"]
        .contains(&level.to_lowercase().as_str());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

/// Validate a log format string.
pub fn validate_log_format(format: &str) -> Result<(), ValidationError> {
    let valid = ["text", "json"].contains(&format.to_lowercase().as_str());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_format"))
    }
}

/// Validate that every channel in a plan sits inside some band.
pub fn validate_channel_plan(channels: &[u8]) -> Result<(), ValidationError> {
    let known = |c: &u8| matches!(c, 1..=14 | 36..=64 | 100..=144 | 149..=177);
    if channels.iter().all(known) {
        Ok(())
    } else {
        Err(ValidationError::new("unknown_channel"))
    }
}
