// netvakt-config/src/validation.rs
//! Custom validation functions for configuration.
//!
//! Shared validation logic used across configuration modules.

use validator::ValidationError;

/// Validate that an interface name follows Linux naming conventions.
/// "any" is accepted as the capture tool's pseudo-interface.
pub fn validate_interface(name: &str) -> Result<(), ValidationError> {
    let valid = !name.is_empty()
        && name.len() <= 15
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_interface"))
    }
}

/// Validate an http(s) endpoint URL without pulling in a URL parser.
pub fn validate_endpoint(url: &str) -> Result<(), ValidationError> {
    let re = regex::Regex::new("^https?://[^\\s]+$")
        .map_err(|_| ValidationError::new("invalid_regex"))?;
    if re.is_match(url) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_endpoint"))
    }
}
