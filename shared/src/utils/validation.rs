//! Input validation helpers shared by service entry points

use super::email::is_valid_email;

/// Check if a string is not blank
pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Validate an identity, returning the normalized address
pub fn validate_identity(email: &str) -> Result<String, &'static str> {
    if !not_blank(email) {
        return Err("email is required");
    }
    if !is_valid_email(email) {
        return Err("email is malformed");
    }
    Ok(email.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("x"));
        assert!(!not_blank("   "));
    }

    #[test]
    fn test_validate_identity() {
        assert_eq!(validate_identity(" a@x.com ").unwrap(), "a@x.com");
        assert_eq!(validate_identity("").unwrap_err(), "email is required");
        assert_eq!(validate_identity("nope").unwrap_err(), "email is malformed");
    }
}
