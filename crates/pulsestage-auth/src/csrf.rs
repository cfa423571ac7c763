//! Double-submit CSRF tokens.
//!
//! The token is set as a readable cookie at login; cookie-authenticated
//! mutating requests must echo it in a header.

use uuid::Uuid;

use pulsestage_core::AppError;
use pulsestage_core::error::codes::CSRF_MISMATCH;
use pulsestage_core::result::AppResult;

use crate::principal::constant_time_eq;

/// A fresh 64-hex-character token.
pub fn generate_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Check that the header echoes the cookie.
pub fn verify(cookie: Option<&str>, header: Option<&str>) -> AppResult<()> {
    match (cookie, header) {
        (Some(cookie), Some(header))
            if !cookie.is_empty() && constant_time_eq(cookie.as_bytes(), header.as_bytes()) =>
        {
            Ok(())
        }
        _ => Err(AppError::authorization("CSRF token missing or invalid").with_code(CSRF_MISMATCH)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique_hex() {
        let a = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, generate_token());
    }

    #[test]
    fn test_verify() {
        let token = generate_token();
        assert!(verify(Some(&token), Some(&token)).is_ok());
        assert!(verify(Some(&token), Some("nope")).is_err());
        assert!(verify(Some(&token), None).is_err());
        assert!(verify(None, None).is_err());
        assert!(verify(Some(""), Some("")).is_err());
    }
}
