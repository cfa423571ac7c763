//! Session token validation.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use pulsestage_core::AppError;
use pulsestage_core::config::AuthConfig;
use pulsestage_core::error::codes::NOT_AUTHENTICATED;
use pulsestage_core::result::AppResult;

use super::claims::Claims;

/// Verifies session token signatures and expiry.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decode and validate a token.
    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let message = match e.kind() {
                    JwtErrorKind::ExpiredSignature => "Session has expired".to_string(),
                    JwtErrorKind::InvalidSignature => "Invalid session signature".to_string(),
                    JwtErrorKind::InvalidToken => "Invalid session token".to_string(),
                    _ => format!("Session validation failed: {e}"),
                };
                AppError::authentication(message).with_code(NOT_AUTHENTICATED)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtEncoder;
    use pulsestage_core::types::id::{TenantId, UserId};

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_issued_token_decodes_to_same_identity() {
        let cfg = config("test-secret");
        let (user, tenant) = (UserId::new(), TenantId::new());
        let issued = JwtEncoder::new(&cfg).issue(user, tenant).unwrap();
        let claims = JwtDecoder::new(&cfg).decode(&issued.token).unwrap();
        assert_eq!(claims.user_id(), user);
        assert_eq!(claims.tenant_id(), tenant);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issued = JwtEncoder::new(&config("one"))
            .issue(UserId::new(), TenantId::new())
            .unwrap();
        let err = JwtDecoder::new(&config("two")).decode(&issued.token).unwrap_err();
        assert_eq!(err.code, Some(NOT_AUTHENTICATED));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(JwtDecoder::new(&config("x")).decode("not-a-token").is_err());
    }
}
