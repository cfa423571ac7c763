//! Session token creation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Serialize;
use uuid::Uuid;

use pulsestage_core::AppError;
use pulsestage_core::config::AuthConfig;
use pulsestage_core::result::AppResult;
use pulsestage_core::types::id::{TenantId, UserId};

use super::claims::Claims;

/// Signs session tokens with HMAC-SHA256.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    ttl_minutes: i64,
}

/// A freshly signed token.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

impl JwtEncoder {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_minutes: i64::try_from(config.session_ttl_minutes).unwrap_or(i64::MAX / 60),
        }
    }

    /// Issue a session token for `user` in `tenant`.
    pub fn issue(&self, user: UserId, tenant: TenantId) -> AppResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + Duration::minutes(self.ttl_minutes);
        let claims = Claims {
            sub: user,
            tenant,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode session token: {e}")))?;
        Ok(IssuedToken { token, expires_at })
    }
}
