//! Claims carried by a session token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pulsestage_core::types::id::{TenantId, UserId};

use crate::principal::Principal;

/// Payload of a PulseStage session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user ID.
    pub sub: UserId,
    /// The tenant the session was opened in.
    pub tenant: TenantId,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    /// Token ID.
    pub jti: Uuid,
}

impl Claims {
    pub fn user_id(&self) -> UserId {
        self.sub
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant
    }

    /// The identity these claims establish.
    pub fn principal(&self) -> Principal {
        Principal::Member {
            user: self.sub,
            tenant: self.tenant,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
