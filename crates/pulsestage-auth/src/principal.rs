//! Authenticated identities and the bootstrap admin key.

use serde::Serialize;
use sha2::{Digest, Sha256};

use pulsestage_core::types::id::{TenantId, UserId};

/// Who is making the request, once authentication has succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Principal {
    /// Holder of the tenant's bootstrap admin key. Not a role: it bypasses
    /// team checks for setup work, but not the last-owner rule.
    Bootstrap { tenant: TenantId },
    /// A signed-in user.
    Member { user: UserId, tenant: TenantId },
}

impl Principal {
    /// The tenant the identity was established in.
    pub fn tenant(&self) -> TenantId {
        match self {
            Self::Bootstrap { tenant } | Self::Member { tenant, .. } => *tenant,
        }
    }

    /// The user, for member principals.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Bootstrap { .. } => None,
            Self::Member { user, .. } => Some(*user),
        }
    }

    pub fn is_bootstrap(&self) -> bool {
        matches!(self, Self::Bootstrap { .. })
    }
}

/// The configured bootstrap key, held as a SHA-256 digest.
#[derive(Clone)]
pub struct AdminKey {
    digest: [u8; 32],
}

impl AdminKey {
    pub fn new(key: &str) -> Self {
        Self {
            digest: Sha256::digest(key.as_bytes()).into(),
        }
    }

    /// Compare a presented key in constant time.
    pub fn verify(&self, presented: &str) -> bool {
        let presented: [u8; 32] = Sha256::digest(presented.as_bytes()).into();
        constant_time_eq(&self.digest, &presented)
    }
}

impl std::fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminKey(****)")
    }
}

/// Byte comparison whose running time depends only on the lengths.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
