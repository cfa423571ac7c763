//! The tenant boundary threaded through every persistence call.

use std::fmt;

use serde::Serialize;

use super::id::TenantId;

/// The resolved tenant of the current request.
///
/// Every store method takes a `TenantScope` (directly or inside a
/// [`QueryPredicate`](super::QueryPredicate)); there is no variant of any
/// query that omits it. It is deliberately not `Deserialize`: a scope comes
/// from tenant resolution, never from request input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TenantScope {
    tenant_id: TenantId,
}

impl TenantScope {
    /// Scope all subsequent work to `tenant_id`.
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }

    /// The tenant this scope is bound to.
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Whether a row owned by `tenant_id` is visible in this scope.
    pub fn contains(&self, tenant_id: TenantId) -> bool {
        self.tenant_id == tenant_id
    }
}

impl fmt::Display for TenantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tenant:{}", self.tenant_id)
    }
}
