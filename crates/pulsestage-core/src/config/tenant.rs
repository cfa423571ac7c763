//! Tenant resolution configuration.

use serde::{Deserialize, Serialize};

/// How the active tenant is derived from an incoming request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Base domain; `acme.<base_domain>` resolves to tenant slug `acme`.
    #[serde(default = "default_base_domain")]
    pub base_domain: String,
    /// Accept an explicit tenant header. Development and test only.
    #[serde(default)]
    pub allow_header_override: bool,
    /// Header carrying the tenant slug when overrides are allowed.
    #[serde(default = "default_header_name")]
    pub header_name: String,
    /// Slug used when neither subdomain nor header names a tenant.
    #[serde(default)]
    pub default_slug: Option<String>,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            base_domain: default_base_domain(),
            allow_header_override: false,
            header_name: default_header_name(),
            default_slug: None,
        }
    }
}

fn default_base_domain() -> String {
    "pulsestage.app".to_string()
}

fn default_header_name() -> String {
    "x-tenant-id".to_string()
}
