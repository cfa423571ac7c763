//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Session token, bootstrap credential, and CSRF configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for session JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Session token TTL in minutes.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_minutes: u64,
    /// Bootstrap admin key. When unset the bootstrap path is disabled.
    #[serde(default)]
    pub admin_key: Option<String>,
    /// Header carrying the bootstrap admin key.
    #[serde(default = "default_admin_key_header")]
    pub admin_key_header: String,
    /// Cookie carrying the session token.
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
    /// Whether cookie-authenticated mutating requests must pass a CSRF check.
    #[serde(default = "default_true")]
    pub csrf_enabled: bool,
    /// Cookie carrying the CSRF token.
    #[serde(default = "default_csrf_cookie")]
    pub csrf_cookie: String,
    /// Header that must echo the CSRF cookie.
    #[serde(default = "default_csrf_header")]
    pub csrf_header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            session_ttl_minutes: default_session_ttl(),
            admin_key: None,
            admin_key_header: default_admin_key_header(),
            session_cookie: default_session_cookie(),
            csrf_enabled: default_true(),
            csrf_cookie: default_csrf_cookie(),
            csrf_header: default_csrf_header(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_session_ttl() -> u64 {
    8 * 60
}

fn default_admin_key_header() -> String {
    "x-admin-key".to_string()
}

fn default_session_cookie() -> String {
    "pulsestage_session".to_string()
}

fn default_true() -> bool {
    true
}

fn default_csrf_cookie() -> String {
    "pulsestage_csrf".to_string()
}

fn default_csrf_header() -> String {
    "x-csrf-token".to_string()
}
