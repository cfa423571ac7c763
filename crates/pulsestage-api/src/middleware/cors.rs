//! CORS layer configuration.

use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use pulsestage_core::config::{AuthConfig, CorsConfig};

/// Builds a CORS tower layer from configuration.
///
/// Session cookies ride on cross-origin requests, so credentials are
/// allowed and origins are always listed explicitly.
pub fn build_cors_layer(config: &CorsConfig, auth: &AuthConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| o.parse().ok())
        .collect();

    let mut headers = vec![header::AUTHORIZATION, header::CONTENT_TYPE];
    for name in [&auth.csrf_header, &auth.admin_key_header] {
        if let Ok(name) = HeaderName::try_from(name.as_str()) {
            headers.push(name);
        }
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(headers)
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(config.max_age_seconds))
}
