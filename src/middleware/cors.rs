//! CORS policy for the browser storefront.
//!
//! - Development: any origin, no credentials.
//! - Production: exact-match allowlist from `CORS_ALLOWED_ORIGINS`. An empty
//!   allowlist allows no cross-origin callers at all.
//!
//! Only `Authorization` and `Content-Type` request headers are allowed; the
//! bearer token is the sole credential, so cookies are never enabled.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;

pub fn layer(config: &Config) -> CorsLayer {
    let cors = if config.app_env.is_production() {
        let allowed: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter(|s| s.as_str() != "*")
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        CorsLayer::new().allow_origin(AllowOrigin::list(allowed))
    } else {
        CorsLayer::new().allow_origin(Any)
    };

    cors.allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ])
    .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
    .max_age(Duration::from_secs(60 * 10))
}

pub fn apply(router: Router, config: &Config) -> Router {
    router.layer(layer(config))
}
