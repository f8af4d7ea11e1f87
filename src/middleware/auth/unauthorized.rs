//! 401 response for requests that could not be authenticated.
//!
//! Body is always `{"error": "<message>"}` with one of the fixed messages of
//! [`Rejection::message`]; token and key material never appear in it.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::services::auth::Rejection;

const PREVIEW_PREFIX: usize = 10;
const PREVIEW_SUFFIX: usize = 10;

#[derive(Debug, Serialize)]
struct UnauthorizedBody {
    error: &'static str,
}

pub fn respond(rejection: Rejection) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(UnauthorizedBody {
            error: rejection.message(),
        }),
    )
        .into_response()
}

/// `first10....last10`; anything too short to split safely becomes `****`.
pub fn mask_token(token: &str) -> String {
    let token = token.trim();
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= PREVIEW_PREFIX + PREVIEW_SUFFIX {
        return "****".to_string();
    }

    let head: String = chars[..PREVIEW_PREFIX].iter().collect();
    let tail: String = chars[chars.len() - PREVIEW_SUFFIX..].iter().collect();
    format!("{head}....{tail}")
}

/// Masked preview of an `Authorization` header value, `none` when absent.
pub fn mask_header_token(header: Option<&str>) -> String {
    match header {
        None => "none".to_string(),
        Some(value) => {
            let token = match value.get(..7) {
                Some(scheme) if scheme.eq_ignore_ascii_case("bearer ") => &value[7..],
                _ => value,
            };
            mask_token(token)
        }
    }
}
