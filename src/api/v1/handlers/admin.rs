use axum::Json;
use serde_json::{Value, json};

use crate::api::v1::extractors::AuthCtxExtractor;
use crate::error::AppError;
use crate::services::auth::identity::Role;

/// GET /admin/whoami (ROLE_ADMIN only)
pub async fn whoami(AuthCtxExtractor(auth): AuthCtxExtractor) -> Result<Json<Value>, AppError> {
    if !auth.has_authority(&Role::Admin.authority()) {
        return Err(AppError::Forbidden);
    }

    Ok(Json(json!({
        "subject": auth.subject(),
        "authorities": auth.authorities,
    })))
}
