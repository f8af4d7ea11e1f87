/*
 * Responsibility
 * - GET /health (疎通用)
 * - 認証は不要。token が付いていれば middleware を通った結果 (authenticated) も返す
 */
use axum::{Json, extract::Request, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::api::v1::extractors::AuthCtx;

pub async fn health(req: Request) -> impl IntoResponse {
    let authenticated = req.extensions().get::<AuthCtx>().is_some();
    (
        StatusCode::OK,
        Json(json!({"status": "ok", "authenticated": authenticated})),
    )
}
