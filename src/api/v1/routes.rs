/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /auth 配下, /admin 配下 を route
 * - 認証 middleware は app.rs 側で v1 全体に掛ける (ここでは route のみ)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    admin::whoami,
    auth::{login, me, refresh, register},
    health::health,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
        .route("/admin/whoami", get(whoami))
}
