/*
 * Responsibility
 * - /auth 系 handler (register / login / refresh / me)
 * - DTO validation → service 呼び出し → DTO に詰め替え
 * - refresh は body で token を受け取る (期限切れ token を Authorization に載せると middleware で 401 になるため)
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::auth::{
            AuthResponse, LoginRequest, MeResponse, RefreshRequest, RefreshResponse,
            RegisterRequest,
        },
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    services::{account::IssuedSession, auth::identity::Role},
    state::AppState,
};

fn to_response(session: IssuedSession) -> AuthResponse {
    AuthResponse {
        token: session.token,
        id: session.user_id,
        role: session.role,
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_FAILED", msg))?;

    let session = state
        .accounts
        .register(
            &req.email,
            &req.password,
            &req.first_name,
            &req.last_name,
            Role::User,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(to_response(session))))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_FAILED", msg))?;

    let session = state.accounts.login(&req.email, &req.password).await?;
    Ok(Json(to_response(session)))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    let token = state.tokens.refresh_token(&req.token)?;
    Ok(Json(RefreshResponse { token }))
}

pub async fn me(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
) -> Result<Json<MeResponse>, AppError> {
    let user = state
        .users
        .find_by_email(auth.subject())
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(MeResponse {
        id: user.id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        role: user.role,
        authorities: auth.authorities.into_iter().collect(),
    }))
}
