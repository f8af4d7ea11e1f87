/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - AuthError / RepoError / PasswordError を統一的に変換
 *
 * Note
 * - request 認証の拒否 (401) はここを通らない。middleware/auth/unauthorized.rs が応答を組み立てる
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::repos::error::RepoError;
use crate::services::auth::AuthError;
use crate::services::password::PasswordError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("forbidden")]
    Forbidden,
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("{code}: {message}")]
    Conflict { code: &'static str, message: String },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message.into())
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", "forbidden".into()),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{resource} not found."),
            ),
            AppError::Conflict { code, message } => (StatusCode::CONFLICT, code, message),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match &e {
            AuthError::StillValid => AppError::bad_request("TOKEN_STILL_VALID", e.to_string()),
            AuthError::NoSubject => AppError::bad_request("TOKEN_NO_SUBJECT", e.to_string()),
            AuthError::Malformed(_) => AppError::bad_request("INVALID_TOKEN", "invalid token"),
            AuthError::Expired => AppError::Unauthorized("token expired"),
            AuthError::SubjectMismatch | AuthError::UserNotFound => {
                AppError::Unauthorized("unauthorized or invalid token")
            }
            AuthError::Lookup(_)
            | AuthError::NoStrategyRegistered
            | AuthError::ExpiryOutOfRange
            | AuthError::Signing(_) => {
                error!(error = %e, "auth service failure");
                AppError::Internal
            }
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match &e {
            RepoError::Conflict => AppError::conflict("EMAIL_TAKEN", "email already registered"),
            RepoError::Unavailable(_) => {
                error!(error = %e, "user store failure");
                AppError::Internal
            }
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(_: PasswordError) -> Self {
        AppError::Internal
    }
}
