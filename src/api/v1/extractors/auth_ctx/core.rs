use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Response;

use crate::middleware::auth::unauthorized;
use crate::services::auth::Rejection;
use crate::state::AppState;

use super::AuthCtx;

/// Handler で AuthCtx を受け取るための extractor
/// middleware が AuthCtx を request.extensions() に insert 済みである前提
/// 見つからない場合は 401 (`unauthorized or invalid token`) を返す
pub struct AuthCtxExtractor(pub AuthCtx);

impl FromRequestParts<AppState> for AuthCtxExtractor
where
    AppState: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .map(AuthCtxExtractor)
            .ok_or_else(|| unauthorized::respond(Rejection::Unauthorized))
    }
}
