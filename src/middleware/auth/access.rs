//! Bearer token 検証 → AuthCtx を extensions に入れる
//!
//! - header なし (または Bearer 以外) → そのまま通す。認可は extractor / handler 側で判断する
//! - 拒否 → masked token 付きで warn を出し、unauthorized::respond で 401 を返す (後続は実行しない)
//! - 成功 → AuthCtx を request extensions に入れて後続へ
//!
//! 判定ロジックそのものは services::auth::RequestAuthenticator にある。

use std::net::SocketAddr;

use axum::{
    Router,
    body::Body,
    extract::{ConnectInfo, OriginalUri, State},
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};
use tracing::{debug, warn};

use crate::api::v1::extractors::AuthCtx;
use crate::middleware::auth::unauthorized;
use crate::services::auth::AuthOutcome;
use crate::state::AppState;

/// `/api/v1/*` に認証を掛けるための middleware を適用する。
///
/// 例：
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // 同じ request で二度認証しない
    if req.extensions().get::<AuthCtx>().is_some() {
        return next.run(req).await;
    }

    // 読めない byte を含む header も「token あり」として扱う (PassThrough させない)
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

    match state
        .authenticator
        .authenticate(authorization.as_deref())
        .await
    {
        AuthOutcome::PassThrough => next.run(req).await,
        AuthOutcome::Authenticated(auth_ctx) => {
            debug!(
                principal = %auth_ctx.subject(),
                authorities = ?auth_ctx.authorities,
                "request authenticated"
            );

            // middleware → extractor への受け渡し
            req.extensions_mut().insert(auth_ctx);
            next.run(req).await
        }
        AuthOutcome::Rejected(rejected) => {
            let remote_addr = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.to_string())
                .unwrap_or_else(|| "unknown".to_string());

            warn!(
                path = %original_uri.path(),
                remote_addr = %remote_addr,
                subject = rejected.subject.as_deref().unwrap_or("unknown"),
                reason = rejected.rejection.reason(),
                cause = %rejected.cause,
                token = %unauthorized::mask_header_token(authorization.as_deref()),
                "rejecting request token"
            );

            unauthorized::respond(rejected.rejection)
        }
    }
}
