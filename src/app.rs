/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (auth / CORS / request-id / timeout など)
 * - axum::serve() で起動
 */
use std::{net::SocketAddr, panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repos::user_repo::InMemoryUserRepo;
use crate::services::auth::build_strategy_router;
use crate::services::auth::identity::Role;
use crate::services::password::{Argon2Hasher, PasswordHasher};
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,token_auth=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics via tracing; stderr may be hidden depending on how we are launched.
        tracing::error!(?info, "panic");

        // Development: fail fast. Production: default behavior, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Process-level services, built once and shared read-only afterwards.
pub async fn build_state(config: &Config) -> Result<AppState> {
    // Fails fast when no validation strategy could be registered.
    let tokens = build_strategy_router(&config.auth)?;
    let repo = Arc::new(InMemoryUserRepo::new());
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher);

    let state = AppState::new(tokens, repo, hasher);

    if let Some(seed) = &config.admin_seed {
        state
            .accounts
            .register(&seed.email, &seed.password, "Admin", "", Role::Admin)
            .await
            .context("failed to seed admin account")?;
        tracing::info!(email = %seed.email, "seeded admin account");
    }

    Ok(state)
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let v1 = middleware::auth::access::apply(api::v1::routes(), state.clone());

    let router = Router::new().nest("/api/v1", v1).with_state(state);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}
