/// Factory: build the token stack from the immutable `AuthConfig`.
use std::sync::Arc;

use tracing::info;

use crate::config::AuthConfig;
use crate::services::auth::error::AuthError;
use crate::services::auth::lifecycle::TokenLifecycleService;
use crate::services::auth::strategy::StrategyRouter;

pub fn build_strategy_router(config: &AuthConfig) -> Result<Arc<StrategyRouter>, AuthError> {
    let lifecycle = Arc::new(TokenLifecycleService::new(config));
    let router = StrategyRouter::with_default_strategy(lifecycle)?;

    info!(
        default_strategy = %router.default_strategy_name(),
        ttl_seconds = config.ttl().num_seconds(),
        "token validation strategies registered"
    );

    Ok(Arc::new(router))
}
