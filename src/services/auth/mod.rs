pub mod authenticator;
pub mod claims;
pub mod codec;
pub mod error;
pub mod factory;
pub mod identity;
pub mod lifecycle;
pub mod strategy;

pub use authenticator::{AuthOutcome, Rejection, RequestAuthenticator};
pub use error::AuthError;
pub use factory::build_strategy_router;
pub use strategy::StrategyRouter;
