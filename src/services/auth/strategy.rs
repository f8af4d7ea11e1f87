//! Pluggable token validation.
//!
//! A [`ValidationStrategy`] implements the full validation capability set. The
//! [`StrategyRouter`] owns the strategies registered at startup, picks one per
//! token and forwards every call to it, so callers never name a strategy.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::services::auth::codec::TokenStatus;
use crate::services::auth::error::AuthError;
use crate::services::auth::identity::Identity;
use crate::services::auth::lifecycle::TokenLifecycleService;

pub trait ValidationStrategy: Send + Sync {
    fn extract_all_claims(&self, token: &str) -> TokenStatus;

    /// Predicate: any decode failure resolves to `false`.
    fn validate_token(&self, token: &str, identity: &Identity) -> bool;

    fn is_token_expired(&self, token: &str) -> bool;

    fn refresh_token(&self, token: &str) -> Result<String, AuthError>;
}

/// Names under which strategies are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StrategyName {
    DefaultJwt,
}

impl StrategyName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyName::DefaultJwt => "default_jwt",
        }
    }
}

impl fmt::Display for StrategyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HS256 validation backed by [`TokenLifecycleService`].
#[derive(Clone, Debug)]
pub struct DefaultJwtStrategy {
    lifecycle: Arc<TokenLifecycleService>,
}

impl DefaultJwtStrategy {
    pub fn new(lifecycle: Arc<TokenLifecycleService>) -> Self {
        Self { lifecycle }
    }
}

impl ValidationStrategy for DefaultJwtStrategy {
    fn extract_all_claims(&self, token: &str) -> TokenStatus {
        self.lifecycle.extractor().status(token)
    }

    fn validate_token(&self, token: &str, identity: &Identity) -> bool {
        match self.lifecycle.extractor().status(token) {
            TokenStatus::Valid(claims) => claims.subject() == Some(identity.subject.as_str()),
            TokenStatus::Expired(_) | TokenStatus::Malformed(_) => false,
        }
    }

    fn is_token_expired(&self, token: &str) -> bool {
        self.lifecycle.extractor().is_expired_or_invalid(token)
    }

    fn refresh_token(&self, token: &str) -> Result<String, AuthError> {
        self.lifecycle.refresh(token)
    }
}

/// Facade over the registered strategies plus token issuance.
///
/// The registry is built once and never mutated, so it is shared without locks.
#[derive(Clone)]
pub struct StrategyRouter {
    strategies: BTreeMap<StrategyName, Arc<dyn ValidationStrategy>>,
    default_name: StrategyName,
    default: Arc<dyn ValidationStrategy>,
    lifecycle: Arc<TokenLifecycleService>,
}

impl fmt::Debug for StrategyRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRouter")
            .field("strategies", &self.strategies.keys().collect::<Vec<_>>())
            .field("default", &self.default_name)
            .finish()
    }
}

impl StrategyRouter {
    /// Fails with `NoStrategyRegistered` when `strategies` is empty.
    ///
    /// `DefaultJwt` becomes the default when present, otherwise the first
    /// registered name in order.
    pub fn new<I>(lifecycle: Arc<TokenLifecycleService>, strategies: I) -> Result<Self, AuthError>
    where
        I: IntoIterator<Item = (StrategyName, Arc<dyn ValidationStrategy>)>,
    {
        let strategies: BTreeMap<_, _> = strategies.into_iter().collect();

        let default_name = if strategies.contains_key(&StrategyName::DefaultJwt) {
            StrategyName::DefaultJwt
        } else {
            *strategies
                .keys()
                .next()
                .ok_or(AuthError::NoStrategyRegistered)?
        };
        let default = strategies
            .get(&default_name)
            .cloned()
            .ok_or(AuthError::NoStrategyRegistered)?;

        Ok(Self {
            strategies,
            default_name,
            default,
            lifecycle,
        })
    }

    /// Router with only [`DefaultJwtStrategy`] registered.
    pub fn with_default_strategy(lifecycle: Arc<TokenLifecycleService>) -> Result<Self, AuthError> {
        let default: Arc<dyn ValidationStrategy> =
            Arc::new(DefaultJwtStrategy::new(lifecycle.clone()));
        Self::new(lifecycle, [(StrategyName::DefaultJwt, default)])
    }

    pub fn default_strategy_name(&self) -> StrategyName {
        self.default_name
    }

    pub fn registered(&self) -> impl Iterator<Item = StrategyName> + '_ {
        self.strategies.keys().copied()
    }

    // Every token goes to the default for now; routing on header/format would hook in here.
    pub fn choose_strategy(&self, _token: &str) -> &dyn ValidationStrategy {
        self.default.as_ref()
    }

    pub fn extract_all_claims(&self, token: &str) -> TokenStatus {
        self.choose_strategy(token).extract_all_claims(token)
    }

    pub fn validate_token(&self, token: &str, identity: &Identity) -> bool {
        self.choose_strategy(token).validate_token(token, identity)
    }

    pub fn is_token_expired(&self, token: &str) -> bool {
        self.choose_strategy(token).is_token_expired(token)
    }

    pub fn refresh_token(&self, token: &str) -> Result<String, AuthError> {
        self.choose_strategy(token).refresh_token(token)
    }

    pub fn generate_token(&self, identity: &Identity) -> Result<String, AuthError> {
        self.lifecycle.issue(identity)
    }

    pub fn generate_bare_token(&self, subject: &str) -> Result<String, AuthError> {
        self.lifecycle.issue_bare(subject)
    }
}
