//! Per-request authentication.
//!
//! One pass per request:
//! - no `Authorization: Bearer` header → [`AuthOutcome::PassThrough`]
//! - Malformed → rejected (invalid format)
//! - Expired → rejected (expired)
//! - Valid, subject unknown to the user store → rejected (user not found)
//! - Valid, final `validate_token` cross-check fails → rejected (validation failed)
//! - otherwise → [`AuthOutcome::Authenticated`] with an [`AuthCtx`]
//!
//! Lookup faults degrade to a generic rejection instead of surfacing.

use std::sync::Arc;

use tracing::error;

use crate::api::v1::extractors::AuthCtx;
use crate::repos::user_repo::UserLookup;
use crate::services::auth::error::{AuthError, MalformedReason};
use crate::services::auth::identity::authority_for;
use crate::services::auth::strategy::StrategyRouter;

const BEARER_PREFIX: &str = "Bearer ";

/// Client-facing rejection kinds. Messages are a fixed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    InvalidFormat,
    Expired,
    UserNotFound,
    ValidationFailed,
    Unauthorized,
}

impl Rejection {
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::InvalidFormat => "invalid_format",
            Rejection::Expired => "expired",
            Rejection::UserNotFound => "user_not_found",
            Rejection::ValidationFailed => "validation_failed",
            Rejection::Unauthorized => "unauthorized",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Rejection::InvalidFormat => "invalid token format",
            Rejection::Expired => "token expired",
            Rejection::UserNotFound => "user not found for token",
            Rejection::ValidationFailed | Rejection::Unauthorized => {
                "unauthorized or invalid token"
            }
        }
    }
}

impl From<&AuthError> for Rejection {
    fn from(e: &AuthError) -> Self {
        match e {
            AuthError::Malformed(_) => Rejection::InvalidFormat,
            AuthError::Expired => Rejection::Expired,
            AuthError::UserNotFound => Rejection::UserNotFound,
            AuthError::SubjectMismatch => Rejection::ValidationFailed,
            _ => Rejection::Unauthorized,
        }
    }
}

/// A rejected request, with what is safe to log about it.
#[derive(Debug)]
pub struct Rejected {
    pub rejection: Rejection,
    pub subject: Option<String>,
    pub cause: AuthError,
}

impl Rejected {
    fn new(cause: AuthError, subject: Option<String>) -> Self {
        Self {
            rejection: Rejection::from(&cause),
            subject,
            cause,
        }
    }
}

#[derive(Debug)]
pub enum AuthOutcome {
    PassThrough,
    Authenticated(AuthCtx),
    Rejected(Rejected),
}

/// Token carried by an `Authorization: Bearer <token>` header, if any.
pub fn bearer_token(authorization: Option<&str>) -> Option<&str> {
    authorization?.strip_prefix(BEARER_PREFIX).map(str::trim)
}

#[derive(Clone)]
pub struct RequestAuthenticator {
    router: Arc<StrategyRouter>,
    users: Arc<dyn UserLookup>,
}

impl std::fmt::Debug for RequestAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestAuthenticator")
            .field("router", &self.router)
            .finish()
    }
}

impl RequestAuthenticator {
    pub fn new(router: Arc<StrategyRouter>, users: Arc<dyn UserLookup>) -> Self {
        Self { router, users }
    }

    pub async fn authenticate(&self, authorization: Option<&str>) -> AuthOutcome {
        let Some(token) = bearer_token(authorization) else {
            return AuthOutcome::PassThrough;
        };

        match self.resolve(token).await {
            Ok(ctx) => AuthOutcome::Authenticated(ctx),
            Err(rejected) => AuthOutcome::Rejected(rejected),
        }
    }

    async fn resolve(&self, token: &str) -> Result<AuthCtx, Rejected> {
        let status = self.router.extract_all_claims(token);
        let token_subject = status.subject().map(str::to_string);

        let claims = status
            .into_valid()
            .map_err(|e| Rejected::new(e, token_subject))?;

        let subject = claims.subject().ok_or_else(|| {
            Rejected::new(AuthError::Malformed(MalformedReason::MissingClaim), None)
        })?;

        let user = match self.users.find_by_email(subject).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                return Err(Rejected::new(
                    AuthError::UserNotFound,
                    Some(subject.to_string()),
                ));
            }
            Err(e) => {
                error!(error = %e, "user lookup failed during authentication");
                return Err(Rejected::new(
                    AuthError::Lookup(e),
                    Some(subject.to_string()),
                ));
            }
        };

        // Role claim wins; tokens without one fall back to the stored role.
        let authority = claims
            .role()
            .map(authority_for)
            .unwrap_or_else(|| user.role.authority());

        let identity = user.identity();
        if !self.router.validate_token(token, &identity) {
            return Err(Rejected::new(
                AuthError::SubjectMismatch,
                Some(subject.to_string()),
            ));
        }

        Ok(AuthCtx::new(user.id, identity, authority))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{Duration, Utc};

    use super::*;
    use crate::config::AuthConfig;
    use crate::repos::error::RepoError;
    use crate::repos::user_repo::{InMemoryUserRepo, NewUser, UserRecord};
    use crate::services::auth::identity::{Identity, Role};
    use crate::services::auth::lifecycle::TokenLifecycleService;

    struct FailingLookup;

    #[async_trait]
    impl UserLookup for FailingLookup {
        async fn find_by_email(&self, _email: &str) -> Result<Option<UserRecord>, RepoError> {
            Err(RepoError::Unavailable("connection refused".to_string()))
        }
    }

    struct Fixture {
        lifecycle: Arc<TokenLifecycleService>,
        router: Arc<StrategyRouter>,
        users: Arc<InMemoryUserRepo>,
    }

    impl Fixture {
        async fn new() -> Self {
            let config =
                AuthConfig::new("authn-secret-authn-secret-authn-!!", Duration::hours(1)).unwrap();
            let lifecycle = Arc::new(TokenLifecycleService::new(&config));
            let router = Arc::new(StrategyRouter::with_default_strategy(lifecycle.clone()).unwrap());
            let users = Arc::new(InMemoryUserRepo::new());
            users
                .insert(NewUser {
                    email: "a@x.com".to_string(),
                    password_digest: String::new(),
                    role: Role::Admin,
                    first_name: "A".to_string(),
                    last_name: "X".to_string(),
                })
                .await
                .unwrap();

            Self {
                lifecycle,
                router,
                users,
            }
        }

        fn authenticator(&self) -> RequestAuthenticator {
            RequestAuthenticator::new(self.router.clone(), self.users.clone())
        }

        fn token(&self, subject: &str, role: Option<&str>, issued_ago: Duration) -> String {
            self.lifecycle
                .extractor()
                .codec()
                .encode(subject, role, Utc::now() - issued_ago, Duration::hours(1))
                .unwrap()
        }
    }

    fn rejection_of(outcome: AuthOutcome) -> Rejection {
        match outcome {
            AuthOutcome::Rejected(r) => r.rejection,
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_or_non_bearer_header_passes_through() {
        let fx = Fixture::new().await;
        let authn = fx.authenticator();

        assert!(matches!(authn.authenticate(None).await, AuthOutcome::PassThrough));
        assert!(matches!(
            authn.authenticate(Some("Basic dXNlcjpwYXNz")).await,
            AuthOutcome::PassThrough
        ));
    }

    #[tokio::test]
    async fn garbage_is_invalid_format() {
        let fx = Fixture::new().await;
        let outcome = fx
            .authenticator()
            .authenticate(Some("Bearer garbage.not.jwt"))
            .await;

        assert_eq!(rejection_of(outcome), Rejection::InvalidFormat);
    }

    #[tokio::test]
    async fn expired_token_for_existing_user_is_rejected_as_expired() {
        let fx = Fixture::new().await;
        let token = fx.token("a@x.com", Some("ADMIN"), Duration::hours(2));

        let outcome = fx
            .authenticator()
            .authenticate(Some(&format!("Bearer {token}")))
            .await;

        match outcome {
            AuthOutcome::Rejected(r) => {
                assert_eq!(r.rejection, Rejection::Expired);
                assert_eq!(r.subject.as_deref(), Some("a@x.com"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_subject_is_user_not_found() {
        let fx = Fixture::new().await;
        let token = fx.token("ghost@x.com", None, Duration::zero());

        let outcome = fx
            .authenticator()
            .authenticate(Some(&format!("Bearer {token}")))
            .await;

        assert_eq!(rejection_of(outcome), Rejection::UserNotFound);
    }

    #[tokio::test]
    async fn subject_that_differs_from_stored_email_fails_validation() {
        let fx = Fixture::new().await;
        // The lookup normalizes, the cross-check compares exactly.
        let token = fx.token("A@X.com", None, Duration::zero());

        let outcome = fx
            .authenticator()
            .authenticate(Some(&format!("Bearer {token}")))
            .await;

        assert_eq!(rejection_of(outcome), Rejection::ValidationFailed);
    }

    #[tokio::test]
    async fn valid_token_binds_context_with_claimed_authority() {
        let fx = Fixture::new().await;
        let token = fx
            .router
            .generate_token(&Identity::new("a@x.com", Role::Admin))
            .unwrap();

        match fx
            .authenticator()
            .authenticate(Some(&format!("Bearer {token}")))
            .await
        {
            AuthOutcome::Authenticated(ctx) => {
                assert_eq!(ctx.subject(), "a@x.com");
                assert_eq!(ctx.authorities.len(), 1);
                assert!(ctx.has_authority("ROLE_ADMIN"));
            }
            other => panic!("expected authenticated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn prefixed_role_claim_is_normalized_once() {
        let fx = Fixture::new().await;
        let token = fx.token("a@x.com", Some("ROLE_USER"), Duration::zero());

        match fx
            .authenticator()
            .authenticate(Some(&format!("Bearer {token}")))
            .await
        {
            AuthOutcome::Authenticated(ctx) => assert!(ctx.has_authority("ROLE_USER")),
            other => panic!("expected authenticated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bare_token_falls_back_to_stored_role() {
        let fx = Fixture::new().await;
        let token = fx.router.generate_bare_token("a@x.com").unwrap();

        match fx
            .authenticator()
            .authenticate(Some(&format!("Bearer {token}")))
            .await
        {
            AuthOutcome::Authenticated(ctx) => {
                assert!(ctx.has_authority("ROLE_ADMIN"));
                assert_eq!(ctx.identity.role, Role::Admin);
            }
            other => panic!("expected authenticated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn lookup_fault_degrades_to_generic_rejection() {
        let fx = Fixture::new().await;
        let authn = RequestAuthenticator::new(fx.router.clone(), Arc::new(FailingLookup));
        let token = fx.token("a@x.com", None, Duration::zero());

        let outcome = authn.authenticate(Some(&format!("Bearer {token}"))).await;

        match outcome {
            AuthOutcome::Rejected(r) => {
                assert_eq!(r.rejection, Rejection::Unauthorized);
                assert_eq!(r.rejection.message(), "unauthorized or invalid token");
                assert!(matches!(r.cause, AuthError::Lookup(_)));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("Bearer ")), Some(""));
        assert_eq!(bearer_token(Some("bearer abc")), None);
        assert_eq!(bearer_token(None), None);
    }
}
