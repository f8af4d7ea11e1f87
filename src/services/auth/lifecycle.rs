use chrono::{Duration, Utc};
use tracing::debug;

use crate::config::AuthConfig;
use crate::services::auth::claims::ClaimsExtractor;
use crate::services::auth::codec::{TokenCodec, TokenStatus};
use crate::services::auth::error::AuthError;
use crate::services::auth::identity::Identity;

/// Issues tokens and refreshes expired ones.
///
/// - `issue` embeds the role claim.
/// - `issue_bare` omits it; refresh has no verified role at hand.
/// - `refresh` only accepts expired tokens, so a live session cannot be
///   extended without re-authenticating.
#[derive(Clone, Debug)]
pub struct TokenLifecycleService {
    extractor: ClaimsExtractor,
    ttl: Duration,
}

impl TokenLifecycleService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            extractor: ClaimsExtractor::new(TokenCodec::new(config)),
            ttl: config.ttl(),
        }
    }

    pub fn extractor(&self) -> &ClaimsExtractor {
        &self.extractor
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        self.extractor.codec().encode(
            &identity.subject,
            Some(identity.role.as_str()),
            Utc::now(),
            self.ttl,
        )
    }

    pub fn issue_bare(&self, subject: &str) -> Result<String, AuthError> {
        self.extractor
            .codec()
            .encode(subject, None, Utc::now(), self.ttl)
    }

    pub fn refresh(&self, token: &str) -> Result<String, AuthError> {
        let claims = match self.extractor.status(token) {
            TokenStatus::Valid(_) => return Err(AuthError::StillValid),
            TokenStatus::Malformed(reason) => return Err(AuthError::Malformed(reason)),
            TokenStatus::Expired(claims) => claims,
        };

        let subject = claims.subject().ok_or(AuthError::NoSubject)?;
        debug!(subject = %subject, "refreshing expired token");

        self.issue_bare(subject)
    }
}
