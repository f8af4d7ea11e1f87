use crate::services::auth::codec::{TokenCodec, TokenStatus};

/// Uniform view over [`TokenCodec::decode`].
#[derive(Clone, Debug)]
pub struct ClaimsExtractor {
    codec: TokenCodec,
}

impl ClaimsExtractor {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn status(&self, token: &str) -> TokenStatus {
        self.codec.decode(token)
    }

    /// Subject of a Valid or Expired token. Never reads claims from a Malformed one.
    pub fn subject_of(&self, token: &str) -> Option<String> {
        self.status(token).subject().map(str::to_string)
    }

    /// A malformed token has no trustworthy expiry, so it counts as expired.
    pub fn is_expired_or_invalid(&self, token: &str) -> bool {
        !self.status(token).is_valid()
    }
}
