use thiserror::Error;

use crate::repos::error::RepoError;

/// Why a token could not be decoded.
///
/// Messages are fixed strings so nothing from the token (or the key) ever
/// leaks into logs or responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid token structure")]
    InvalidStructure,
    #[error("invalid token payload")]
    InvalidPayload,
    #[error("missing required claim")]
    MissingClaim,
    #[error("unexpected signing algorithm")]
    UnexpectedAlgorithm,
    #[error("invalid token")]
    Other,
}

impl From<&jsonwebtoken::errors::Error> for MalformedReason {
    fn from(e: &jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidToken | ErrorKind::Base64(_) => Self::InvalidStructure,
            ErrorKind::Json(_) | ErrorKind::Utf8(_) => Self::InvalidPayload,
            ErrorKind::MissingRequiredClaim(_) => Self::MissingClaim,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                Self::UnexpectedAlgorithm
            }
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("malformed token: {0}")]
    Malformed(MalformedReason),

    #[error("token expired")]
    Expired,

    #[error("token subject does not match identity")]
    SubjectMismatch,

    #[error("user not found for token")]
    UserNotFound,

    #[error("token is still valid")]
    StillValid,

    #[error("cannot refresh token: subject not present")]
    NoSubject,

    #[error("no validation strategy registered")]
    NoStrategyRegistered,

    #[error("user lookup failed")]
    Lookup(#[from] RepoError),

    #[error("token expiry out of range")]
    ExpiryOutOfRange,

    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}
