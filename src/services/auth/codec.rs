use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::config::AuthConfig;
use crate::services::auth::error::{AuthError, MalformedReason};

/// Token payload (`sub`, `role?`, `iat`, `exp`).
///
/// `sub` defaults to empty so a token without a subject still decodes; callers
/// go through [`Claims::subject`] which treats blank as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn subject(&self) -> Option<&str> {
        if self.sub.trim().is_empty() {
            None
        } else {
            Some(self.sub.as_str())
        }
    }

    /// Role asserted by the token, if any. Blank counts as absent.
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref().map(str::trim).filter(|r| !r.is_empty())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Outcome of decoding a token.
///
/// Expiry is a classification, not a failure: `Expired` still carries the
/// original claims. `Malformed` carries none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    Valid(Claims),
    Expired(Claims),
    Malformed(MalformedReason),
}

impl TokenStatus {
    pub fn claims(&self) -> Option<&Claims> {
        match self {
            TokenStatus::Valid(c) | TokenStatus::Expired(c) => Some(c),
            TokenStatus::Malformed(_) => None,
        }
    }

    pub fn subject(&self) -> Option<&str> {
        self.claims().and_then(Claims::subject)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, TokenStatus::Valid(_))
    }

    /// Claims of a `Valid` token, or the error matching the other variants.
    pub fn into_valid(self) -> Result<Claims, AuthError> {
        match self {
            TokenStatus::Valid(c) => Ok(c),
            TokenStatus::Expired(_) => Err(AuthError::Expired),
            TokenStatus::Malformed(reason) => Err(AuthError::Malformed(reason)),
        }
    }
}

/// HS256 encoder/decoder over the process-wide secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        // exp is checked by decode_at after the signature, so expired claims stay readable.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn encode(
        &self,
        subject: &str,
        role: Option<&str>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or(AuthError::ExpiryOutOfRange)?;
        let claims = Claims {
            sub: subject.to_string(),
            role: role.map(str::to_string),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            AuthError::Signing(e)
        })
    }

    pub fn decode(&self, token: &str) -> TokenStatus {
        self.decode_at(token, Utc::now())
    }

    /// Signature and structure first, then expiry against `now`.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> TokenStatus {
        let claims =
            match jsonwebtoken::decode::<Claims>(token.trim(), &self.decoding_key, &self.validation)
            {
                Ok(data) => data.claims,
                Err(e) => return TokenStatus::Malformed(MalformedReason::from(&e)),
            };

        if claims.is_expired_at(now) {
            TokenStatus::Expired(claims)
        } else {
            TokenStatus::Valid(claims)
        }
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::*;

    const SECRET: &str = "test-secret-test-secret-test-secret!";

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig::new(SECRET, Duration::hours(1)).unwrap())
    }

    fn payload_of(token: &str) -> serde_json::Value {
        let segment = token.split('.').nth(1).unwrap();
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(segment).unwrap()).unwrap()
    }

    #[test]
    fn fresh_token_decodes_as_valid() {
        let codec = codec();
        let token = codec
            .encode("a@x.com", Some("ADMIN"), Utc::now(), Duration::hours(1))
            .unwrap();

        match codec.decode(&token) {
            TokenStatus::Valid(claims) => {
                assert_eq!(claims.subject(), Some("a@x.com"));
                assert_eq!(claims.role(), Some("ADMIN"));
                assert_eq!(claims.exp - claims.iat, 3600);
            }
            other => panic!("expected valid, got {other:?}"),
        }
    }

    #[test]
    fn expired_token_keeps_claims() {
        let codec = codec();
        let issued = Utc::now() - Duration::hours(2);
        let token = codec
            .encode("a@x.com", Some("USER"), issued, Duration::hours(1))
            .unwrap();

        match codec.decode(&token) {
            TokenStatus::Expired(claims) => {
                assert_eq!(claims.subject(), Some("a@x.com"));
                assert_eq!(claims.iat, issued.timestamp());
            }
            other => panic!("expected expired, got {other:?}"),
        }
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let codec = codec();
        let issued = Utc::now();
        let token = codec
            .encode("a@x.com", None, issued, Duration::seconds(60))
            .unwrap();

        let just_before = issued + Duration::seconds(59);
        let at_exp = issued + Duration::seconds(60);
        assert!(codec.decode_at(&token, just_before).is_valid());
        assert!(matches!(
            codec.decode_at(&token, at_exp),
            TokenStatus::Expired(_)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec();
        for input in ["garbage.not.jwt", "abc", "", "a.b", "a.b.c.d"] {
            let status = codec.decode(input);
            assert!(
                matches!(status, TokenStatus::Malformed(_)),
                "{input:?} -> {status:?}"
            );
            assert_eq!(status.subject(), None);
        }
    }

    #[test]
    fn foreign_secret_is_invalid_signature() {
        let other = TokenCodec::new(
            &AuthConfig::new("another-secret-another-secret-12345", Duration::hours(1)).unwrap(),
        );
        let token = other
            .encode("a@x.com", None, Utc::now(), Duration::hours(1))
            .unwrap();

        assert_eq!(
            codec().decode(&token),
            TokenStatus::Malformed(MalformedReason::InvalidSignature)
        );
    }

    #[test]
    fn tampered_payload_is_rejected_even_when_expired() {
        let codec = codec();
        let token = codec
            .encode(
                "a@x.com",
                Some("USER"),
                Utc::now() - Duration::hours(2),
                Duration::hours(1),
            )
            .unwrap();

        let mut forged = payload_of(&token);
        forged["role"] = "ADMIN".into();
        let parts: Vec<&str> = token.split('.').collect();
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
        let tampered = format!("{}.{}.{}", parts[0], body, parts[2]);

        assert_eq!(
            codec.decode(&tampered),
            TokenStatus::Malformed(MalformedReason::InvalidSignature)
        );
    }

    #[test]
    fn absent_role_is_omitted_from_payload() {
        let token = codec()
            .encode("a@x.com", None, Utc::now(), Duration::hours(1))
            .unwrap();

        let payload = payload_of(&token);
        assert!(payload.get("role").is_none());
        assert_eq!(payload["sub"], "a@x.com");

        let header_segment = token.split('.').next().unwrap();
        let header: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header_segment).unwrap()).unwrap();
        assert_eq!(header["alg"], "HS256");
        assert_eq!(header["typ"], "JWT");
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let err = codec()
            .encode("a@x.com", None, DateTime::<Utc>::MAX_UTC, Duration::hours(1))
            .unwrap_err();

        assert!(matches!(err, AuthError::ExpiryOutOfRange));
    }

    #[test]
    fn into_valid_maps_variants_to_errors() {
        let codec = codec();
        let expired = codec
            .encode(
                "a@x.com",
                None,
                Utc::now() - Duration::hours(2),
                Duration::hours(1),
            )
            .unwrap();

        assert!(matches!(
            codec.decode(&expired).into_valid(),
            Err(AuthError::Expired)
        ));
        assert!(matches!(
            codec.decode("nope").into_valid(),
            Err(AuthError::Malformed(_))
        ));
    }
}
