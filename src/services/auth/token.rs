use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::services::auth::credentials::Principal;

/// Why a presented token was refused. All three surface to the client as the same 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
}

#[derive(Debug, Error)]
pub enum TokenIssueError {
    #[error("failed to sign access token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
    #[error("token lifetime of {0}s overflows the expiry timestamp")]
    TtlOutOfRange(u64),
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessTokenClaims {
    iss: String,
    sub: String,
    iat: i64,
    exp: i64,
    jti: String,
}

/// Handler-facing result of a successful `issue`.
#[derive(Clone, Debug)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub expires_at: DateTime<Utc>,
}

/// Result of a successful `validate`: the token's subject plus its validity window.
///
/// The token is self-contained; the subject is not re-checked against the credential store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedToken {
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub jti: String,
}

/// HS256 issuer/verifier with a fixed TTL.
///
/// - Key material is intentionally not printable via Debug.
/// - Expiry is checked here (not by jsonwebtoken) so the check time can be injected
///   and the boundary is exact: valid while `now < exp`.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl_seconds: u64,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], issuer: impl Into<String>, ttl_seconds: u64) -> Self {
        let issuer = issuer.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["iss", "sub", "iat", "exp"]);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer,
            ttl_seconds,
        }
    }

    pub fn issue(&self, principal: &Principal) -> Result<IssuedToken, TokenIssueError> {
        self.issue_at(principal.username(), Utc::now())
    }

    pub fn issue_at(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenIssueError> {
        let out_of_range = || {
            error!(ttl_seconds = self.ttl_seconds, "token lifetime out of range");
            TokenIssueError::TtlOutOfRange(self.ttl_seconds)
        };

        let ttl = i64::try_from(self.ttl_seconds).map_err(|_| out_of_range())?;
        let iat = now.timestamp();
        let exp = iat.checked_add(ttl).ok_or_else(out_of_range)?;
        let expires_at = ChronoDuration::try_seconds(ttl)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(out_of_range)?;

        let claims = AccessTokenClaims {
            iss: self.issuer.clone(),
            sub: username.to_owned(),
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
        };

        let access_token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| {
            error!(error = %e, "failed to sign access token");
            TokenIssueError::Sign(e)
        })?;

        Ok(IssuedToken {
            access_token,
            token_type: "Bearer",
            expires_in: self.ttl_seconds,
            expires_at,
        })
    }

    pub fn validate(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Order of checks: structure, then signature, then expiry.
    pub fn validate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedToken, TokenError> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
                .map_err(|e| classify(e.kind()))?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() || claims.exp <= claims.iat {
            return Err(TokenError::Malformed);
        }

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        let issued_at = timestamp(claims.iat)?;
        let expires_at = timestamp(claims.exp)?;

        Ok(VerifiedToken {
            username: claims.sub,
            issued_at,
            expires_at,
            jti: claims.jti,
        })
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, TokenError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or(TokenError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";
    const TTL: u64 = 3600;

    fn service() -> TokenService {
        TokenService::new(SECRET, "weather-api", TTL)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn issued_token_resolves_to_the_same_subject() {
        let svc = service();
        let now = Utc::now();
        let issued = svc.issue_at("kata-user", now).unwrap();

        assert_eq!(issued.token_type, "Bearer");
        assert_eq!(issued.expires_in, TTL);

        let verified = svc.validate(&issued.access_token).unwrap();
        assert_eq!(verified.username, "kata-user");
        assert_eq!(verified.issued_at.timestamp(), now.timestamp());
        assert_eq!(
            verified.expires_at.timestamp(),
            now.timestamp() + TTL as i64
        );
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let svc = service();
        let issued_at = 1_700_000_000;
        let token = svc.issue_at("kata-user", at(issued_at)).unwrap().access_token;
        let exp = issued_at + TTL as i64;

        assert!(svc.validate_at(&token, at(issued_at)).is_ok());
        assert!(svc.validate_at(&token, at(exp - 1)).is_ok());
        assert_eq!(
            svc.validate_at(&token, at(exp)).unwrap_err(),
            TokenError::Expired
        );
        assert_eq!(
            svc.validate_at(&token, at(exp + 86_400)).unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn altered_signature_is_rejected() {
        let svc = service();
        let token = svc.issue_at("kata-user", Utc::now()).unwrap().access_token;

        let (signing_input, signature) = token.rsplit_once('.').unwrap();
        let mut sig: Vec<char> = signature.chars().collect();
        // First char carries 6 full bits, so any swap changes the decoded bytes.
        sig[0] = if sig[0] == 'A' { 'B' } else { 'A' };
        let tampered = format!("{}.{}", signing_input, sig.into_iter().collect::<String>());

        assert_eq!(
            svc.validate(&tampered).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn token_from_another_key_is_rejected() {
        let other = TokenService::new(b"ffffffffffffffffffffffffffffffff", "weather-api", TTL);
        let token = other.issue_at("kata-user", Utc::now()).unwrap().access_token;

        assert_eq!(
            service().validate(&token).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let svc = service();
        for raw in ["", "abc", "a.b", "a.b.c", "not a token at all"] {
            assert_eq!(svc.validate(raw).unwrap_err(), TokenError::Malformed, "{raw}");
        }
    }

    #[test]
    fn forged_and_expired_token_reports_the_signature() {
        let svc = service();
        let token = svc.issue_at("kata-user", at(1_000)).unwrap().access_token;
        let (signing_input, _) = token.rsplit_once('.').unwrap();
        let forged = format!("{}.AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", signing_input);

        assert_eq!(
            svc.validate_at(&forged, at(1_000_000)).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn oversized_ttl_is_an_error_not_a_panic() {
        let now = at(1_700_000_000);

        for ttl in [i64::MAX as u64, u64::MAX] {
            let svc = TokenService::new(SECRET, "weather-api", ttl);
            let err = svc.issue_at("kata-user", now).unwrap_err();
            assert!(matches!(err, TokenIssueError::TtlOutOfRange(t) if t == ttl));
        }
    }

    #[test]
    fn longest_configured_ttl_still_validates() {
        let ttl = crate::config::MAX_ACCESS_TOKEN_TTL_SECONDS;
        let svc = TokenService::new(SECRET, "weather-api", ttl);
        let now = at(1_700_000_000);

        let issued = svc.issue_at("kata-user", now).unwrap();
        assert_eq!(issued.expires_in, ttl);

        let verified = svc.validate_at(&issued.access_token, now).unwrap();
        assert_eq!(verified.expires_at.timestamp(), now.timestamp() + ttl as i64);
    }

    #[test]
    fn validation_is_deterministic() {
        let svc = service();
        let now = at(1_700_000_000);
        let token = svc.issue_at("kata-user", now).unwrap().access_token;

        let first = svc.validate_at(&token, now);
        let second = svc.validate_at(&token, now);
        assert_eq!(first, second);
    }
}
