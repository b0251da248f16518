//! Authentication filter: bearer token → `SecurityCtx` in the request extensions.
//!
//! Per request, starting from "unauthenticated":
//! - no `Authorization` header → `SecurityCtx::Anonymous` (the policy layer decides)
//! - header present but unusable (not ASCII, wrong scheme, empty token) → 401 right here
//! - token present → `TokenService::validate`; success → `SecurityCtx::Authenticated`,
//!   `Malformed`/`InvalidSignature`/`Expired` → 401 (reason logged, response identical)
//!
//! Pure function of (headers, current time, signing key). Nothing shared is mutated.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};

use crate::api::extractors::{AuthCtx, SecurityCtx};
use crate::error::AppError;
use crate::services::auth::{TokenError, TokenService};
use crate::state::AppState;

/// Why a request was turned away before reaching the policy layer. Logged, never sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotAscii,
    WrongScheme,
    EmptyToken,
    Token(TokenError),
}

impl Rejection {
    fn reason(&self) -> &'static str {
        match self {
            Self::NotAscii => "authorization header is not visible ASCII",
            Self::WrongScheme => "authorization scheme is not Bearer",
            Self::EmptyToken => "empty bearer token",
            Self::Token(TokenError::Malformed) => "malformed token",
            Self::Token(TokenError::InvalidSignature) => "invalid token signature",
            Self::Token(TokenError::Expired) => "token expired",
        }
    }
}

/// Resolve the security context from the request headers as of `now`.
pub fn resolve(
    headers: &HeaderMap,
    tokens: &TokenService,
    now: DateTime<Utc>,
) -> Result<SecurityCtx, Rejection> {
    let Some(raw) = headers.get(header::AUTHORIZATION) else {
        return Ok(SecurityCtx::Anonymous);
    };

    let value = raw.to_str().map_err(|_| Rejection::NotAscii)?;

    let (scheme, token) = value.trim().split_once(' ').unwrap_or((value.trim(), ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(Rejection::WrongScheme);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(Rejection::EmptyToken);
    }

    let verified = tokens.validate_at(token, now).map_err(Rejection::Token)?;
    tracing::debug!(jti = %verified.jti, "bearer token verified");

    Ok(SecurityCtx::Authenticated(AuthCtx::new(
        verified.username,
        verified.issued_at,
        verified.expires_at,
    )))
}

pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = match resolve(req.headers(), &state.tokens, Utc::now()) {
        Ok(ctx) => ctx,
        Err(rejection) => {
            tracing::warn!(
                reason = rejection.reason(),
                method = %req.method(),
                path = %req.uri().path(),
                "bearer authentication failed"
            );
            return Err(AppError::Unauthorized);
        }
    };

    if let Some(auth) = ctx.auth_ctx() {
        tracing::debug!(
            username = %auth.username,
            issued_at = %auth.issued_at,
            expires_at = %auth.expires_at,
            "request authenticated"
        );
    }

    // Read by the policy layer and AuthCtxExtractor.
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
