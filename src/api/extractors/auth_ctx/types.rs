/*
 * Responsibility
 * - The request-scoped security context as handlers and the policy layer see it
 * - Built fresh per request by the authentication filter, dropped with the request
 *
 * Notes
 * - Token parsing/verification lives in services::auth::token
 * - This module only fixes the contract between middleware and handlers
 */
use chrono::{DateTime, Utc};

/// Principal resolved from a validated bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthCtx {
    pub fn new(
        username: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            username: username.into(),
            issued_at,
            expires_at,
        }
    }
}

/// Either a validated principal or the anonymous marker. Always present after the filter runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SecurityCtx {
    #[default]
    Anonymous,
    Authenticated(AuthCtx),
}

impl SecurityCtx {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn auth_ctx(&self) -> Option<&AuthCtx> {
        match self {
            Self::Authenticated(ctx) => Some(ctx),
            Self::Anonymous => None,
        }
    }
}
