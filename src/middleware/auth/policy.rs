//! Authorization enforcement: runs after `access::authenticate`, before any handler.
//!
//! Deny for an anonymous caller → 401; deny for an authenticated one → 403.
//! With the current `AccessLevel` set (`Public`, `Authenticated`) the policy never denies an
//! authenticated caller, so the 403 mapping is only reachable once a stricter level exists.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::api::extractors::SecurityCtx;
use crate::error::AppError;
use crate::services::auth::Decision;
use crate::state::AppState;

pub async fn authorize(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Missing context means the filter did not run; treat as anonymous (fail closed).
    let anonymous = SecurityCtx::Anonymous;
    let ctx = req.extensions().get::<SecurityCtx>().unwrap_or(&anonymous);
    let authenticated = ctx.is_authenticated();
    let decision = state.policy.decide(req.method(), req.uri().path(), ctx);

    match denial(decision, authenticated) {
        None => Ok(next.run(req).await),
        Some(err) => {
            tracing::debug!(
                method = %req.method(),
                path = %req.uri().path(),
                authenticated,
                "request denied by access policy"
            );
            Err(err)
        }
    }
}

fn denial(decision: Decision, authenticated: bool) -> Option<AppError> {
    match decision {
        Decision::Allow => None,
        Decision::Deny if authenticated => Some(AppError::Forbidden),
        Decision::Deny => Some(AppError::Unauthorized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deny_maps_by_caller() {
        assert!(denial(Decision::Allow, false).is_none());
        assert!(denial(Decision::Allow, true).is_none());
        assert!(matches!(
            denial(Decision::Deny, false),
            Some(AppError::Unauthorized)
        ));
        assert!(matches!(
            denial(Decision::Deny, true),
            Some(AppError::Forbidden)
        ));
    }
}
