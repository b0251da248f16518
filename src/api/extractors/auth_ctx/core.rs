use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

use super::{AuthCtx, SecurityCtx};

/// Extractor for handlers that need the authenticated principal.
///
/// The access middleware must already have stored a `SecurityCtx` in the request extensions.
/// Anonymous or missing context → 401 (route not covered by the auth pipeline).
pub struct AuthCtxExtractor(pub AuthCtx);

impl FromRequestParts<AppState> for AuthCtxExtractor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityCtx>()
            .and_then(SecurityCtx::auth_ctx)
            .cloned()
            .map(AuthCtxExtractor)
            .ok_or(AppError::Unauthorized)
    }
}
