/*
 * Responsibility
 * - POST /auth/login
 * - The only place credentials are checked and a token is minted
 * - Unknown user and wrong password produce the identical 401 (only the log differs)
 */
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use tracing::{info, warn};

use crate::{
    api::dto::auth::{LoginRequest, TokenResponse},
    error::AppError,
    state::AppState,
};

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let Json(req) = payload?;

    let principal = state
        .credentials
        .lookup(&req.username)
        .await
        .map_err(|e| {
            warn!(error = %e, "credential lookup failed");
            AppError::Internal
        })?;

    let principal = match principal {
        Some(p) => p,
        None => {
            state.credentials.verify_unknown(&req.password).await;
            warn!(reason = "unknown user", "login rejected");
            return Err(AppError::Unauthorized);
        }
    };

    if !state.credentials.verify(&req.password, &principal).await {
        warn!(reason = "wrong password", username = %principal.username(), "login rejected");
        return Err(AppError::Unauthorized);
    }

    let issued = state
        .tokens
        .issue(&principal)
        .map_err(|_| AppError::Internal)?;

    info!(username = %principal.username(), expires_at = %issued.expires_at, "access token issued");

    Ok((
        StatusCode::OK,
        Json(TokenResponse {
            access_token: issued.access_token,
            token_type: issued.token_type.to_string(),
            expires_in: issued.expires_in,
        }),
    ))
}
