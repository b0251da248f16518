/*
 * Responsibility
 * - The auth pipeline: authenticate (filter) → authorize (policy) → handler
 * - Either step short-circuits with a terminal response
 */
pub mod access;
pub mod policy;

use axum::{Router, middleware};
use tower::ServiceBuilder;

use crate::state::AppState;

/// Wrap every route of `router` in the auth pipeline.
///
/// ServiceBuilder layers run top to bottom, so `authenticate` always precedes `authorize`.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn_with_state(
                state.clone(),
                access::authenticate,
            ))
            .layer(middleware::from_fn_with_state(state, policy::authorize)),
    )
}
