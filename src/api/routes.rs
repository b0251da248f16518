/*
 * Responsibility
 * - URL structure of the API
 * - Everything returned here goes through the auth pipeline (see middleware::auth)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{
    auth::login,
    not_found,
    weather::{get_weather, update_weather},
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route(
            "/weather/{location_id}",
            get(get_weather).post(update_weather),
        )
        .fallback(not_found)
}
