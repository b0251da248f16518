/*
 * Responsibility
 * - GET /weather/{location_id}  (public)
 * - POST /weather/{location_id} (authenticated; the auth pipeline has already run)
 * - Body validation → repo find/save → response DTO
 */
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use chrono::Utc;
use tracing::info;

use crate::{
    api::{
        dto::weather::{UpdateWeatherRequest, WeatherResponse},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    state::AppState,
};

pub async fn get_weather(
    State(state): State<AppState>,
    Path(location_id): Path<String>,
) -> Result<Json<WeatherResponse>, AppError> {
    let row = state
        .weather
        .find_by_location_id(&location_id)
        .await?
        .ok_or(AppError::not_found("location"))?;

    Ok(Json(row.into()))
}

pub async fn update_weather(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    Path(location_id): Path<String>,
    payload: Result<Json<UpdateWeatherRequest>, JsonRejection>,
) -> Result<Json<WeatherResponse>, AppError> {
    let Json(req) = payload?;
    let reading = req
        .validate()
        .map_err(|msg| AppError::bad_request("INVALID_BODY", msg))?;

    let mut row = state
        .weather
        .find_by_location_id(&location_id)
        .await?
        .ok_or(AppError::not_found("location"))?;

    row.temp = reading.temp;
    row.pressure = reading.pressure;
    row.humidity = reading.humidity;
    row.last_updated = Utc::now();

    let row = state.weather.save(row).await?;

    info!(
        username = %auth.username,
        location_id = %location_id,
        "weather reading updated"
    );

    Ok(Json(row.into()))
}
