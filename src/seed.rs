/*
 * Responsibility
 * - Provision the demo principal and weather record at startup
 * - Idempotent: rows that already exist are left untouched
 */
use anyhow::{Context, Result};
use chrono::Utc;

use crate::repos::weather_repo::WeatherRow;
use crate::services::auth::credentials::CredentialError;
use crate::state::AppState;

pub const DEMO_USERNAME: &str = "kata-user";
pub const DEMO_PASSWORD: &str = "password123";
pub const DEMO_LOCATION_ID: &str = "bogota-col";

pub fn demo_location() -> WeatherRow {
    WeatherRow {
        location_id: DEMO_LOCATION_ID.to_string(),
        city: "Bogotá".to_string(),
        country: "Colombia".to_string(),
        region: "Cundinamarca".to_string(),
        temp: 17.5,
        pressure: 994.71,
        humidity: 61,
        last_updated: Utc::now(),
    }
}

pub async fn run(state: &AppState) -> Result<()> {
    match state
        .credentials
        .provision(DEMO_USERNAME, DEMO_PASSWORD)
        .await
    {
        Ok(()) => {}
        Err(CredentialError::AlreadyExists(_)) => {
            tracing::debug!(username = DEMO_USERNAME, "demo principal already present");
        }
        Err(e) => return Err(e).context("failed to provision demo principal"),
    }

    let existing = state
        .weather
        .find_by_location_id(DEMO_LOCATION_ID)
        .await
        .context("failed to look up demo location")?;

    if existing.is_none() {
        state
            .weather
            .save(demo_location())
            .await
            .context("failed to seed demo location")?;
    }

    tracing::info!(
        username = DEMO_USERNAME,
        location_id = DEMO_LOCATION_ID,
        "demo data ready"
    );
    Ok(())
}
