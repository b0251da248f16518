/*
 * Responsibility
 * - Weather records keyed by location_id
 * - find + save (upsert); no delete, records are provisioned at startup
 */
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct WeatherRow {
    pub location_id: String,

    pub city: String,
    pub country: String,
    pub region: String,

    pub temp: f64,
    pub pressure: f64,
    pub humidity: i32,

    pub last_updated: DateTime<Utc>,
}

#[async_trait]
pub trait WeatherRepo: Send + Sync {
    async fn find_by_location_id(&self, location_id: &str) -> RepoResult<Option<WeatherRow>>;

    /// Insert or replace the row for `row.location_id`, returning what is stored.
    async fn save(&self, row: WeatherRow) -> RepoResult<WeatherRow>;
}

#[derive(Debug, Default)]
pub struct MemoryWeatherRepo {
    rows: RwLock<HashMap<String, WeatherRow>>,
}

#[async_trait]
impl WeatherRepo for MemoryWeatherRepo {
    async fn find_by_location_id(&self, location_id: &str) -> RepoResult<Option<WeatherRow>> {
        Ok(self.rows.read().await.get(location_id).cloned())
    }

    async fn save(&self, row: WeatherRow) -> RepoResult<WeatherRow> {
        self.rows
            .write()
            .await
            .insert(row.location_id.clone(), row.clone());
        Ok(row)
    }
}

#[derive(Debug, Clone)]
pub struct PgWeatherRepo {
    pool: PgPool,
}

impl PgWeatherRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WeatherRepo for PgWeatherRepo {
    async fn find_by_location_id(&self, location_id: &str) -> RepoResult<Option<WeatherRow>> {
        let row = sqlx::query_as::<_, WeatherRow>(
            r#"
            SELECT
                location_id, city, country, region,
                temp, pressure, humidity, last_updated
            FROM weather_data
            WHERE location_id = $1
            "#,
        )
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn save(&self, row: WeatherRow) -> RepoResult<WeatherRow> {
        let row = sqlx::query_as::<_, WeatherRow>(
            r#"
            INSERT INTO weather_data (
                location_id, city, country, region,
                temp, pressure, humidity, last_updated
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (location_id) DO UPDATE
            SET
                city = EXCLUDED.city,
                country = EXCLUDED.country,
                region = EXCLUDED.region,
                temp = EXCLUDED.temp,
                pressure = EXCLUDED.pressure,
                humidity = EXCLUDED.humidity,
                last_updated = EXCLUDED.last_updated
            RETURNING
                location_id, city, country, region,
                temp, pressure, humidity, last_updated
            "#,
        )
        .bind(&row.location_id)
        .bind(&row.city)
        .bind(&row.country)
        .bind(&row.region)
        .bind(row.temp)
        .bind(row.pressure)
        .bind(row.humidity)
        .bind(row.last_updated)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bogota() -> WeatherRow {
        WeatherRow {
            location_id: "bogota-col".into(),
            city: "Bogotá".into(),
            country: "Colombia".into(),
            region: "Cundinamarca".into(),
            temp: 17.5,
            pressure: 994.71,
            humidity: 61,
            last_updated: Utc::now(),
        }
    }

    #[tokio::test]
    async fn save_then_find() {
        let repo = MemoryWeatherRepo::default();
        assert!(repo.find_by_location_id("bogota-col").await.unwrap().is_none());

        repo.save(bogota()).await.unwrap();

        let found = repo.find_by_location_id("bogota-col").await.unwrap().unwrap();
        assert_eq!(found.city, "Bogotá");
    }

    #[tokio::test]
    async fn save_replaces_existing_row() {
        let repo = MemoryWeatherRepo::default();
        repo.save(bogota()).await.unwrap();

        let mut updated = bogota();
        updated.temp = 20.0;
        repo.save(updated).await.unwrap();

        let found = repo.find_by_location_id("bogota-col").await.unwrap().unwrap();
        assert_eq!(found.temp, 20.0);
    }
}
