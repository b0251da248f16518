//! Schema bootstrap for the PostgreSQL backend.
use sqlx::PgPool;

use crate::repos::error::RepoResult;

pub async fn ensure_schema(pool: &PgPool) -> RepoResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            username      TEXT PRIMARY KEY,
            password_hash TEXT NOT NULL,
            created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weather_data (
            location_id  TEXT PRIMARY KEY,
            city         TEXT NOT NULL,
            country      TEXT NOT NULL,
            region       TEXT NOT NULL,
            temp         DOUBLE PRECISION NOT NULL,
            pressure     DOUBLE PRECISION NOT NULL,
            humidity     INTEGER NOT NULL,
            last_updated TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
