/*
 * Responsibility
 * - Credential rows (username + bcrypt hash)
 * - Exact-match lookup, no case folding
 * - Usernames are immutable: `create` never overwrites an existing row
 */
use std::{collections::HashMap, fmt};

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;

use crate::repos::error::RepoResult;

#[derive(Clone, FromRow)]
pub struct UserRow {
    pub username: String,
    pub password_hash: String,
}

impl fmt::Debug for UserRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRow")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserRow>>;

    // Returns:
    // - Ok(true)  => row inserted
    // - Ok(false) => username already taken (existing row untouched)
    async fn create(&self, row: UserRow) -> RepoResult<bool>;
}

#[derive(Debug, Default)]
pub struct MemoryUserRepo {
    rows: RwLock<HashMap<String, UserRow>>,
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserRow>> {
        Ok(self.rows.read().await.get(username).cloned())
    }

    async fn create(&self, row: UserRow) -> RepoResult<bool> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&row.username) {
            return Ok(false);
        }
        rows.insert(row.username.clone(), row);
        Ok(true)
    }
}

#[derive(Debug, Clone)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT username, password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create(&self, row: UserRow) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(&row.username)
        .bind(&row.password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
