/*
 * Responsibility
 * - What the repo layer reports upward
 * - Absence of a row is `Ok(None)`, never an error
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error: {0}")]
    Db(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;
