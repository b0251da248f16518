//! CredentialStore: principal lookup + bcrypt secret verification.
//!
//! bcrypt is deliberately slow, so hashing and verification run on the blocking pool
//! (`spawn_blocking`) and never stall the async workers serving other requests.
use std::{fmt, sync::Arc};

use thiserror::Error;
use tracing::{debug, warn};

use crate::repos::{
    error::RepoError,
    user_repo::{UserRepo, UserRow},
};

/// Identity resolved from stored credentials.
///
/// The password hash is opaque: it never leaves this module except to be compared.
#[derive(Clone)]
pub struct Principal {
    username: String,
    password_hash: String,
}

impl Principal {
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl From<UserRow> for Principal {
    fn from(row: UserRow) -> Self {
        Self {
            username: row.username,
            password_hash: row.password_hash,
        }
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("bcrypt: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("username already provisioned: {0}")]
    AlreadyExists(String),
    #[error("username must not be empty")]
    EmptyUsername,
}

pub struct CredentialStore {
    users: Arc<dyn UserRepo>,
    cost: u32,
    // Verified against when the username is unknown, so both login failure paths
    // spend the same bcrypt time.
    dummy_hash: String,
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

impl CredentialStore {
    /// Runs one bcrypt hash synchronously; call at startup, not on a request path.
    pub fn new(users: Arc<dyn UserRepo>, cost: u32) -> Result<Self, CredentialError> {
        let dummy_hash = bcrypt::hash("dummy-password-for-timing", cost)?;
        Ok(Self {
            users,
            cost,
            dummy_hash,
        })
    }

    pub async fn lookup(&self, username: &str) -> Result<Option<Principal>, CredentialError> {
        let row = self.users.find_by_username(username).await?;
        Ok(row.map(Principal::from))
    }

    /// `false` on mismatch. A stored hash bcrypt cannot parse also yields `false`.
    pub async fn verify(&self, raw_secret: &str, principal: &Principal) -> bool {
        verify_blocking(raw_secret, &principal.password_hash).await
    }

    /// Burn the same CPU as a real verification for a username that does not exist.
    pub async fn verify_unknown(&self, raw_secret: &str) -> bool {
        let _ = verify_blocking(raw_secret, &self.dummy_hash).await;
        false
    }

    pub async fn hash(&self, raw_secret: &str) -> Result<String, CredentialError> {
        let raw = raw_secret.to_owned();
        let cost = self.cost;
        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(raw, cost)).await??;
        Ok(hashed)
    }

    /// Create a principal. Existing usernames are never overwritten.
    pub async fn provision(
        &self,
        username: &str,
        raw_secret: &str,
    ) -> Result<(), CredentialError> {
        if username.is_empty() {
            return Err(CredentialError::EmptyUsername);
        }

        let password_hash = self.hash(raw_secret).await?;
        let created = self
            .users
            .create(UserRow {
                username: username.to_owned(),
                password_hash,
            })
            .await?;

        if !created {
            return Err(CredentialError::AlreadyExists(username.to_owned()));
        }

        debug!(username = %username, "principal provisioned");
        Ok(())
    }
}

async fn verify_blocking(raw_secret: &str, stored_hash: &str) -> bool {
    let raw = raw_secret.to_owned();
    let hash = stored_hash.to_owned();

    match tokio::task::spawn_blocking(move || bcrypt::verify(raw, &hash)).await {
        Ok(Ok(matched)) => matched,
        Ok(Err(e)) => {
            warn!(error = %e, "stored password hash could not be verified");
            false
        }
        Err(e) => {
            warn!(error = %e, "password verification task failed");
            false
        }
    }
}
