/// Factory: build the auth services from application `Config`.
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::{Config, MIN_SECRET_LEN};
use crate::repos::user_repo::UserRepo;
use crate::services::auth::{CredentialStore, TokenService};

pub fn build_token_service(config: &Config) -> Result<Arc<TokenService>> {
    let secret = match config.jwt_secret.configured() {
        Some(secret) => secret.to_vec(),
        None => {
            tracing::warn!(
                "JWT_SECRET not set; using an ephemeral signing key \
                 (tokens will not survive a restart)"
            );
            ephemeral_secret()?
        }
    };

    Ok(Arc::new(TokenService::new(
        &secret,
        config.auth_issuer.clone(),
        config.access_token_ttl_seconds,
    )))
}

pub fn build_credential_store(
    config: &Config,
    users: Arc<dyn UserRepo>,
) -> Result<Arc<CredentialStore>> {
    let store = CredentialStore::new(users, config.bcrypt_cost)
        .context("failed to initialize credential store")?;
    Ok(Arc::new(store))
}

fn ephemeral_secret() -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; MIN_SECRET_LEN * 2];
    getrandom::fill(&mut bytes).map_err(|e| anyhow::anyhow!("getrandom failed: {e}"))?;
    Ok(bytes)
}
