/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 * - Built once at startup, read-only afterwards; Clone is cheap (Arc inside)
 */
use std::sync::Arc;

use crate::repos::weather_repo::WeatherRepo;
use crate::services::auth::{AuthorizationPolicy, CredentialStore, TokenService};

#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<dyn WeatherRepo>,
    pub credentials: Arc<CredentialStore>,
    pub tokens: Arc<TokenService>,
    pub policy: Arc<AuthorizationPolicy>,
}

impl AppState {
    pub fn new(
        weather: Arc<dyn WeatherRepo>,
        credentials: Arc<CredentialStore>,
        tokens: Arc<TokenService>,
        policy: Arc<AuthorizationPolicy>,
    ) -> Self {
        Self {
            weather,
            credentials,
            tokens,
            policy,
        }
    }
}
