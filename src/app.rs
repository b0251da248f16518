/*
 * Responsibility
 * - Load config → build dependencies → seed → assemble the Router
 * - Apply middleware (HTTP layers / auth pipeline)
 * - Serve with axum::serve() (graceful shutdown)
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::repos::{
    schema,
    user_repo::{MemoryUserRepo, PgUserRepo, UserRepo},
    weather_repo::{MemoryWeatherRepo, PgWeatherRepo, WeatherRepo},
};
use crate::seed;
use crate::services::auth::{AuthorizationPolicy, build_credential_store, build_token_service};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // RUST_LOG=info,weather_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so it gets noticed.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting weather API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;

    if config.seed_demo_data {
        seed::run(&state).await?;
    }

    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Construct every process-wide service once; they are read-only from here on.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let (users, weather): (Arc<dyn UserRepo>, Arc<dyn WeatherRepo>) =
        match &config.database_url {
            Some(url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.database_max_connections)
                    .connect(url)
                    .await
                    .context("failed to connect to DATABASE_URL")?;
                schema::ensure_schema(&pool).await?;
                tracing::info!("using PostgreSQL stores");
                (
                    Arc::new(PgUserRepo::new(pool.clone())),
                    Arc::new(PgWeatherRepo::new(pool)),
                )
            }
            None => {
                tracing::info!("DATABASE_URL not set; using in-memory stores");
                (
                    Arc::new(MemoryUserRepo::default()),
                    Arc::new(MemoryWeatherRepo::default()),
                )
            }
        };

    let credentials = build_credential_store(config, users)?;
    let tokens = build_token_service(config)?;
    let policy = Arc::new(AuthorizationPolicy::weather_api());

    Ok(AppState::new(weather, credentials, tokens, policy))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    // Every route, the fallback included, sits behind the auth pipeline.
    let router = middleware::auth::apply(api::routes(), state.clone()).with_state(state);

    middleware::http::apply(router, config)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
