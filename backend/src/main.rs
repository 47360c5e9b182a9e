//! Backend entry-point: loads configuration, prepares adapters and serves
//! the REST API.

mod server;

use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use campus::inbound::http::health::HealthState;
use campus::outbound::cache::RedisRefreshTokenStore;
use campus::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{AppConfig, ServerConfig, create_server};

const DB_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let app_config = AppConfig::load()
        .map_err(|e| std::io::Error::other(format!("failed to load configuration: {e}")))?;
    let server_config = build_server_config(&app_config).await?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), server_config)?;
    actix_web::rt::spawn(drain_on_signal(health_state, server.handle()));
    server.await
}

/// Fail both probes, then stop accepting connections and let in-flight
/// requests finish.
async fn drain_on_signal(health_state: web::Data<HealthState>, handle: ServerHandle) {
    if let Err(e) = shutdown_signal().await {
        warn!(error = %e, "cannot listen for shutdown signals");
        return;
    }
    info!("shutdown signal received; draining");
    health_state.begin_draining();
    handle.stop(true).await;
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

async fn build_server_config(app_config: &AppConfig) -> std::io::Result<ServerConfig> {
    let (access_secret, refresh_secret) = app_config.token_secrets()?;
    let mut config = ServerConfig::new(app_config.bind_addr()?, access_secret, refresh_secret)
        .with_public_base_url(app_config.public_base_url())
        .with_upload_root(app_config.upload_root())
        .with_ffprobe_path(app_config.ffprobe_path());

    match app_config.database_url.as_deref() {
        Some(url) => {
            let applied = run_pending_migrations(url)
                .await
                .map_err(|e| std::io::Error::other(format!("migrations failed: {e}")))?;
            info!(applied, "database migrations complete");
            let pool = DbPool::new(
                PoolConfig::new(url)
                    .with_max_size(app_config.db_pool_size())
                    .with_connection_timeout(DB_CHECKOUT_TIMEOUT),
            )
            .await
            .map_err(|e| std::io::Error::other(format!("database pool: {e}")))?;
            config = config.with_db_pool(pool);
        }
        None => warn!("CAMPUS_DATABASE_URL unset; using in-memory repositories"),
    }

    match app_config.redis_url.as_deref() {
        Some(url) => {
            let store = RedisRefreshTokenStore::connect(url)
                .await
                .map_err(|e| std::io::Error::other(format!("redis pool: {e}")))?;
            config = config.with_refresh_store(store);
        }
        None => warn!("CAMPUS_REDIS_URL unset; refresh tokens are kept in memory"),
    }

    Ok(config)
}
