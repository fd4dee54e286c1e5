//! Service entry-point: loads configuration, prepares storage and serves the
//! REST API.

mod server;

use std::env;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use campus_clubs::inbound::http::health::HealthState;
use campus_clubs::inbound::http::session_config::{BuildMode, session_settings_from_env};
use campus_clubs::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use ortho_config::OrthoConfig;

use server::{AppSettings, ServerConfig, create_server, storage_backend};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load_from_iter(env::args_os()).wrap_err("failed to load settings")?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(
        fingerprint = %session.fingerprint,
        ephemeral = session.ephemeral,
        "session key loaded"
    );

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr()?,
    )
    .with_uploads_dir(settings.uploads_dir())
    .with_limits(settings.limits());

    if let Some(url) = settings.database_url.as_deref() {
        run_pending_migrations(url).await?;
        let mut pool_config = PoolConfig::new(url);
        if let Some(max) = settings.db_max_connections {
            pool_config = pool_config.with_max_size(max);
        }
        let pool = DbPool::new(pool_config)
            .await
            .wrap_err("failed to create database pool")?;
        config = config.with_db_pool(pool);
    }

    #[cfg(feature = "metrics")]
    {
        let metrics = server::build_metrics()
            .map_err(|message| color_eyre::eyre::eyre!("configure Prometheus metrics: {message}"))?;
        config = config.with_metrics(Some(metrics));
    }

    let health_state = web::Data::new(HealthState::new(storage_backend(&config)));
    let bind_addr = config.bind_addr;
    let server = create_server(health_state, config, settings.bootstrap_admin()?).await?;
    info!(%bind_addr, "listening");
    server.await.wrap_err("server terminated with an error")
}
