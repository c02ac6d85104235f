//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use commission_backend::inbound::http::health::HealthState;
use commission_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use commission_backend::outbound::notifier::{
    ConfiguredNotifier, HttpLifecycleNotifier, LoggingLifecycleNotifier,
};
use commission_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use commission_backend::settings::AppSettings;
use server::{ServerConfig, create_server};

fn notifier_from(settings: &AppSettings) -> Result<ConfiguredNotifier> {
    match settings.notifier_url()? {
        Some(endpoint) => {
            info!(%endpoint, "delivering lifecycle events to webhook");
            let notifier = HttpLifecycleNotifier::new(endpoint, settings.notifier_timeout())
                .wrap_err("failed to build webhook client")?;
            Ok(ConfiguredNotifier::Http(notifier))
        }
        None => Ok(ConfiguredNotifier::Logging(LoggingLifecycleNotifier)),
    }
}

async fn connect_database(url: &str, max_connections: u32) -> Result<DbPool> {
    let migration_url = url.to_owned();
    let applied = tokio::task::spawn_blocking(move || run_migrations(&migration_url))
        .await
        .wrap_err("migration task panicked")?
        .wrap_err("failed to run database migrations")?;
    info!(applied, "database migrations complete");
    DbPool::new(PoolConfig::new(url).with_max_size(max_connections))
        .await
        .wrap_err("failed to build database pool")
}

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

    let settings = AppSettings::load().wrap_err("failed to load settings")?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;

    let mut config = ServerConfig::new(session, settings.bind_addr()?)
        .with_notifier(notifier_from(&settings)?)
        .with_timeouts(settings.timeouts());
    if let Some(url) = settings.database_url() {
        let pool = connect_database(url, settings.database_max_connections()).await?;
        config = config.with_db_pool(pool);
    }

    let bind_addr = config.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "commission backend listening");
    server.await.wrap_err("server terminated with an error")
}
