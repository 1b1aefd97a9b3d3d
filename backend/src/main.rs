//! User API entry-point: loads settings, connects to MongoDB and serves the
//! REST endpoints with health probes and OpenAPI docs.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use std::ffi::OsString;
use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use user_api::domain::UserService;
use user_api::inbound::http::health::HealthState;
use user_api::outbound::persistence::{MongoConfig, MongoDbContext};
use user_api::settings::AppSettings;

use server::{ServerConfig, create_server};

/// Load settings from `args`, the environment and configuration files.
fn load_settings<I>(args: I) -> Result<AppSettings>
where
    I: IntoIterator<Item = OsString>,
{
    AppSettings::load_from_iter(args).map_err(|err| eyre!("load settings: {err}"))
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

    let settings = load_settings(std::env::args_os())?;
    let names = settings.collection_names().wrap_err("collection names")?;
    let bind_addr = settings.bind_addr().wrap_err("bind address")?;

    let mongo = MongoConfig::new(settings.connection_uri(), settings.db_name.as_str())
        .with_app_name(settings.application_name.as_str());
    let context = MongoDbContext::connect(mongo)
        .await
        .wrap_err("configure MongoDB client")?;
    context.ping().await.wrap_err("reach MongoDB")?;
    info!(
        database = context.database_name(),
        users = names.users(),
        counters = names.counters(),
        "connected to MongoDB"
    );

    let service = Arc::new(UserService::new(Arc::new(context), names));
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), ServerConfig::new(bind_addr, service))?;
    server.await?;
    health_state.mark_unhealthy();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use env_lock::lock_env;
    use rstest::rstest;

    #[rstest]
    fn starts_from_built_in_defaults() {
        let _guard = lock_env([
            ("USER_API_DB_HOST", None::<String>),
            ("USER_API_DB_PORT", None),
            ("USER_API_DB_NAME", None),
            ("USER_API_DATABASE_URI", None),
            ("USER_API_APPLICATION_NAME", None),
            ("USER_API_USERS_COLLECTION", None),
            ("USER_API_COUNTERS_COLLECTION", None),
            ("USER_API_BIND_ADDR", None),
        ]);

        let settings = load_settings([OsString::from("user-api")]).expect("defaults load");

        assert_eq!(
            settings.connection_uri(),
            "mongodb://localhost:27017/?appName=user-api"
        );
        assert_eq!(settings.bind_addr().expect("default address").port(), 8080);
    }
}
