use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lifecover_core::config::{DatabaseSettings, Settings, StoreBackend};
use lifecover_core::storage::{
    MemorySubmissionStore, PgSubmissionStore, SubmissionStore, UnavailableSubmissionStore,
};

mod app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let store: Arc<dyn SubmissionStore> = match settings.submission_store {
        StoreBackend::Memory => {
            tracing::warn!("SUBMISSION_STORE=memory; submissions are not durable");
            Arc::new(MemorySubmissionStore::new())
        }
        StoreBackend::Postgres => connect_postgres(&settings.database).await,
    };

    let app = app::router(app::AppState { store }, settings.cors_allow_origin.as_deref())?;

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

// Falls back to a store that fails every write, so the API still serves the
// client page and health probe while the database is down.
async fn connect_postgres(db: &DatabaseSettings) -> Arc<dyn SubmissionStore> {
    let store = match PgSubmissionStore::connect(db).await {
        Ok(store) => store,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %format!("{e:#}"), "db connect failed; starting API in degraded mode");
            return Arc::new(UnavailableSubmissionStore);
        }
    };

    match lifecover_core::storage::migrate(store.pool()).await {
        Ok(()) => Arc::new(store),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %format!("{e:#}"), "db migrations failed; starting API in degraded mode");
            Arc::new(UnavailableSubmissionStore)
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
