pub mod domain;
pub mod infra;
pub mod subsystems;

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::extract::FromRef;
use domain::{
    catalog::{FsImageStore, ImageStore},
    orders::{InvoiceRenderer, PdfInvoiceRenderer},
};
use infra::{DatabaseSettings, Settings};
use sqlx::{PgPool, postgres::PgPoolOptions};
use subsystems::{SessionSweeper, WebServer};
use tokio_graceful_shutdown::{IntoSubsystem, SubsystemBuilder, Toplevel};
use tower_sessions_sqlx_store::PostgresStore;
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub settings: Settings,
    pub pool: PgPool,
    pub images: Arc<dyn ImageStore>,
    pub invoices: Arc<dyn InvoiceRenderer>,
    pub sessions: PostgresStore,
}

pub fn build_subsystems(state: AppState) -> Toplevel {
    let session_sweeper = SessionSweeper::new(state.sessions.clone());
    let webserver = WebServer::new(state);

    // Setup and execute subsystem tree
    Toplevel::new(async |s| {
        s.start(SubsystemBuilder::new(
            "SessionSweeper",
            session_sweeper.into_subsystem(),
        ));
        s.start(SubsystemBuilder::new(
            "Webserver",
            webserver.into_subsystem(),
        ));
    })
}

pub async fn test_server(toplevel: Toplevel, pool: PgPool) -> anyhow::Result<()> {
    let result = toplevel
        .handle_shutdown_requests(Duration::from_millis(2000))
        .await
        .map_err(Into::into);
    pool.close().await;
    result
}

pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    build_subsystems(state)
        .catch_signals()
        .handle_shutdown_requests(Duration::from_millis(2000))
        .await
        .map_err(Into::into)
}

pub fn configure_tracing(settings: &Settings) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(
        settings.application.logs_directory.clone(),
        "shop_server.log",
    );
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(non_blocking)
        .init();
    _guard
}

pub async fn construct_app_state(settings: Settings) -> Result<AppState, anyhow::Error> {
    let pool = construct_db_pool(&settings.database).await?;

    let sessions = PostgresStore::new(pool.clone());
    sessions
        .migrate()
        .await
        .context("Failed to create the session table.")?;

    let images: Arc<dyn ImageStore> = Arc::new(FsImageStore::new(
        settings.application.media_directory.clone(),
    ));

    Ok(AppState {
        settings,
        pool,
        images,
        invoices: Arc::new(PdfInvoiceRenderer),
        sessions,
    })
}

pub async fn construct_db_pool(settings: &DatabaseSettings) -> Result<PgPool, anyhow::Error> {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_with(settings.with_db_name())
        .await
        .context("Failed to connect to Postgres database.\n1. Check database is running.\n2. Check Postgres database settings in configuration file(s).")
}

/// Applies the migrations under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    sqlx::migrate!()
        .run(pool)
        .await
        .context("Failed to run database migrations.")
}
