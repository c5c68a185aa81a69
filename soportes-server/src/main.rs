//! soportes-server - Incident Intake & Classification service
//!
//! Serves the HTTP contract consumed by the incident tracking frontend:
//! client/incident creation, bulk CSV ingestion, priority classification,
//! status transitions and dashboard statistics.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use soportes_server::config::Config;
use soportes_server::etl::Clasificador;
use soportes_server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting soportes-server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::parse();
    info!("Database path: {}", config.database.display());

    let pool = soportes_common::db::init_database(&config.database).await?;
    info!("✓ Database connection established");

    // Priority rule set is immutable after startup; handlers receive it
    // through AppState
    let clasificador = Clasificador::default();
    info!("Priority classifier loaded ({} rules)", clasificador.num_reglas());

    let state = AppState::new(pool, clasificador);
    let app = soportes_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("soportes-server listening on http://{}", config.bind_addr());
    info!("Health check: http://{}/health", config.bind_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
