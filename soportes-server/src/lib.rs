//! soportes-server library - Incident Intake & Classification service
//!
//! HTTP backend for the customer-incident tracking frontend: bulk CSV
//! ingestion with deduplication, keyword-driven priority classification,
//! and incident status management.

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::etl::Clasificador;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod estado;
pub mod etl;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Priority rule set, built once at startup
    pub clasificador: Arc<Clasificador>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, clasificador: Clasificador) -> Self {
        Self {
            db,
            clasificador: Arc::new(clasificador),
        }
    }
}

/// Build application router
///
/// CORS is permissive: the frontend is served from a different origin.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post, put};

    Router::new()
        .route("/", get(api::root))
        .merge(api::health::health_routes())
        .route("/api/clientes", post(api::clientes::crear_cliente))
        .route("/api/clientes/sorted", get(api::clientes::clientes_ordenados))
        .route(
            "/api/clientes/:id/incidencias",
            get(api::clientes::incidencias_de_cliente),
        )
        .route("/api/incidencias", post(api::incidencias::crear_incidencia))
        .route(
            "/api/incidencias/:id/estado",
            put(api::incidencias::actualizar_estado_incidencia),
        )
        .route("/api/estadisticas", get(api::estadisticas::obtener_estadisticas))
        .route("/api/etl/upload", post(api::etl::subir_etl))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
