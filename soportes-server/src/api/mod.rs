//! HTTP API handlers

use axum::Json;
use serde_json::{json, Value};

pub mod clientes;
pub mod estadisticas;
pub mod etl;
pub mod health;
pub mod incidencias;

/// GET /
///
/// Welcome banner.
pub async fn root() -> Json<Value> {
    Json(json!({
        "mensaje": "¡Bienvenido a Te Soportamos!",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
