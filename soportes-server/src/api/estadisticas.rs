//! Dashboard statistics endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::db::stats;
use crate::error::ApiResult;
use crate::AppState;
use soportes_common::{Estado, Prioridad};

#[derive(Debug, Serialize)]
pub struct Estadisticas {
    pub total_clientes: i64,
    pub total_incidencias: i64,
    pub por_prioridad: PorPrioridad,
    pub por_estado: PorEstado,
}

#[derive(Debug, Serialize)]
pub struct PorPrioridad {
    pub critica: i64,
    pub alta: i64,
    pub media: i64,
    pub normal: i64,
}

#[derive(Debug, Serialize)]
pub struct PorEstado {
    pub abierta: i64,
    pub en_proceso: i64,
    pub cerrada: i64,
}

/// GET /api/estadisticas
pub async fn obtener_estadisticas(State(state): State<AppState>) -> ApiResult<Json<Estadisticas>> {
    let pool = &state.db;

    Ok(Json(Estadisticas {
        total_clientes: stats::contar_clientes(pool).await?,
        total_incidencias: stats::contar_incidencias(pool).await?,
        por_prioridad: PorPrioridad {
            critica: stats::contar_por_prioridad(pool, Prioridad::Critica).await?,
            alta: stats::contar_por_prioridad(pool, Prioridad::Alta).await?,
            media: stats::contar_por_prioridad(pool, Prioridad::Media).await?,
            normal: stats::contar_por_prioridad(pool, Prioridad::Normal).await?,
        },
        por_estado: PorEstado {
            abierta: stats::contar_por_estado(pool, Estado::Abierta).await?,
            en_proceso: stats::contar_por_estado(pool, Estado::EnProceso).await?,
            cerrada: stats::contar_por_estado(pool, Estado::Cerrada).await?,
        },
    }))
}
