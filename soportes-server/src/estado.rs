//! Status transition service
//!
//! Deliberately permissive state machine: the three states form a
//! complete graph, no-op transitions included, and nothing is terminal.
//! Only the status changes; the creation-time priority is never
//! recomputed.

use sqlx::SqlitePool;
use tracing::info;

use crate::db;
use crate::error::{ApiError, ApiResult};
use soportes_common::Estado;

/// Validate and apply a status change, returning the confirmation
/// message shown to the user.
pub async fn actualizar_estado(
    pool: &SqlitePool,
    incidencia_id: i64,
    nuevo_estado: &str,
) -> ApiResult<String> {
    let estado: Estado = nuevo_estado.parse().map_err(|_| {
        ApiError::BadRequest(format!(
            "Estado no válido: '{}'. Valores permitidos: ABIERTA, EN PROCESO, CERRADA",
            nuevo_estado.trim()
        ))
    })?;

    let incidencia = db::incidencias::obtener_incidencia(pool, incidencia_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Incidencia no encontrada".to_string()))?;

    let cliente = db::clientes::obtener_cliente(pool, incidencia.id_cliente)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cliente asociado no encontrado".to_string()))?;

    let anterior = incidencia.estado;
    db::incidencias::actualizar_estado(pool, incidencia_id, estado).await?;

    info!(
        incidencia = incidencia_id,
        desde = %anterior,
        hasta = %estado,
        "Estado de incidencia actualizado"
    );

    Ok(format!(
        "La incidencia {} correspondiente al cliente {}, cuyo email es {} y cuyo teléfono es {}, \
         con fecha {} y descripción '{}' ha pasado de {} a {}",
        incidencia.id,
        cliente.nombre,
        cliente.email,
        cliente.telefono,
        incidencia.fecha,
        incidencia.descripcion,
        anterior,
        estado
    ))
}
