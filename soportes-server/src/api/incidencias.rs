//! Incident API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::estado;
use crate::etl::normalizer::{fecha_valida, FORMATO_FECHA};
use crate::AppState;
use soportes_common::{Estado, NuevaIncidencia, Prioridad};

/// Request body for direct incident creation. `prioridad_ia` is not
/// caller-settable: it is computed here, once, from the description.
#[derive(Debug, Deserialize)]
pub struct PeticionIncidencia {
    pub id_cliente: i64,
    pub descripcion: String,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(default)]
    pub fecha: Option<String>,
}

/// Stored incident as returned by creation
#[derive(Debug, Serialize)]
pub struct RespuestaIncidencia {
    pub id: i64,
    pub id_cliente: i64,
    pub fecha: String,
    pub descripcion: String,
    pub estado: Estado,
    pub prioridad_ia: Prioridad,
}

/// Status update request body
#[derive(Debug, Deserialize)]
pub struct PeticionEstado {
    pub estado: String,
}

/// Status update confirmation
#[derive(Debug, Serialize)]
pub struct RespuestaMensaje {
    pub mensaje: String,
}

/// POST /api/incidencias
///
/// Create an incident for an existing client.
pub async fn crear_incidencia(
    State(state): State<AppState>,
    Json(peticion): Json<PeticionIncidencia>,
) -> ApiResult<(StatusCode, Json<RespuestaIncidencia>)> {
    let descripcion = peticion.descripcion.trim().to_string();
    if descripcion.is_empty() {
        return Err(ApiError::BadRequest(
            "El campo 'descripcion' es obligatorio".to_string(),
        ));
    }

    let estado = match peticion.estado.as_deref().map(str::trim) {
        None | Some("") => Estado::Abierta,
        Some(crudo) => crudo.parse().map_err(|_| {
            ApiError::BadRequest(format!(
                "Estado no válido: '{crudo}'. Valores permitidos: ABIERTA, EN PROCESO, CERRADA"
            ))
        })?,
    };

    // Date format is caller responsibility; a non-conforming value is
    // rejected rather than re-parsed with a guessed format
    let fecha = match peticion.fecha.as_deref().map(str::trim) {
        None | Some("") => Local::now().date_naive().format(FORMATO_FECHA).to_string(),
        Some(crudo) => {
            if !fecha_valida(crudo) {
                return Err(ApiError::BadRequest(format!(
                    "Fecha no válida (se espera DD-MM-YYYY): '{crudo}'"
                )));
            }
            crudo.to_string()
        }
    };

    if !db::clientes::existe_cliente(&state.db, peticion.id_cliente).await? {
        return Err(ApiError::BadRequest(
            "No se puede crear incidencia para un cliente inexistente".to_string(),
        ));
    }

    let nueva = NuevaIncidencia {
        id_cliente: peticion.id_cliente,
        fecha,
        descripcion,
        estado,
    };

    let prioridad = state.clasificador.clasificar(&nueva.descripcion);

    let id = db::incidencias::insertar_incidencia(&state.db, &nueva, prioridad)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest(
                "Ya existe una incidencia idéntica para este cliente y fecha".to_string(),
            )
        })?;

    Ok((
        StatusCode::CREATED,
        Json(RespuestaIncidencia {
            id,
            id_cliente: nueva.id_cliente,
            fecha: nueva.fecha,
            descripcion: nueva.descripcion,
            estado: nueva.estado,
            prioridad_ia: prioridad,
        }),
    ))
}

/// PUT /api/incidencias/:id/estado
///
/// Apply a status transition and return the confirmation message.
pub async fn actualizar_estado_incidencia(
    State(state): State<AppState>,
    Path(incidencia_id): Path<i64>,
    Json(peticion): Json<PeticionEstado>,
) -> ApiResult<Json<RespuestaMensaje>> {
    let mensaje = estado::actualizar_estado(&state.db, incidencia_id, &peticion.estado).await?;
    Ok(Json(RespuestaMensaje { mensaje }))
}
