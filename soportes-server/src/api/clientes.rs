//! Client API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use soportes_common::{Cliente, Estado, NuevoCliente, Prioridad};

/// Request body for direct client creation
#[derive(Debug, Deserialize)]
pub struct PeticionCliente {
    pub nombre: String,
    pub email: String,
    pub telefono: String,
}

/// One incident as listed under a client
#[derive(Debug, Serialize)]
pub struct IncidenciaDeCliente {
    pub id: i64,
    pub fecha: String,
    pub descripcion: String,
    pub estado: Estado,
    pub prioridad_ia: Prioridad,
}

/// POST /api/clientes
///
/// Create a client. The email is the natural key: a duplicate
/// (case-insensitive) is rejected, same policy as bulk ingestion.
pub async fn crear_cliente(
    State(state): State<AppState>,
    Json(peticion): Json<PeticionCliente>,
) -> ApiResult<(StatusCode, Json<Cliente>)> {
    let nuevo = NuevoCliente {
        nombre: campo_no_vacio(&peticion.nombre, "nombre")?,
        email: campo_no_vacio(&peticion.email, "email")?,
        telefono: campo_no_vacio(&peticion.telefono, "telefono")?,
    };

    let id = db::clientes::insertar_cliente(&state.db, &nuevo)
        .await?
        .ok_or_else(|| ApiError::BadRequest("El email ya está registrado".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(Cliente {
            id,
            nombre: nuevo.nombre,
            email: nuevo.email,
            telefono: nuevo.telefono,
        }),
    ))
}

/// GET /api/clientes/sorted
///
/// Clients ordered alphabetically by name.
pub async fn clientes_ordenados(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Cliente>>> {
    let clientes = db::clientes::clientes_ordenados(&state.db).await?;
    Ok(Json(clientes))
}

/// GET /api/clientes/:id/incidencias
///
/// Incidents of one client, most recent first. 404 when the client does
/// not exist.
pub async fn incidencias_de_cliente(
    State(state): State<AppState>,
    Path(cliente_id): Path<i64>,
) -> ApiResult<Json<Vec<IncidenciaDeCliente>>> {
    if !db::clientes::existe_cliente(&state.db, cliente_id).await? {
        return Err(ApiError::NotFound("Cliente no encontrado".to_string()));
    }

    let incidencias = db::incidencias::incidencias_de_cliente(&state.db, cliente_id).await?;

    Ok(Json(
        incidencias
            .into_iter()
            .map(|incidencia| IncidenciaDeCliente {
                id: incidencia.id,
                fecha: incidencia.fecha,
                descripcion: incidencia.descripcion,
                estado: incidencia.estado,
                prioridad_ia: incidencia.prioridad_ia,
            })
            .collect(),
    ))
}

fn campo_no_vacio(valor: &str, nombre: &str) -> ApiResult<String> {
    let limpio = valor.trim();
    if limpio.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "El campo '{nombre}' es obligatorio"
        )));
    }
    Ok(limpio.to_string())
}
