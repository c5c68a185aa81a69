//! Bulk CSV upload endpoint

use axum::{extract::Multipart, extract::State, Json};
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::etl::{ingerir, ResultadoEtl};
use crate::AppState;

/// POST /api/etl/upload
///
/// Multipart form with optional `clientes_file` and `incidencias_file`
/// parts; at least one must be present. One call = one batch: within it
/// rows are processed sequentially, so later rows dedup against earlier
/// ones of the same upload.
pub async fn subir_etl(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<ResultadoEtl>> {
    let mut clientes_csv: Option<Vec<u8>> = None;
    let mut incidencias_csv: Option<Vec<u8>> = None;

    while let Some(campo) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Formulario multipart no válido: {e}")))?
    {
        let nombre = campo.name().unwrap_or_default().to_string();
        let contenido = campo
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("No se pudo leer '{nombre}': {e}")))?;

        match nombre.as_str() {
            "clientes_file" => clientes_csv = Some(contenido.to_vec()),
            "incidencias_file" => incidencias_csv = Some(contenido.to_vec()),
            otro => warn!(campo = otro, "Campo multipart ignorado"),
        }
    }

    let resultado = ingerir(
        &state.db,
        &state.clasificador,
        clientes_csv.as_deref(),
        incidencias_csv.as_deref(),
    )
    .await?;

    Ok(Json(resultado))
}
