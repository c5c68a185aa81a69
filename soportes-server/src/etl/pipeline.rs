//! Ingestion orchestrator
//!
//! Drives one batch: clients fully before incidents (an incident may
//! reference a client created moments earlier in the same batch), each
//! row through normalize → dedup → classify → persist. Row-level
//! failures append a log entry and processing continues; the batch as a
//! whole only fails when no input was supplied or the store is
//! unreachable. The batch is not atomic: a crash mid-way leaves inserted
//! records in place, and re-uploading the same file is safe because the
//! dedup keys make ingestion idempotent.

use chrono::Local;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::etl::clasificador::Clasificador;
use crate::etl::dedup::{Decision, ResolutorDuplicados};
use crate::etl::normalizer::{
    normalizar_cliente, normalizar_incidencia, FilaCliente, FilaIncidencia,
};

/// Delimiter between entries of the batch log.
pub const SEPARADOR_LOG: &str = " | ";

/// Summary of one ingestion batch. `lineas_leidas` counts every data row
/// read, including rejected rows and duplicates; `insertados_reales`
/// counts only rows that produced a new stored record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultadoEtl {
    pub lineas_leidas: i64,
    pub insertados_reales: i64,
    pub mensaje: String,
}

/// Run one ingestion batch over the supplied CSV payloads (comma
/// delimited, header row, UTF-8). At least one payload must be present.
pub async fn ingerir(
    pool: &SqlitePool,
    clasificador: &Clasificador,
    clientes_csv: Option<&[u8]>,
    incidencias_csv: Option<&[u8]>,
) -> ApiResult<ResultadoEtl> {
    if clientes_csv.is_none() && incidencias_csv.is_none() {
        return Err(ApiError::EmptyBatch);
    }

    let fecha_ingesta = Local::now().date_naive();
    let mut lote = Lote::default();
    let mut resolutor = ResolutorDuplicados::new();

    if let Some(bytes) = clientes_csv {
        procesar_clientes(pool, &mut resolutor, &mut lote, bytes).await?;
    }

    if let Some(bytes) = incidencias_csv {
        procesar_incidencias(
            pool,
            clasificador,
            &mut resolutor,
            &mut lote,
            bytes,
            fecha_ingesta,
        )
        .await?;
    }

    info!(
        lineas = lote.lineas,
        insertados = lote.insertados,
        "Lote ETL completado"
    );

    lote.log.push(format!(
        "Proceso completado: {} de {} registros insertados",
        lote.insertados, lote.lineas
    ));

    Ok(ResultadoEtl {
        lineas_leidas: lote.lineas,
        insertados_reales: lote.insertados,
        mensaje: lote.log.join(SEPARADOR_LOG),
    })
}

/// Running counters and log of one batch.
#[derive(Debug, Default)]
struct Lote {
    lineas: i64,
    insertados: i64,
    log: Vec<String>,
}

fn lector_csv(bytes: &[u8]) -> csv::Reader<&[u8]> {
    // flexible: a short row surfaces as missing fields with a precise
    // rejection reason instead of aborting the whole batch
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes)
}

async fn procesar_clientes(
    pool: &SqlitePool,
    resolutor: &mut ResolutorDuplicados,
    lote: &mut Lote,
    bytes: &[u8],
) -> ApiResult<()> {
    for (indice, fila) in lector_csv(bytes).deserialize::<FilaCliente>().enumerate() {
        let num_fila = indice + 1;
        lote.lineas += 1;

        let fila = match fila {
            Ok(fila) => fila,
            Err(err) => {
                lote.log.push(format!(
                    "Fila {num_fila} de clientes ilegible (invalid_type): {err}"
                ));
                continue;
            }
        };

        let candidato = match normalizar_cliente(&fila) {
            Ok(candidato) => candidato,
            Err(rechazo) => {
                lote.log
                    .push(format!("Fila {num_fila} de clientes rechazada: {rechazo}"));
                continue;
            }
        };

        if resolutor.resolver_cliente(pool, &candidato).await? == Decision::Duplicado {
            lote.log
                .push(format!("Cliente duplicado omitido: {}", candidato.email));
            continue;
        }

        match db::clientes::insertar_cliente(pool, &candidato).await? {
            Some(id) => {
                lote.insertados += 1;
                debug!(id, email = %candidato.email, "Cliente insertado");
            }
            // Lost the uniqueness race against a concurrent batch
            None => {
                lote.log
                    .push(format!("Cliente duplicado omitido: {}", candidato.email));
            }
        }
    }

    Ok(())
}

async fn procesar_incidencias(
    pool: &SqlitePool,
    clasificador: &Clasificador,
    resolutor: &mut ResolutorDuplicados,
    lote: &mut Lote,
    bytes: &[u8],
    fecha_ingesta: chrono::NaiveDate,
) -> ApiResult<()> {
    for (indice, fila) in lector_csv(bytes)
        .deserialize::<FilaIncidencia>()
        .enumerate()
    {
        let num_fila = indice + 1;
        lote.lineas += 1;

        let fila = match fila {
            Ok(fila) => fila,
            Err(err) => {
                lote.log.push(format!(
                    "Fila {num_fila} de incidencias ilegible (invalid_type): {err}"
                ));
                continue;
            }
        };

        let candidata = match normalizar_incidencia(&fila, fecha_ingesta) {
            Ok(candidata) => candidata,
            Err(rechazo) => {
                lote.log.push(format!(
                    "Fila {num_fila} de incidencias rechazada: {rechazo}"
                ));
                continue;
            }
        };

        // The reference must resolve against existing state or a client
        // inserted earlier in this same batch; both are store reads here,
        // since clients are fully processed before incidents
        if !db::clientes::existe_cliente(pool, candidata.id_cliente).await? {
            lote.log.push(format!(
                "Incidencia saltada: cliente {} no existe",
                candidata.id_cliente
            ));
            continue;
        }

        if resolutor.resolver_incidencia(pool, &candidata).await? == Decision::Duplicado {
            lote.log.push(format!(
                "Incidencia duplicada omitida: cliente {}, fecha {}",
                candidata.id_cliente, candidata.fecha
            ));
            continue;
        }

        let prioridad = clasificador.clasificar(&candidata.descripcion);

        match db::incidencias::insertar_incidencia(pool, &candidata, prioridad).await? {
            Some(id) => {
                lote.insertados += 1;
                debug!(id, prioridad = %prioridad, "Incidencia insertada");
            }
            None => {
                lote.log.push(format!(
                    "Incidencia duplicada omitida: cliente {}, fecha {}",
                    candidata.id_cliente, candidata.fecha
                ));
            }
        }
    }

    Ok(())
}
