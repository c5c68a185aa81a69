//! Record normalizer: one raw CSV row in, one typed candidate out
//!
//! Pure functions. A rejected row carries its reason and is counted and
//! logged by the orchestrator; it never aborts the batch.

use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;

use soportes_common::{Estado, NuevaIncidencia, NuevoCliente};

/// Date format used throughout the contract (`fecha` fields).
pub const FORMATO_FECHA: &str = "%d-%m-%Y";

/// Raw client row as deserialized from the CSV. Every field is optional
/// here; required-field enforcement happens in normalization so that a
/// short row yields a precise rejection instead of a parse abort.
#[derive(Debug, Default, Deserialize)]
pub struct FilaCliente {
    /// Ignored when present: ids are store-assigned.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
}

/// Raw incident row as deserialized from the CSV.
#[derive(Debug, Default, Deserialize)]
pub struct FilaIncidencia {
    /// Ignored when present: ids are store-assigned.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub id_cliente: Option<String>,
    #[serde(default)]
    pub fecha: Option<String>,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub estado: Option<String>,
}

/// Why a row was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotivoRechazo {
    MissingField,
    InvalidType,
    MalformedDate,
}

impl MotivoRechazo {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotivoRechazo::MissingField => "missing_field",
            MotivoRechazo::InvalidType => "invalid_type",
            MotivoRechazo::MalformedDate => "malformed_date",
        }
    }
}

/// A row-level rejection: reason plus a display-ready detail.
#[derive(Debug)]
pub struct RechazoFila {
    pub motivo: MotivoRechazo,
    pub detalle: String,
}

impl RechazoFila {
    fn nuevo(motivo: MotivoRechazo, detalle: impl Into<String>) -> Self {
        Self {
            motivo,
            detalle: detalle.into(),
        }
    }
}

impl fmt::Display for RechazoFila {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.detalle, self.motivo.as_str())
    }
}

/// Normalize one client row. All three fields are required and must be
/// non-empty after trimming; nothing is defaulted.
pub fn normalizar_cliente(fila: &FilaCliente) -> Result<NuevoCliente, RechazoFila> {
    let nombre = campo_obligatorio(&fila.nombre, "nombre")?;
    let email = campo_obligatorio(&fila.email, "email")?;
    let telefono = campo_obligatorio(&fila.telefono, "telefono")?;

    Ok(NuevoCliente {
        nombre,
        email,
        telefono,
    })
}

/// Normalize one incident row. `estado` defaults to ABIERTA and `fecha`
/// to the ingestion date; those are the only defaulted fields.
pub fn normalizar_incidencia(
    fila: &FilaIncidencia,
    fecha_ingesta: NaiveDate,
) -> Result<NuevaIncidencia, RechazoFila> {
    let id_cliente_crudo = campo_obligatorio(&fila.id_cliente, "id_cliente")?;
    let id_cliente: i64 = id_cliente_crudo.parse().map_err(|_| {
        RechazoFila::nuevo(
            MotivoRechazo::InvalidType,
            format!("id_cliente no es un entero: '{id_cliente_crudo}'"),
        )
    })?;

    let descripcion = campo_obligatorio(&fila.descripcion, "descripcion")?;

    let estado = match valor_presente(&fila.estado) {
        None => Estado::Abierta,
        Some(crudo) => crudo.parse().map_err(|_| {
            RechazoFila::nuevo(
                MotivoRechazo::InvalidType,
                format!("estado no reconocido: '{crudo}'"),
            )
        })?,
    };

    let fecha = match valor_presente(&fila.fecha) {
        None => fecha_ingesta.format(FORMATO_FECHA).to_string(),
        Some(crudo) => {
            NaiveDate::parse_from_str(&crudo, FORMATO_FECHA).map_err(|_| {
                RechazoFila::nuevo(
                    MotivoRechazo::MalformedDate,
                    format!("fecha no válida (se espera DD-MM-YYYY): '{crudo}'"),
                )
            })?;
            crudo
        }
    };

    Ok(NuevaIncidencia {
        id_cliente,
        fecha,
        descripcion,
        estado,
    })
}

/// Validate a caller-supplied date string against the contract format.
pub fn fecha_valida(fecha: &str) -> bool {
    NaiveDate::parse_from_str(fecha.trim(), FORMATO_FECHA).is_ok()
}

fn valor_presente(campo: &Option<String>) -> Option<String> {
    campo
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn campo_obligatorio(campo: &Option<String>, nombre: &str) -> Result<String, RechazoFila> {
    valor_presente(campo).ok_or_else(|| {
        RechazoFila::nuevo(
            MotivoRechazo::MissingField,
            format!("campo obligatorio '{nombre}' ausente o vacío"),
        )
    })
}
