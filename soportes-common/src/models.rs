//! Domain models shared across the service
//!
//! Field names follow the wire contract consumed by the frontend
//! (`nombre`, `telefono`, `prioridad_ia`, ...) so the structs serialize
//! directly into API responses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A registered client. `email` is the natural key: the store enforces
/// at most one client per email, compared case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cliente {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    pub telefono: String,
}

/// A stored incident. `prioridad_ia` is computed once at creation from
/// the description and never recomputed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incidencia {
    pub id: i64,
    pub id_cliente: i64,
    /// Calendar date in DD-MM-YYYY format, as supplied by the caller.
    pub fecha: String,
    pub descripcion: String,
    pub estado: Estado,
    pub prioridad_ia: Prioridad,
}

/// A validated client candidate, not yet stored. The id is assigned by
/// the store on insert.
#[derive(Debug, Clone)]
pub struct NuevoCliente {
    pub nombre: String,
    pub email: String,
    pub telefono: String,
}

/// A validated incident candidate, not yet stored and not yet classified.
#[derive(Debug, Clone)]
pub struct NuevaIncidencia {
    pub id_cliente: i64,
    pub fecha: String,
    pub descripcion: String,
    pub estado: Estado,
}

/// Incident lifecycle state. Any state may transition to any other,
/// including itself; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Estado {
    #[serde(rename = "ABIERTA")]
    Abierta,
    #[serde(rename = "EN PROCESO")]
    EnProceso,
    #[serde(rename = "CERRADA")]
    Cerrada,
}

impl Estado {
    /// All recognized states, in display order.
    pub const TODOS: [Estado; 3] = [Estado::Abierta, Estado::EnProceso, Estado::Cerrada];

    pub fn as_str(&self) -> &'static str {
        match self {
            Estado::Abierta => "ABIERTA",
            Estado::EnProceso => "EN PROCESO",
            Estado::Cerrada => "CERRADA",
        }
    }
}

impl fmt::Display for Estado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Estado {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ABIERTA" => Ok(Estado::Abierta),
            "EN PROCESO" => Ok(Estado::EnProceso),
            "CERRADA" => Ok(Estado::Cerrada),
            otro => Err(Error::InvalidInput(format!(
                "Estado no reconocido: '{otro}'. Valores permitidos: ABIERTA, EN PROCESO, CERRADA"
            ))),
        }
    }
}

/// Automated priority level, from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prioridad {
    #[serde(rename = "CRÍTICA")]
    Critica,
    #[serde(rename = "ALTA")]
    Alta,
    #[serde(rename = "MEDIA")]
    Media,
    #[serde(rename = "NORMAL")]
    Normal,
}

impl Prioridad {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prioridad::Critica => "CRÍTICA",
            Prioridad::Alta => "ALTA",
            Prioridad::Media => "MEDIA",
            Prioridad::Normal => "NORMAL",
        }
    }

    /// Numeric severity rank. Higher is more severe; used to keep
    /// classifier rules ordered most-severe-first.
    pub fn severidad(&self) -> u8 {
        match self {
            Prioridad::Critica => 3,
            Prioridad::Alta => 2,
            Prioridad::Media => 1,
            Prioridad::Normal => 0,
        }
    }
}

impl fmt::Display for Prioridad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Prioridad {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "CRÍTICA" => Ok(Prioridad::Critica),
            "ALTA" => Ok(Prioridad::Alta),
            "MEDIA" => Ok(Prioridad::Media),
            "NORMAL" => Ok(Prioridad::Normal),
            otro => Err(Error::InvalidInput(format!(
                "Prioridad no reconocida: '{otro}'"
            ))),
        }
    }
}
