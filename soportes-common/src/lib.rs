//! # Soportes Common Library
//!
//! Shared code for the incident tracking backend:
//! - Domain models (`Cliente`, `Incidencia`, `Estado`, `Prioridad`)
//! - Common error types
//! - Database initialization and schema

pub mod db;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{Cliente, Estado, Incidencia, NuevaIncidencia, NuevoCliente, Prioridad};
