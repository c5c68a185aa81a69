//! Database access helpers, one module per table plus aggregate queries

pub mod clientes;
pub mod incidencias;
pub mod stats;
