//! Incident intake pipeline
//!
//! CSV bytes flow through the normalizer, the dedup resolver and (for
//! incidents) the priority classifier before being persisted. Row-level
//! failures are contained and logged; only an absent batch or an
//! unreachable store aborts the request.

pub mod clasificador;
pub mod dedup;
pub mod normalizer;
pub mod pipeline;

pub use clasificador::{reglas_por_defecto, Clasificador, Regla};
pub use dedup::{Decision, ResolutorDuplicados};
pub use pipeline::{ingerir, ResultadoEtl};
