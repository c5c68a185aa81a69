//! Dedup resolver
//!
//! Decides, per normalized candidate, whether to insert or skip. The
//! decision consults the store *and* an in-batch accumulator: two rows of
//! the same file that collide must resolve first-in-file-wins even though
//! the first one is not yet visible to a plain store read at decision
//! time. The accumulator is an explicit value owned by the batch, not
//! ambient state.

use std::collections::HashSet;

use soportes_common::{NuevaIncidencia, NuevoCliente, Result};
use sqlx::SqlitePool;

use crate::db;

/// Outcome of a dedup check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Insertar,
    Duplicado,
}

/// Per-batch dedup state. Natural keys: normalized (lowercased) email for
/// clients, (id_cliente, descripcion, fecha) for incidents.
#[derive(Debug, Default)]
pub struct ResolutorDuplicados {
    emails: HashSet<String>,
    incidencias: HashSet<(i64, String, String)>,
}

impl ResolutorDuplicados {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a client candidate. On `Insertar` the key is accumulated
    /// so later rows of the same batch see it as a duplicate.
    pub async fn resolver_cliente(
        &mut self,
        pool: &SqlitePool,
        candidato: &NuevoCliente,
    ) -> Result<Decision> {
        let clave = candidato.email.to_lowercase();

        if self.emails.contains(&clave) {
            return Ok(Decision::Duplicado);
        }
        if db::clientes::buscar_por_email(pool, &candidato.email)
            .await?
            .is_some()
        {
            return Ok(Decision::Duplicado);
        }

        self.emails.insert(clave);
        Ok(Decision::Insertar)
    }

    /// Resolve an incident candidate against its natural key tuple.
    pub async fn resolver_incidencia(
        &mut self,
        pool: &SqlitePool,
        candidata: &NuevaIncidencia,
    ) -> Result<Decision> {
        let clave = (
            candidata.id_cliente,
            candidata.descripcion.clone(),
            candidata.fecha.clone(),
        );

        if self.incidencias.contains(&clave) {
            return Ok(Decision::Duplicado);
        }
        if db::incidencias::existe_incidencia(
            pool,
            candidata.id_cliente,
            &candidata.descripcion,
            &candidata.fecha,
        )
        .await?
        {
            return Ok(Decision::Duplicado);
        }

        self.incidencias.insert(clave);
        Ok(Decision::Insertar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soportes_common::db::init_schema;
    use soportes_common::Estado;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        pool
    }

    fn candidato(email: &str) -> NuevoCliente {
        NuevoCliente {
            nombre: "Ana".into(),
            email: email.into(),
            telefono: "600111222".into(),
        }
    }

    fn candidata(id_cliente: i64, descripcion: &str, fecha: &str) -> NuevaIncidencia {
        NuevaIncidencia {
            id_cliente,
            fecha: fecha.into(),
            descripcion: descripcion.into(),
            estado: Estado::Abierta,
        }
    }

    #[tokio::test]
    async fn primera_aparicion_en_lote_gana() {
        let pool = test_pool().await;
        let mut resolutor = ResolutorDuplicados::new();

        let primera = resolutor
            .resolver_cliente(&pool, &candidato("ana@ejemplo.com"))
            .await
            .unwrap();
        assert_eq!(primera, Decision::Insertar);

        // Same email, different case, later in the same batch: duplicate
        // even though nothing has hit the store yet
        let segunda = resolutor
            .resolver_cliente(&pool, &candidato("ANA@ejemplo.com"))
            .await
            .unwrap();
        assert_eq!(segunda, Decision::Duplicado);
    }

    #[tokio::test]
    async fn duplicado_contra_estado_previo_del_almacen() {
        let pool = test_pool().await;
        db::clientes::insertar_cliente(&pool, &candidato("ana@ejemplo.com"))
            .await
            .unwrap()
            .expect("first insert should succeed");

        let mut resolutor = ResolutorDuplicados::new();
        let decision = resolutor
            .resolver_cliente(&pool, &candidato("Ana@Ejemplo.Com"))
            .await
            .unwrap();
        assert_eq!(decision, Decision::Duplicado);
    }

    #[tokio::test]
    async fn incidencias_deduplican_por_tupla() {
        let pool = test_pool().await;
        db::clientes::insertar_cliente(&pool, &candidato("ana@ejemplo.com"))
            .await
            .unwrap();

        let mut resolutor = ResolutorDuplicados::new();

        let primera = resolutor
            .resolver_incidencia(&pool, &candidata(1, "No arranca", "01-03-2025"))
            .await
            .unwrap();
        assert_eq!(primera, Decision::Insertar);

        let repetida = resolutor
            .resolver_incidencia(&pool, &candidata(1, "No arranca", "01-03-2025"))
            .await
            .unwrap();
        assert_eq!(repetida, Decision::Duplicado);

        // A different date is a different natural key
        let distinta = resolutor
            .resolver_incidencia(&pool, &candidata(1, "No arranca", "02-03-2025"))
            .await
            .unwrap();
        assert_eq!(distinta, Decision::Insertar);
    }
}
