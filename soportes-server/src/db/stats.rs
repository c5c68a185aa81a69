//! Aggregate counts for the dashboard statistics endpoint

use soportes_common::{Estado, Prioridad, Result};
use sqlx::SqlitePool;

pub async fn contar_clientes(pool: &SqlitePool) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clientes")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

pub async fn contar_incidencias(pool: &SqlitePool) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM incidencias")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

pub async fn contar_por_prioridad(pool: &SqlitePool, prioridad: Prioridad) -> Result<i64> {
    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM incidencias WHERE prioridad_ia = ?")
            .bind(prioridad.as_str())
            .fetch_one(pool)
            .await?;
    Ok(total)
}

pub async fn contar_por_estado(pool: &SqlitePool, estado: Estado) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM incidencias WHERE estado = ?")
        .bind(estado.as_str())
        .fetch_one(pool)
        .await?;
    Ok(total)
}
