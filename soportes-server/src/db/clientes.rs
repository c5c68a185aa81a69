//! Client database operations

use soportes_common::{Cliente, NuevoCliente, Result};
use sqlx::{Row, SqlitePool};

/// Insert a client, returning the assigned id, or `None` when the email
/// already exists. The UNIQUE constraint on `email` (case-insensitive)
/// makes the duplicate check atomic with respect to concurrent batches.
pub async fn insertar_cliente(pool: &SqlitePool, nuevo: &NuevoCliente) -> Result<Option<i64>> {
    let resultado = sqlx::query(
        r#"
        INSERT INTO clientes (nombre, email, telefono)
        VALUES (?, ?, ?)
        ON CONFLICT(email) DO NOTHING
        "#,
    )
    .bind(&nuevo.nombre)
    .bind(&nuevo.email)
    .bind(&nuevo.telefono)
    .execute(pool)
    .await?;

    if resultado.rows_affected() == 0 {
        Ok(None)
    } else {
        Ok(Some(resultado.last_insert_rowid()))
    }
}

/// Look up a client by email, case-insensitively.
pub async fn buscar_por_email(pool: &SqlitePool, email: &str) -> Result<Option<Cliente>> {
    let fila = sqlx::query(
        r#"
        SELECT id, nombre, email, telefono
        FROM clientes
        WHERE email = ? COLLATE NOCASE
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(fila.map(|fila| mapear_cliente(&fila)))
}

/// Load a client by id.
pub async fn obtener_cliente(pool: &SqlitePool, id: i64) -> Result<Option<Cliente>> {
    let fila = sqlx::query(
        r#"
        SELECT id, nombre, email, telefono
        FROM clientes
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(fila.map(|fila| mapear_cliente(&fila)))
}

/// Whether a client with this id exists.
pub async fn existe_cliente(pool: &SqlitePool, id: i64) -> Result<bool> {
    let existe: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clientes WHERE id = ?)")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(existe)
}

/// All clients ordered alphabetically by name.
pub async fn clientes_ordenados(pool: &SqlitePool) -> Result<Vec<Cliente>> {
    let filas = sqlx::query(
        r#"
        SELECT id, nombre, email, telefono
        FROM clientes
        ORDER BY nombre ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(filas.iter().map(mapear_cliente).collect())
}

fn mapear_cliente(fila: &sqlx::sqlite::SqliteRow) -> Cliente {
    Cliente {
        id: fila.get("id"),
        nombre: fila.get("nombre"),
        email: fila.get("email"),
        telefono: fila.get("telefono"),
    }
}
