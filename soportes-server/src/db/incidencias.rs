//! Incident database operations

use soportes_common::{Estado, Incidencia, NuevaIncidencia, Prioridad, Result};
use sqlx::{Row, SqlitePool};

/// Insert an incident with its computed priority, returning the assigned
/// id, or `None` when the (id_cliente, descripcion, fecha) natural key
/// already exists.
pub async fn insertar_incidencia(
    pool: &SqlitePool,
    nueva: &NuevaIncidencia,
    prioridad: Prioridad,
) -> Result<Option<i64>> {
    let resultado = sqlx::query(
        r#"
        INSERT INTO incidencias (id_cliente, fecha, descripcion, estado, prioridad_ia)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(id_cliente, descripcion, fecha) DO NOTHING
        "#,
    )
    .bind(nueva.id_cliente)
    .bind(&nueva.fecha)
    .bind(&nueva.descripcion)
    .bind(nueva.estado.as_str())
    .bind(prioridad.as_str())
    .execute(pool)
    .await?;

    if resultado.rows_affected() == 0 {
        Ok(None)
    } else {
        Ok(Some(resultado.last_insert_rowid()))
    }
}

/// Whether an incident with this natural key is already stored.
pub async fn existe_incidencia(
    pool: &SqlitePool,
    id_cliente: i64,
    descripcion: &str,
    fecha: &str,
) -> Result<bool> {
    let existe: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM incidencias
            WHERE id_cliente = ? AND descripcion = ? AND fecha = ?
        )
        "#,
    )
    .bind(id_cliente)
    .bind(descripcion)
    .bind(fecha)
    .fetch_one(pool)
    .await?;

    Ok(existe)
}

/// Load an incident by id.
pub async fn obtener_incidencia(pool: &SqlitePool, id: i64) -> Result<Option<Incidencia>> {
    let fila = sqlx::query(
        r#"
        SELECT id, id_cliente, fecha, descripcion, estado, prioridad_ia
        FROM incidencias
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    fila.map(|fila| mapear_incidencia(&fila)).transpose()
}

/// All incidents of one client, most recently created first.
pub async fn incidencias_de_cliente(pool: &SqlitePool, id_cliente: i64) -> Result<Vec<Incidencia>> {
    let filas = sqlx::query(
        r#"
        SELECT id, id_cliente, fecha, descripcion, estado, prioridad_ia
        FROM incidencias
        WHERE id_cliente = ?
        ORDER BY fecha_creacion DESC, id DESC
        "#,
    )
    .bind(id_cliente)
    .fetch_all(pool)
    .await?;

    filas.iter().map(mapear_incidencia).collect()
}

/// Persist a status change. Only `estado` is touched; in particular
/// `prioridad_ia` keeps its creation-time value.
pub async fn actualizar_estado(pool: &SqlitePool, id: i64, estado: Estado) -> Result<()> {
    sqlx::query("UPDATE incidencias SET estado = ? WHERE id = ?")
        .bind(estado.as_str())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

fn mapear_incidencia(fila: &sqlx::sqlite::SqliteRow) -> Result<Incidencia> {
    let estado: String = fila.get("estado");
    let prioridad: String = fila.get("prioridad_ia");

    Ok(Incidencia {
        id: fila.get("id"),
        id_cliente: fila.get("id_cliente"),
        fecha: fila.get("fecha"),
        descripcion: fila.get("descripcion"),
        estado: estado.parse()?,
        prioridad_ia: prioridad.parse()?,
    })
}
