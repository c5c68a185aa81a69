//! Database initialization
//!
//! Opens (or creates) the SQLite database and brings the schema up to
//! date. Schema creation is idempotent so every service start can run it.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Initialize database connection pool and create tables if needed.
///
/// The pool's `acquire_timeout` is the store-access timeout: a saturated
/// or unreachable store surfaces as `sqlx::Error::PoolTimedOut` instead
/// of hanging the request.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // mode=rwc creates the database file on first run
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers while one batch writes
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    // Bounded wait on a locked database instead of an immediate failure
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent - safe to call multiple times).
///
/// The UNIQUE constraints are the store-level natural keys: duplicate
/// checks and inserts from concurrent batches are serialized here rather
/// than through application locking.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    create_clientes_table(pool).await?;
    create_incidencias_table(pool).await?;
    Ok(())
}

/// Clients table. `email` is the natural key, compared case-insensitively.
async fn create_clientes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clientes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL,
            email TEXT NOT NULL COLLATE NOCASE UNIQUE,
            telefono TEXT NOT NULL,
            fecha_creacion TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Incidents table. The natural key is (id_cliente, descripcion, fecha):
/// re-uploading the same CSV must not inflate record counts.
async fn create_incidencias_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS incidencias (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            id_cliente INTEGER NOT NULL REFERENCES clientes(id),
            fecha TEXT NOT NULL,
            descripcion TEXT NOT NULL,
            estado TEXT NOT NULL DEFAULT 'ABIERTA',
            prioridad_ia TEXT NOT NULL DEFAULT 'NORMAL',
            fecha_creacion TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (id_cliente, descripcion, fecha)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
