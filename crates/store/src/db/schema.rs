//! Database lifecycle and table definitions.
//!
//! # Tables
//!
//! - `usuarios` - Registered users, unique by email
//! - `productos` - Catalog with price and stock
//! - `ordenes` - Orders owned by a user, with status and stored total
//! - `orden_producto` - Order lines with a unit-price snapshot; a product
//!   appears at most once per order

use sqlx::{Connection, PgConnection};
use tracing::{info, instrument, warn};

use tienda_core::DatabaseName;

use super::AdminSession;
use crate::error::DbError;

/// SQLSTATE `duplicate_database`.
const DUPLICATE_DATABASE: &str = "42P04";

const CREATE_USUARIOS: &str = r"
CREATE TABLE IF NOT EXISTS usuarios (
    id SERIAL PRIMARY KEY,
    nombre VARCHAR(100) NOT NULL,
    email VARCHAR(100) UNIQUE NOT NULL,
    fecha_registro TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

const CREATE_PRODUCTOS: &str = r"
CREATE TABLE IF NOT EXISTS productos (
    id SERIAL PRIMARY KEY,
    nombre VARCHAR(100) NOT NULL,
    descripcion TEXT,
    precio DECIMAL(10, 2) NOT NULL CHECK (precio >= 0),
    stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0)
)";

const CREATE_ORDENES: &str = r"
CREATE TABLE IF NOT EXISTS ordenes (
    id SERIAL PRIMARY KEY,
    usuario_id INTEGER REFERENCES usuarios(id),
    fecha_orden TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    estado VARCHAR(20) DEFAULT 'pendiente',
    total DECIMAL(10, 2) NOT NULL
)";

const CREATE_ORDEN_PRODUCTO: &str = r"
CREATE TABLE IF NOT EXISTS orden_producto (
    id SERIAL PRIMARY KEY,
    orden_id INTEGER REFERENCES ordenes(id),
    producto_id INTEGER REFERENCES productos(id),
    cantidad INTEGER NOT NULL,
    precio_unitario DECIMAL(10, 2) NOT NULL,
    CONSTRAINT orden_producto_unique UNIQUE (orden_id, producto_id)
)";

/// Table names paired with their DDL, in foreign-key dependency order.
pub const TABLES: [(&str, &str); 4] = [
    ("usuarios", CREATE_USUARIOS),
    ("productos", CREATE_PRODUCTOS),
    ("ordenes", CREATE_ORDENES),
    ("orden_producto", CREATE_ORDEN_PRODUCTO),
];

/// Outcome of [`ensure_database`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseStatus {
    /// The database was absent and has been created.
    Created,
    /// The database already existed and was left untouched.
    AlreadyExists,
}

/// Outcome of [`drop_database`] and [`reset_database`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetReport {
    /// Other sessions that were connected to the target and got terminated.
    pub terminated_sessions: usize,
    /// Whether the database existed before the drop.
    pub existed: bool,
}

/// Check the catalog for a database by name.
async fn lookup(conn: &mut PgConnection, name: &DatabaseName) -> Result<bool, sqlx::Error> {
    let found = sqlx::query_scalar::<_, i32>(
        "SELECT 1 FROM pg_catalog.pg_database WHERE datname = $1",
    )
    .bind(name.as_str())
    .fetch_optional(&mut *conn)
    .await?;
    Ok(found.is_some())
}

/// Create `name` unless the catalog already lists it.
///
/// Idempotent: a second call reports [`DatabaseStatus::AlreadyExists`]. A
/// concurrent creator winning the race between the lookup and the create is
/// reported the same way.
///
/// # Errors
///
/// Returns `DbError::Admin` if the lookup or the create fails.
#[instrument(skip(admin), fields(database = %name))]
pub async fn ensure_database(
    admin: &mut AdminSession,
    name: &DatabaseName,
) -> Result<DatabaseStatus, DbError> {
    let admin_err = |source| DbError::Admin {
        database: name.to_string(),
        source,
    };
    let conn = admin.connection();

    if lookup(conn, name).await.map_err(admin_err)? {
        info!("Database {name} already exists");
        return Ok(DatabaseStatus::AlreadyExists);
    }

    let create = format!("CREATE DATABASE {}", name.quoted());
    match sqlx::raw_sql(&create).execute(&mut *conn).await {
        Ok(_) => {
            info!("Database {name} created successfully");
            Ok(DatabaseStatus::Created)
        }
        Err(sqlx::Error::Database(ref db_err))
            if db_err.code().as_deref() == Some(DUPLICATE_DATABASE) =>
        {
            info!("Database {name} already exists");
            Ok(DatabaseStatus::AlreadyExists)
        }
        Err(source) => Err(admin_err(source)),
    }
}

/// Whether the catalog lists a database called `name`.
///
/// # Errors
///
/// Returns `DbError::Admin` if the lookup fails.
pub async fn database_exists(
    admin: &mut AdminSession,
    name: &DatabaseName,
) -> Result<bool, DbError> {
    lookup(admin.connection(), name)
        .await
        .map_err(|source| DbError::Admin {
            database: name.to_string(),
            source,
        })
}

/// Terminate every other session on `name` and drop it if it exists.
///
/// The engine refuses to drop a database that has connections, so sessions
/// are terminated first. Dropping a database that does not exist succeeds.
///
/// # Errors
///
/// Returns `DbError::MaintenanceIsTarget` if `admin` is connected to `name`,
/// or `DbError::Admin` if terminating sessions or dropping fails.
#[instrument(skip(admin), fields(database = %name))]
pub async fn drop_database(
    admin: &mut AdminSession,
    name: &DatabaseName,
) -> Result<ResetReport, DbError> {
    if admin.database() == name {
        return Err(DbError::MaintenanceIsTarget(name.to_string()));
    }

    let admin_err = |source| DbError::Admin {
        database: name.to_string(),
        source,
    };
    let conn = admin.connection();

    let existed = lookup(conn, name).await.map_err(admin_err)?;

    let terminated = sqlx::query_scalar::<_, Option<bool>>(
        r"
        SELECT pg_terminate_backend(pg_stat_activity.pid)
        FROM pg_stat_activity
        WHERE pg_stat_activity.datname = $1
          AND pid <> pg_backend_pid()
        ",
    )
    .bind(name.as_str())
    .fetch_all(&mut *conn)
    .await
    .map_err(admin_err)?;

    let terminated_sessions = terminated.iter().filter(|ok| ok.unwrap_or(false)).count();
    if terminated_sessions < terminated.len() {
        warn!(
            requested = terminated.len(),
            terminated = terminated_sessions,
            "Some sessions could not be terminated"
        );
    } else if terminated_sessions > 0 {
        info!(terminated = terminated_sessions, "Terminated open sessions");
    }

    sqlx::raw_sql(&format!("DROP DATABASE IF EXISTS {}", name.quoted()))
        .execute(&mut *conn)
        .await
        .map_err(admin_err)?;
    info!("Database {name} dropped");

    Ok(ResetReport {
        terminated_sessions,
        existed,
    })
}

/// Drop `name` if it exists and recreate it empty.
///
/// Runs [`drop_database`], then `CREATE DATABASE`, both from `admin`, which
/// is bound to the maintenance database. Any failure aborts the sequence;
/// nothing is retried or rolled back.
///
/// # Errors
///
/// Returns `DbError::MaintenanceIsTarget` if `admin` is connected to `name`,
/// or `DbError::Admin` if terminating sessions, dropping or creating fails.
#[instrument(skip(admin), fields(database = %name))]
pub async fn reset_database(
    admin: &mut AdminSession,
    name: &DatabaseName,
) -> Result<ResetReport, DbError> {
    let report = drop_database(admin, name).await?;

    sqlx::raw_sql(&format!("CREATE DATABASE {}", name.quoted()))
        .execute(&mut *admin.connection())
        .await
        .map_err(|source| DbError::Admin {
            database: name.to_string(),
            source,
        })?;
    info!("Database {name} recreated successfully");

    Ok(report)
}

/// Create the four storefront tables if they do not exist.
///
/// All statements run in one transaction, committed at the end; on error the
/// transaction is dropped and rolled back. Safe to call repeatedly.
///
/// # Errors
///
/// Returns `DbError::Schema` if any statement or the commit fails.
#[instrument(skip(conn))]
pub async fn create_tables(conn: &mut PgConnection) -> Result<(), DbError> {
    let mut tx = conn.begin().await.map_err(DbError::Schema)?;

    for (table, ddl) in TABLES {
        sqlx::raw_sql(ddl)
            .execute(&mut *tx)
            .await
            .map_err(DbError::Schema)?;
        tracing::debug!(table, "Table ensured");
    }

    tx.commit().await.map_err(DbError::Schema)?;
    info!(tables = TABLES.len(), "Tables created successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_in_dependency_order() {
        let names: Vec<&str> = TABLES.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["usuarios", "productos", "ordenes", "orden_producto"]);

        // Every table referenced by a foreign key is created earlier
        for (index, (_, ddl)) in TABLES.iter().enumerate() {
            for (earlier, _) in TABLES.iter().skip(index) {
                assert!(
                    !ddl.contains(&format!("REFERENCES {earlier}(")),
                    "{earlier} referenced before creation"
                );
            }
        }
    }

    #[test]
    fn test_ddl_is_idempotent() {
        for (name, ddl) in TABLES {
            assert!(
                ddl.contains(&format!("CREATE TABLE IF NOT EXISTS {name} (")),
                "{name} must use IF NOT EXISTS"
            );
        }
    }

    #[test]
    fn test_order_line_uniqueness_constraint() {
        assert!(CREATE_ORDEN_PRODUCTO.contains("UNIQUE (orden_id, producto_id)"));
    }

    #[test]
    fn test_defaults_and_checks() {
        assert!(CREATE_ORDENES.contains("DEFAULT 'pendiente'"));
        assert!(CREATE_PRODUCTOS.contains("stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0)"));
        assert!(CREATE_PRODUCTOS.contains("CHECK (precio >= 0)"));
        assert!(CREATE_USUARIOS.contains("email VARCHAR(100) UNIQUE NOT NULL"));
    }
}
