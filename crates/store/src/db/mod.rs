//! Sessions against the PostgreSQL server.
//!
//! Two kinds of session exist and are never interchangeable:
//!
//! - [`AdminSession`] is bound to the maintenance database from
//!   [`DatabaseConfig::name`]. It exposes no way to open a transaction, so
//!   every statement it runs commits on its own. `CREATE DATABASE` and
//!   `DROP DATABASE` cannot run inside a transaction block, and a database
//!   cannot be dropped from a session connected to it.
//! - [`Session`] is bound to the target database and dereferences to the
//!   underlying [`PgConnection`] for table creation, seeding and queries.
//!
//! Each session is a single connection; there is no pool. Dropping a session
//! closes its socket, so every early return releases it.

pub mod schema;

use std::ops::{Deref, DerefMut};

use sqlx::{Connection, PgConnection};
use tracing::{debug, instrument};

use tienda_core::DatabaseName;

use crate::config::DatabaseConfig;
use crate::error::DbError;

pub use schema::{
    DatabaseStatus, ResetReport, create_tables, database_exists, drop_database, ensure_database,
    reset_database,
};

/// Open a connection to `database`, or to the configured default.
async fn connect(
    config: &DatabaseConfig,
    database: Option<&DatabaseName>,
) -> Result<(PgConnection, DatabaseName), DbError> {
    let name = database.unwrap_or(&config.name).clone();
    debug!(host = %config.host, port = config.port, database = %name, "Connecting");

    let conn = PgConnection::connect_with(&config.connect_options(Some(&name)))
        .await
        .map_err(|source| DbError::Connection {
            database: name.to_string(),
            source,
        })?;

    Ok((conn, name))
}

/// A session on a target database.
#[derive(Debug)]
pub struct Session {
    conn: PgConnection,
    database: DatabaseName,
}

impl Session {
    /// Connect to `database`, or to [`DatabaseConfig::name`] when `None`.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Connection` if the server is unreachable or rejects
    /// the credentials.
    #[instrument(skip(config), fields(host = %config.host))]
    pub async fn connect(
        config: &DatabaseConfig,
        database: Option<&DatabaseName>,
    ) -> Result<Self, DbError> {
        let (conn, database) = connect(config, database).await?;
        Ok(Self { conn, database })
    }

    /// The database this session is bound to.
    #[must_use]
    pub const fn database(&self) -> &DatabaseName {
        &self.database
    }

    /// Close the session gracefully.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Connection` if the terminate handshake fails.
    pub async fn close(self) -> Result<(), DbError> {
        let database = self.database.to_string();
        self.conn
            .close()
            .await
            .map_err(|source| DbError::Connection { database, source })
    }
}

impl Deref for Session {
    type Target = PgConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

/// An autocommit session on the maintenance database.
#[derive(Debug)]
pub struct AdminSession {
    conn: PgConnection,
    database: DatabaseName,
}

impl AdminSession {
    /// Connect to the maintenance database ([`DatabaseConfig::name`]).
    ///
    /// # Errors
    ///
    /// Returns `DbError::Connection` if the server is unreachable or rejects
    /// the credentials.
    #[instrument(skip(config), fields(host = %config.host, database = %config.name))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbError> {
        let (conn, database) = connect(config, None).await?;
        Ok(Self { conn, database })
    }

    /// The maintenance database this session is bound to.
    #[must_use]
    pub const fn database(&self) -> &DatabaseName {
        &self.database
    }

    /// Close the session gracefully.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Connection` if the terminate handshake fails.
    pub async fn close(self) -> Result<(), DbError> {
        let database = self.database.to_string();
        self.conn
            .close()
            .await
            .map_err(|source| DbError::Connection { database, source })
    }

    pub(crate) const fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }
}
