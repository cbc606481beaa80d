//! Shared helpers for the tienda integration tests.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tienda-integration-tests -- --ignored
//! ```
//!
//! Tests need a reachable PostgreSQL server configured through the `DB_*`
//! variables and a role allowed to create databases.

#![cfg_attr(not(test), forbid(unsafe_code))]

use tienda_core::DatabaseName;
use tienda_store::{
    AdminSession, DatabaseConfig, DbError, SeedFixtures, SeedSummary, Session, create_tables,
    drop_database, ensure_database, insert_sample_data,
};
use uuid::Uuid;

/// A uniquely named database owned by one test.
#[derive(Debug)]
pub struct TestDatabase {
    pub config: DatabaseConfig,
    pub name: DatabaseName,
}

impl TestDatabase {
    /// Pick a fresh name. Nothing is created yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the `DB_*` configuration is invalid.
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config = DatabaseConfig::from_env()?;
        let name = DatabaseName::parse(&format!("tienda_it_{}", Uuid::new_v4().simple()))?;
        Ok(Self { config, name })
    }

    /// Open an administrative session on the maintenance database.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Connection` if the server is unreachable.
    pub async fn admin(&self) -> Result<AdminSession, DbError> {
        AdminSession::connect(&self.config).await
    }

    /// Open a session on this test's database.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Connection` if the database does not exist.
    pub async fn session(&self) -> Result<Session, DbError> {
        Session::connect(&self.config, Some(&self.name)).await
    }

    /// Create the database and its empty tables.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    pub async fn prepare(&self) -> Result<Session, DbError> {
        let mut admin = self.admin().await?;
        ensure_database(&mut admin, &self.name).await?;
        admin.close().await?;

        let mut session = self.session().await?;
        create_tables(&mut session).await?;
        Ok(session)
    }

    /// Create the database and tables, then seed the bundled fixtures.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    pub async fn provision(&self) -> Result<(Session, SeedSummary), DbError> {
        let mut session = self.prepare().await?;
        let summary = insert_sample_data(&mut session, &SeedFixtures::bundled()?).await?;
        Ok((session, summary))
    }

    /// Drop the database, terminating any session still on it.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Admin` if the drop fails.
    pub async fn cleanup(self) -> Result<(), DbError> {
        let mut admin = self.admin().await?;
        drop_database(&mut admin, &self.name).await?;
        admin.close().await
    }
}
