//! Error type for the provisioning pipeline.
//!
//! Everything except the ad-hoc query runner fails fast with a [`DbError`];
//! the runner reports failures as data instead (see [`crate::query`]).

use thiserror::Error;

use crate::seed::FixtureError;

/// Errors raised while connecting, provisioning or seeding.
#[derive(Debug, Error)]
pub enum DbError {
    /// The server could not be reached or rejected the login.
    #[error("connection to database {database} failed: {source}")]
    Connection {
        /// Database the session was opening.
        database: String,
        #[source]
        source: sqlx::Error,
    },

    /// Creating, dropping or clearing sessions of a database failed.
    #[error("administrative operation on database {database} failed: {source}")]
    Admin {
        /// Database being administered.
        database: String,
        #[source]
        source: sqlx::Error,
    },

    /// A reset was requested for the database the administrative session is
    /// connected to.
    #[error(
        "cannot reset {0}: it is the maintenance database; set DB_NAME to a different database"
    )]
    MaintenanceIsTarget(String),

    /// Table creation failed.
    #[error("schema error: {0}")]
    Schema(#[source] sqlx::Error),

    /// An insert in the seed transaction failed; nothing was kept.
    #[error("seed error: {0}")]
    Seed(#[source] sqlx::Error),

    /// An insert violated a unique constraint; nothing was kept.
    #[error("seed conflict on {constraint}: {message}")]
    SeedConflict {
        /// Name of the violated constraint, if the engine reported one.
        constraint: String,
        /// Engine message.
        message: String,
    },

    /// The seed fixtures could not be loaded or are inconsistent.
    #[error("fixture error: {0}")]
    Fixtures(#[from] FixtureError),
}

impl DbError {
    /// Classify an insert failure, separating unique violations from the rest.
    pub(crate) fn from_seed(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::SeedConflict {
                constraint: db_err.constraint().unwrap_or("unknown").to_owned(),
                message: db_err.message().to_owned(),
            };
        }
        Self::Seed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = DbError::MaintenanceIsTarget("postgres".to_string());
        assert!(err.to_string().starts_with("cannot reset postgres"));

        let err = DbError::SeedConflict {
            constraint: "usuarios_email_key".to_string(),
            message: "duplicate key value violates unique constraint".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "seed conflict on usuarios_email_key: duplicate key value violates unique constraint"
        );
    }

    #[test]
    fn test_from_seed_keeps_non_database_errors() {
        let err = DbError::from_seed(sqlx::Error::RowNotFound);
        assert!(matches!(err, DbError::Seed(sqlx::Error::RowNotFound)));
    }
}
