//! Database configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `DB_NAME` - Maintenance database used for administrative sessions (default: postgres)
//! - `DB_USER` - Login role (default: postgres)
//! - `DB_PASSWORD` - Login password (default: password)
//! - `DB_HOST` - Server host (default: localhost)
//! - `DB_PORT` - Server port (default: 5432)
//!
//! A `.env` file in the working directory is loaded first if present.

use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

use tienda_core::{DatabaseName, DatabaseNameError};

const DEFAULT_NAME: &str = "postgres";
const DEFAULT_USER: &str = "postgres";
const DEFAULT_PASSWORD: &str = "password";
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Invalid database name in {0}: {1}")]
    InvalidDatabaseName(String, DatabaseNameError),
}

/// Connection parameters for the PostgreSQL server.
///
/// Built once at process start and passed by reference to whatever opens
/// sessions. Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct DatabaseConfig {
    /// Database sessions connect to when no target is given. Administrative
    /// sessions always use it.
    pub name: DatabaseName,
    /// Login role
    pub user: String,
    /// Login password
    pub password: SecretString,
    /// Server host name or address
    pub host: String,
    /// Server port
    pub port: u16,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl DatabaseConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `DB_PORT` is not a port number or `DB_NAME`
    /// is not a valid database name.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`DatabaseConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let name = DatabaseName::parse(&get("DB_NAME", DEFAULT_NAME))
            .map_err(|e| ConfigError::InvalidDatabaseName("DB_NAME".to_string(), e))?;
        let port = match lookup("DB_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidEnvVar("DB_PORT".to_string(), e.to_string()))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            name,
            user: get("DB_USER", DEFAULT_USER),
            password: SecretString::from(get("DB_PASSWORD", DEFAULT_PASSWORD)),
            host: get("DB_HOST", DEFAULT_HOST),
            port,
        })
    }

    /// Connection options for `database`, or for [`DatabaseConfig::name`] when `None`.
    #[must_use]
    pub fn connect_options(&self, database: Option<&DatabaseName>) -> PgConnectOptions {
        let database = database.unwrap_or(&self.name);
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(self.password.expose_secret())
            .database(database.as_str())
            .application_name("tienda")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DatabaseConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.name.as_str(), "postgres");
        assert_eq!(config.user, "postgres");
        assert_eq!(config.password.expose_secret(), "password");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
    }

    #[test]
    fn test_overrides() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[
            ("DB_NAME", "mantenimiento"),
            ("DB_USER", "tienda"),
            ("DB_PASSWORD", "s3cr3t"),
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
        ]))
        .unwrap();

        assert_eq!(config.name.as_str(), "mantenimiento");
        assert_eq!(config.user, "tienda");
        assert_eq!(config.password.expose_secret(), "s3cr3t");
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 6543);
    }

    #[test]
    fn test_invalid_port() {
        let result = DatabaseConfig::from_lookup(lookup_from(&[("DB_PORT", "cinco")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(ref key, _)) if key == "DB_PORT"));

        let result = DatabaseConfig::from_lookup(lookup_from(&[("DB_PORT", "70000")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_name() {
        let result = DatabaseConfig::from_lookup(lookup_from(&[("DB_NAME", "")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidDatabaseName(_, DatabaseNameError::Empty))
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config =
            DatabaseConfig::from_lookup(lookup_from(&[("DB_PASSWORD", "super_secret_pw")]))
                .unwrap();
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("localhost"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_pw"));
    }

    #[test]
    fn test_connect_options_target() {
        let config = DatabaseConfig::from_lookup(|_| None).unwrap();
        let target = DatabaseName::parse("tienda_db").unwrap();

        let options = config.connect_options(Some(&target));
        assert_eq!(options.get_database(), Some("tienda_db"));
        assert_eq!(options.get_host(), "localhost");
        assert_eq!(options.get_port(), 5432);

        let options = config.connect_options(None);
        assert_eq!(options.get_database(), Some("postgres"));
    }
}
