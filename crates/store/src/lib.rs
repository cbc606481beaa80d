//! Tienda Store - Database provisioning, seeding and ad-hoc queries.
//!
//! # Modules
//!
//! - [`config`] - `DB_*` environment configuration
//! - [`db`] - Administrative and target sessions, schema management
//! - [`seed`] - Fixture loading and the transactional seed loader
//! - [`query`] - Ad-hoc statement runner
//! - [`present`] - Bordered table rendering
//! - [`report`] - Sample-data overview
//!
//! # Setup sequence
//!
//! ```rust,ignore
//! let config = DatabaseConfig::from_env()?;
//! let fixtures = SeedFixtures::bundled()?;
//!
//! let target = DatabaseName::parse("tienda_db")?;
//!
//! let mut admin = AdminSession::connect(&config).await?;
//! ensure_database(&mut admin, &target).await?;
//! admin.close().await?;
//!
//! let mut session = Session::connect(&config, Some(&target)).await?;
//! create_tables(&mut session).await?;
//! insert_sample_data(&mut session, &fixtures).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod present;
pub mod query;
pub mod report;
pub mod seed;
pub mod value;

pub use config::{ConfigError, DatabaseConfig};
pub use db::{
    AdminSession, DatabaseStatus, ResetReport, Session, create_tables, database_exists,
    drop_database, ensure_database, reset_database,
};
pub use error::DbError;
pub use present::{render_outcome, render_table};
pub use query::{QUERY_ERROR_PREFIX, QueryOutcome, QueryParam, execute_query};
pub use report::{SAMPLE_QUERIES, SampleQuery, render_report, sample_overview};
pub use seed::{FixtureError, SeedFixtures, SeedSummary, insert_sample_data};
pub use value::Value;
