//! Subcommand implementations.

pub mod query;
pub mod report;
pub mod setup;
