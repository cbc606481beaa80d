//! Provision and seed the target database.
//!
//! Order of operations:
//!
//! 1. Load and validate fixtures (no connection yet)
//! 2. Administrative session: create-if-absent, or drop and recreate with `--reset`
//! 3. Target session: create tables, seed, print the overview
//!
//! A failure at any step stops the run; later steps never see a half-done
//! earlier one.

use std::path::Path;

use tracing::{info, warn};

use tienda_core::DatabaseName;
use tienda_store::{
    AdminSession, DatabaseConfig, DatabaseStatus, SeedFixtures, Session, create_tables,
    ensure_database, insert_sample_data, render_report, reset_database, sample_overview,
};

/// Run the setup sequence against `target`.
///
/// # Errors
///
/// Returns an error if the fixtures are invalid, the server is unreachable,
/// or any administrative, schema or seed step fails.
pub async fn run(
    config: &DatabaseConfig,
    target: &DatabaseName,
    reset: bool,
    seed_file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let fixtures = match seed_file {
        Some(path) => {
            info!(path = %path.display(), "Loading fixtures from file");
            SeedFixtures::from_file(path)?
        }
        None => SeedFixtures::bundled()?,
    };
    info!(
        users = fixtures.users.len(),
        products = fixtures.products.len(),
        orders = fixtures.orders.len(),
        order_lines = fixtures.order_lines.len(),
        "Fixtures validated"
    );

    let mut admin = AdminSession::connect(config).await?;
    if reset {
        warn!(database = %target, "Resetting database, all existing data will be lost");
        let report = reset_database(&mut admin, target).await?;
        info!(
            database = %target,
            terminated_sessions = report.terminated_sessions,
            existed = report.existed,
            "Database recreated"
        );
    } else {
        match ensure_database(&mut admin, target).await? {
            DatabaseStatus::Created => info!(database = %target, "Database created"),
            DatabaseStatus::AlreadyExists => {
                info!(database = %target, "Database already exists");
            }
        }
    }
    admin.close().await?;

    let mut session = Session::connect(config, Some(target)).await?;
    create_tables(&mut session).await?;
    info!(database = %target, "Tables ready");

    let summary = insert_sample_data(&mut session, &fixtures).await?;
    info!(
        users = summary.user_ids.len(),
        orders = summary.order_ids.len(),
        "Database seeded"
    );

    let sections = sample_overview(&mut session).await;
    session.close().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", render_report(&sections));
    }

    Ok(())
}
