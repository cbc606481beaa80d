//! Run one ad-hoc statement.

use tracing::info;

use tienda_core::DatabaseName;
use tienda_store::{DatabaseConfig, QueryParam, Session, execute_query, render_outcome};

/// Run `sql` against `target` and print the outcome.
///
/// A failing statement is printed, not returned: only connection problems
/// make this command fail.
///
/// # Errors
///
/// Returns an error if the session cannot be opened or closed.
pub async fn run(
    config: &DatabaseConfig,
    target: &DatabaseName,
    sql: &str,
    params: &[QueryParam],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::connect(config, Some(target)).await?;

    let outcome = execute_query(&mut session, sql, params).await;
    if let Some(rows) = outcome.row_count() {
        info!(rows, "Query returned rows");
    }

    session.close().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("Database: {target}");
        println!("Query: {sql}");
        println!();
        println!("{}", render_outcome(&outcome));
    }

    Ok(())
}
