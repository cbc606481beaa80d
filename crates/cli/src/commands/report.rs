//! Print the sample-data overview.

use tienda_core::DatabaseName;
use tienda_store::{DatabaseConfig, Session, render_report, sample_overview};

/// Print the overview tables for `target`.
///
/// # Errors
///
/// Returns an error if the session cannot be opened or closed.
pub async fn run(
    config: &DatabaseConfig,
    target: &DatabaseName,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::connect(config, Some(target)).await?;
    let sections = sample_overview(&mut session).await;
    session.close().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("Database: {target}");
        println!();
        println!("{}", render_report(&sections));
    }

    Ok(())
}
