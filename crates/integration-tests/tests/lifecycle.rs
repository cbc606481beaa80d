//! Database lifecycle: create, reset, tables and seeding.
//!
//! These tests require a running `PostgreSQL` server reachable through the
//! `DB_*` variables and a role with `CREATEDB`.
//!
//! Run with: cargo test -p tienda-integration-tests -- --ignored

use tienda_integration_tests::TestDatabase;
use tienda_store::{
    DatabaseConfig, DatabaseStatus, DbError, SeedFixtures, Session, create_tables,
    database_exists, ensure_database, insert_sample_data, reset_database,
};

async fn count(session: &mut tienda_store::Session, sql: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(sql)
        .fetch_one(&mut **session)
        .await
        .expect("Failed to count rows")
}

// ============================================================================
// Create / Reset
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_ensure_database_twice() {
    let db = TestDatabase::new().expect("Invalid configuration");
    let mut admin = db.admin().await.expect("Failed to connect");

    let first = ensure_database(&mut admin, &db.name)
        .await
        .expect("First create failed");
    let second = ensure_database(&mut admin, &db.name)
        .await
        .expect("Second create failed");

    assert_eq!(first, DatabaseStatus::Created);
    assert_eq!(second, DatabaseStatus::AlreadyExists);
    assert!(database_exists(&mut admin, &db.name).await.expect("Lookup failed"));

    admin.close().await.expect("Failed to close");
    db.cleanup().await.expect("Failed to clean up");
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_reset_nonexistent_database() {
    let db = TestDatabase::new().expect("Invalid configuration");
    let mut admin = db.admin().await.expect("Failed to connect");

    let report = reset_database(&mut admin, &db.name)
        .await
        .expect("Reset of a missing database failed");

    assert!(!report.existed);
    assert_eq!(report.terminated_sessions, 0);
    assert!(database_exists(&mut admin, &db.name).await.expect("Lookup failed"));

    admin.close().await.expect("Failed to close");
    db.cleanup().await.expect("Failed to clean up");
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_reset_twice_leaves_empty_database() {
    let db = TestDatabase::new().expect("Invalid configuration");
    let (session, _) = db.provision().await.expect("Provisioning failed");
    session.close().await.expect("Failed to close");

    let mut admin = db.admin().await.expect("Failed to connect");
    let first = reset_database(&mut admin, &db.name)
        .await
        .expect("First reset failed");
    let second = reset_database(&mut admin, &db.name)
        .await
        .expect("Second reset failed");
    admin.close().await.expect("Failed to close");

    assert!(first.existed);
    assert!(second.existed);

    let mut session = db.session().await.expect("Failed to connect");
    let tables = count(
        &mut session,
        "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = 'public'",
    )
    .await;
    assert_eq!(tables, 0);

    session.close().await.expect("Failed to close");
    db.cleanup().await.expect("Failed to clean up");
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_reset_terminates_open_sessions() {
    let db = TestDatabase::new().expect("Invalid configuration");
    let (open_session, _) = db.provision().await.expect("Provisioning failed");

    let mut admin = db.admin().await.expect("Failed to connect");
    let report = reset_database(&mut admin, &db.name)
        .await
        .expect("Reset failed");
    admin.close().await.expect("Failed to close");

    assert!(report.terminated_sessions >= 1);

    // The terminated session's socket is already gone
    drop(open_session);
    db.cleanup().await.expect("Failed to clean up");
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_reset_refuses_maintenance_database() {
    let db = TestDatabase::new().expect("Invalid configuration");
    let mut admin = db.admin().await.expect("Failed to connect");
    let maintenance = admin.database().clone();

    let result = reset_database(&mut admin, &maintenance).await;

    assert!(matches!(result, Err(DbError::MaintenanceIsTarget(_))));
    assert!(database_exists(&mut admin, &maintenance).await.expect("Lookup failed"));
    admin.close().await.expect("Failed to close");
}

// ============================================================================
// Tables / Seeding
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_create_tables_is_idempotent() {
    let db = TestDatabase::new().expect("Invalid configuration");
    let (mut session, _) = db.provision().await.expect("Provisioning failed");

    create_tables(&mut session)
        .await
        .expect("Second create_tables failed");

    assert_eq!(count(&mut session, "SELECT COUNT(*) FROM usuarios").await, 6);

    session.close().await.expect("Failed to close");
    db.cleanup().await.expect("Failed to clean up");
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_seed_inserts_fixture_counts() {
    let db = TestDatabase::new().expect("Invalid configuration");
    let (mut session, summary) = db.provision().await.expect("Provisioning failed");

    assert_eq!(summary.user_ids.len(), 6);
    assert_eq!(summary.product_ids.len(), 8);
    assert_eq!(summary.order_ids.len(), 10);
    assert_eq!(summary.order_line_ids.len(), 17);

    assert_eq!(count(&mut session, "SELECT COUNT(*) FROM usuarios").await, 6);
    assert_eq!(count(&mut session, "SELECT COUNT(*) FROM productos").await, 8);
    assert_eq!(count(&mut session, "SELECT COUNT(*) FROM ordenes").await, 10);
    assert_eq!(count(&mut session, "SELECT COUNT(*) FROM orden_producto").await, 17);

    session.close().await.expect("Failed to close");
    db.cleanup().await.expect("Failed to clean up");
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_seed_references_resolve() {
    let db = TestDatabase::new().expect("Invalid configuration");
    let (mut session, _) = db.provision().await.expect("Provisioning failed");

    let dangling_orders = count(
        &mut session,
        r"
        SELECT COUNT(*) FROM ordenes o
        LEFT JOIN usuarios u ON o.usuario_id = u.id
        WHERE u.id IS NULL
        ",
    )
    .await;
    let dangling_lines = count(
        &mut session,
        r"
        SELECT COUNT(*) FROM orden_producto op
        LEFT JOIN ordenes o ON op.orden_id = o.id
        LEFT JOIN productos p ON op.producto_id = p.id
        WHERE o.id IS NULL OR p.id IS NULL
        ",
    )
    .await;
    let duplicate_pairs = count(
        &mut session,
        r"
        SELECT COUNT(*) FROM (
            SELECT orden_id, producto_id FROM orden_producto
            GROUP BY orden_id, producto_id
            HAVING COUNT(*) > 1
        ) d
        ",
    )
    .await;

    assert_eq!(dangling_orders, 0);
    assert_eq!(dangling_lines, 0);
    assert_eq!(duplicate_pairs, 0);

    session.close().await.expect("Failed to close");
    db.cleanup().await.expect("Failed to clean up");
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_reseed_conflicts_and_rolls_back() {
    let db = TestDatabase::new().expect("Invalid configuration");
    let (mut session, _) = db.provision().await.expect("Provisioning failed");
    let fixtures = SeedFixtures::bundled().expect("Bundled fixtures are valid");

    let result = insert_sample_data(&mut session, &fixtures).await;

    assert!(
        matches!(result, Err(DbError::SeedConflict { .. })),
        "expected a conflict, got {result:?}"
    );
    assert_eq!(count(&mut session, "SELECT COUNT(*) FROM usuarios").await, 6);
    assert_eq!(count(&mut session, "SELECT COUNT(*) FROM productos").await, 8);
    assert_eq!(count(&mut session, "SELECT COUNT(*) FROM orden_producto").await, 17);

    session.close().await.expect("Failed to close");
    db.cleanup().await.expect("Failed to clean up");
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_conflict_midway_discards_earlier_rows() {
    let db = TestDatabase::new().expect("Invalid configuration");
    let mut session = db.prepare().await.expect("Preparing failed");
    let fixtures = SeedFixtures::bundled().expect("Bundled fixtures are valid");

    // Third bundled user; the first two insert before the unique violation
    sqlx::query("INSERT INTO usuarios (nombre, email) VALUES ($1, $2)")
        .bind("Carlos López")
        .bind("carlos@example.com")
        .execute(&mut *session)
        .await
        .expect("Failed to insert user");

    let result = insert_sample_data(&mut session, &fixtures).await;

    let Err(DbError::SeedConflict { constraint, .. }) = &result else {
        panic!("expected a conflict, got {result:?}");
    };
    assert!(constraint.contains("email"), "constraint: {constraint}");
    assert_eq!(count(&mut session, "SELECT COUNT(*) FROM usuarios").await, 1);
    assert_eq!(count(&mut session, "SELECT COUNT(*) FROM productos").await, 0);

    session.close().await.expect("Failed to close");
    db.cleanup().await.expect("Failed to clean up");
}

// ============================================================================
// Connection errors
// ============================================================================

#[tokio::test]
async fn test_unreachable_server_is_a_connection_error() {
    let config = DatabaseConfig::from_lookup(|key| match key {
        "DB_HOST" => Some("127.0.0.1".to_string()),
        "DB_PORT" => Some("1".to_string()),
        _ => None,
    })
    .expect("Valid configuration");

    let result = Session::connect(&config, None).await;

    let Err(DbError::Connection { database, .. }) = &result else {
        panic!("expected a connection error, got {result:?}");
    };
    assert_eq!(database, config.name.as_str());
}
