//! Seed loader for a freshly created schema.
//!
//! Rows are inserted in dependency order because later rows point at ids the
//! engine generated for earlier ones:
//!
//! 1. `usuarios` - ids captured in insertion order
//! 2. `productos` - ids captured for traceability
//! 3. `ordenes` - each resolves its user by position; ids captured
//! 4. `orden_producto` - each resolves its order and product by position
//!
//! The whole run is one transaction. If any insert fails the transaction is
//! dropped uncommitted and the engine discards every row of the run.

mod fixtures;

use sqlx::{Connection, PgConnection};
use tracing::{debug, info, instrument, warn};

use tienda_core::{OrderId, OrderLineId, ProductId, UserId};

use crate::error::DbError;

pub use fixtures::{
    FixtureError, OrderFixture, OrderLineFixture, ProductFixture, SeedFixtures, UserFixture,
};

/// Ids generated during a seed run, each list in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Generated `usuarios.id` values.
    pub user_ids: Vec<UserId>,
    /// Generated `productos.id` values.
    pub product_ids: Vec<ProductId>,
    /// Generated `ordenes.id` values.
    pub order_ids: Vec<OrderId>,
    /// Generated `orden_producto.id` values.
    pub order_line_ids: Vec<OrderLineId>,
}

/// Look up the id captured at a 1-based position.
fn resolve<T: Copy>(ids: &[T], position: usize, entity: &'static str) -> Result<T, DbError> {
    position
        .checked_sub(1)
        .and_then(|index| ids.get(index))
        .copied()
        .ok_or_else(|| FixtureError::MissingReference { entity, position }.into())
}

/// Insert `fixtures` in one transaction.
///
/// # Errors
///
/// Returns `DbError::Fixtures` if the fixtures fail validation (nothing is
/// sent to the server), `DbError::SeedConflict` on a unique violation (for
/// example seeding a database that already holds the same emails), or
/// `DbError::Seed` for any other failure. In every error case no row of this
/// run remains.
#[instrument(skip_all, fields(
    users = fixtures.users.len(),
    products = fixtures.products.len(),
    orders = fixtures.orders.len(),
    order_lines = fixtures.order_lines.len(),
))]
pub async fn insert_sample_data(
    conn: &mut PgConnection,
    fixtures: &SeedFixtures,
) -> Result<SeedSummary, DbError> {
    let errors = fixtures.validate();
    if !errors.is_empty() {
        return Err(FixtureError::Invalid(errors).into());
    }

    let mut tx = conn.begin().await.map_err(DbError::Seed)?;
    let mut summary = SeedSummary::default();

    for user in &fixtures.users {
        let id = sqlx::query_scalar::<_, UserId>(
            "INSERT INTO usuarios (nombre, email) VALUES ($1, $2) RETURNING id",
        )
        .bind(&user.name)
        .bind(&user.email)
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::from_seed)?;
        debug!(%id, email = %user.email, "Inserted user");
        summary.user_ids.push(id);
    }

    for product in &fixtures.products {
        let id = sqlx::query_scalar::<_, ProductId>(
            r"
            INSERT INTO productos (nombre, descripcion, precio, stock)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&product.name)
        .bind(product.description.as_deref())
        .bind(product.price)
        .bind(product.stock)
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::from_seed)?;
        debug!(%id, name = %product.name, "Inserted product");
        summary.product_ids.push(id);
    }

    for order in &fixtures.orders {
        let user_id = resolve(&summary.user_ids, order.user, "user")?;
        if !order.status.is_known() {
            warn!(status = %order.status, "Seeding order with a status outside the named set");
        }
        let id = sqlx::query_scalar::<_, OrderId>(
            "INSERT INTO ordenes (usuario_id, estado, total) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_id)
        .bind(&order.status)
        .bind(order.total)
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::from_seed)?;
        debug!(%id, %user_id, status = %order.status, "Inserted order");
        summary.order_ids.push(id);
    }

    for line in &fixtures.order_lines {
        let order_id = resolve(&summary.order_ids, line.order, "order")?;
        let product_id = resolve(&summary.product_ids, line.product, "product")?;
        let id = sqlx::query_scalar::<_, OrderLineId>(
            r"
            INSERT INTO orden_producto (orden_id, producto_id, cantidad, precio_unitario)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(line.quantity)
        .bind(line.unit_price)
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::from_seed)?;
        summary.order_line_ids.push(id);
    }

    tx.commit().await.map_err(DbError::Seed)?;

    info!(
        users = summary.user_ids.len(),
        products = summary.product_ids.len(),
        orders = summary.order_ids.len(),
        order_lines = summary.order_line_ids.len(),
        "Sample data inserted successfully"
    );
    Ok(summary)
}
