//! Overview of the sample data, printed after seeding.

use sqlx::PgConnection;

use crate::present::render_outcome;
use crate::query::{QueryOutcome, execute_query};

/// A titled overview query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleQuery {
    pub title: &'static str,
    pub sql: &'static str,
}

/// The overview queries, in print order.
pub const SAMPLE_QUERIES: [SampleQuery; 4] = [
    SampleQuery {
        title: "Usuarios",
        sql: "SELECT id, nombre, email FROM usuarios ORDER BY id",
    },
    SampleQuery {
        title: "Productos",
        sql: "SELECT id, nombre, precio, stock FROM productos ORDER BY id",
    },
    SampleQuery {
        title: "Órdenes",
        sql: r"
            SELECT o.id, u.nombre AS usuario, o.fecha_orden, o.estado, o.total
            FROM ordenes o
            JOIN usuarios u ON o.usuario_id = u.id
            ORDER BY o.id
        ",
    },
    SampleQuery {
        title: "Detalles de Órdenes",
        sql: r"
            SELECT op.orden_id, p.nombre AS producto, op.cantidad, op.precio_unitario,
                   op.cantidad * op.precio_unitario AS subtotal
            FROM orden_producto op
            JOIN productos p ON op.producto_id = p.id
            ORDER BY op.orden_id, op.id
        ",
    },
];

/// Run every overview query, pairing each outcome with its title.
///
/// Failures are kept as outcomes so one broken query does not hide the rest.
pub async fn sample_overview(conn: &mut PgConnection) -> Vec<(&'static str, QueryOutcome)> {
    let mut sections = Vec::with_capacity(SAMPLE_QUERIES.len());
    for query in SAMPLE_QUERIES {
        let outcome = execute_query(conn, query.sql, &[]).await;
        sections.push((query.title, outcome));
    }
    sections
}

/// Render overview sections as titled tables separated by blank lines.
#[must_use]
pub fn render_report(sections: &[(&'static str, QueryOutcome)]) -> String {
    sections
        .iter()
        .map(|(title, outcome)| format!("{title}:\n{}", render_outcome(outcome)))
        .collect::<Vec<_>>()
        .join("\n\n")
}
