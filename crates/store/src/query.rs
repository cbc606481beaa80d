//! Ad-hoc statement runner.
//!
//! Unlike the rest of the crate, the runner never returns an error: whatever
//! happens is folded into a [`QueryOutcome`] the caller can print.

use std::convert::Infallible;
use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgTypeInfo};
use sqlx::query::Query;
use sqlx::{Column, Executor, PgConnection, Postgres, Statement, Type};
use tracing::{debug, instrument, warn};

use crate::value::{Value, decode_cell};

/// Prefix of every [`QueryOutcome::Failure`] description.
pub const QUERY_ERROR_PREFIX: &str = "Query error: ";

/// A positional statement parameter (`$1`, `$2`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Text(String),
}

impl QueryParam {
    /// Infer a parameter from command-line text.
    ///
    /// `true`/`false` become booleans, whole numbers integers, other numbers
    /// decimals, and anything else text.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(n) = raw.parse::<i64>() {
            return Self::Int(n);
        }
        if let Ok(d) = Decimal::from_str(raw) {
            return Self::Decimal(d);
        }
        Self::Text(raw.to_owned())
    }

    fn type_info(&self) -> PgTypeInfo {
        match self {
            Self::Bool(_) => <bool as Type<Postgres>>::type_info(),
            Self::Int(_) => <i64 as Type<Postgres>>::type_info(),
            Self::Decimal(_) => <Decimal as Type<Postgres>>::type_info(),
            Self::Text(_) => <String as Type<Postgres>>::type_info(),
        }
    }

    fn bind_to<'q>(
        &self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        match self {
            Self::Bool(v) => query.bind(*v),
            Self::Int(v) => query.bind(*v),
            Self::Decimal(v) => query.bind(*v),
            Self::Text(v) => query.bind(v.clone()),
        }
    }
}

impl FromStr for QueryParam {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// What running a statement produced.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The statement has a result descriptor. Every row has one value per
    /// column, in engine order.
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    /// The statement has no result descriptor; holds the affected-row message.
    Status(String),
    /// The statement failed; the description starts with [`QUERY_ERROR_PREFIX`].
    Failure(String),
}

impl QueryOutcome {
    /// Status message for a statement that affected `count` rows.
    #[must_use]
    pub fn affected(count: u64) -> Self {
        Self::Status(format!("{count} rows affected"))
    }

    /// Failure description for an execution error.
    #[must_use]
    pub fn failure(err: &sqlx::Error) -> Self {
        let detail = match err {
            sqlx::Error::Database(db_err) => db_err.message().to_owned(),
            other => other.to_string(),
        };
        Self::Failure(format!("{QUERY_ERROR_PREFIX}{detail}"))
    }

    /// Failure description for a statement with no SQL in it.
    #[must_use]
    pub fn empty_statement() -> Self {
        Self::Failure(format!("{QUERY_ERROR_PREFIX}can't execute an empty query"))
    }

    /// Whether this outcome is a [`QueryOutcome::Failure`].
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Number of rows returned, if the statement returned rows.
    #[must_use]
    pub fn row_count(&self) -> Option<usize> {
        match self {
            Self::Rows { rows, .. } => Some(rows.len()),
            Self::Status(_) | Self::Failure(_) => None,
        }
    }
}

/// Run one statement and describe its outcome.
///
/// The statement is prepared first; the prepared statement's column list is
/// the result descriptor. With columns, all rows are fetched; without, the
/// affected-row count is reported. Results are fully drained before
/// returning, so nothing stays open on the connection.
#[instrument(skip(conn, params), fields(params = params.len()))]
pub async fn execute_query(
    conn: &mut PgConnection,
    sql: &str,
    params: &[QueryParam],
) -> QueryOutcome {
    if is_blank(sql) {
        warn!("Refusing to run an empty statement");
        return QueryOutcome::empty_statement();
    }
    match run(conn, sql, params).await {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(error = %err, "Query failed");
            QueryOutcome::failure(&err)
        }
    }
}

/// Whitespace and bare semicolons only. The server answers these with an
/// empty-query response that carries no descriptor and no count.
fn is_blank(sql: &str) -> bool {
    sql.chars().all(|c| c.is_whitespace() || c == ';')
}

async fn run(
    conn: &mut PgConnection,
    sql: &str,
    params: &[QueryParam],
) -> Result<QueryOutcome, sqlx::Error> {
    let types: Vec<PgTypeInfo> = params.iter().map(QueryParam::type_info).collect();
    let columns: Vec<String> = {
        let statement = (&mut *conn).prepare_with(sql, &types).await?;
        statement
            .columns()
            .iter()
            .map(|column| column.name().to_owned())
            .collect()
    };

    let query = params
        .iter()
        .fold(sqlx::query(sql), |query, param| param.bind_to(query));

    if columns.is_empty() {
        let result = query.execute(&mut *conn).await?;
        debug!(rows_affected = result.rows_affected(), "Statement executed");
        return Ok(QueryOutcome::affected(result.rows_affected()));
    }

    let rows: Vec<Vec<Value>> = query
        .fetch_all(&mut *conn)
        .await?
        .iter()
        .map(|row| (0..columns.len()).map(|index| decode_cell(row, index)).collect())
        .collect();
    debug!(rows = rows.len(), columns = columns.len(), "Rows fetched");

    Ok(QueryOutcome::Rows { columns, rows })
}
