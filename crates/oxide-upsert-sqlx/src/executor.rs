//! SQLite execution over a sqlx pool.

use std::future::Future;

use oxide_upsert_core::runner::{Execute, ExecuteAsync};
use oxide_upsert_core::SqlValue;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::error::Result;

/// Runs compiled upserts against a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    pool: SqlitePool,
}

impl SqliteExecutor {
    /// Wraps an existing pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns the pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl ExecuteAsync for SqliteExecutor {
    type Error = sqlx::Error;

    fn execute_async(
        &self,
        sql: &str,
        parameters: &[SqlValue],
    ) -> impl Future<Output = std::result::Result<u64, sqlx::Error>> + Send {
        let query = parameters
            .iter()
            .fold(sqlx::query(sql), |query, value| bind_param(query, value));
        let pool = &self.pool;
        async move {
            let result = query.execute(pool).await?;
            debug!(rows = result.rows_affected(), "executed statement");
            Ok(result.rows_affected())
        }
    }
}

/// Binds a `SqlValue` parameter to a query.
fn bind_param<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Float(f) => query.bind(*f),
        SqlValue::Text(s) => query.bind(s.clone()),
        SqlValue::Blob(b) => query.bind(b.clone()),
    }
}

/// A [`SqliteExecutor`] driven by its own current-thread runtime, for
/// callers without an async context.
///
/// Must not be used from inside another tokio runtime.
pub struct BlockingSqliteExecutor {
    inner: SqliteExecutor,
    runtime: Runtime,
}

impl BlockingSqliteExecutor {
    /// Opens a single-connection pool for `url`.
    ///
    /// One connection keeps `:memory:` databases shared between calls.
    ///
    /// # Errors
    ///
    /// Fails if the runtime cannot be built or the database cannot be opened.
    pub fn connect(url: &str) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let pool = runtime.block_on(SqlitePoolOptions::new().max_connections(1).connect(url))?;
        Ok(Self {
            inner: SqliteExecutor::new(pool),
            runtime,
        })
    }

    /// Returns the pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        self.inner.pool()
    }

    /// Runs a future to completion on the executor's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

impl Execute for BlockingSqliteExecutor {
    type Error = sqlx::Error;

    fn execute(&self, sql: &str, parameters: &[SqlValue]) -> std::result::Result<u64, sqlx::Error> {
        self.runtime.block_on(self.inner.execute_async(sql, parameters))
    }
}
