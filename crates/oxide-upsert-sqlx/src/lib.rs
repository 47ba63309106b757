//! # oxide-upsert-sqlx
//!
//! Executes commands compiled by `oxide-upsert-core` through `sqlx`.
//!
//! ```ignore
//! use oxide_upsert_core::prelude::*;
//! use oxide_upsert_sqlx::{sqlite_runner, SqliteExecutor};
//!
//! async fn bump(pool: sqlx::SqlitePool, rows: &[PageView]) -> oxide_upsert_core::Result<u64> {
//!     let spec = UpdateSpec::new().set("hits", target("hits") + source("hits"));
//!     sqlite_runner()
//!         .run_async(&SqliteExecutor::new(pool), &page_views(), rows, &["path"], &spec.into())
//!         .await
//! }
//! ```
//!
//! Blocking callers use [`BlockingSqliteExecutor`] with
//! [`UpsertRunner::run`](oxide_upsert_core::UpsertRunner::run).

mod error;
mod executor;

pub use error::{Result, SqlxBackendError};
pub use executor::{BlockingSqliteExecutor, SqliteExecutor};

use oxide_upsert_core::dialect::SqliteDialect;
use oxide_upsert_core::UpsertRunner;

/// A runner rendering SQLite statements.
#[must_use]
pub const fn sqlite_runner() -> UpsertRunner<SqliteDialect> {
    UpsertRunner::new(SqliteDialect::new())
}
