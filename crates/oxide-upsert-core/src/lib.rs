//! # oxide-upsert-core
//!
//! Compiles "insert, or update on conflict" commands for several SQL
//! dialects.
//!
//! Given an [`EntitySchema`], a batch of entities, the properties that
//! identify an existing row and an [`OnConflict`] policy, the compiler
//! produces one parameterized statement:
//!
//! - PostgreSQL and SQLite: `INSERT ... ON CONFLICT (...) DO UPDATE SET ...`
//! - MySQL: `INSERT ... ON DUPLICATE KEY UPDATE ...`
//! - SQL Server: `MERGE ... USING (VALUES ...) ...`
//!
//! Update assignments may be a value, a column of the incoming (source) or
//! existing (target) row, or one `+ - * /` over two of those:
//!
//! ```rust
//! use oxide_upsert_core::prelude::*;
//!
//! struct PageView {
//!     path: String,
//!     hits: i64,
//! }
//!
//! let schema = EntitySchema::new("page_views")
//!     .column("path", |p: &PageView| p.path.clone().to_sql_value())
//!     .column("hits", |p: &PageView| p.hits.to_sql_value());
//!
//! let views = vec![
//!     PageView { path: String::from("/"), hits: 3 },
//!     PageView { path: String::from("/about"), hits: 1 },
//! ];
//! let spec = UpdateSpec::new().set("hits", target("hits") + source("hits"));
//!
//! let runner = UpsertRunner::new(DialectKind::MySql);
//! let command = runner.prepare(&schema, &views, &["path"], &spec.into()).unwrap();
//!
//! assert_eq!(
//!     command.sql,
//!     "INSERT INTO `page_views` (`path`, `hits`) VALUES (?, ?), (?, ?) \
//!      ON DUPLICATE KEY UPDATE `hits` = `hits` + VALUES(`hits`)"
//! );
//! assert_eq!(command.parameters.len(), 4);
//! ```
//!
//! ## Safety of generated SQL
//!
//! Values are always bound as parameters. Identifiers come from the
//! schema and are quoted, not parameterized, so schemas must be built from
//! trusted metadata.

pub mod analyzer;
pub mod binder;
pub mod command;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod known;
pub mod runner;
pub mod schema;
pub mod update;
pub mod value;

pub use command::{compile, CompiledCommand};
pub use dialect::{DialectKind, UpsertDialect};
pub use error::{Result, UpsertError};
pub use runner::{Execute, ExecuteAsync, UpsertRunner};
pub use schema::{ColumnRef, EntitySchema};
pub use update::{OnConflict, UpdateSpec};
pub use value::{SqlValue, ToSqlValue};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::command::{compile, CompiledCommand};
    pub use crate::dialect::{
        DialectKind, MySqlDialect, PostgresDialect, SqlServerDialect, SqliteDialect,
        UpsertDialect,
    };
    pub use crate::error::{Result, UpsertError};
    pub use crate::expr::{call, source, target, value, Side, UpdateExpr};
    pub use crate::runner::{Execute, ExecuteAsync, UpsertRunner};
    pub use crate::schema::{ColumnRef, EntitySchema, TableName};
    pub use crate::update::{OnConflict, UpdateSpec};
    pub use crate::value::{SqlValue, ToSqlValue};
}
