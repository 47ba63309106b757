//! SQL dialect support.
//!
//! Every engine spells "insert or update" differently. [`UpsertDialect`]
//! holds the per-engine pieces (identifier quoting, parameter tokens, how a
//! column of the incoming or existing row is qualified) and renders the
//! final statement. Expression rendering is shared.

mod mysql;
mod postgres;
mod sqlite;
mod sqlserver;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expr::Side;
use crate::known::{BoundAssignment, BoundExpression, BoundValue, Expression};
use crate::schema::TableName;

pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;

/// Alias given to the existing row where the statement allows one.
pub const TARGET_ALIAS: &str = "T";

/// Alias given to the incoming rows in a `MERGE ... USING` clause.
pub const SOURCE_ALIAS: &str = "S";

/// Trait for dialect-specific upsert rendering.
pub trait UpsertDialect {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Opening and closing identifier quote characters.
    fn identifier_quotes(&self) -> (char, char) {
        ('"', '"')
    }

    /// Quotes an identifier, doubling any embedded closing quote.
    fn quote_identifier(&self, name: &str) -> String {
        let (open, close) = self.identifier_quotes();
        let escaped = name.replace(close, &format!("{close}{close}"));
        format!("{open}{escaped}{close}")
    }

    /// Quotes a table name, including its schema qualifier if any.
    fn quote_table(&self, table: &TableName) -> String {
        match &table.schema {
            Some(schema) => format!(
                "{}.{}",
                self.quote_identifier(schema),
                self.quote_identifier(&table.name)
            ),
            None => self.quote_identifier(&table.name),
        }
    }

    /// Renders the placeholder for the zero-based parameter `index`.
    fn parameter(&self, index: usize) -> String;

    /// Prefix qualifying a column of the incoming row.
    fn source_prefix(&self) -> String;

    /// Suffix closing a column of the incoming row.
    fn source_suffix(&self) -> &'static str {
        ""
    }

    /// Prefix qualifying a column of the existing row.
    ///
    /// Defaults to the quoted [`TARGET_ALIAS`] the statement gives that row.
    fn target_prefix(&self) -> String {
        format!("{}.", self.quote_identifier(TARGET_ALIAS))
    }

    /// Renders a single value.
    fn expand_value(&self, value: &BoundValue) -> String {
        match value {
            BoundValue::Parameter(index) => self.parameter(*index),
            BoundValue::Column {
                name,
                side: Side::Source,
            } => format!(
                "{}{}{}",
                self.source_prefix(),
                self.quote_identifier(name),
                self.source_suffix()
            ),
            BoundValue::Column {
                name,
                side: Side::Target,
            } => format!("{}{}", self.target_prefix(), self.quote_identifier(name)),
        }
    }

    /// Renders an update expression.
    fn expand_expression(&self, expression: &BoundExpression) -> String {
        match expression {
            Expression::Value(value) => self.expand_value(value),
            Expression::Arithmetic { op, left, right } => format!(
                "{} {} {}",
                self.expand_value(left),
                op.symbol(),
                self.expand_value(right)
            ),
        }
    }

    /// Renders a comma separated list of quoted columns.
    fn column_list(&self, columns: &[&str]) -> String {
        columns
            .iter()
            .map(|c| self.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Renders `(p0, p1), (p2, p3), ...` for `entity_count` rows.
    ///
    /// Row `r`, column `c` is parameter `r * column_count + c`, which is
    /// where the binder put that entity's value.
    fn values_rows(&self, entity_count: usize, column_count: usize) -> String {
        (0..entity_count)
            .map(|row| {
                let placeholders: Vec<String> = (0..column_count)
                    .map(|col| self.parameter(row * column_count + col))
                    .collect();
                format!("({})", placeholders.join(", "))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Renders `"col" = expr, ...` for the update branch.
    fn assignment_list(&self, updates: &[BoundAssignment]) -> String {
        updates
            .iter()
            .map(|u| {
                format!(
                    "{} = {}",
                    self.quote_identifier(&u.column),
                    self.expand_expression(&u.expression)
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Renders the complete upsert statement.
    ///
    /// `join_columns` is never empty; an empty update list means the
    /// existing row is left untouched.
    fn generate_command(
        &self,
        table: &TableName,
        entity_count: usize,
        insert_columns: &[&str],
        join_columns: &[&str],
        updates: &[BoundAssignment],
    ) -> String;
}

/// `INSERT ... ON CONFLICT (...) DO UPDATE SET ...`, shared by PostgreSQL and SQLite.
fn on_conflict_command<D: UpsertDialect + ?Sized>(
    dialect: &D,
    table: &TableName,
    entity_count: usize,
    insert_columns: &[&str],
    join_columns: &[&str],
    updates: &[BoundAssignment],
) -> String {
    let mut sql = format!(
        "INSERT INTO {} AS {} ({}) VALUES {}",
        dialect.quote_table(table),
        dialect.quote_identifier(TARGET_ALIAS),
        dialect.column_list(insert_columns),
        dialect.values_rows(entity_count, insert_columns.len())
    );
    sql.push_str(" ON CONFLICT (");
    sql.push_str(&dialect.column_list(join_columns));
    sql.push(')');
    if updates.is_empty() {
        sql.push_str(" DO NOTHING");
    } else {
        sql.push_str(" DO UPDATE SET ");
        sql.push_str(&dialect.assignment_list(updates));
    }
    sql
}

/// Error returned when a dialect name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown SQL dialect `{0}`")]
pub struct UnknownDialect(pub String);

/// The supported engines, selectable from configuration.
///
/// ```rust
/// use oxide_upsert_core::dialect::{DialectKind, UpsertDialect};
///
/// let kind = DialectKind::from_url("postgres://localhost/app").unwrap();
/// assert_eq!(kind, DialectKind::Postgres);
/// assert_eq!(kind.parameter(0), "$1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[serde(alias = "postgresql")]
    Postgres,
    Sqlite,
    #[serde(alias = "mariadb")]
    MySql,
    #[serde(alias = "mssql")]
    SqlServer,
}

impl DialectKind {
    /// Every supported dialect.
    pub const ALL: [Self; 4] = [Self::Postgres, Self::Sqlite, Self::MySql, Self::SqlServer];

    /// Detects the dialect from a connection URL scheme.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownDialect`] when the scheme names no supported engine.
    pub fn from_url(url: &str) -> Result<Self, UnknownDialect> {
        let scheme = url.split_once(':').map_or(url, |(scheme, _)| scheme);
        scheme.parse()
    }

    /// Returns the renderer for this engine.
    #[must_use]
    pub fn renderer(self) -> &'static dyn UpsertDialect {
        match self {
            Self::Postgres => &PostgresDialect,
            Self::Sqlite => &SqliteDialect,
            Self::MySql => &MySqlDialect,
            Self::SqlServer => &SqlServerDialect,
        }
    }
}

impl FromStr for DialectKind {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlserver" | "mssql" | "tsql" => Ok(Self::SqlServer),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.renderer().name())
    }
}

impl UpsertDialect for DialectKind {
    fn name(&self) -> &'static str {
        self.renderer().name()
    }

    fn identifier_quotes(&self) -> (char, char) {
        self.renderer().identifier_quotes()
    }

    fn quote_identifier(&self, name: &str) -> String {
        self.renderer().quote_identifier(name)
    }

    fn quote_table(&self, table: &TableName) -> String {
        self.renderer().quote_table(table)
    }

    fn parameter(&self, index: usize) -> String {
        self.renderer().parameter(index)
    }

    fn source_prefix(&self) -> String {
        self.renderer().source_prefix()
    }

    fn source_suffix(&self) -> &'static str {
        self.renderer().source_suffix()
    }

    fn target_prefix(&self) -> String {
        self.renderer().target_prefix()
    }

    fn generate_command(
        &self,
        table: &TableName,
        entity_count: usize,
        insert_columns: &[&str],
        join_columns: &[&str],
        updates: &[BoundAssignment],
    ) -> String {
        self.renderer()
            .generate_command(table, entity_count, insert_columns, join_columns, updates)
    }
}
