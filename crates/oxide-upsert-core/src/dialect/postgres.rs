//! PostgreSQL dialect.

use super::{on_conflict_command, UpsertDialect};
use crate::known::BoundAssignment;
use crate::schema::TableName;

/// PostgreSQL: `INSERT ... ON CONFLICT (...) DO UPDATE SET ...` (9.5+).
///
/// The existing row is aliased `"T"`; incoming values come from `EXCLUDED`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl UpsertDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn parameter(&self, index: usize) -> String {
        format!("${}", index + 1)
    }

    fn source_prefix(&self) -> String {
        String::from("EXCLUDED.")
    }

    fn generate_command(
        &self,
        table: &TableName,
        entity_count: usize,
        insert_columns: &[&str],
        join_columns: &[&str],
        updates: &[BoundAssignment],
    ) -> String {
        on_conflict_command(self, table, entity_count, insert_columns, join_columns, updates)
    }
}
