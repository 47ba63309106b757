//! SQLite dialect.

use super::{on_conflict_command, UpsertDialect};
use crate::known::BoundAssignment;
use crate::schema::TableName;

/// SQLite: `INSERT ... ON CONFLICT (...) DO UPDATE SET ...` (3.24.0+).
///
/// Parameters use the numbered `?NNN` form so an index can appear anywhere
/// in the statement. The existing row is aliased `"T"`; incoming values
/// come from `excluded`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl UpsertDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn parameter(&self, index: usize) -> String {
        format!("?{}", index + 1)
    }

    fn source_prefix(&self) -> String {
        String::from("excluded.")
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Side;
    use crate::known::{ArithmeticOp, BoundValue, Expression};

    #[test]
    fn test_sqlite_dialect() {
        let dialect = SqliteDialect::new();
        assert_eq!(dialect.name(), "sqlite");
        assert_eq!(dialect.parameter(0), "?1");
        assert_eq!(dialect.identifier_quotes(), ('"', '"'));
    }

    #[test]
    fn test_sqlite_composite_key() {
        let updates = vec![BoundAssignment {
            column: String::from("granted_at"),
            expression: Expression::Arithmetic {
                op: ArithmeticOp::Add,
                left: BoundValue::Column {
                    name: String::from("granted_at"),
                    side: Side::Target,
                },
                right: BoundValue::Parameter(3),
            },
        }];
        let sql = SqliteDialect.generate_command(
            &TableName::new("user_roles"),
            1,
            &["user_id", "role_id", "granted_at"],
            &["user_id", "role_id"],
            &updates,
        );
        assert_eq!(
            sql,
            "INSERT INTO \"user_roles\" AS \"T\" (\"user_id\", \"role_id\", \"granted_at\") \
             VALUES (?1, ?2, ?3) ON CONFLICT (\"user_id\", \"role_id\") \
             DO UPDATE SET \"granted_at\" = \"T\".\"granted_at\" + ?4"
        );
    }
}
