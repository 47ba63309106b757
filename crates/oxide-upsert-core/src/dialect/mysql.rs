//! MySQL / MariaDB dialect.

use super::UpsertDialect;
use crate::known::BoundAssignment;
use crate::schema::TableName;

/// MySQL: `INSERT ... ON DUPLICATE KEY UPDATE ...`.
///
/// MySQL picks the conflicting unique key itself, so the join columns only
/// matter for the do-nothing form. Incoming values are read with
/// `VALUES(col)`; bare column names refer to the existing row.
///
/// Placeholders are positional `?`. Parameters appear in the statement in
/// index order (insert rows first, then update constants), which is what
/// makes the unnumbered form safe here.
///
/// MySQL applies the assignments left to right, and a bare column name
/// reads the row as updated so far. A target reference placed after an
/// assignment to the same column therefore sees the new value, where the
/// other dialects read the existing row as it was before the update.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl UpsertDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quotes(&self) -> (char, char) {
        ('`', '`')
    }

    fn parameter(&self, _index: usize) -> String {
        String::from("?")
    }

    fn source_prefix(&self) -> String {
        String::from("VALUES(")
    }

    fn source_suffix(&self) -> &'static str {
        ")"
    }

    fn target_prefix(&self) -> String {
        String::new()
    }

    fn generate_command(
        &self,
        table: &TableName,
        entity_count: usize,
        insert_columns: &[&str],
        join_columns: &[&str],
        updates: &[BoundAssignment],
    ) -> String {
        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.quote_table(table),
            self.column_list(insert_columns),
            self.values_rows(entity_count, insert_columns.len())
        );
        if updates.is_empty() {
            // A self-assignment keeps the row and still reports no error on duplicates.
            if let Some(key) = join_columns.first() {
                let key = self.quote_identifier(key);
                sql.push_str(&format!(" ON DUPLICATE KEY UPDATE {key} = {key}"));
            }
        } else {
            sql.push_str(" ON DUPLICATE KEY UPDATE ");
            sql.push_str(&self.assignment_list(updates));
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Side;
    use crate::known::{ArithmeticOp, BoundValue, Expression};

    #[test]
    fn test_mysql_dialect() {
        let dialect = MySqlDialect::new();
        assert_eq!(dialect.name(), "mysql");
        assert_eq!(dialect.parameter(7), "?");
        assert_eq!(dialect.quote_identifier("order"), "`order`");
    }

    #[test]
    fn test_mysql_on_duplicate_key() {
        let updates = vec![
            BoundAssignment {
                column: String::from("name"),
                expression: Expression::Value(BoundValue::Column {
                    name: String::from("name"),
                    side: Side::Source,
                }),
            },
            BoundAssignment {
                column: String::from("hits"),
                expression: Expression::Arithmetic {
                    op: ArithmeticOp::Add,
                    left: BoundValue::Column {
                        name: String::from("hits"),
                        side: Side::Target,
                    },
                    right: BoundValue::Parameter(6),
                },
            },
        ];
        let sql = MySqlDialect.generate_command(
            &TableName::new("pages"),
            2,
            &["id", "name", "hits"],
            &["id"],
            &updates,
        );
        assert_eq!(
            sql,
            "INSERT INTO `pages` (`id`, `name`, `hits`) VALUES (?, ?, ?), (?, ?, ?) \
             ON DUPLICATE KEY UPDATE `name` = VALUES(`name`), `hits` = `hits` + ?"
        );
    }

    #[test]
    fn test_mysql_do_nothing() {
        let sql = MySqlDialect.generate_command(
            &TableName::new("tags"),
            1,
            &["slug", "label"],
            &["slug"],
            &[],
        );
        assert_eq!(
            sql,
            "INSERT INTO `tags` (`slug`, `label`) VALUES (?, ?) \
             ON DUPLICATE KEY UPDATE `slug` = `slug`"
        );
    }
}
