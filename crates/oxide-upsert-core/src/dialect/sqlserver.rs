//! SQL Server dialect.

use super::{UpsertDialect, SOURCE_ALIAS, TARGET_ALIAS};
use crate::known::BoundAssignment;
use crate::schema::TableName;

/// SQL Server: `MERGE ... USING (VALUES ...) ... WHEN MATCHED ...`.
///
/// The incoming rows form a derived table aliased `[S]`, the existing row
/// is `[T]`. `HOLDLOCK` keeps the match-then-insert race out of concurrent
/// merges.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlServerDialect;

impl SqlServerDialect {
    /// Creates a new SQL Server dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl UpsertDialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn identifier_quotes(&self) -> (char, char) {
        ('[', ']')
    }

    fn parameter(&self, index: usize) -> String {
        format!("@p{index}")
    }

    fn source_prefix(&self) -> String {
        format!("{}.", self.quote_identifier(SOURCE_ALIAS))
    }

    fn generate_command(
        &self,
        table: &TableName,
        entity_count: usize,
        insert_columns: &[&str],
        join_columns: &[&str],
        updates: &[BoundAssignment],
    ) -> String {
        let target = self.quote_identifier(TARGET_ALIAS);
        let source = self.quote_identifier(SOURCE_ALIAS);
        let columns = self.column_list(insert_columns);

        let mut sql = format!(
            "MERGE INTO {} WITH (HOLDLOCK) AS {target} USING (VALUES {}) AS {source} ({columns})",
            self.quote_table(table),
            self.values_rows(entity_count, insert_columns.len()),
        );

        let on: Vec<String> = join_columns
            .iter()
            .map(|c| {
                let c = self.quote_identifier(c);
                format!("{target}.{c} = {source}.{c}")
            })
            .collect();
        sql.push_str(" ON ");
        sql.push_str(&on.join(" AND "));

        let source_values: Vec<String> = insert_columns
            .iter()
            .map(|c| format!("{source}.{}", self.quote_identifier(c)))
            .collect();
        sql.push_str(&format!(
            " WHEN NOT MATCHED BY TARGET THEN INSERT ({columns}) VALUES ({})",
            source_values.join(", ")
        ));

        if !updates.is_empty() {
            sql.push_str(" WHEN MATCHED THEN UPDATE SET ");
            sql.push_str(&self.assignment_list(updates));
        }
        sql.push(';');
        sql
    }
}
