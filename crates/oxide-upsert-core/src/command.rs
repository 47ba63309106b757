//! Upsert compilation.

use tracing::{debug, trace};

use crate::analyzer::analyze;
use crate::binder::bind;
use crate::dialect::UpsertDialect;
use crate::error::Result;
use crate::schema::{ColumnRef, EntitySchema};
use crate::known::UpdateAssignment;
use crate::update::OnConflict;
use crate::value::SqlValue;

/// A rendered statement and the parameters it references, in index order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCommand {
    /// SQL text.
    pub sql: String,
    /// Positional parameters.
    pub parameters: Vec<SqlValue>,
}

/// The batch-independent half of compilation.
pub(crate) struct Plan {
    pub(crate) join_columns: Vec<ColumnRef>,
    pub(crate) assignments: Vec<UpdateAssignment>,
}

/// Resolves the match columns and analyzes the update policy.
///
/// Every error this raises is also raised by [`compile`] for any batch.
pub(crate) fn plan<E>(
    schema: &EntitySchema<E>,
    match_on: &[&str],
    on_conflict: &OnConflict,
) -> Result<Plan> {
    let join_columns = schema.resolve_match(match_on)?;
    let assignments = analyze(schema, &join_columns, on_conflict)?;
    Ok(Plan {
        join_columns,
        assignments,
    })
}

/// Compiles an upsert of `entities` into a single statement.
///
/// `match_on` lists the properties that identify an existing row.
/// Compilation is all-or-nothing: on error no SQL is produced.
///
/// ```rust
/// use oxide_upsert_core::prelude::*;
///
/// struct Counter {
///     id: i64,
///     count: i64,
/// }
///
/// let schema = EntitySchema::new("counters")
///     .column("id", |c: &Counter| c.id.to_sql_value())
///     .column("count", |c: &Counter| c.count.to_sql_value());
/// let rows = [Counter { id: 1, count: 5 }];
/// let spec = UpdateSpec::new().set("count", target("count") + source("count"));
///
/// let command = compile(&PostgresDialect, &schema, &rows, &["id"], &spec.into()).unwrap();
/// assert_eq!(
///     command.sql,
///     "INSERT INTO \"counters\" AS \"T\" (\"id\", \"count\") VALUES ($1, $2) \
///      ON CONFLICT (\"id\") DO UPDATE SET \"count\" = \"T\".\"count\" + EXCLUDED.\"count\""
/// );
/// assert_eq!(command.parameters.len(), 2);
/// ```
///
/// # Errors
///
/// - [`UpsertError::InvalidMatchSpec`](crate::UpsertError::InvalidMatchSpec) when `match_on` is
///   empty or names a generated column;
/// - [`UpsertError::UnknownColumn`](crate::UpsertError::UnknownColumn),
///   [`UpsertError::MalformedUpdateSpec`](crate::UpsertError::MalformedUpdateSpec) and
///   [`UpsertError::UnsupportedOperation`](crate::UpsertError::UnsupportedOperation)
///   from resolving the match and update specifications;
/// - [`UpsertError::EmptyBatch`](crate::UpsertError::EmptyBatch) when `entities` is empty.
pub fn compile<D, E>(
    dialect: &D,
    schema: &EntitySchema<E>,
    entities: &[E],
    match_on: &[&str],
    on_conflict: &OnConflict,
) -> Result<CompiledCommand>
where
    D: UpsertDialect + ?Sized,
{
    let Plan {
        join_columns,
        assignments,
    } = plan(schema, match_on, on_conflict)?;
    let bindings = bind(schema, entities, &assignments)?;

    let insert_columns: Vec<&str> = schema.insert_columns().map(ColumnRef::column).collect();
    let join_names: Vec<&str> = join_columns.iter().map(ColumnRef::column).collect();
    let sql = dialect.generate_command(
        schema.table(),
        entities.len(),
        &insert_columns,
        &join_names,
        &bindings.updates,
    );

    debug!(
        dialect = dialect.name(),
        table = %schema.table(),
        entities = entities.len(),
        updates = bindings.updates.len(),
        parameters = bindings.parameters.len(),
        "compiled upsert command"
    );
    trace!(sql = %sql, "upsert sql");

    Ok(CompiledCommand {
        sql,
        parameters: bindings.parameters,
    })
}
