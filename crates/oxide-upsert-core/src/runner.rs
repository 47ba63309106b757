//! Upsert execution.
//!
//! [`UpsertRunner`] compiles a command with its dialect and hands the SQL
//! and parameters to an execution backend. Backends implement [`Execute`]
//! (blocking) or [`ExecuteAsync`]; connection handling, transactions and
//! retries belong to them.

use std::future::Future;

use tracing::debug;

use crate::command::{compile, plan, CompiledCommand};
use crate::dialect::UpsertDialect;
use crate::error::{Result, UpsertError};
use crate::schema::EntitySchema;
use crate::update::OnConflict;
use crate::value::SqlValue;

/// A blocking execution backend.
pub trait Execute {
    /// Error raised by the backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Executes one statement and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Any error raised by the database or the connection.
    fn execute(&self, sql: &str, parameters: &[SqlValue]) -> std::result::Result<u64, Self::Error>;
}

/// An asynchronous execution backend.
///
/// Dropping the returned future cancels the call.
pub trait ExecuteAsync {
    /// Error raised by the backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Executes one statement and returns the number of affected rows.
    fn execute_async(
        &self,
        sql: &str,
        parameters: &[SqlValue],
    ) -> impl Future<Output = std::result::Result<u64, Self::Error>> + Send;
}

/// Compiles and runs upserts for one dialect.
#[derive(Debug, Clone, Default)]
pub struct UpsertRunner<D> {
    dialect: D,
}

impl<D: UpsertDialect> UpsertRunner<D> {
    /// Creates a runner rendering statements for `dialect`.
    #[must_use]
    pub const fn new(dialect: D) -> Self {
        Self { dialect }
    }

    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Compiles the command without executing it.
    ///
    /// # Errors
    ///
    /// See [`compile`].
    pub fn prepare<E>(
        &self,
        schema: &EntitySchema<E>,
        entities: &[E],
        match_on: &[&str],
        on_conflict: &OnConflict,
    ) -> Result<CompiledCommand> {
        compile(&self.dialect, schema, entities, match_on, on_conflict)
    }

    /// Upserts `entities` through a blocking backend.
    ///
    /// An empty batch returns `0` without touching the backend, once the
    /// match columns and update policy have been validated.
    ///
    /// # Errors
    ///
    /// Compilation errors (see [`compile`]) are returned before the backend
    /// is called; backend failures come back as [`UpsertError::Backend`].
    pub fn run<E, X: Execute>(
        &self,
        executor: &X,
        schema: &EntitySchema<E>,
        entities: &[E],
        match_on: &[&str],
        on_conflict: &OnConflict,
    ) -> Result<u64> {
        if entities.is_empty() {
            plan(schema, match_on, on_conflict)?;
            debug!(entity = schema.entity_name(), "empty batch, nothing to upsert");
            return Ok(0);
        }
        let command = self.prepare(schema, entities, match_on, on_conflict)?;
        let affected = executor
            .execute(&command.sql, &command.parameters)
            .map_err(|e| UpsertError::Backend(Box::new(e)))?;
        debug!(entity = schema.entity_name(), affected, "upsert executed");
        Ok(affected)
    }

    /// Upserts `entities` through an asynchronous backend.
    ///
    /// The command is fully compiled before the backend is awaited, so
    /// cancelling the returned future never leaves compiler state behind.
    ///
    /// # Errors
    ///
    /// Same as [`Self::run`].
    pub async fn run_async<E, X: ExecuteAsync>(
        &self,
        executor: &X,
        schema: &EntitySchema<E>,
        entities: &[E],
        match_on: &[&str],
        on_conflict: &OnConflict,
    ) -> Result<u64>
    where
        D: Sync,
        E: Sync,
        X: Sync,
    {
        if entities.is_empty() {
            plan(schema, match_on, on_conflict)?;
            debug!(entity = schema.entity_name(), "empty batch, nothing to upsert");
            return Ok(0);
        }
        let command = self.prepare(schema, entities, match_on, on_conflict)?;
        let affected = executor
            .execute_async(&command.sql, &command.parameters)
            .await
            .map_err(|e| UpsertError::Backend(Box::new(e)))?;
        debug!(entity = schema.entity_name(), affected, "upsert executed");
        Ok(affected)
    }
}
