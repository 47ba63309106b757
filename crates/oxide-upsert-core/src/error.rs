//! Error types for upsert compilation and execution.

use thiserror::Error;

/// Boxed error returned by an execution backend.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while compiling or running an upsert.
///
/// Every variant except [`UpsertError::Backend`] is raised before a
/// statement is sent to the database.
#[derive(Debug, Error)]
pub enum UpsertError {
    /// The update specification is not a usable column-assignment list.
    #[error("malformed update specification: {0}")]
    MalformedUpdateSpec(String),

    /// A property name does not resolve to a column of the entity.
    #[error("unknown property `{property}` on entity `{entity}`")]
    UnknownColumn {
        /// The entity (table) being upserted.
        entity: String,
        /// The property that failed to resolve.
        property: String,
    },

    /// An update expression uses an operation outside assignment and `+ - * /`.
    #[error("unsupported operation in update expression: {0}")]
    UnsupportedOperation(String),

    /// The match specification names no columns, or a column the inserted
    /// rows do not carry.
    #[error("invalid match specification: {0}")]
    InvalidMatchSpec(String),

    /// There are no entities to compile a statement for.
    #[error("cannot compile an upsert for an empty batch")]
    EmptyBatch,

    /// Error raised by the execution backend, passed through unchanged.
    #[error(transparent)]
    Backend(BackendError),
}

impl UpsertError {
    pub(crate) fn unknown_column(entity: &str, property: &str) -> Self {
        Self::UnknownColumn {
            entity: entity.to_string(),
            property: property.to_string(),
        }
    }

    /// Returns whether the error was detected before reaching the database.
    #[must_use]
    pub const fn is_compile_error(&self) -> bool {
        !matches!(self, Self::Backend(_))
    }
}

/// Result type alias for upsert operations.
pub type Result<T> = std::result::Result<T, UpsertError>;
