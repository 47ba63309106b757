//! What happens to an existing row when an upsert hits a conflict.

use crate::expr::UpdateExpr;
use crate::value::ToSqlValue;

/// An ordered list of column assignments applied on conflict.
///
/// ```rust
/// use oxide_upsert_core::expr::{source, target};
/// use oxide_upsert_core::update::UpdateSpec;
///
/// let spec = UpdateSpec::new()
///     .set("count", target("count") + source("count"))
///     .set_value("status", "seen");
/// assert_eq!(spec.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSpec {
    assignments: Vec<(String, UpdateExpr)>,
}

impl UpdateSpec {
    /// Creates an empty specification.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns an expression to a property.
    #[must_use]
    pub fn set(mut self, property: &str, expr: UpdateExpr) -> Self {
        self.assignments.push((String::from(property), expr));
        self
    }

    /// Assigns a literal value to a property.
    #[must_use]
    pub fn set_value<T: ToSqlValue>(self, property: &str, value: T) -> Self {
        self.set(property, UpdateExpr::Value(value.to_sql_value()))
    }

    /// The assignments, in the order they were added.
    #[must_use]
    pub fn assignments(&self) -> &[(String, UpdateExpr)] {
        &self.assignments
    }

    /// Number of assignments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Returns whether no assignment was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Conflict policy for an upsert.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OnConflict {
    /// Overwrite every non-key, non-generated column with its incoming value.
    #[default]
    UpdateAll,
    /// Apply the given assignments only.
    Update(UpdateSpec),
    /// Leave the existing row untouched.
    DoNothing,
}

impl From<UpdateSpec> for OnConflict {
    fn from(spec: UpdateSpec) -> Self {
        Self::Update(spec)
    }
}

impl From<Option<UpdateSpec>> for OnConflict {
    fn from(spec: Option<UpdateSpec>) -> Self {
        spec.map_or(Self::UpdateAll, Self::Update)
    }
}
