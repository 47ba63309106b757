//! Parameter binding.
//!
//! Binding runs in two passes over the same order:
//!
//! 1. collect every value into one list: the insert columns of each entity
//!    (batch order, then column order), followed by the constants of each
//!    update assignment (assignment order, then operand order);
//! 2. rebuild the update assignments with each constant replaced by its
//!    position in that list.
//!
//! The index a renderer prints is therefore exactly the position of the
//! value in the parameter list handed to the backend.

use crate::error::{Result, UpsertError};
use crate::known::{BoundAssignment, BoundValue, KnownValue, UpdateAssignment};
use crate::schema::{EntitySchema, Getter};
use crate::value::SqlValue;

/// Parameters and bound update assignments for one statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Bindings {
    /// Every parameter, in index order.
    pub parameters: Vec<SqlValue>,
    /// Update assignments referencing `parameters` by index.
    pub updates: Vec<BoundAssignment>,
}

/// Binds a batch of entities and the update assignments.
///
/// # Errors
///
/// Returns [`UpsertError::EmptyBatch`] when `entities` is empty.
pub fn bind<E>(
    schema: &EntitySchema<E>,
    entities: &[E],
    assignments: &[UpdateAssignment],
) -> Result<Bindings> {
    if entities.is_empty() {
        return Err(UpsertError::EmptyBatch);
    }

    let parameters = collect_parameters(schema, entities, assignments);
    let first_update_index = parameters.len()
        - assignments
            .iter()
            .map(|a| a.expression.constants().count())
            .sum::<usize>();

    let mut next_index = first_update_index;
    let mut updates = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        let expression = assignment.expression.map(|value| match value {
            KnownValue::Constant(_) => {
                let index = next_index;
                next_index += 1;
                BoundValue::Parameter(index)
            }
            KnownValue::Property { column, side } => BoundValue::Column {
                name: column.column().to_string(),
                side: *side,
            },
        });
        updates.push(BoundAssignment {
            column: assignment.column.column().to_string(),
            expression,
        });
    }
    debug_assert_eq!(next_index, parameters.len());

    Ok(Bindings {
        parameters,
        updates,
    })
}

fn collect_parameters<E>(
    schema: &EntitySchema<E>,
    entities: &[E],
    assignments: &[UpdateAssignment],
) -> Vec<SqlValue> {
    let getters: Vec<Getter<E>> = schema.getters().collect();
    let mut parameters = Vec::with_capacity(entities.len() * getters.len());
    for entity in entities {
        parameters.extend(getters.iter().map(|get| get(entity)));
    }
    parameters.extend(
        assignments
            .iter()
            .flat_map(|a| a.expression.constants())
            .cloned(),
    );
    parameters
}
