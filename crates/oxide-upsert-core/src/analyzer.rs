//! Update specification analysis.
//!
//! Turns an [`OnConflict`] policy into the list of column assignments the
//! update branch performs, resolving every property against the schema and
//! rejecting shapes no dialect can render.

use tracing::trace;

use crate::error::{Result, UpsertError};
use crate::expr::{BinaryOp, Side, UpdateExpr};
use crate::known::{ArithmeticOp, Expression, KnownExpression, KnownValue, UpdateAssignment};
use crate::schema::{ColumnRef, EntitySchema};
use crate::update::{OnConflict, UpdateSpec};

/// Produces one assignment per column the update branch writes.
///
/// `match_columns` must already be resolved; they are excluded from the
/// default policy.
///
/// # Errors
///
/// - [`UpsertError::MalformedUpdateSpec`] for an empty specification, a
///   generated column on the left-hand side, a column assigned twice, or a
///   source-side reference to a generated column.
/// - [`UpsertError::UnknownColumn`] for any property that does not resolve.
/// - [`UpsertError::UnsupportedOperation`] for anything but a value, a
///   property, or one `+ - * /` over two of those.
pub fn analyze<E>(
    schema: &EntitySchema<E>,
    match_columns: &[ColumnRef],
    policy: &OnConflict,
) -> Result<Vec<UpdateAssignment>> {
    let assignments = match policy {
        OnConflict::UpdateAll => default_assignments(schema, match_columns),
        OnConflict::Update(spec) => explicit_assignments(schema, spec)?,
        OnConflict::DoNothing => Vec::new(),
    };
    trace!(
        entity = schema.entity_name(),
        assignments = assignments.len(),
        "analyzed update policy"
    );
    Ok(assignments)
}

fn default_assignments<E>(
    schema: &EntitySchema<E>,
    match_columns: &[ColumnRef],
) -> Vec<UpdateAssignment> {
    schema
        .insert_columns()
        .filter(|column| !match_columns.contains(column))
        .map(|column| UpdateAssignment {
            column: column.clone(),
            expression: KnownExpression::source(column.clone()),
        })
        .collect()
}

fn explicit_assignments<E>(
    schema: &EntitySchema<E>,
    spec: &UpdateSpec,
) -> Result<Vec<UpdateAssignment>> {
    if spec.is_empty() {
        return Err(UpsertError::MalformedUpdateSpec(String::from(
            "no column is assigned",
        )));
    }

    let mut assignments: Vec<UpdateAssignment> = Vec::with_capacity(spec.len());
    for (property, expr) in spec.assignments() {
        let column = schema.resolve(property)?;
        if column.is_generated() {
            return Err(UpsertError::MalformedUpdateSpec(format!(
                "column `{}` is generated by the database and cannot be assigned",
                column.column()
            )));
        }
        if assignments.iter().any(|a| a.column == *column) {
            return Err(UpsertError::MalformedUpdateSpec(format!(
                "column `{}` is assigned more than once",
                column.column()
            )));
        }
        assignments.push(UpdateAssignment {
            column: column.clone(),
            expression: lower(schema, expr)?,
        });
    }
    Ok(assignments)
}

fn lower<E>(schema: &EntitySchema<E>, expr: &UpdateExpr) -> Result<KnownExpression> {
    match expr {
        UpdateExpr::Binary { op, left, right } => {
            let op = arithmetic_op(*op).ok_or_else(|| unsupported(expr))?;
            Ok(Expression::Arithmetic {
                op,
                left: operand(schema, left)?,
                right: operand(schema, right)?,
            })
        }
        UpdateExpr::Call { .. } => Err(unsupported(expr)),
        UpdateExpr::Value(_) | UpdateExpr::Property { .. } => {
            Ok(Expression::Value(operand(schema, expr)?))
        }
    }
}

fn operand<E>(schema: &EntitySchema<E>, expr: &UpdateExpr) -> Result<KnownValue> {
    match expr {
        UpdateExpr::Value(value) => Ok(KnownValue::Constant(value.clone())),
        UpdateExpr::Property { side, name } => {
            let column = schema.resolve(name)?;
            if *side == Side::Source && column.is_generated() {
                return Err(UpsertError::MalformedUpdateSpec(format!(
                    "`source.{name}` refers to generated column `{}`, which is not part of the inserted row",
                    column.column()
                )));
            }
            Ok(KnownValue::Property {
                column: column.clone(),
                side: *side,
            })
        }
        nested => Err(UpsertError::UnsupportedOperation(format!(
            "{} used as an operand; only values and properties can be combined",
            nested.describe()
        ))),
    }
}

const fn arithmetic_op(op: BinaryOp) -> Option<ArithmeticOp> {
    match op {
        BinaryOp::Add => Some(ArithmeticOp::Add),
        BinaryOp::Sub => Some(ArithmeticOp::Subtract),
        BinaryOp::Mul => Some(ArithmeticOp::Multiply),
        BinaryOp::Div => Some(ArithmeticOp::Divide),
        _ => None,
    }
}

fn unsupported(expr: &UpdateExpr) -> UpsertError {
    UpsertError::UnsupportedOperation(expr.describe())
}
