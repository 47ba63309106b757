//! Normalized update expressions.
//!
//! The analyzer lowers an [`UpdateExpr`](crate::expr::UpdateExpr) tree into
//! an [`Expression`]: a single value, or one `+ - * /` over two values.
//! Nothing else is representable, so everything downstream of the analyzer
//! can render without failing.

use std::fmt;

use crate::expr::Side;
use crate::schema::ColumnRef;
use crate::value::SqlValue;

/// The four operators an update expression may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    /// The operator symbol, identical in every supported dialect.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }
}

/// Kind of an [`Expression`], mirroring the shapes accepted from callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    MemberAccess,
    Constant,
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// A value inside an analyzed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum KnownValue {
    /// A literal, bound as a parameter.
    Constant(SqlValue),
    /// A resolved column of the source or target row.
    Property {
        /// The resolved column.
        column: ColumnRef,
        /// Which row it is read from.
        side: Side,
    },
}

impl KnownValue {
    /// Returns the literal if this is a constant.
    #[must_use]
    pub const fn as_constant(&self) -> Option<&SqlValue> {
        match self {
            Self::Constant(v) => Some(v),
            Self::Property { .. } => None,
        }
    }
}

/// A value after parameter indices have been assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundValue {
    /// Positional parameter, zero-based.
    Parameter(usize),
    /// A column of the source or target row, by storage name.
    Column {
        /// Storage name of the column.
        name: String,
        /// Which row it is read from.
        side: Side,
    },
}

/// A single value, or one arithmetic operation over two values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression<V> {
    /// A bare value.
    Value(V),
    /// `left op right`.
    Arithmetic {
        /// Operator.
        op: ArithmeticOp,
        /// Left operand.
        left: V,
        /// Right operand.
        right: V,
    },
}

/// An expression over analyzed values.
pub type KnownExpression = Expression<KnownValue>;

/// An expression whose constants have been replaced by parameter indices.
pub type BoundExpression = Expression<BoundValue>;

impl<V> Expression<V> {
    /// Operands in rendering order: left before right.
    pub fn operands(&self) -> impl Iterator<Item = &V> {
        let (first, second) = match self {
            Self::Value(v) => (v, None),
            Self::Arithmetic { left, right, .. } => (left, Some(right)),
        };
        std::iter::once(first).chain(second)
    }

    /// Maps every operand, visiting them in the order of [`Self::operands`].
    pub fn map<W>(&self, mut f: impl FnMut(&V) -> W) -> Expression<W> {
        match self {
            Self::Value(v) => Expression::Value(f(v)),
            Self::Arithmetic { op, left, right } => {
                let left = f(left);
                let right = f(right);
                Expression::Arithmetic {
                    op: *op,
                    left,
                    right,
                }
            }
        }
    }
}

impl KnownExpression {
    /// The expression kind.
    #[must_use]
    pub const fn kind(&self) -> ExpressionKind {
        match self {
            Self::Value(KnownValue::Constant(_)) => ExpressionKind::Constant,
            Self::Value(KnownValue::Property { .. }) => ExpressionKind::MemberAccess,
            Self::Arithmetic { op, .. } => match op {
                ArithmeticOp::Add => ExpressionKind::Add,
                ArithmeticOp::Subtract => ExpressionKind::Subtract,
                ArithmeticOp::Multiply => ExpressionKind::Multiply,
                ArithmeticOp::Divide => ExpressionKind::Divide,
            },
        }
    }

    /// Reads a column of the incoming row.
    #[must_use]
    pub fn source(column: ColumnRef) -> Self {
        Self::Value(KnownValue::Property {
            column,
            side: Side::Source,
        })
    }

    /// Constants in operand order.
    pub fn constants(&self) -> impl Iterator<Item = &SqlValue> {
        self.operands().filter_map(KnownValue::as_constant)
    }
}

/// One column assignment of the update branch.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateAssignment {
    /// Column being assigned.
    pub column: ColumnRef,
    /// Value assigned to it.
    pub expression: KnownExpression,
}

/// An assignment ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundAssignment {
    /// Storage name of the assigned column.
    pub column: String,
    /// Value assigned to it.
    pub expression: BoundExpression,
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
