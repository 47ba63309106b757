//! Update expression builder.
//!
//! Update specifications are written as small expression trees:
//!
//! ```rust
//! use oxide_upsert_core::expr::{source, target, value};
//!
//! // count = existing count + incoming count
//! let add = target("count") + source("count");
//! // score = existing score * 2
//! let double = target("score") * value(2_i64);
//! ```
//!
//! The builder can describe more than an upsert can compile (comparisons,
//! logic, function calls, nesting). Those shapes are rejected with
//! `UnsupportedOperation` when the command is compiled.

use std::fmt;
use std::ops;

use crate::value::{SqlValue, ToSqlValue};

/// Which row a property reference reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The incoming row proposed for insertion.
    Source,
    /// The existing row in the table; only meaningful on conflict.
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

/// Binary operators the builder can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    Gt,

    // Logical
    And,
    Or,

    // String
    Concat,
}

impl BinaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Concat => "||",
        }
    }

    /// Returns whether the operator is one of `+ - * /`.
    #[must_use]
    pub const fn is_simple_arithmetic(&self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Mul | Self::Div)
    }
}

/// An update expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateExpr {
    /// A literal value, bound as a parameter.
    Value(SqlValue),
    /// A property of the source or target row.
    Property {
        /// Which row the property is read from.
        side: Side,
        /// Property name, resolved against the entity schema.
        name: String,
    },
    /// A binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<UpdateExpr>,
        /// Right operand.
        right: Box<UpdateExpr>,
    },
    /// A function call.
    Call {
        /// Function name.
        name: String,
        /// Arguments.
        args: Vec<UpdateExpr>,
    },
}

/// References a property of the incoming row.
#[must_use]
pub fn source(property: &str) -> UpdateExpr {
    UpdateExpr::Property {
        side: Side::Source,
        name: String::from(property),
    }
}

/// References a property of the existing row.
#[must_use]
pub fn target(property: &str) -> UpdateExpr {
    UpdateExpr::Property {
        side: Side::Target,
        name: String::from(property),
    }
}

/// A literal value.
#[must_use]
pub fn value<T: ToSqlValue>(value: T) -> UpdateExpr {
    UpdateExpr::Value(value.to_sql_value())
}

/// A function call, e.g. `call("COALESCE", vec![target("a"), value(0)])`.
#[must_use]
pub fn call(name: &str, args: Vec<UpdateExpr>) -> UpdateExpr {
    UpdateExpr::Call {
        name: String::from(name),
        args,
    }
}

impl UpdateExpr {
    fn binary(self, op: BinaryOp, right: Self) -> Self {
        Self::Binary {
            op,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    /// `self = right`.
    #[must_use]
    pub fn equals(self, right: Self) -> Self {
        self.binary(BinaryOp::Eq, right)
    }

    /// `self != right`.
    #[must_use]
    pub fn not_equals(self, right: Self) -> Self {
        self.binary(BinaryOp::NotEq, right)
    }

    /// `self < right`.
    #[must_use]
    pub fn less_than(self, right: Self) -> Self {
        self.binary(BinaryOp::Lt, right)
    }

    /// `self > right`.
    #[must_use]
    pub fn greater_than(self, right: Self) -> Self {
        self.binary(BinaryOp::Gt, right)
    }

    /// `self AND right`.
    #[must_use]
    pub fn and(self, right: Self) -> Self {
        self.binary(BinaryOp::And, right)
    }

    /// `self OR right`.
    #[must_use]
    pub fn or(self, right: Self) -> Self {
        self.binary(BinaryOp::Or, right)
    }

    /// `self || right`.
    #[must_use]
    pub fn concat(self, right: Self) -> Self {
        self.binary(BinaryOp::Concat, right)
    }

    /// Short description of the expression's outermost operation.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Value(v) => format!("{} value", v.type_name()),
            Self::Property { side, name } => format!("{side}.{name}"),
            Self::Binary { op, .. } => format!("operator `{}`", op.as_str()),
            Self::Call { name, .. } => format!("function call `{name}`"),
        }
    }
}

impl From<SqlValue> for UpdateExpr {
    fn from(value: SqlValue) -> Self {
        Self::Value(value)
    }
}

macro_rules! binary_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl ops::$trait for UpdateExpr {
            type Output = Self;

            fn $method(self, right: Self) -> Self {
                self.binary($op, right)
            }
        }
    };
}

binary_operator!(Add, add, BinaryOp::Add);
binary_operator!(Sub, sub, BinaryOp::Sub);
binary_operator!(Mul, mul, BinaryOp::Mul);
binary_operator!(Div, div, BinaryOp::Div);
binary_operator!(Rem, rem, BinaryOp::Mod);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_overloads_build_binary_nodes() {
        let expr = target("count") + source("count");
        match expr {
            UpdateExpr::Binary { op, left, right } => {
                assert_eq!(op, BinaryOp::Add);
                assert_eq!(*left, target("count"));
                assert_eq!(*right, source("count"));
            }
            other => panic!("Expected binary node, got {other:?}"),
        }
    }

    #[test]
    fn test_rem_is_modulo() {
        let expr = target("n") % value(3_i64);
        assert_eq!(expr.describe(), "operator `%`");
    }

    #[test]
    fn test_describe() {
        assert_eq!(source("name").describe(), "source.name");
        assert_eq!(value("x").describe(), "text value");
        assert_eq!(
            call("lower", vec![source("name")]).describe(),
            "function call `lower`"
        );
        assert_eq!(
            target("a").equals(value(1_i64)).describe(),
            "operator `=`"
        );
    }

    #[test]
    fn test_simple_arithmetic() {
        assert!(BinaryOp::Div.is_simple_arithmetic());
        assert!(!BinaryOp::Mod.is_simple_arithmetic());
        assert!(!BinaryOp::And.is_simple_arithmetic());
    }
}
