mod build;


use crate::value::Value;
use std::{
    fmt,
    ops::{BitAnd, BitOr},
};

// re-exports
pub use build::build_filter;

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
}

impl CompareOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Like => "LIKE",
        }
    }
}

///
/// Filter
///
/// Boolean expression tree usable as a WHERE clause. Rendering to SQL is
/// left to the caller; `Display` exists for diagnostics only.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    Compare {
        column: String,
        op: CompareOp,
        value: Value,
    },
    In {
        column: String,
        values: Vec<Value>,
    },
    NotIn {
        column: String,
        values: Vec<Value>,
    },
    And(Vec<Self>),
    Or(Vec<Self>),
}

impl Filter {
    #[must_use]
    pub fn compare(column: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Eq, value)
    }

    #[must_use]
    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Ne, value)
    }

    #[must_use]
    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Lt, value)
    }

    #[must_use]
    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Lte, value)
    }

    #[must_use]
    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Gt, value)
    }

    #[must_use]
    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Gte, value)
    }

    #[must_use]
    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::compare(column, CompareOp::Like, Value::Text(pattern.into()))
    }

    #[must_use]
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::compare(column, CompareOp::Eq, Value::Null)
    }

    #[must_use]
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::compare(column, CompareOp::Ne, Value::Null)
    }

    #[must_use]
    pub fn in_(column: impl Into<String>, values: Vec<Value>) -> Self {
        Self::In {
            column: column.into(),
            values,
        }
    }

    #[must_use]
    pub fn not_in(column: impl Into<String>, values: Vec<Value>) -> Self {
        Self::NotIn {
            column: column.into(),
            values,
        }
    }

    #[must_use]
    pub const fn and(filters: Vec<Self>) -> Self {
        Self::And(filters)
    }

    #[must_use]
    pub const fn or(filters: Vec<Self>) -> Self {
        Self::Or(filters)
    }

    /// Combine sibling expressions: nothing for none, the expression itself
    /// for one, otherwise an `And` or `Or` node.
    #[must_use]
    pub fn join(mut filters: Vec<Self>, conjunctive: bool) -> Option<Self> {
        match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ if conjunctive => Some(Self::And(filters)),
            _ => Some(Self::Or(filters)),
        }
    }

    /// Number of leaf comparisons in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::And(children) | Self::Or(children) => children.iter().map(Self::leaf_count).sum(),
            _ => 1,
        }
    }

    const fn is_group(&self) -> bool {
        matches!(self, Self::And(_) | Self::Or(_))
    }
}

impl BitAnd for Filter {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitOr for Filter {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare {
                column,
                op: CompareOp::Eq,
                value: Value::Null,
            } => write!(f, "{column} IS NULL"),
            Self::Compare {
                column,
                op: CompareOp::Ne,
                value: Value::Null,
            } => write!(f, "{column} IS NOT NULL"),
            Self::Compare { column, op, value } => {
                write!(f, "{column} {} {value}", op.symbol())
            }
            Self::In { column, values } => {
                write!(f, "{column} IN {}", Value::List(values.clone()))
            }
            Self::NotIn { column, values } => {
                write!(f, "{column} NOT IN {}", Value::List(values.clone()))
            }
            Self::And(children) => write_group(f, children, " AND "),
            Self::Or(children) => write_group(f, children, " OR "),
        }
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, children: &[Filter], sep: &str) -> fmt::Result {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        if child.is_group() {
            write!(f, "({child})")?;
        } else {
            write!(f, "{child}")?;
        }
    }

    Ok(())
}
