//! Operator registry.
//!
//! The operator set is closed: query and update tokens resolve through
//! immutable tables to the enums below, and each query operator carries the
//! function that builds its leaf expression.

#[cfg(test)]
mod tests;

use crate::{
    error::Error,
    filter::Filter,
    update::{Assignment, Dialect, UpdateExpr},
    value::Value,
};
use std::fmt;

///
/// QueryOp
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum QueryOp {
    Lt,
    Lte,
    Eq,
    Ne,
    Gt,
    Gte,
    In,
    NotIn,
    Like,
    Null,
    Or,
}

impl QueryOp {
    /// Resolve a declared token; an absent or empty token means equality.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        query_operator(token).map(|entry| entry.op)
    }

    /// Canonical token.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::Like => "like",
            Self::Null => "null",
            Self::Or => "or",
        }
    }

    /// Membership operators require a list-shaped field.
    #[must_use]
    pub const fn is_membership(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }

    /// Construction function, if this operator builds a leaf expression.
    #[must_use]
    pub fn builder(self) -> Option<FilterFn> {
        QUERY_OPERATORS
            .iter()
            .find(|entry| entry.op == self)
            .and_then(|entry| entry.build)
    }
}

impl fmt::Display for QueryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Builds one leaf expression from a column and a non-empty field value.
/// `Ok(None)` means the value produces no expression.
pub type FilterFn = fn(&str, Value) -> Result<Option<Filter>, Error>;

///
/// QueryOperator
///

#[derive(Clone, Copy, Debug)]
pub struct QueryOperator {
    pub token: &'static str,
    pub op: QueryOp,
    pub build: Option<FilterFn>,
}

pub static QUERY_OPERATORS: &[QueryOperator] = &[
    QueryOperator {
        token: "",
        op: QueryOp::Eq,
        build: Some(build_eq),
    },
    QueryOperator {
        token: "=",
        op: QueryOp::Eq,
        build: Some(build_eq),
    },
    QueryOperator {
        token: "!=",
        op: QueryOp::Ne,
        build: Some(build_ne),
    },
    QueryOperator {
        token: "<",
        op: QueryOp::Lt,
        build: Some(build_lt),
    },
    QueryOperator {
        token: "<=",
        op: QueryOp::Lte,
        build: Some(build_lte),
    },
    QueryOperator {
        token: ">",
        op: QueryOp::Gt,
        build: Some(build_gt),
    },
    QueryOperator {
        token: ">=",
        op: QueryOp::Gte,
        build: Some(build_gte),
    },
    QueryOperator {
        token: "in",
        op: QueryOp::In,
        build: Some(build_in),
    },
    QueryOperator {
        token: "not in",
        op: QueryOp::NotIn,
        build: Some(build_not_in),
    },
    QueryOperator {
        token: "like",
        op: QueryOp::Like,
        build: Some(build_like),
    },
    QueryOperator {
        token: "null",
        op: QueryOp::Null,
        build: Some(build_null),
    },
    QueryOperator {
        token: "or",
        op: QueryOp::Or,
        build: None,
    },
];

/// Look up a query token.
#[must_use]
pub fn query_operator(token: &str) -> Option<&'static QueryOperator> {
    QUERY_OPERATORS.iter().find(|entry| entry.token == token)
}

///
/// CONSTRUCTION FUNCTIONS
///

#[allow(clippy::unnecessary_wraps)]
fn build_eq(column: &str, value: Value) -> Result<Option<Filter>, Error> {
    Ok(Some(Filter::eq(column, value)))
}

#[allow(clippy::unnecessary_wraps)]
fn build_ne(column: &str, value: Value) -> Result<Option<Filter>, Error> {
    Ok(Some(Filter::ne(column, value)))
}

#[allow(clippy::unnecessary_wraps)]
fn build_lt(column: &str, value: Value) -> Result<Option<Filter>, Error> {
    Ok(Some(Filter::lt(column, value)))
}

#[allow(clippy::unnecessary_wraps)]
fn build_lte(column: &str, value: Value) -> Result<Option<Filter>, Error> {
    Ok(Some(Filter::lte(column, value)))
}

#[allow(clippy::unnecessary_wraps)]
fn build_gt(column: &str, value: Value) -> Result<Option<Filter>, Error> {
    Ok(Some(Filter::gt(column, value)))
}

#[allow(clippy::unnecessary_wraps)]
fn build_gte(column: &str, value: Value) -> Result<Option<Filter>, Error> {
    Ok(Some(Filter::gte(column, value)))
}

fn build_in(column: &str, value: Value) -> Result<Option<Filter>, Error> {
    Ok(Some(Filter::in_(column, flatten(column, value)?)))
}

fn build_not_in(column: &str, value: Value) -> Result<Option<Filter>, Error> {
    Ok(Some(Filter::not_in(column, flatten(column, value)?)))
}

fn build_like(column: &str, value: Value) -> Result<Option<Filter>, Error> {
    match value {
        Value::Text(pattern) => Ok(Some(Filter::like(column, pattern))),
        other => Err(Error::InvalidFieldValue {
            column: column.to_string(),
            expected: "text",
            found: other.kind_name(),
        }),
    }
}

// `true` selects NULL rows, `false` non-NULL rows; anything else is ignored.
#[allow(clippy::unnecessary_wraps)]
fn build_null(column: &str, value: Value) -> Result<Option<Filter>, Error> {
    Ok(match value {
        Value::Bool(true) => Some(Filter::is_null(column)),
        Value::Bool(false) => Some(Filter::is_not_null(column)),
        _ => None,
    })
}

// Membership values become a flat list, one presence level stripped per item.
fn flatten(column: &str, value: Value) -> Result<Vec<Value>, Error> {
    match value {
        Value::List(items) => Ok(items.into_iter().map(Value::into_deref_present).collect()),
        other => Err(Error::InvalidFieldValue {
            column: column.to_string(),
            expected: "list",
            found: other.kind_name(),
        }),
    }
}

///
/// UpdateOp
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UpdateOp {
    Add,
    Sub,
    MergeJson,
}

impl UpdateOp {
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        update_operator(token).map(|entry| entry.op)
    }

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::MergeJson => "merge_json",
        }
    }

    /// Build the compound assignment for `column`.
    ///
    /// Returns `None` when the value serializes to nothing, in which case
    /// the column is left out of the update.
    pub fn build(
        self,
        column: &str,
        value: Value,
        dialect: Dialect,
    ) -> Result<Option<Assignment>, Error> {
        let expr = match self {
            Self::Add => UpdateExpr::new(format!("{column} + ?"), vec![value]),
            Self::Sub => UpdateExpr::new(format!("{column} - ?"), vec![value]),
            Self::MergeJson => {
                let json = crate::update::merge_json_text(&value)?;
                if json.is_empty() {
                    return Ok(None);
                }

                UpdateExpr::new(
                    dialect.merge_json_sql(column),
                    vec![Value::Text(json.clone()), Value::Text(json)],
                )
            }
        };

        Ok(Some(Assignment::Expr(expr)))
    }
}

impl fmt::Display for UpdateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

///
/// UpdateOperator
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UpdateOperator {
    pub token: &'static str,
    pub op: UpdateOp,
}

pub static UPDATE_OPERATORS: &[UpdateOperator] = &[
    UpdateOperator {
        token: "+",
        op: UpdateOp::Add,
    },
    UpdateOperator {
        token: "-",
        op: UpdateOp::Sub,
    },
    UpdateOperator {
        token: "merge_json",
        op: UpdateOp::MergeJson,
    },
];

/// Look up an update token. The empty token is direct assignment and has no
/// entry.
#[must_use]
pub fn update_operator(token: &str) -> Option<&'static UpdateOperator> {
    UPDATE_OPERATORS.iter().find(|entry| entry.token == token)
}
