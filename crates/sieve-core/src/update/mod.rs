mod build;


use crate::{error::Error, value::Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// re-exports
pub use build::build_update;

/// Column → assignment. Ordered by column name so iteration is stable.
pub type UpdateMap = BTreeMap<String, Assignment>;

///
/// Assignment
///

#[derive(Clone, Debug, PartialEq)]
pub enum Assignment {
    /// `column = value`
    Value(Value),
    /// `column = <sql>` with positional parameters.
    Expr(UpdateExpr),
}

impl Assignment {
    #[must_use]
    pub const fn as_expr(&self) -> Option<&UpdateExpr> {
        match self {
            Self::Expr(expr) => Some(expr),
            Self::Value(_) => None,
        }
    }

    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Expr(_) => None,
        }
    }
}

///
/// UpdateExpr
///
/// Parameterized SQL fragment; each `?` binds the matching entry of `params`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateExpr {
    pub sql: String,
    pub params: Vec<Value>,
}

impl UpdateExpr {
    #[must_use]
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

///
/// Dialect
/// SQL flavor used for the JSON merge-patch template.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    MySql,
    Sqlite,
}

impl Dialect {
    /// Conditional merge-patch: a NULL or empty column takes the document
    /// as-is, otherwise the document is merged into it. Binds two params,
    /// both the JSON text.
    #[must_use]
    pub fn merge_json_sql(self, column: &str) -> String {
        match self {
            Self::MySql => format!(
                "CASE WHEN (`{column}` IS NULL OR `{column}` = '') THEN CAST(? AS JSON) \
                 ELSE JSON_MERGE_PATCH(`{column}`, CAST(? AS JSON)) END"
            ),
            Self::Sqlite => format!(
                "CASE WHEN (\"{column}\" IS NULL OR \"{column}\" = '') THEN json(?) \
                 ELSE json_patch(\"{column}\", json(?)) END"
            ),
        }
    }
}

/// JSON text bound by `merge_json`.
///
/// Documents bind as serialized. Plain snapshots bind through
/// [`Value::to_json`], except records: their serialized form is unknown.
pub(crate) fn merge_json_text(value: &Value) -> Result<String, Error> {
    let text = match value.deref_present() {
        Value::Document(document) => serde_json::to_string(document.json()?),
        Value::Record(_) => return Err(Error::ProjectionFailure { kind: "struct" }),
        other => serde_json::to_string(&other.to_json()),
    };

    Ok(text.unwrap_or_default())
}
