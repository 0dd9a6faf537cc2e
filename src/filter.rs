//! Filter clause parsing and SQL translation
//!
//! Query endpoints accept a `filter` parameter holding a JSON array of
//! clauses. Each recognized clause becomes one SQL comparison and the whole
//! list is applied as a conjunction. Column names are checked against an
//! explicit per-table allow-list; clauses that do not match any allowed
//! shape (missing name, unknown column, unknown operator, unusable value
//! type) are a deliberate no-op rather than an error.

use crate::error::{AppError, Result};
use rusqlite::types::{ToSql, ToSqlOutput, Value as RusqliteValue};
use serde::Deserialize;
use serde_json::Value;

/// One clause of the client-supplied filter array.
///
/// All fields are optional on the wire; recognition happens during
/// translation, not deserialization, so a half-formed clause parses fine
/// and is then skipped.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterClause {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub op: Option<String>,
    #[serde(default)]
    pub val: Option<Value>,
}

/// A SQL parameter produced by clause translation.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Text(s) => ToSqlOutput::Owned(RusqliteValue::Text(s.clone())),
            SqlValue::Integer(i) => ToSqlOutput::Owned(RusqliteValue::Integer(*i)),
            SqlValue::Real(f) => ToSqlOutput::Owned(RusqliteValue::Real(*f)),
        })
    }
}

/// One translated comparison: a parameterized SQL fragment plus its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub sql: String,
    pub param: SqlValue,
}

/// Allowed filter columns for one metric table.
///
/// The label column only supports exact-match equality; comparison columns
/// support le/ge/eq. Anything else is skipped.
#[derive(Debug, Clone, Copy)]
pub struct FilterSchema {
    pub label_column: &'static str,
    pub comparison_columns: &'static [&'static str],
}

/// Filter columns for the stock table.
pub const STOCK_FILTER: FilterSchema = FilterSchema {
    label_column: "metric",
    comparison_columns: &["price", "volume", "time"],
};

/// Filter columns for the float and integer metric tables.
pub const VALUE_FILTER: FilterSchema = FilterSchema {
    label_column: "metric",
    comparison_columns: &["value", "time"],
};

/// Parse the raw `filter` query parameter into clauses.
///
/// An absent parameter defaults to `[]` upstream, so this only ever sees
/// client-supplied text; anything that is not a JSON clause array fails
/// the request.
pub fn parse_filter(raw: &str) -> Result<Vec<FilterClause>> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::Filter(format!("filter must be a JSON array of clauses: {}", e)))
}

impl FilterSchema {
    /// Translate clauses into SQL conditions, AND-ed by the query builder.
    ///
    /// Order is irrelevant (commutative conjunction) and duplicate clauses
    /// on one column all apply.
    pub fn translate(&self, clauses: &[FilterClause]) -> Vec<Condition> {
        let mut conditions = Vec::new();

        for clause in clauses {
            let name = match clause.name.as_deref() {
                Some(n) => n,
                None => {
                    tracing::debug!("skipping filter clause without a name");
                    continue;
                }
            };

            if name == self.label_column {
                // Equality only; any `op` on the label clause is ignored.
                match clause.val.as_ref().and_then(Value::as_str) {
                    Some(label) => conditions.push(Condition {
                        sql: format!("{} = ?", self.label_column),
                        param: SqlValue::Text(label.to_string()),
                    }),
                    None => tracing::debug!("skipping label clause with non-string value"),
                }
                continue;
            }

            if !self.comparison_columns.contains(&name) {
                tracing::debug!(column = name, "skipping filter clause on unknown column");
                continue;
            }

            let operator = match clause.op.as_deref() {
                Some("le") => "<=",
                Some("ge") => ">=",
                Some("eq") => "=",
                other => {
                    tracing::debug!(op = ?other, "skipping filter clause with unknown operator");
                    continue;
                }
            };

            match clause.val.as_ref().and_then(sql_value) {
                Some(param) => conditions.push(Condition {
                    sql: format!("{} {} ?", name, operator),
                    param,
                }),
                None => tracing::debug!(column = name, "skipping filter clause with unusable value"),
            }
        }

        conditions
    }
}

/// Map a JSON value onto a SQL parameter. Booleans, null, and containers
/// have no column counterpart and yield None.
fn sql_value(value: &Value) -> Option<SqlValue> {
    match value {
        Value::String(s) => Some(SqlValue::Text(s.clone())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(SqlValue::Integer(i))
            } else {
                n.as_f64().map(SqlValue::Real)
            }
        }
        _ => None,
    }
}
