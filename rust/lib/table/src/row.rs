use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity of a table row, taken from its `id` field or, failing that, its
/// `key` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl RowId {
    /// Identity from a JSON value. Falsy values (`null`, `false`, `0`, `""`)
    /// carry no identity.
    pub fn from_value(v: &Value) -> Option<RowId> {
        match v {
            Value::Null | Value::Bool(false) => None,
            Value::Number(n) => match n.as_i64() {
                Some(0) => None,
                Some(i) => Some(RowId::Int(i)),
                None => n
                    .as_f64()
                    .filter(|f| *f != 0.0 && !f.is_nan())
                    .map(|_| RowId::Text(n.to_string())),
            },
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(RowId::Text(s.clone())),
            other => Some(RowId::Text(other.to_string())),
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(i) => write!(f, "{}", i),
            RowId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RowId {
    fn from(i: i64) -> Self {
        RowId::Int(i)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        RowId::Text(s.to_string())
    }
}

/// A record the table can display. The engine only looks at the identity
/// and at fields named by column keys.
pub trait TableRow {
    fn field(&self, key: &str) -> Option<Cow<'_, Value>>;

    fn row_id(&self) -> Option<RowId> {
        self.field("id")
            .and_then(|v| RowId::from_value(&v))
            .or_else(|| self.field("key").and_then(|v| RowId::from_value(&v)))
    }
}

impl TableRow for Map<String, Value> {
    fn field(&self, key: &str) -> Option<Cow<'_, Value>> {
        self.get(key).map(Cow::Borrowed)
    }
}

impl TableRow for Value {
    fn field(&self, key: &str) -> Option<Cow<'_, Value>> {
        self.get(key).map(Cow::Borrowed)
    }
}

/// Plain-text rendering of a cell value: `null` is empty, strings are bare,
/// everything else is its JSON text.
pub fn display_value(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
