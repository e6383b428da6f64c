pub mod decode;

use chrono::{DateTime, Utc};
pub use decode::decode_rows;
use serde_json::Value;

/// A single result row, keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// Decode path of one column, fixed from the first row of a result set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Time,
    Number,
    Text,
    Unsupported,
}

impl ValueKind {
    /// Infer the decode path from a cell's JSON type.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::Text,
            _ => ValueKind::Unsupported,
        }
    }
}

/// Row-aligned values of a single column.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValues {
    Time(Vec<DateTime<Utc>>),
    Number(Vec<f64>),
    Text(Vec<String>),
    Int(Vec<i64>),
}

impl FieldValues {
    pub fn len(&self) -> usize {
        match self {
            FieldValues::Time(values) => values.len(),
            FieldValues::Number(values) => values.len(),
            FieldValues::Text(values) => values.len(),
            FieldValues::Int(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named, typed column.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub values: FieldValues,
}

/// A columnar result set: ordered columns with row-aligned values.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Frame {
    pub fn new(name: impl Into<String>) -> Self {
        Frame {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Number of rows, taken from the first column.
    pub fn row_count(&self) -> usize {
        self.fields.first().map_or(0, |field| field.values.len())
    }
}
