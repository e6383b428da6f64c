//! Turns decoded JSON rows into a columnar [`Frame`].

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde_json::Value;

use super::{Field, FieldValues, Frame, Row, ValueKind};

/// Column name that is always decoded as an RFC 3339 timestamp.
pub const TIME_COLUMN: &str = "time";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("column `{column}`, row {row}: parse timestamp: {source}")]
    ParseTimestamp {
        column: String,
        row: usize,
        #[source]
        source: chrono::ParseError,
    },

    #[error("column `{column}`, row {row}: expected a {expected} value")]
    TypeMismatch {
        column: String,
        row: usize,
        expected: &'static str,
    },
}

/// Decodes a row sequence into one frame.
///
/// The first row fixes both the column set and each column's decode path;
/// later rows are only validated against it. Columns whose first-row value
/// is neither a number nor text (and not named `time`) are dropped without
/// error. Any violation of the inferred path fails the whole decode.
///
/// An empty row sequence yields no frame at all rather than an empty one.
pub fn decode_rows(name: &str, rows: &[Row]) -> Result<Option<Frame>, Error> {
    let Some(first) = rows.first() else {
        return Ok(None);
    };

    let mut frame = Frame::new(name);

    // Sort the first row's keys so the column order is stable.
    for key in first.keys().sorted() {
        let kind = if key == TIME_COLUMN {
            ValueKind::Time
        } else {
            ValueKind::of(&first[key])
        };

        let values = match kind {
            ValueKind::Time => FieldValues::Time(decode_time_column(rows, key)?),
            ValueKind::Number => {
                FieldValues::Number(decode_column(rows, key, "number", Value::as_f64)?)
            }
            ValueKind::Text => FieldValues::Text(decode_column(rows, key, "text", |value| {
                value.as_str().map(String::from)
            })?),
            ValueKind::Unsupported => continue,
        };

        frame.fields.push(Field {
            name: key.clone(),
            values,
        });
    }

    Ok(Some(frame))
}

fn decode_time_column(rows: &[Row], key: &str) -> Result<Vec<DateTime<Utc>>, Error> {
    let mut column = Vec::with_capacity(rows.len());
    for (row, cells) in rows.iter().enumerate() {
        let raw = cells
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::TypeMismatch {
                column: key.to_string(),
                row,
                expected: "timestamp string",
            })?;
        let parsed = DateTime::parse_from_rfc3339(raw).map_err(|source| Error::ParseTimestamp {
            column: key.to_string(),
            row,
            source,
        })?;
        column.push(parsed.with_timezone(&Utc));
    }

    Ok(column)
}

fn decode_column<T>(
    rows: &[Row],
    key: &str,
    expected: &'static str,
    read: impl Fn(&Value) -> Option<T>,
) -> Result<Vec<T>, Error> {
    let mut column = Vec::with_capacity(rows.len());
    for (row, cells) in rows.iter().enumerate() {
        let cell = cells
            .get(key)
            .and_then(|value| read(value))
            .ok_or_else(|| Error::TypeMismatch {
                column: key.to_string(),
                row,
                expected,
            })?;
        column.push(cell);
    }

    Ok(column)
}
