//! Column values as seen by the undo engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single column value in a row image, a bound parameter, or a driver result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum SqlValue {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    /// Exact numeric text, for literals and driver values that do not fit an `i64`
    Decimal(String),
    Text(String),
    Bytes(Vec<u8>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Integer view of the value.
    ///
    /// Drivers commonly hand identity values back as DECIMAL text, so integral
    /// text (optionally with a `.0…` fraction) is accepted too.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(v) => Some(*v),
            SqlValue::Text(s) | SqlValue::Decimal(s) => integral_text(s),
            SqlValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value as a SQL literal suitable for inlining into statement text.
    pub fn to_sql_literal(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Boolean(true) => "TRUE".to_string(),
            SqlValue::Boolean(false) => "FALSE".to_string(),
            SqlValue::Int(v) => v.to_string(),
            SqlValue::Float(v) => v.to_string(),
            SqlValue::Decimal(d) => d.clone(),
            SqlValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
            SqlValue::Bytes(b) => {
                let hex: String = b.iter().map(|byte| format!("{:02x}", byte)).collect();
                format!("X'{}'", hex)
            },
        }
    }
}

fn integral_text(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let (int_part, frac) = s.split_once('.')?;
    if !frac.is_empty() && frac.chars().all(|c| c == '0') {
        int_part.parse::<i64>().ok()
    } else {
        None
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql_literal())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v.into())
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Boolean(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// Rows returned by the driver for a query or a generated-keys request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRows {
    pub rows: Vec<Vec<SqlValue>>,
}

impl ResultRows {
    pub fn new(rows: Vec<Vec<SqlValue>>) -> Self {
        Self { rows }
    }

    /// One row per value, single column.
    pub fn single_column(values: impl IntoIterator<Item = SqlValue>) -> Self {
        Self {
            rows: values.into_iter().map(|v| vec![v]).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of column `col` (0-based) in the first row.
    pub fn first_value(&self, col: usize) -> Option<&SqlValue> {
        self.rows.first().and_then(|row| row.get(col))
    }

    /// All values of column `col` (0-based); rows missing the column yield NULL.
    pub fn column(&self, col: usize) -> Vec<SqlValue> {
        self.rows
            .iter()
            .map(|row| row.get(col).cloned().unwrap_or(SqlValue::Null))
            .collect()
    }
}
