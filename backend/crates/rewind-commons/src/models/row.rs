//! Row images: the before/after snapshots an undo log is built from.

use crate::errors::{Result, RewindError};
use crate::models::table_meta::TableMeta;
use crate::models::value::SqlValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a field belongs to the primary key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyType {
    Null,
    PrimaryKey,
}

/// One column of one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: SqlValue,
    pub key_type: KeyType,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            key_type: KeyType::Null,
        }
    }

    pub fn primary_key(name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            key_type: KeyType::PrimaryKey,
        }
    }

    pub fn is_primary_key(&self) -> bool {
        self.key_type == KeyType::PrimaryKey
    }
}

/// One physical row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub fields: Vec<Field>,
}

impl Row {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn add(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Key fields in the table's declared key order.
    ///
    /// Every key column of `meta` must be present in the row.
    pub fn ordered_primary_keys<'a>(&'a self, meta: &TableMeta) -> Result<Vec<&'a Field>> {
        meta.primary_key_names()
            .iter()
            .map(|key| {
                self.get(key).ok_or_else(|| {
                    RewindError::invariant(format!(
                        "row image of '{}' is missing primary key column '{}'",
                        meta.table_name(),
                        key
                    ))
                })
            })
            .collect()
    }
}

/// Ordered rows of one table, captured at statement-execution time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRecords {
    pub table_name: String,
    pub rows: Vec<Row>,
}

impl TableRecords {
    pub fn new(table_name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            table_name: table_name.into(),
            rows,
        }
    }

    pub fn empty(table_name: impl Into<String>) -> Self {
        Self::new(table_name, Vec::new())
    }

    /// Build records from `(column, value)` pairs, tagging key columns from `meta`.
    pub fn from_values<I, R, S>(meta: &TableMeta, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (S, SqlValue)>,
        S: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                Row::new(
                    row.into_iter()
                        .map(|(name, value)| {
                            let name = name.into();
                            if meta.is_primary_key(&name) {
                                Field::primary_key(name, value)
                            } else {
                                Field::new(name, value)
                            }
                        })
                        .collect(),
                )
            })
            .collect();
        Self::new(meta.table_name(), rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Primary-key values per key column, one entry per row in row order.
    pub fn primary_key_values(&self, meta: &TableMeta) -> Result<BTreeMap<String, Vec<SqlValue>>> {
        let mut values: BTreeMap<String, Vec<SqlValue>> = BTreeMap::new();
        for row in &self.rows {
            for field in row.ordered_primary_keys(meta)? {
                values
                    .entry(field.name.clone())
                    .or_default()
                    .push(field.value.clone());
            }
        }
        Ok(values)
    }
}
