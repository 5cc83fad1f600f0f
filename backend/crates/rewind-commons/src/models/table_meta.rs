//! Table and column metadata consumed by the engine.
//!
//! Loaded once per table by the metadata collaborator and shared behind `Arc`.

use crate::errors::{Result, RewindError};
use serde::{Deserialize, Serialize};

/// Metadata of a single column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    /// Declared type as reported by the store (e.g. "INTEGER", "VARCHAR(20)")
    pub data_type: String,
    pub nullable: bool,
    pub auto_increment: bool,
    /// Ordinal position in the table (1-indexed)
    pub ordinal_position: u32,
    /// Declared column default, if any
    pub default_value: Option<String>,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, ordinal_position: u32) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            auto_increment: false,
            ordinal_position,
            default_value: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }
}

/// Metadata of a table: its columns in ordinal order and the primary-key subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    table_name: String,
    columns: Vec<ColumnMeta>,
    primary_keys: Vec<String>,
}

impl TableMeta {
    /// Build table metadata.
    ///
    /// Columns are sorted by ordinal position. The primary key must be non-empty
    /// and every key name must name a column (case-insensitive).
    pub fn new(
        table_name: impl Into<String>,
        mut columns: Vec<ColumnMeta>,
        primary_keys: Vec<String>,
    ) -> Result<Self> {
        let table_name = table_name.into();
        if primary_keys.is_empty() {
            return Err(RewindError::invariant(format!(
                "table '{}' has no primary key",
                table_name
            )));
        }
        columns.sort_by_key(|c| c.ordinal_position);

        let mut resolved = Vec::with_capacity(primary_keys.len());
        for key in primary_keys {
            let column = columns
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(&key))
                .ok_or_else(|| {
                    RewindError::invariant(format!(
                        "primary key '{}' is not a column of table '{}'",
                        key, table_name
                    ))
                })?;
            resolved.push(column.name.clone());
        }

        Ok(Self {
            table_name,
            columns,
            primary_keys: resolved,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// All columns in ordinal order
    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    /// Primary-key column names in declared key order
    pub fn primary_key_names(&self) -> &[String] {
        &self.primary_keys
    }

    pub fn is_composite_key(&self) -> bool {
        self.primary_keys.len() > 1
    }

    pub fn column(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn is_primary_key(&self, name: &str) -> bool {
        self.primary_keys.iter().any(|k| k.eq_ignore_ascii_case(name))
    }

    /// Primary-key columns in declared key order
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &ColumnMeta> {
        self.primary_keys.iter().filter_map(move |k| self.column(k))
    }

    /// The auto-increment key column, if the key has one.
    pub fn auto_increment_key(&self) -> Option<&ColumnMeta> {
        self.primary_key_columns().find(|c| c.auto_increment)
    }

    /// Single-column key that is auto-incrementing.
    pub fn can_auto_increment(&self) -> bool {
        !self.is_composite_key() && self.auto_increment_key().is_some()
    }
}
