//! INSERT statement analysis

use super::params::PlaceholderCounter;
use super::value_expr::{classify_value, ValueExpr};
use crate::parser::object_name_parts;
use rewind_commons::{Result, RewindError};
use sqlparser::ast::{Insert, SetExpr, TableObject};

/// Structured intent of one `INSERT INTO t (cols) VALUES (...), (...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertFacts {
    pub table_name: String,
    /// Column names as written (unquoted); empty when the statement has no
    /// column list and values follow the table's column order.
    pub columns: Vec<String>,
    /// One entry per VALUES row
    pub rows: Vec<Vec<ValueExpr>>,
}

impl InsertFacts {
    pub fn has_column_list(&self) -> bool {
        !self.columns.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of `name` in the column list (case-insensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }
}

pub(crate) fn analyze_insert(insert: &Insert) -> Result<InsertFacts> {
    let name = match &insert.table {
        TableObject::TableName(name) => name,
        _ => return Err(RewindError::unsupported("INSERT into a table function")),
    };
    let table_name = object_name_parts(name).join(".");

    // each of these may keep or displace an existing row, which a DELETE by key would destroy
    if insert.replace_into || insert.or.is_some() {
        return Err(RewindError::unsupported("REPLACE / INSERT OR REPLACE"));
    }
    if insert.ignore {
        return Err(RewindError::unsupported("INSERT IGNORE"));
    }
    if insert.on.is_some() {
        return Err(RewindError::unsupported(
            "INSERT with ON DUPLICATE KEY UPDATE / ON CONFLICT",
        ));
    }

    let source = insert
        .source
        .as_ref()
        .ok_or_else(|| RewindError::unsupported("INSERT ... DEFAULT VALUES"))?;
    if source.with.is_some() {
        return Err(RewindError::unsupported("INSERT with a WITH clause"));
    }
    let values = match source.body.as_ref() {
        SetExpr::Values(values) => values,
        _ => return Err(RewindError::unsupported("INSERT ... SELECT")),
    };

    let columns: Vec<String> = insert.columns.iter().map(|ident| ident.value.clone()).collect();

    let mut counter = PlaceholderCounter::default();
    let mut rows = Vec::with_capacity(values.rows.len());
    for (row_index, value_row) in values.rows.iter().enumerate() {
        if !columns.is_empty() && value_row.len() != columns.len() {
            return Err(RewindError::invalid_sql(format!(
                "VALUES row {} has {} values for {} columns",
                row_index + 1,
                value_row.len(),
                columns.len()
            )));
        }
        let row = value_row
            .iter()
            .map(|expr| classify_value(expr, &mut counter))
            .collect::<Result<Vec<_>>>()?;
        rows.push(row);
    }

    log::debug!(
        "Analyzed INSERT into {}: {} column(s), {} row(s)",
        table_name,
        columns.len(),
        rows.len()
    );

    Ok(InsertFacts {
        table_name,
        columns,
        rows,
    })
}
