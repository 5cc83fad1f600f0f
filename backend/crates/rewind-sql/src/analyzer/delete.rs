//! DELETE statement analysis

use super::params::PlaceholderCounter;
use super::predicate::WherePredicate;
use super::{single_table, TargetTable};
use rewind_commons::{Result, RewindError};
use sqlparser::ast::{Delete, FromTable};

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteFacts {
    pub table_name: String,
    pub table_alias: Option<String>,
    /// `None` when the statement deletes every row
    pub predicate: Option<WherePredicate>,
}

pub(crate) fn analyze_delete(delete: &Delete) -> Result<DeleteFacts> {
    if !delete.tables.is_empty() {
        return Err(RewindError::unsupported("multi-table DELETE"));
    }
    if delete.using.is_some() {
        return Err(RewindError::unsupported("DELETE with USING"));
    }
    // the before image cannot tell which of the matching rows a LIMIT picks
    if delete.limit.is_some() || !delete.order_by.is_empty() {
        return Err(RewindError::unsupported("DELETE with ORDER BY / LIMIT"));
    }

    let tables = match &delete.from {
        FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => tables,
    };
    let table = match tables.as_slice() {
        [table] => table,
        [] => return Err(RewindError::invalid_sql("DELETE without a target table")),
        _ => return Err(RewindError::unsupported("multi-table DELETE")),
    };
    let TargetTable { name, alias } = single_table(table, "DELETE")?;

    let predicate = delete
        .selection
        .as_ref()
        .map(|expr| WherePredicate::new(expr, &mut PlaceholderCounter::default()))
        .transpose()?;

    log::debug!("Analyzed DELETE from {}: where={}", name, predicate.is_some());

    Ok(DeleteFacts {
        table_name: name,
        table_alias: alias,
        predicate,
    })
}
