//! UPDATE statement analysis

use super::params::PlaceholderCounter;
use super::predicate::WherePredicate;
use super::value_expr::{classify_value, ValueExpr};
use super::{single_table, TargetTable};
use crate::parser::object_name_parts;
use rewind_commons::{Result, RewindError};
use sqlparser::ast::{AssignmentTarget, Update};

/// One `column = value` of a SET clause
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentFact {
    /// Unqualified, unquoted column name
    pub column: String,
    pub value: ValueExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateFacts {
    pub table_name: String,
    pub table_alias: Option<String>,
    pub assignments: Vec<AssignmentFact>,
    /// `None` when the statement updates every row
    pub predicate: Option<WherePredicate>,
}

impl UpdateFacts {
    pub fn columns(&self) -> Vec<&str> {
        self.assignments.iter().map(|a| a.column.as_str()).collect()
    }
}

pub(crate) fn analyze_update(update: &Update) -> Result<UpdateFacts> {
    if update.from.is_some() {
        return Err(RewindError::unsupported("multi-table UPDATE with FROM"));
    }
    if update.limit.is_some() {
        return Err(RewindError::unsupported("UPDATE with LIMIT"));
    }
    let TargetTable { name, alias } = single_table(&update.table, "UPDATE")?;

    let mut counter = PlaceholderCounter::default();
    let mut assignments = Vec::with_capacity(update.assignments.len());
    for assignment in &update.assignments {
        let target = match &assignment.target {
            AssignmentTarget::ColumnName(target) => target,
            AssignmentTarget::Tuple(_) => {
                return Err(RewindError::unsupported("tuple assignment in UPDATE"))
            },
        };
        let column = unqualified_column(&object_name_parts(target), &name, alias.as_deref())?;
        let value = classify_value(&assignment.value, &mut counter)?;
        assignments.push(AssignmentFact { column, value });
    }

    let predicate = update
        .selection
        .as_ref()
        .map(|expr| WherePredicate::new(expr, &mut counter))
        .transpose()?;

    log::debug!(
        "Analyzed UPDATE {}: {} assignment(s), where={}",
        name,
        assignments.len(),
        predicate.is_some()
    );

    Ok(UpdateFacts {
        table_name: name,
        table_alias: alias,
        assignments,
        predicate,
    })
}

/// Strip a `t.` / `alias.` qualifier from a SET column.
fn unqualified_column(parts: &[String], table: &str, alias: Option<&str>) -> Result<String> {
    let Some((column, qualifier)) = parts.split_last() else {
        return Err(RewindError::invalid_sql("empty column name in SET clause"));
    };
    if qualifier.is_empty() {
        return Ok(column.clone());
    }

    let qualifier = qualifier.join(".");
    let table_short = table.rsplit('.').next().unwrap_or(table);
    let matches = qualifier.eq_ignore_ascii_case(table)
        || qualifier.eq_ignore_ascii_case(table_short)
        || alias.is_some_and(|a| qualifier.eq_ignore_ascii_case(a));
    if !matches {
        return Err(RewindError::unsupported(format!(
            "SET column '{}.{}' does not belong to table {}",
            qualifier, column, table
        )));
    }
    Ok(column.clone())
}
