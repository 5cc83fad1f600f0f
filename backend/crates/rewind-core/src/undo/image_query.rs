//! Queries that capture row images.
//!
//! The before image of an UPDATE or DELETE is read with the statement's own
//! predicate under `FOR UPDATE`. After images, and the current rows checked
//! before compensating, are read back by primary key.

use super::UndoStatement;
use crate::dialects::DialectProfile;
use crate::pk::PkValues;
use rewind_commons::{Result, RewindError, SqlValue, SqlUndoLog, TableMeta};
use rewind_sql::analyzer::{ParameterSource, RenderMode, StatementFacts};

/// `SELECT ... FOR UPDATE` reading the rows an UPDATE or DELETE is about to change.
///
/// UPDATE reads the key columns plus the assigned columns; DELETE reads whole rows.
pub fn before_image_query(
    profile: &DialectProfile,
    meta: &TableMeta,
    facts: &StatementFacts,
    params: &dyn ParameterSource,
) -> Result<UndoStatement> {
    let columns = match facts {
        StatementFacts::Insert(_) => {
            return Err(RewindError::invariant("INSERT has no before image to query"));
        },
        StatementFacts::Update(update) => {
            let mut columns: Vec<&str> = meta.primary_key_names().iter().map(String::as_str).collect();
            for column in update.columns() {
                if !columns.iter().any(|c| c.eq_ignore_ascii_case(column)) {
                    columns.push(column);
                }
            }
            profile.identifiers.escape_list(columns)
        },
        StatementFacts::Delete(_) => "*".to_string(),
    };

    let mut sql = format!("SELECT {} FROM {}", columns, facts.table_name());
    if let Some(alias) = facts.table_alias() {
        sql.push(' ');
        sql.push_str(alias);
    }

    let mut bound = Vec::new();
    if let Some(predicate) = facts.predicate() {
        let rendered = predicate.render(params, RenderMode::ForwardReference(profile.placeholders))?;
        sql.push_str(" WHERE ");
        sql.push_str(&rendered.sql);
        bound = rendered.params;
    }
    sql.push_str(" FOR UPDATE");

    Ok(UndoStatement::new(sql, bound))
}

/// `SELECT * FROM t WHERE pk IN (...)`, split so no query carries more than
/// `max_in_size` rows.
///
/// Composite keys use `(a = ? AND b = ?) OR (...)`. Returns no statements
/// when there are no rows.
pub fn select_by_primary_keys(
    profile: &DialectProfile,
    meta: &TableMeta,
    pk_values: &PkValues,
    max_in_size: usize,
) -> Result<Vec<UndoStatement>> {
    let key_columns = meta
        .primary_key_names()
        .iter()
        .map(|key| {
            pk_values
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
                .map(|(_, values)| (key.as_str(), values.as_slice()))
                .ok_or_else(|| {
                    RewindError::invariant(format!(
                        "no values for primary key '{}' of '{}'",
                        key,
                        meta.table_name()
                    ))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let row_count = key_columns.first().map(|(_, values)| values.len()).unwrap_or(0);
    if key_columns.iter().any(|(_, values)| values.len() != row_count) {
        return Err(RewindError::invariant(format!(
            "primary key columns of '{}' carry different row counts",
            meta.table_name()
        )));
    }

    let chunk = max_in_size.max(1);
    let mut statements = Vec::new();
    let mut start = 0;
    while start < row_count {
        let end = (start + chunk).min(row_count);
        statements.push(select_rows(profile, meta, &key_columns, start..end));
        start = end;
    }
    Ok(statements)
}

fn select_rows(
    profile: &DialectProfile,
    meta: &TableMeta,
    key_columns: &[(&str, &[SqlValue])],
    rows: std::ops::Range<usize>,
) -> UndoStatement {
    let mut params = Vec::new();
    let mut ordinal = 1;
    let mut next_marker = || {
        let marker = profile.placeholders.marker(ordinal);
        ordinal += 1;
        marker
    };

    let condition = match key_columns {
        [(name, values)] => {
            let markers: Vec<String> = rows.clone().map(|_| next_marker()).collect();
            params.extend(values[rows].iter().cloned());
            format!("{} IN ({})", profile.escape(name), markers.join(", "))
        },
        _ => rows
            .map(|row| {
                let parts: Vec<String> = key_columns
                    .iter()
                    .map(|(name, values)| {
                        params.push(values[row].clone());
                        format!("{} = {}", profile.escape(name), next_marker())
                    })
                    .collect();
                format!("({})", parts.join(" AND "))
            })
            .collect::<Vec<_>>()
            .join(" OR "),
    };

    UndoStatement::new(
        format!("SELECT * FROM {} WHERE {}", meta.table_name(), condition),
        params,
    )
}

/// Queries reading the rows an undo log's compensation is about to touch.
///
/// Keys come from the after image, or from the before image when the
/// statement was a DELETE.
pub fn current_image_queries(
    profile: &DialectProfile,
    meta: &TableMeta,
    undo_log: &SqlUndoLog,
    max_in_size: usize,
) -> Result<Vec<UndoStatement>> {
    let image = if undo_log.after_image.is_empty() {
        &undo_log.before_image
    } else {
        &undo_log.after_image
    };
    let pk_values = image.primary_key_values(meta)?;
    select_by_primary_keys(profile, meta, &pk_values, max_in_size)
}
