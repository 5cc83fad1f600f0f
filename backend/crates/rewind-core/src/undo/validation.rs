//! Undo data validation.
//!
//! Before compensating, the rows currently stored are compared with the undo
//! log. Rows still matching the after image are safe to compensate; rows
//! already matching the before image were compensated earlier. Anything else
//! was changed outside the branch and must not be overwritten.

use rewind_commons::{
    Result, RewindError, Row, SqlType, SqlUndoLog, SqlValue, TableMeta, TableRecords,
};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCheck {
    /// Current rows equal the after image
    Proceed,
    /// Nothing to undo: the before image is already in place
    Skip,
}

/// Compare `current` with the images of `undo_log`.
pub fn check_current_image(
    undo_log: &SqlUndoLog,
    current: &TableRecords,
    meta: &TableMeta,
) -> Result<ImageCheck> {
    if images_match(&undo_log.before_image, &undo_log.after_image, meta)? {
        log::debug!(
            "Before and after images of {} on '{}' are equal; nothing to undo",
            undo_log.sql_type,
            undo_log.table_name
        );
        return Ok(ImageCheck::Skip);
    }
    if images_match(&undo_log.after_image, current, meta)? {
        return Ok(ImageCheck::Proceed);
    }
    if images_match(&undo_log.before_image, current, meta)? {
        log::info!(
            "Rows of '{}' already match the before image of {}; skipping compensation",
            undo_log.table_name,
            undo_log.sql_type
        );
        return Ok(ImageCheck::Skip);
    }

    Err(RewindError::DirtyImage(format!(
        "rows of '{}' changed outside the branch since {}: expected {} row(s) matching the after image, found {}",
        undo_log.table_name,
        undo_log.sql_type,
        undo_log.after_image.len(),
        current.len()
    )))
}

/// Every row of `expected` has a row in `actual` with the same key and the
/// same values for every column `expected` carries. Column order does not
/// matter; extra columns in `actual` are ignored.
pub fn images_match(expected: &TableRecords, actual: &TableRecords, meta: &TableMeta) -> Result<bool> {
    if expected.len() != actual.len() {
        return Ok(false);
    }

    for row in &expected.rows {
        let key = key_of(row, meta)?;
        let mut found = None;
        for candidate in &actual.rows {
            if key_of(candidate, meta)? == key {
                found = Some(candidate);
                break;
            }
        }
        let Some(candidate) = found else {
            return Ok(false);
        };
        let same = row
            .fields
            .iter()
            .all(|field| candidate.get(&field.name).is_some_and(|c| c.value == field.value));
        if !same {
            return Ok(false);
        }
    }
    Ok(true)
}

fn key_of(row: &Row, meta: &TableMeta) -> Result<Vec<SqlValue>> {
    Ok(row
        .ordered_primary_keys(meta)?
        .into_iter()
        .map(|f| f.value.clone())
        .collect())
}

type RowKey = (String, Vec<String>);

fn row_key(table_name: &str, row: &Row, meta: &TableMeta) -> Result<RowKey> {
    let key = key_of(row, meta)?.iter().map(SqlValue::to_sql_literal).collect();
    Ok((table_name.to_ascii_lowercase(), key))
}

/// Rows as the newer compensations of a branch leave them.
///
/// A branch is unwound newest first, and the compensating statements only run
/// after every log was checked. So an older log touching a row a newer log
/// already compensated must be checked against the row the newer compensation
/// will restore, not against the row currently stored. `None` marks a row the
/// newer compensation deletes.
#[derive(Debug, Default)]
pub struct CompensatedRows {
    rows: HashMap<RowKey, Option<Row>>,
}

impl CompensatedRows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `current` with every row of `undo_log` replaced by its compensated state.
    pub fn overlay(
        &self,
        undo_log: &SqlUndoLog,
        current: TableRecords,
        meta: &TableMeta,
    ) -> Result<TableRecords> {
        if self.rows.is_empty() {
            return Ok(current);
        }
        let table = &undo_log.table_name;

        let mut touched = Vec::new();
        for row in undo_log.before_image.rows.iter().chain(&undo_log.after_image.rows) {
            let key = row_key(table, row, meta)?;
            if self.rows.contains_key(&key) && !touched.contains(&key) {
                touched.push(key);
            }
        }
        if touched.is_empty() {
            return Ok(current);
        }

        let mut rows = Vec::with_capacity(current.rows.len());
        for row in current.rows {
            if !touched.contains(&row_key(table, &row, meta)?) {
                rows.push(row);
            }
        }
        rows.extend(
            touched
                .iter()
                .filter_map(|key| self.rows.get(key).cloned().flatten()),
        );
        Ok(TableRecords::new(current.table_name, rows))
    }

    /// Remember the rows compensating `undo_log` leaves behind.
    pub fn record(&mut self, undo_log: &SqlUndoLog, meta: &TableMeta) -> Result<()> {
        let table = &undo_log.table_name;
        match undo_log.sql_type {
            SqlType::Insert => {
                for row in &undo_log.after_image.rows {
                    self.rows.insert(row_key(table, row, meta)?, None);
                }
            },
            SqlType::Update | SqlType::Delete => {
                for row in &undo_log.before_image.rows {
                    self.rows.insert(row_key(table, row, meta)?, Some(row.clone()));
                }
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_commons::ColumnMeta;

    fn meta() -> TableMeta {
        TableMeta::new(
            "t",
            vec![ColumnMeta::new("id", "BIGINT", 1), ColumnMeta::new("v", "VARCHAR", 2)],
            vec!["id".to_string()],
        )
        .unwrap()
    }

    fn image(rows: &[(i64, &str)]) -> TableRecords {
        TableRecords::from_values(
            &meta(),
            rows.iter()
                .map(|(id, v)| vec![("id", SqlValue::Int(*id)), ("v", SqlValue::from(*v))]),
        )
    }

    fn update_log() -> SqlUndoLog {
        SqlUndoLog {
            sql_type: SqlType::Update,
            table_name: "t".to_string(),
            before_image: image(&[(1, "x")]),
            after_image: image(&[(1, "y")]),
        }
    }

    #[test]
    fn test_current_equals_after_image() {
        let check = check_current_image(&update_log(), &image(&[(1, "y")]), &meta()).unwrap();
        assert_eq!(check, ImageCheck::Proceed);
    }

    #[test]
    fn test_already_compensated() {
        let check = check_current_image(&update_log(), &image(&[(1, "x")]), &meta()).unwrap();
        assert_eq!(check, ImageCheck::Skip);
    }

    #[test]
    fn test_dirty_image() {
        let err = check_current_image(&update_log(), &image(&[(1, "z")]), &meta()).unwrap_err();
        assert!(matches!(err, RewindError::DirtyImage(_)));
    }

    #[test]
    fn test_column_order_and_extra_columns_ignored() {
        let current = TableRecords::from_values(
            &meta(),
            vec![vec![
                ("extra", SqlValue::Null),
                ("V", SqlValue::from("y")),
                ("id", SqlValue::Int(1)),
            ]],
        );
        assert!(images_match(&image(&[(1, "y")]), &current, &meta()).unwrap());
    }

    #[test]
    fn test_delete_log_with_rows_gone() {
        let log = SqlUndoLog {
            sql_type: SqlType::Delete,
            table_name: "t".to_string(),
            before_image: image(&[(1, "x")]),
            after_image: TableRecords::empty("t"),
        };
        assert_eq!(
            check_current_image(&log, &TableRecords::empty("t"), &meta()).unwrap(),
            ImageCheck::Proceed
        );
    }

    #[test]
    fn test_overlay_replaces_rows_of_newer_compensations() {
        let meta = meta();
        let insert = SqlUndoLog {
            sql_type: SqlType::Insert,
            table_name: "t".to_string(),
            before_image: TableRecords::empty("t"),
            after_image: image(&[(1, "x")]),
        };
        let mut compensated = CompensatedRows::new();
        compensated.record(&update_log(), &meta).unwrap();

        let current = compensated.overlay(&insert, image(&[(1, "y")]), &meta).unwrap();
        assert_eq!(current, image(&[(1, "x")]));
        assert_eq!(
            check_current_image(&insert, &current, &meta).unwrap(),
            ImageCheck::Proceed
        );

        compensated.record(&insert, &meta).unwrap();
        let gone = compensated.overlay(&update_log(), image(&[(1, "x")]), &meta).unwrap();
        assert!(gone.is_empty());
    }

    #[test]
    fn test_overlay_leaves_other_rows_alone() {
        let meta = meta();
        let mut compensated = CompensatedRows::new();
        assert!(compensated.is_empty());
        compensated.record(&update_log(), &meta).unwrap();

        let other = SqlUndoLog {
            sql_type: SqlType::Update,
            table_name: "t".to_string(),
            before_image: image(&[(2, "a")]),
            after_image: image(&[(2, "b")]),
        };
        let current = compensated.overlay(&other, image(&[(2, "b")]), &meta).unwrap();
        assert_eq!(current, image(&[(2, "b")]));
    }
}
