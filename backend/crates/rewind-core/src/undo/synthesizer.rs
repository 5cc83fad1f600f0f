//! Compensating statements for undo logs.
//!
//! | original | compensation |
//! |----------|--------------|
//! | INSERT   | `DELETE FROM t WHERE pk = ?` keyed by the after image |
//! | UPDATE   | `UPDATE t SET c = ? WHERE pk = ?` restoring the before image |
//! | DELETE   | `INSERT INTO t (c, pk) VALUES (?, ?)` re-inserting the before image |
//!
//! Key columns always appear in the table's declared key order, so the same
//! undo log produces byte-identical text every time.

use super::UndoStatement;
use crate::dialects::{DialectProfile, UndoSynthesizer};
use rewind_commons::{Field, Result, RewindError, Row, SqlType, SqlUndoLog, TableMeta};

/// Undo synthesizer driven by a [`DialectProfile`]
#[derive(Debug, Clone, Copy)]
pub struct DefaultUndoSynthesizer {
    profile: &'static DialectProfile,
}

impl DefaultUndoSynthesizer {
    pub fn new(profile: &'static DialectProfile) -> Self {
        Self { profile }
    }

    /// `a = ? AND b = ?` over `fields`, markers numbered from `first_ordinal`
    fn equals_list(&self, fields: &[&Field], separator: &str, first_ordinal: usize) -> String {
        fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                format!(
                    "{} = {}",
                    self.profile.escape(&field.name),
                    self.profile.placeholders.marker(first_ordinal + i)
                )
            })
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn delete_inserted(&self, table: &str, row: &Row, meta: &TableMeta) -> Result<UndoStatement> {
        let keys = row.ordered_primary_keys(meta)?;
        let sql = format!("DELETE FROM {} WHERE {}", table, self.equals_list(&keys, " AND ", 1));
        Ok(UndoStatement::new(sql, values(&keys)))
    }

    fn restore_updated(&self, table: &str, row: &Row, meta: &TableMeta) -> Result<UndoStatement> {
        let keys = row.ordered_primary_keys(meta)?;
        let columns = non_key_fields(row, meta);
        if columns.is_empty() {
            return Err(RewindError::invariant(format!(
                "before image of UPDATE on '{}' has no non-key column to restore",
                table
            )));
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            table,
            self.equals_list(&columns, ", ", 1),
            self.equals_list(&keys, " AND ", columns.len() + 1)
        );
        let mut params = values(&columns);
        params.extend(values(&keys));
        Ok(UndoStatement::new(sql, params))
    }

    fn reinsert_deleted(&self, table: &str, row: &Row, meta: &TableMeta) -> Result<UndoStatement> {
        let mut fields = non_key_fields(row, meta);
        fields.extend(row.ordered_primary_keys(meta)?);

        let columns = self
            .profile
            .identifiers
            .escape_list(fields.iter().map(|f| f.name.as_str()));
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns,
            self.profile.placeholders.markers(1, fields.len())
        );
        Ok(UndoStatement::new(sql, values(&fields)))
    }
}

impl UndoSynthesizer for DefaultUndoSynthesizer {
    fn synthesize(&self, undo_log: &SqlUndoLog, meta: &TableMeta) -> Result<Vec<UndoStatement>> {
        if meta.is_composite_key() && !self.profile.supports_composite_keys() {
            return Err(RewindError::unsupported(format!(
                "composite primary key is not supported in {}",
                self.profile.id
            )));
        }

        let (image, image_name) = match undo_log.sql_type {
            SqlType::Insert => (&undo_log.after_image, "after"),
            SqlType::Update | SqlType::Delete => (&undo_log.before_image, "before"),
        };
        if image.is_empty() {
            return Err(RewindError::invariant(format!(
                "{} image of {} undo log on '{}' is empty",
                image_name, undo_log.sql_type, undo_log.table_name
            )));
        }

        let table = undo_log.table_name.as_str();
        image
            .rows
            .iter()
            .map(|row| match undo_log.sql_type {
                SqlType::Insert => self.delete_inserted(table, row, meta),
                SqlType::Update => self.restore_updated(table, row, meta),
                SqlType::Delete => self.reinsert_deleted(table, row, meta),
            })
            .collect()
    }
}

/// Non-key fields in row order; key membership comes from `meta`, not from
/// the field tags of the image.
fn non_key_fields<'a>(row: &'a Row, meta: &TableMeta) -> Vec<&'a Field> {
    row.fields
        .iter()
        .filter(|f| !meta.is_primary_key(&f.name))
        .collect()
}

fn values(fields: &[&Field]) -> Vec<rewind_commons::SqlValue> {
    fields.iter().map(|f| f.value.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialects::{db2, mysql, postgres};
    use rewind_commons::{ColumnMeta, SqlValue, TableRecords};

    fn meta(keys: &[&str]) -> TableMeta {
        TableMeta::new(
            "T",
            vec![
                ColumnMeta::new("id", "BIGINT", 1).auto_increment(),
                ColumnMeta::new("tenant", "INT", 2),
                ColumnMeta::new("v", "VARCHAR", 3),
                ColumnMeta::new("order", "INT", 4),
            ],
            keys.iter().map(|k| k.to_string()).collect(),
        )
        .unwrap()
    }

    fn undo_log(sql_type: SqlType, meta: &TableMeta, row: Vec<(&str, SqlValue)>) -> SqlUndoLog {
        let image = TableRecords::from_values(meta, vec![row]);
        let (before, after) = match sql_type {
            SqlType::Insert => (TableRecords::empty("T"), image),
            SqlType::Update => (image.clone(), image),
            SqlType::Delete => (image, TableRecords::empty("T")),
        };
        SqlUndoLog {
            sql_type,
            table_name: "T".to_string(),
            before_image: before,
            after_image: after,
        }
    }

    #[test]
    fn test_update_compensation_mysql_escapes_reserved_words() {
        let meta = meta(&["id"]);
        let log = undo_log(
            SqlType::Update,
            &meta,
            vec![
                ("id", SqlValue::Int(1)),
                ("v", SqlValue::from("x")),
                ("order", SqlValue::Int(3)),
            ],
        );
        let stmts = DefaultUndoSynthesizer::new(&mysql::PROFILE)
            .synthesize(&log, &meta)
            .unwrap();
        assert_eq!(stmts[0].sql, "UPDATE T SET v = ?, `order` = ? WHERE id = ?");
        assert_eq!(
            stmts[0].params,
            vec![SqlValue::from("x"), SqlValue::Int(3), SqlValue::Int(1)]
        );
    }

    #[test]
    fn test_postgres_numbers_markers_across_clauses() {
        let meta = meta(&["id", "tenant"]);
        let log = undo_log(
            SqlType::Update,
            &meta,
            vec![
                ("tenant", SqlValue::Int(7)),
                ("v", SqlValue::from("x")),
                ("id", SqlValue::Int(1)),
            ],
        );
        let stmts = DefaultUndoSynthesizer::new(&postgres::PROFILE)
            .synthesize(&log, &meta)
            .unwrap();
        assert_eq!(stmts[0].sql, "UPDATE T SET v = $1 WHERE id = $2 AND tenant = $3");
        assert_eq!(
            stmts[0].params,
            vec![SqlValue::from("x"), SqlValue::Int(1), SqlValue::Int(7)]
        );
    }

    #[test]
    fn test_delete_compensation_reinserts_keys_last() {
        let meta = meta(&["id"]);
        let log = undo_log(
            SqlType::Delete,
            &meta,
            vec![("id", SqlValue::Int(4)), ("v", SqlValue::from("gone"))],
        );
        let stmts = DefaultUndoSynthesizer::new(&db2::PROFILE)
            .synthesize(&log, &meta)
            .unwrap();
        assert_eq!(stmts[0].sql, "INSERT INTO T (v, id) VALUES (?, ?)");
        assert_eq!(stmts[0].params, vec![SqlValue::from("gone"), SqlValue::Int(4)]);
    }

    #[test]
    fn test_update_without_non_key_columns() {
        let meta = meta(&["id"]);
        let log = undo_log(SqlType::Update, &meta, vec![("id", SqlValue::Int(1))]);
        let err = DefaultUndoSynthesizer::new(&db2::PROFILE)
            .synthesize(&log, &meta)
            .unwrap_err();
        assert!(matches!(err, RewindError::InvariantViolation(_)));
    }

    #[test]
    fn test_empty_image_is_invariant_violation() {
        let meta = meta(&["id"]);
        let log = SqlUndoLog {
            sql_type: SqlType::Update,
            table_name: "T".to_string(),
            before_image: TableRecords::empty("T"),
            after_image: TableRecords::empty("T"),
        };
        let err = DefaultUndoSynthesizer::new(&mysql::PROFILE)
            .synthesize(&log, &meta)
            .unwrap_err();
        assert!(matches!(err, RewindError::InvariantViolation(_)));
    }

    #[test]
    fn test_db2_rejects_composite_keys() {
        let meta = meta(&["id", "tenant"]);
        let log = undo_log(
            SqlType::Insert,
            &meta,
            vec![("id", SqlValue::Int(1)), ("tenant", SqlValue::Int(2))],
        );
        let err = DefaultUndoSynthesizer::new(&db2::PROFILE)
            .synthesize(&log, &meta)
            .unwrap_err();
        assert_eq!(
            err,
            RewindError::UnsupportedConstruct("composite primary key is not supported in db2".into())
        );
    }
}
