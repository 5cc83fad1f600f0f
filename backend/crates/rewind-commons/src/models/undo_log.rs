//! Undo log records kept by a branch transaction until its outcome is known.

use crate::models::row::TableRecords;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of the original mutating statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    Insert,
    Update,
    Delete,
}

impl SqlType {
    pub fn as_str(self) -> &'static str {
        match self {
            SqlType::Insert => "INSERT",
            SqlType::Update => "UPDATE",
            SqlType::Delete => "DELETE",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Undo record of one mutating statement execution.
///
/// Built through the engine's `build_undo_log`, which checks the image shapes
/// against the operation kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlUndoLog {
    pub sql_type: SqlType,
    pub table_name: String,
    pub before_image: TableRecords,
    pub after_image: TableRecords,
}

/// All undo records of one branch transaction, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchUndoLog {
    pub xid: String,
    pub branch_id: i64,
    pub sql_undo_logs: Vec<SqlUndoLog>,
}

impl BranchUndoLog {
    pub fn new(xid: impl Into<String>, branch_id: i64) -> Self {
        Self {
            xid: xid.into(),
            branch_id,
            sql_undo_logs: Vec::new(),
        }
    }

    pub fn append(&mut self, undo_log: SqlUndoLog) {
        self.sql_undo_logs.push(undo_log);
    }

    pub fn is_empty(&self) -> bool {
        self.sql_undo_logs.is_empty()
    }

    /// Undo records newest first, the order compensation must run in.
    pub fn rollback_order(&self) -> impl Iterator<Item = &SqlUndoLog> {
        self.sql_undo_logs.iter().rev()
    }
}
