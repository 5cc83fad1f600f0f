//! Statement analysis
//!
//! Extracts structured intent (table, columns, values, WHERE predicate,
//! alias) from an already parsed INSERT, UPDATE or DELETE. Any shape the
//! analyzer cannot describe exactly is rejected with
//! [`RewindError::UnsupportedConstruct`].

pub mod delete;
pub mod insert;
pub mod params;
pub mod predicate;
pub mod update;
pub mod value_expr;

pub use delete::DeleteFacts;
pub use insert::InsertFacts;
pub use params::{ParameterSource, PlaceholderCounter};
pub use predicate::{PlaceholderStyle, RenderMode, RenderedPredicate, WherePredicate};
pub use update::{AssignmentFact, UpdateFacts};
pub use value_expr::{ResolvedValue, ValueExpr};

use crate::parser::object_name_parts;
use rewind_commons::{Result, RewindError, SqlType};
use sqlparser::ast::{Statement, TableFactor, TableWithJoins};

/// Facts of one mutating statement
#[derive(Debug, Clone, PartialEq)]
pub enum StatementFacts {
    Insert(InsertFacts),
    Update(UpdateFacts),
    Delete(DeleteFacts),
}

impl StatementFacts {
    pub fn sql_type(&self) -> SqlType {
        match self {
            StatementFacts::Insert(_) => SqlType::Insert,
            StatementFacts::Update(_) => SqlType::Update,
            StatementFacts::Delete(_) => SqlType::Delete,
        }
    }

    pub fn table_name(&self) -> &str {
        match self {
            StatementFacts::Insert(f) => &f.table_name,
            StatementFacts::Update(f) => &f.table_name,
            StatementFacts::Delete(f) => &f.table_name,
        }
    }

    pub fn table_alias(&self) -> Option<&str> {
        match self {
            StatementFacts::Insert(_) => None,
            StatementFacts::Update(f) => f.table_alias.as_deref(),
            StatementFacts::Delete(f) => f.table_alias.as_deref(),
        }
    }

    pub fn predicate(&self) -> Option<&WherePredicate> {
        match self {
            StatementFacts::Insert(_) => None,
            StatementFacts::Update(f) => f.predicate.as_ref(),
            StatementFacts::Delete(f) => f.predicate.as_ref(),
        }
    }

    pub fn as_insert(&self) -> Option<&InsertFacts> {
        match self {
            StatementFacts::Insert(f) => Some(f),
            _ => None,
        }
    }
}

/// Analyze one parsed statement.
pub fn analyze_statement(statement: &Statement) -> Result<StatementFacts> {
    match statement {
        Statement::Insert(insert) => insert::analyze_insert(insert).map(StatementFacts::Insert),
        Statement::Update(update) => update::analyze_update(update).map(StatementFacts::Update),
        Statement::Delete(delete) => delete::analyze_delete(delete).map(StatementFacts::Delete),
        other => Err(RewindError::unsupported(format!(
            "statement kind for undo logging: {}",
            statement_keyword(other)
        ))),
    }
}

/// Leading keyword of a statement, for error messages
fn statement_keyword(statement: &Statement) -> String {
    statement
        .to_string()
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_uppercase()
}

pub(crate) struct TargetTable {
    pub name: String,
    pub alias: Option<String>,
}

/// The single plain table an UPDATE or DELETE targets.
pub(crate) fn single_table(table: &TableWithJoins, kind: &str) -> Result<TargetTable> {
    if !table.joins.is_empty() {
        return Err(RewindError::unsupported(format!("multi-table {} via JOIN", kind)));
    }
    match &table.relation {
        TableFactor::Table { name, alias, .. } => Ok(TargetTable {
            name: object_name_parts(name).join("."),
            alias: alias.as_ref().map(|a| a.name.value.clone()),
        }),
        _ => Err(RewindError::unsupported(format!(
            "{} target that is not a plain table",
            kind
        ))),
    }
}
