//! Common parsing utilities
//!
//! The engine never answers statement-shape questions from raw text; these
//! helpers exist for the parsed-statement provider and for tests, so every
//! caller parses with the same options.

use rewind_commons::{Result, RewindError};
use sqlparser::ast::{ObjectName, ObjectNamePart, Statement};
use sqlparser::dialect::Dialect;
use sqlparser::parser::{Parser, ParserError, ParserOptions};

const DEFAULT_SQL_RECURSION_LIMIT: usize = 256;

/// Default sqlparser options used across rewind
pub fn parser_options() -> ParserOptions {
    ParserOptions::new().with_trailing_commas(false)
}

/// Parse SQL into statements using rewind defaults (options + recursion limit)
pub fn parse_sql_statements(
    sql: &str,
    dialect: &dyn Dialect,
) -> std::result::Result<Vec<Statement>, ParserError> {
    Parser::new(dialect)
        .with_options(parser_options())
        .with_recursion_limit(DEFAULT_SQL_RECURSION_LIMIT)
        .try_with_sql(sql)?
        .parse_statements()
}

/// Parse exactly one statement.
///
/// Multi-statement input is rejected: one undo log covers one statement.
pub fn parse_single_statement(sql: &str, dialect: &dyn Dialect) -> Result<Statement> {
    let mut statements = parse_sql_statements(sql, dialect)
        .map_err(|e| RewindError::invalid_sql(format!("{}: {}", e, sql)))?;

    match statements.len() {
        1 => Ok(statements.remove(0)),
        0 => Err(RewindError::invalid_sql("No SQL statement found")),
        n => Err(RewindError::unsupported(format!(
            "multiple statements in one execution ({} found)",
            n
        ))),
    }
}

/// Unquoted identifier parts of an object name (`"s"."T"` → `["s", "T"]`).
pub fn object_name_parts(name: &ObjectName) -> Vec<String> {
    name.0
        .iter()
        .filter_map(|part| match part {
            ObjectNamePart::Identifier(ident) => Some(ident.value.clone()),
            #[allow(unreachable_patterns)]
            _ => None,
        })
        .collect()
}
