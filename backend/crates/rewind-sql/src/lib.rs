//! rewind-sql - statement analysis for the rewind undo engine
//!
//! Works on statements already parsed by `sqlparser`:
//! - INSERT: table, column list, per-row value expressions
//! - UPDATE: table, alias, SET assignments, WHERE predicate
//! - DELETE: table, alias, WHERE predicate
//!
//! WHERE predicates render back to text either with forward-reference markers
//! or with bound values inlined as literals. Identifier escaping for the
//! generated compensating statements lives in [`escape`].
//!
//! # Example
//!
//! ```
//! use rewind_sql::analyzer::{analyze_statement, StatementFacts, ValueExpr};
//! use rewind_sql::parser::parse_single_statement;
//! use sqlparser::dialect::GenericDialect;
//!
//! let stmt = parse_single_statement("INSERT INTO T(name) VALUES ('a')", &GenericDialect {}).unwrap();
//! let StatementFacts::Insert(facts) = analyze_statement(&stmt).unwrap() else {
//!     unreachable!()
//! };
//! assert_eq!(facts.table_name, "T");
//! assert_eq!(facts.rows[0], vec![ValueExpr::Literal("a".into())]);
//! ```

pub mod analyzer;
pub mod escape;
pub mod keywords;
pub mod parser;

pub use analyzer::{analyze_statement, StatementFacts};
pub use escape::{EscapeStyle, IdentifierRules};
pub use keywords::KeywordSet;
pub use parser::parse_single_statement;
