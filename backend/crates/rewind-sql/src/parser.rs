//! SQL parsing entry points built on sqlparser-rs.

pub mod utils;

pub use utils::{object_name_parts, parse_single_statement, parse_sql_statements, parser_options};
