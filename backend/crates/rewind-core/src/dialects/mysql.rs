//! MySQL / MariaDB

use super::{CompositeKeySupport, DialectPlugin, DialectProfile, ParserDialect, StepQuery};
use rewind_sql::analyzer::PlaceholderStyle;
use rewind_sql::{EscapeStyle, IdentifierRules, KeywordSet};

pub const MYSQL: &str = "mysql";

pub static PROFILE: DialectProfile = DialectProfile {
    id: MYSQL,
    parser: ParserDialect::MySql,
    identifiers: IdentifierRules::new(EscapeStyle::Backtick, KeywordSet::MySql, false),
    placeholders: PlaceholderStyle::QuestionMark,
    identity_query: "SELECT LAST_INSERT_ID()",
    // Rows are (Variable_name, Value)
    step_query: Some(StepQuery {
        sql: "SHOW VARIABLES LIKE 'auto_increment_increment'",
        column: 1,
    }),
    composite_keys: CompositeKeySupport::ExplicitValuesOnly,
};

pub fn plugin() -> DialectPlugin {
    DialectPlugin::from_profile(&PROFILE)
}
