//! PostgreSQL

use super::{CompositeKeySupport, DialectPlugin, DialectProfile, ParserDialect};
use rewind_sql::analyzer::PlaceholderStyle;
use rewind_sql::{EscapeStyle, IdentifierRules, KeywordSet};

pub const POSTGRESQL: &str = "postgresql";

pub static PROFILE: DialectProfile = DialectProfile {
    id: POSTGRESQL,
    parser: ParserDialect::PostgreSql,
    identifiers: IdentifierRules::new(EscapeStyle::DoubleQuote, KeywordSet::PostgreSql, true),
    placeholders: PlaceholderStyle::Dollar,
    identity_query: "SELECT lastval()",
    // Sequence increments are per sequence, not per session
    step_query: None,
    composite_keys: CompositeKeySupport::ExplicitValuesOnly,
};

pub fn plugin() -> DialectPlugin {
    DialectPlugin::from_profile(&PROFILE)
}
