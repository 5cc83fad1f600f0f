//! IBM DB2
//!
//! Generated keys come from `IDENTITY_VAL_LOCAL()` when the statement was
//! executed without requesting them. DB2 exposes no session-level step
//! variable, so batch inserts use the configured step.

use super::{CompositeKeySupport, DialectPlugin, DialectProfile, ParserDialect};
use rewind_sql::analyzer::PlaceholderStyle;
use rewind_sql::{EscapeStyle, IdentifierRules, KeywordSet};

pub const DB2: &str = "db2";

pub static PROFILE: DialectProfile = DialectProfile {
    id: DB2,
    parser: ParserDialect::Generic,
    identifiers: IdentifierRules::new(EscapeStyle::DoubleQuote, KeywordSet::Db2, true),
    placeholders: PlaceholderStyle::QuestionMark,
    identity_query: "VALUES IDENTITY_VAL_LOCAL()",
    step_query: None,
    composite_keys: CompositeKeySupport::Unsupported,
};

pub fn plugin() -> DialectPlugin {
    DialectPlugin::from_profile(&PROFILE)
}
