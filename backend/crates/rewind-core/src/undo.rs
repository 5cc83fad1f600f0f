//! Undo logs and the compensating statements built from them

pub mod builder;
pub mod image_query;
pub mod synthesizer;
pub mod validation;

pub use builder::build_undo_log;
pub use synthesizer::DefaultUndoSynthesizer;
pub use validation::ImageCheck;

use rewind_commons::SqlValue;
use std::fmt;

/// Statement text plus the values bound to its markers, in marker order
#[derive(Debug, Clone, PartialEq)]
pub struct UndoStatement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl UndoStatement {
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

impl fmt::Display for UndoStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -- params: [", self.sql)?;
        for (i, value) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str("]")
    }
}
