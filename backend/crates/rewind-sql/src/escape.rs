//! Identifier escaping for generated SQL text.
//!
//! Names are quoted only when the target dialect requires it, so
//! `UPDATE t SET v = ? WHERE id = ?` stays readable while `order`, `Name` or
//! `unit price` come out quoted.

use crate::keywords::KeywordSet;

/// Quote character family of a dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeStyle {
    /// `` `name` `` (MySQL)
    Backtick,
    /// `"name"` (PostgreSQL, DB2)
    DoubleQuote,
}

impl EscapeStyle {
    pub fn quote_char(self) -> char {
        match self {
            EscapeStyle::Backtick => '`',
            EscapeStyle::DoubleQuote => '"',
        }
    }
}

/// How a dialect decides whether, and how, to quote an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierRules {
    pub style: EscapeStyle,
    pub keywords: KeywordSet,
    /// Unquoted identifiers are folded to lower case, so any upper-case
    /// letter forces quoting.
    pub folds_to_lower: bool,
}

impl IdentifierRules {
    pub const fn new(style: EscapeStyle, keywords: KeywordSet, folds_to_lower: bool) -> Self {
        Self {
            style,
            keywords,
            folds_to_lower,
        }
    }

    /// Escape a possibly dotted name (`schema.table.column`) part by part.
    pub fn escape(&self, name: &str) -> String {
        if self.is_escaped(name) {
            return name.to_string();
        }
        name.split('.')
            .map(|part| self.escape_part(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Escape every name and join with `", "`.
    pub fn escape_list<'a, I>(&self, names: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .map(|n| self.escape(n))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn escape_part(&self, part: &str) -> String {
        if self.is_escaped(part) || !self.needs_escape(part) {
            return part.to_string();
        }
        let quote = self.style.quote_char();
        let doubled = part.replace(quote, &format!("{}{}", quote, quote));
        format!("{}{}{}", quote, doubled, quote)
    }

    /// Already wrapped in this dialect's quote characters.
    pub fn is_escaped(&self, name: &str) -> bool {
        let quote = self.style.quote_char();
        name.len() >= 2 && name.starts_with(quote) && name.ends_with(quote)
    }

    pub fn needs_escape(&self, part: &str) -> bool {
        if part.is_empty() || self.keywords.is_reserved(part) {
            return true;
        }
        if part.starts_with(|c: char| c.is_ascii_digit()) {
            return true;
        }
        let plain = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$';
        if !part.chars().all(plain) {
            return true;
        }
        self.folds_to_lower && part.chars().any(|c| c.is_ascii_uppercase())
    }
}
