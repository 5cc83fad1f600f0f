//! WHERE predicates of UPDATE and DELETE, rendered back to SQL text.

use super::params::{ParameterSource, PlaceholderCounter};
use super::value_expr::{count_placeholders, sql_value_to_ast};
use rewind_commons::{Result, SqlValue};
use sqlparser::ast::{visit_expressions_mut, Expr, Value};
use std::ops::ControlFlow;

/// Bound-parameter marker syntax of a dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?`
    QuestionMark,
    /// `$1`, `$2`, ...
    Dollar,
}

impl PlaceholderStyle {
    /// Marker for the `ordinal`-th (1-based) bound value
    pub fn marker(self, ordinal: usize) -> String {
        match self {
            PlaceholderStyle::QuestionMark => "?".to_string(),
            PlaceholderStyle::Dollar => format!("${}", ordinal),
        }
    }

    /// `count` markers joined with `", "`, numbered from `first` (1-based).
    pub fn markers(self, first: usize, count: usize) -> String {
        (first..first + count)
            .map(|ordinal| self.marker(ordinal))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// How bound-parameter markers are written into rendered text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Keep markers for later binding; values are returned in marker order.
    ForwardReference(PlaceholderStyle),
    /// Inline each bound value as a SQL literal.
    Literal,
}

/// Rendered predicate text plus the values its markers bind to
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPredicate {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// WHERE clause of an analyzed statement.
///
/// Keeps the parsed expression and the positional index its first `?` marker
/// maps to, so rendering can bind markers without re-counting the rest of
/// the statement.
#[derive(Debug, Clone, PartialEq)]
pub struct WherePredicate {
    expr: Expr,
    first_placeholder: usize,
}

impl WherePredicate {
    /// Capture `expr`, advancing `counter` past the markers it contains.
    pub fn new(expr: &Expr, counter: &mut PlaceholderCounter) -> Result<Self> {
        let first_placeholder = counter.position();
        count_placeholders(expr, counter)?;
        Ok(Self {
            expr: expr.clone(),
            first_placeholder,
        })
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Predicate text exactly as written, markers included
    pub fn original_sql(&self) -> String {
        self.expr.to_string()
    }

    pub fn render(&self, params: &dyn ParameterSource, mode: RenderMode) -> Result<RenderedPredicate> {
        self.render_from(params, mode, 1)
    }

    /// Like [`render`](Self::render), numbering `$n` markers from
    /// `first_ordinal` so the predicate can follow other bound values.
    pub fn render_from(
        &self,
        params: &dyn ParameterSource,
        mode: RenderMode,
        first_ordinal: usize,
    ) -> Result<RenderedPredicate> {
        let mut expr = self.expr.clone();
        let mut counter = PlaceholderCounter::starting_at(self.first_placeholder);
        let mut bound: Vec<SqlValue> = Vec::new();

        let flow = visit_expressions_mut(&mut expr, |e| {
            let Expr::Value(v) = e else {
                return ControlFlow::Continue(());
            };
            let Value::Placeholder(marker) = &v.value else {
                return ControlFlow::Continue(());
            };
            let value = match counter
                .index_for(marker)
                .and_then(|index| params.require(index).cloned())
            {
                Ok(value) => value,
                Err(err) => return ControlFlow::Break(err),
            };
            v.value = match mode {
                RenderMode::ForwardReference(style) => {
                    bound.push(value);
                    Value::Placeholder(style.marker(first_ordinal + bound.len() - 1))
                },
                RenderMode::Literal => sql_value_to_ast(&value),
            };
            ControlFlow::Continue(())
        });

        if let ControlFlow::Break(err) = flow {
            return Err(err);
        }
        Ok(RenderedPredicate {
            sql: expr.to_string(),
            params: bound,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_commons::RewindError;
    use crate::parser::parse_single_statement;
    use sqlparser::ast::Statement;
    use sqlparser::dialect::{GenericDialect, PostgreSqlDialect};

    fn selection(sql: &str, dialect: &dyn sqlparser::dialect::Dialect) -> Expr {
        match parse_single_statement(sql, dialect).unwrap() {
            Statement::Delete(delete) => delete.selection.unwrap(),
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_forward_reference_render() {
        let expr = selection("DELETE FROM t WHERE id = ? AND name = ?", &GenericDialect {});
        let predicate = WherePredicate::new(&expr, &mut PlaceholderCounter::default()).unwrap();
        let params = vec![SqlValue::Int(7), SqlValue::from("x")];

        let rendered = predicate
            .render(&params, RenderMode::ForwardReference(PlaceholderStyle::QuestionMark))
            .unwrap();
        assert_eq!(rendered.sql, "id = ? AND name = ?");
        assert_eq!(rendered.params, params);

        let rendered = predicate
            .render(&params, RenderMode::ForwardReference(PlaceholderStyle::Dollar))
            .unwrap();
        assert_eq!(rendered.sql, "id = $1 AND name = $2");
    }

    #[test]
    fn test_literal_render_escapes_strings() {
        let expr = selection("DELETE FROM t WHERE name = ?", &GenericDialect {});
        let predicate = WherePredicate::new(&expr, &mut PlaceholderCounter::default()).unwrap();
        let rendered = predicate
            .render(&vec![SqlValue::from("it's")], RenderMode::Literal)
            .unwrap();
        assert_eq!(rendered.sql, "name = 'it''s'");
        assert!(rendered.params.is_empty());
    }

    #[test]
    fn test_render_skips_earlier_markers() {
        let expr = selection("DELETE FROM t WHERE id = ?", &GenericDialect {});
        // Two markers were consumed by SET assignments before the WHERE clause.
        let predicate = WherePredicate::new(&expr, &mut PlaceholderCounter::starting_at(2)).unwrap();
        let params = vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)];
        let rendered = predicate.render(&params, RenderMode::Literal).unwrap();
        assert_eq!(rendered.sql, "id = 3");
    }

    #[test]
    fn test_dollar_markers_renumbered() {
        let expr = selection("DELETE FROM t WHERE a = $3 AND b = $1", &PostgreSqlDialect {});
        let predicate = WherePredicate::new(&expr, &mut PlaceholderCounter::default()).unwrap();
        let params = vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)];
        let rendered = predicate
            .render_from(&params, RenderMode::ForwardReference(PlaceholderStyle::Dollar), 4)
            .unwrap();
        assert_eq!(rendered.sql, "a = $4 AND b = $5");
        assert_eq!(rendered.params, vec![SqlValue::Int(3), SqlValue::Int(1)]);
    }

    #[test]
    fn test_missing_parameter() {
        let expr = selection("DELETE FROM t WHERE id = ?", &GenericDialect {});
        let predicate = WherePredicate::new(&expr, &mut PlaceholderCounter::default()).unwrap();
        let err = predicate.render(&Vec::<SqlValue>::new(), RenderMode::Literal).unwrap_err();
        assert!(matches!(err, RewindError::InvalidSql(_)));
    }
}
