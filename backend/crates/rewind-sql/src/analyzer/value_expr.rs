//! Value expressions of INSERT rows and UPDATE assignments.

use super::params::{ParameterSource, PlaceholderCounter};
use rewind_commons::{Result, SqlValue};
use sqlparser::ast::{visit_expressions, Expr, UnaryOperator, Value};
use std::ops::ControlFlow;

/// What a statement says about one column value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueExpr {
    /// Literal written in the statement text
    Literal(SqlValue),
    /// Bound-parameter marker; 0-based index into the parameter source
    Placeholder(usize),
    /// Explicit `NULL`
    Null,
    /// `DEFAULT` keyword in a VALUES list
    Default,
    /// Function call or any other computed expression, rendered back to text.
    /// Its value is only known after execution.
    Computed(String),
}

/// A value expression after binding parameters
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Value(SqlValue),
    Null,
    Default,
    Computed(String),
}

impl ResolvedValue {
    /// The store decides this value (auto-increment, sequence, function, default).
    pub fn is_generated(&self) -> bool {
        !matches!(self, ResolvedValue::Value(_))
    }
}

impl ValueExpr {
    /// Bind against the original statement's parameters.
    pub fn resolve(&self, params: &dyn ParameterSource) -> Result<ResolvedValue> {
        Ok(match self {
            ValueExpr::Literal(v) => ResolvedValue::Value(v.clone()),
            ValueExpr::Placeholder(index) => match params.require(*index)? {
                SqlValue::Null => ResolvedValue::Null,
                v => ResolvedValue::Value(v.clone()),
            },
            ValueExpr::Null => ResolvedValue::Null,
            ValueExpr::Default => ResolvedValue::Default,
            ValueExpr::Computed(text) => ResolvedValue::Computed(text.clone()),
        })
    }
}

/// Classify one value expression, numbering any placeholders it contains.
pub fn classify_value(expr: &Expr, counter: &mut PlaceholderCounter) -> Result<ValueExpr> {
    match expr {
        Expr::Value(v) => match &v.value {
            Value::Null => Ok(ValueExpr::Null),
            Value::Placeholder(marker) => Ok(ValueExpr::Placeholder(counter.index_for(marker)?)),
            other => Ok(literal_from_value(other)
                .map(ValueExpr::Literal)
                .unwrap_or_else(|| ValueExpr::Computed(other.to_string()))),
        },
        Expr::Nested(inner) => classify_value(inner, counter),
        Expr::UnaryOp {
            op: UnaryOperator::Minus,
            expr: inner,
        } => match inner.as_ref() {
            Expr::Value(v) => match &v.value {
                Value::Number(n, _) => Ok(negative_number(n)
                    .map(ValueExpr::Literal)
                    .unwrap_or_else(|| ValueExpr::Computed(expr.to_string()))),
                _ => computed(expr, counter),
            },
            _ => computed(expr, counter),
        },
        Expr::Identifier(ident)
            if ident.quote_style.is_none() && ident.value.eq_ignore_ascii_case("DEFAULT") =>
        {
            Ok(ValueExpr::Default)
        },
        _ => computed(expr, counter),
    }
}

/// Render a computed expression, still consuming the placeholders inside it so
/// later markers keep their positions.
fn computed(expr: &Expr, counter: &mut PlaceholderCounter) -> Result<ValueExpr> {
    count_placeholders(expr, counter)?;
    Ok(ValueExpr::Computed(expr.to_string()))
}

/// Advance `counter` over every placeholder in `expr`, in textual order.
pub fn count_placeholders(expr: &Expr, counter: &mut PlaceholderCounter) -> Result<()> {
    let flow = visit_expressions(expr, |e| {
        if let Expr::Value(v) = e {
            if let Value::Placeholder(marker) = &v.value {
                if let Err(err) = counter.index_for(marker) {
                    return ControlFlow::Break(err);
                }
            }
        }
        ControlFlow::Continue(())
    });
    match flow {
        ControlFlow::Break(err) => Err(err),
        ControlFlow::Continue(()) => Ok(()),
    }
}

/// Numeric literal text as a value. Anything outside i64 stays exact as decimal text.
fn parse_number(n: &str) -> Option<SqlValue> {
    if let Ok(i) = n.parse::<i64>() {
        return Some(SqlValue::Int(i));
    }
    n.parse::<f64>().ok()?;
    Some(SqlValue::Decimal(n.to_string()))
}

fn negative_number(n: &str) -> Option<SqlValue> {
    parse_number(&format!("-{}", n))
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| s.get(i..i + 2).and_then(|b| u8::from_str_radix(b, 16).ok()))
        .collect()
}

/// Literal value carried by a sqlparser `Value`, if it is a plain literal.
pub fn literal_from_value(value: &Value) -> Option<SqlValue> {
    match value {
        Value::Number(n, _) => parse_number(n),
        Value::SingleQuotedString(s)
        | Value::DoubleQuotedString(s)
        | Value::EscapedStringLiteral(s)
        | Value::NationalStringLiteral(s) => Some(SqlValue::Text(s.clone())),
        Value::DollarQuotedString(s) => Some(SqlValue::Text(s.value.clone())),
        Value::HexStringLiteral(s) => decode_hex(s).map(SqlValue::Bytes),
        Value::Boolean(b) => Some(SqlValue::Boolean(*b)),
        Value::Null => Some(SqlValue::Null),
        _ => None,
    }
}

/// sqlparser `Value` for a bound value, used when inlining literals.
pub fn sql_value_to_ast(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Boolean(b) => Value::Boolean(*b),
        SqlValue::Int(i) => Value::Number(i.to_string(), false),
        SqlValue::Float(f) => Value::Number(f.to_string(), false),
        SqlValue::Decimal(d) => Value::Number(d.clone(), false),
        SqlValue::Text(s) => Value::SingleQuotedString(s.clone()),
        SqlValue::Bytes(b) => {
            Value::HexStringLiteral(b.iter().map(|byte| format!("{:02X}", byte)).collect())
        },
    }
}
