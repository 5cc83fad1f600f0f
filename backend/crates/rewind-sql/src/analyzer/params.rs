//! Bound parameters of the original statement and placeholder numbering.

use rewind_commons::{Result, RewindError, SqlValue};

/// Ordered bound values of the original statement, indexable by position (0-based).
pub trait ParameterSource {
    fn parameter_count(&self) -> usize;

    fn parameter(&self, index: usize) -> Option<&SqlValue>;

    /// Value at `index`, failing when the statement references a parameter
    /// that was never bound.
    fn require(&self, index: usize) -> Result<&SqlValue> {
        self.parameter(index).ok_or_else(|| {
            RewindError::invalid_sql(format!(
                "Parameter {} out of range (have {} parameters)",
                index + 1,
                self.parameter_count()
            ))
        })
    }
}

impl ParameterSource for [SqlValue] {
    fn parameter_count(&self) -> usize {
        self.len()
    }

    fn parameter(&self, index: usize) -> Option<&SqlValue> {
        self.get(index)
    }
}

impl ParameterSource for Vec<SqlValue> {
    fn parameter_count(&self) -> usize {
        self.len()
    }

    fn parameter(&self, index: usize) -> Option<&SqlValue> {
        self.get(index)
    }
}

/// Assigns parameter indexes to placeholder markers in textual order.
///
/// `?` markers are numbered positionally; `$n` markers name their index
/// directly and do not advance the positional counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaceholderCounter {
    next: usize,
}

impl PlaceholderCounter {
    pub fn starting_at(next: usize) -> Self {
        Self { next }
    }

    /// Index the next `?` marker will receive
    pub fn position(&self) -> usize {
        self.next
    }

    pub fn index_for(&mut self, marker: &str) -> Result<usize> {
        if marker == "?" {
            let index = self.next;
            self.next += 1;
            return Ok(index);
        }

        let stripped = marker.strip_prefix('$').ok_or_else(|| {
            RewindError::unsupported(format!("placeholder format '{}'", marker))
        })?;
        let param_num: usize = stripped
            .parse()
            .map_err(|_| RewindError::invalid_sql(format!("Invalid placeholder: {}", marker)))?;
        if param_num == 0 {
            return Err(RewindError::invalid_sql(format!(
                "Invalid placeholder index: {}",
                marker
            )));
        }
        Ok(param_num - 1)
    }
}
