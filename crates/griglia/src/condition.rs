//! Condition fragments with positional bindings.
//!
//! Callers describe WHERE content as an ordered sequence of [`ConditionTerm`]s:
//! literal connective keywords (`AND`, `OR`, ...) interleaved with field
//! comparisons. Keywords land in the SQL verbatim (upper-cased); comparison
//! values always travel as `?` bindings. Field names are validated
//! identifiers before being backtick-quoted — they must come from trusted
//! configuration, never raw client input. Operator text is not validated;
//! callers pass vetted operators only.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GridError, GridResult};

/// Regex for valid SQL identifiers (table/column names).
///
/// # Panics
///
/// Panics if the hard-coded regex literal is invalid (impossible in practice).
#[allow(clippy::expect_used)]
static VALID_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("valid regex literal"));

/// Check whether a dynamic table/column name is safe to interpolate.
pub fn is_valid_identifier(name: &str) -> bool {
    VALID_IDENTIFIER.is_match(name)
}

/// Backtick-quote an identifier, rejecting anything that fails validation.
pub(crate) fn quote_identifier(name: &str) -> GridResult<String> {
    if !is_valid_identifier(name) {
        return Err(GridError::Validation(format!(
            "invalid identifier: {name:?}"
        )));
    }
    Ok(format!("`{name}`"))
}

/// One term of a condition sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionTerm {
    /// A literal boolean/logical token, e.g. `AND`, `OR`, `NOT`.
    Keyword(String),
    /// One comparison: `` `column` operator ? `` with the value bound.
    Field {
        column: String,
        operator: String,
        value: Value,
    },
}

impl ConditionTerm {
    /// A connective keyword token.
    pub fn keyword(word: impl Into<String>) -> Self {
        Self::Keyword(word.into())
    }

    /// An equality comparison.
    pub fn field(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field_op(column, "=", value)
    }

    /// A comparison with an explicit operator.
    pub fn field_op(
        column: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self::Field {
            column: column.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// A rendered SQL fragment plus its bindings, in placeholder order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionFragment {
    pub sql: String,
    pub bindings: Vec<Value>,
}

impl ConditionFragment {
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Render a term sequence to space-joined tokens, without wrapping parens.
///
/// Used directly by `Table::select`, where the caller's keywords supply the
/// connectives between comparisons.
pub fn render_terms(terms: &[ConditionTerm]) -> GridResult<ConditionFragment> {
    let mut tokens = Vec::with_capacity(terms.len());
    let mut bindings = Vec::new();

    for term in terms {
        match term {
            ConditionTerm::Keyword(word) => tokens.push(word.to_uppercase()),
            ConditionTerm::Field {
                column,
                operator,
                value,
            } => {
                tokens.push(format!("{} {operator} ?", quote_identifier(column)?));
                bindings.push(value.clone());
            }
        }
    }

    Ok(ConditionFragment {
        sql: tokens.join(" "),
        bindings,
    })
}

/// Render a strict-condition sequence as one parenthesized group.
///
/// An empty sequence renders to an empty fragment with no bindings.
pub fn render_condition(terms: &[ConditionTerm]) -> GridResult<ConditionFragment> {
    if terms.is_empty() {
        return Ok(ConditionFragment::default());
    }

    let inner = render_terms(terms)?;
    Ok(ConditionFragment {
        sql: format!("({})", inner.sql),
        bindings: inner.bindings,
    })
}
