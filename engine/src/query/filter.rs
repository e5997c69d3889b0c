//! Filter clauses derived from query-string parameters.
//!
//! A parameter key is a field name with an optional operator suffix:
//! `price_gte=10`, `title_like=dune`, `status=open`. Clauses are ANDed.

use crate::record::Record;
use crate::value::{as_f64, canonical_string, parse_f64};
use serde_json::Value;
use std::fmt;

/// Comparison applied by a single clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    /// Canonical string equality
    Eq,
    /// Canonical string inequality
    Ne,
    /// Numeric `>`
    Gt,
    /// Numeric `>=`
    Gte,
    /// Numeric `<`
    Lt,
    /// Numeric `<=`
    Lte,
    /// Case-insensitive substring (`_like` is an alias)
    Contains,
    /// Operator token with no known meaning. Never matches.
    Unknown(String),
}

/// Key suffixes recognized as operators, longest-first where they overlap.
const SUFFIXES: &[(&str, Operator)] = &[
    ("_gte", Operator::Gte),
    ("_lte", Operator::Lte),
    ("_gt", Operator::Gt),
    ("_lt", Operator::Lt),
    ("_ne", Operator::Ne),
    ("_contains", Operator::Contains),
    ("_like", Operator::Contains),
];

impl Operator {
    /// Resolve an operator token such as `"gte"` or `"like"`.
    /// An empty token means equality.
    pub fn from_token(token: &str) -> Self {
        match token {
            "" | "eq" => Operator::Eq,
            "ne" => Operator::Ne,
            "gt" => Operator::Gt,
            "gte" => Operator::Gte,
            "lt" => Operator::Lt,
            "lte" => Operator::Lte,
            "contains" | "like" => Operator::Contains,
            other => Operator::Unknown(other.to_string()),
        }
    }

    /// Canonical token for this operator.
    pub fn token(&self) -> &str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Contains => "contains",
            Operator::Unknown(token) => token,
        }
    }

    /// Compare a present record value against the literal from the query.
    pub fn compare(&self, value: &Value, literal: &str) -> bool {
        match self {
            Operator::Eq => canonical_string(value) == literal,
            Operator::Ne => canonical_string(value) != literal,
            Operator::Contains => canonical_string(value)
                .to_lowercase()
                .contains(&literal.to_lowercase()),
            Operator::Gt => numeric(value, literal, |a, b| a > b),
            Operator::Gte => numeric(value, literal, |a, b| a >= b),
            Operator::Lt => numeric(value, literal, |a, b| a < b),
            Operator::Lte => numeric(value, literal, |a, b| a <= b),
            Operator::Unknown(token) => {
                tracing::warn!(operator = %token, "unknown filter operator, clause never matches");
                false
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Both sides must have a numeric form, otherwise the comparison fails.
fn numeric(value: &Value, literal: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (as_f64(value), parse_f64(literal)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

/// Split a parameter key into field name and operator.
///
/// A key with no recognized suffix is an equality clause on the whole key.
pub fn split_key(key: &str) -> (&str, Operator) {
    for (suffix, op) in SUFFIXES {
        if let Some(field) = key.strip_suffix(*suffix) {
            if !field.is_empty() {
                return (field, op.clone());
            }
        }
    }
    (key, Operator::Eq)
}

/// One field + operator + literal test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub field: String,
    pub op: Operator,
    pub value: String,
}

impl FilterClause {
    pub fn new(field: impl Into<String>, op: Operator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Build a clause from a raw `key=value` query parameter.
    pub fn from_param(key: &str, value: impl Into<String>) -> Self {
        let (field, op) = split_key(key);
        Self::new(field, op, value)
    }

    /// A record with the field absent (or null) never satisfies a clause.
    pub fn matches(&self, record: &Record) -> bool {
        if let Operator::Unknown(token) = &self.op {
            tracing::warn!(field = %self.field, operator = %token, "unknown filter operator, clause never matches");
            return false;
        }
        match record.get_present(&self.field) {
            Some(value) => self.op.compare(value, &self.value),
            None => false,
        }
    }
}

/// Conjunction of clauses. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    clauses: Vec<FilterClause>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause (builder style).
    pub fn with(mut self, clause: FilterClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn push(&mut self, clause: FilterClause) {
        self.clauses.push(clause);
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.clauses.iter().all(|c| c.matches(record))
    }

    /// Keep the matching records, preserving order.
    pub fn apply<'a>(&self, records: impl IntoIterator<Item = &'a Record>) -> Vec<&'a Record> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
