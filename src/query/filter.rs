//! Typed filters and their SQL predicate form.

use std::collections::HashMap;
use std::fmt::Debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Match {
    /// Case-insensitive partial match on a text column.
    Contains(String),
    /// Exact match on an integer column.
    Equals(i64),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predicate {
    pub column: &'static str,
    pub rule: Match,
}

impl Predicate {
    pub fn contains(column: &'static str, needle: &str) -> Self {
        Predicate {
            column,
            rule: Match::Contains(needle.to_string()),
        }
    }

    pub fn equals(column: &'static str, value: i64) -> Self {
        Predicate {
            column,
            rule: Match::Equals(value),
        }
    }
}

/// Filter for one record type. All present criteria combine with AND.
pub trait RecordFilter<R>: Clone + Debug + Default + Send + Sync {
    fn from_params(params: &HashMap<String, String>) -> Self;

    /// Criteria as SQL predicates over static column names.
    fn predicates(&self) -> Vec<Predicate>;

    /// Same criteria evaluated against a record in memory.
    fn matches(&self, record: &R) -> bool;
}
