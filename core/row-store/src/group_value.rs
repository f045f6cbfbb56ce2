//! FILENAME: core/row-store/src/group_value.rs
//! PURPOSE: Normalized, hashable key values produced by grouping key extraction.
//! CONTEXT: Group headers and expansion memory compare keys by value, so the
//! raw `FieldValue` (which holds an f64) is normalized into a type with Eq + Hash.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::FieldValue;

/// A normalized, hashable representation of a field value.
/// Two records belong to the same group level iff their `GroupValue`s are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupValue {
    Empty,
    Number(OrderedFloat),
    Text(String),
    Boolean(bool),
}

impl GroupValue {
    pub fn text(value: impl Into<String>) -> Self {
        GroupValue::Text(value.into())
    }

    pub fn number(value: f64) -> Self {
        GroupValue::Number(OrderedFloat(value))
    }

    /// Display label of the key. Used for rendering and for matching
    /// label-based configuration such as the initially collapsed groups.
    pub fn label(&self) -> String {
        match self {
            GroupValue::Empty => String::new(),
            GroupValue::Number(n) => {
                // Format without unnecessary decimal places
                if n.0.fract() == 0.0 && n.0.abs() < 1e15 {
                    format!("{:.0}", n.0)
                } else {
                    format!("{}", n.0)
                }
            }
            GroupValue::Text(s) => s.clone(),
            GroupValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<&FieldValue> for GroupValue {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Empty => GroupValue::Empty,
            FieldValue::Number(n) => GroupValue::Number(OrderedFloat(*n)),
            FieldValue::Text(s) => GroupValue::Text(s.clone()),
            FieldValue::Boolean(b) => GroupValue::Boolean(*b),
        }
    }
}

impl From<&str> for GroupValue {
    fn from(value: &str) -> Self {
        GroupValue::Text(value.to_string())
    }
}

/// Wrapper around f64 that implements Eq and Hash for use as HashMap keys.
/// NaN values are treated as equal to each other, and 0.0 equals -0.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            true
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            // All NaN values hash to the same thing
            u64::MAX.hash(state);
        } else if self.0 == 0.0 {
            0u64.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

impl OrderedFloat {
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}
