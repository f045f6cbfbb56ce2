//! FILENAME: core/row-store/src/record.rs
//! PURPOSE: Defines the records held in the row store's source sequence.
//! CONTEXT: A record is either ordinary application data (`DataRow`) or a
//! synthetic group header produced by the grouping engine. Engine logic
//! pattern-matches on the `Record` tag instead of probing marker fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::group_value::GroupValue;

/// Raw value of a single field of a data row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

/// An application data row: an open mapping from field name to value.
/// Fields are kept ordered so equal rows always serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    pub fields: BTreeMap<String, FieldValue>,
}

impl DataRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }
}

/// Synthetic row marking the start of a group.
///
/// Physical indices refer to positions in the source sequence the header was
/// built into. The header's descendants occupy the contiguous range
/// `index + 1 .. end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupHeader {
    /// Key value shared by every row of this group at this level.
    pub group_value: GroupValue,
    /// Grouping field of this level (empty for ad-hoc key extractors).
    #[serde(default)]
    pub field: String,
    /// Number of enclosing group headers (0 for top-level groups).
    pub depth: usize,
    pub expanded: bool,
    /// Direct children (data rows and nested headers), in source order.
    pub children: Vec<usize>,
    /// Enclosing group header, if any.
    pub parent: Option<usize>,
    /// Exclusive end of the descendant span.
    pub end: usize,
}

impl GroupHeader {
    /// Whether a physical index lies inside this header's descendant span.
    /// `index` is the header's own physical index.
    pub fn contains(&self, index: usize, physical: usize) -> bool {
        physical > index && physical < self.end
    }
}

/// A row of the source sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Record {
    Data(DataRow),
    Group(GroupHeader),
}

impl Record {
    pub fn is_group(&self) -> bool {
        matches!(self, Record::Group(_))
    }

    pub fn as_data(&self) -> Option<&DataRow> {
        match self {
            Record::Data(row) => Some(row),
            Record::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupHeader> {
        match self {
            Record::Group(header) => Some(header),
            Record::Data(_) => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut GroupHeader> {
        match self {
            Record::Group(header) => Some(header),
            Record::Data(_) => None,
        }
    }

    pub fn into_data(self) -> Option<DataRow> {
        match self {
            Record::Data(row) => Some(row),
            Record::Group(_) => None,
        }
    }
}

impl From<DataRow> for Record {
    fn from(row: DataRow) -> Self {
        Record::Data(row)
    }
}

/// Drops every group header, keeping data rows in their current order.
pub fn strip_group_headers(records: impl IntoIterator<Item = Record>) -> Vec<DataRow> {
    records.into_iter().filter_map(Record::into_data).collect()
}
