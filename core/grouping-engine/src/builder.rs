//! FILENAME: core/grouping-engine/src/builder.rs
//! Grouping Builder - turns flat data rows into a grouped source sequence.
//!
//! The builder is a pure function of its inputs: equal rows, keys and options
//! always produce an identical sequence, depth and hidden map.
//!
//! Algorithm:
//! 1. Extract each row's group path (one key per level, most significant first)
//! 2. Keep the open headers whose keys equal the path prefix, close the rest
//! 3. Open a header for every remaining path level, right before the row
//! 4. Attach the row to the innermost open header
//! 5. Hide the descendant span of every collapsed header (collapse is inherited)

use smallvec::SmallVec;

use row_store::{DataRow, GroupHeader, GroupValue, Record, TrimmedMap};

use crate::memory::ExpansionMemory;

/// Key values of a row, one per grouping level.
pub type GroupPath = SmallVec<[GroupValue; 4]>;

// ============================================================================
// KEY EXTRACTION
// ============================================================================

/// Produces the key of one grouping level for a row.
/// `None` ends the row's group path at this level.
pub trait KeyExtractor {
    fn extract(&self, row: &DataRow) -> Option<GroupValue>;

    /// Grouping field recorded on headers of this level.
    fn field(&self) -> &str {
        ""
    }
}

/// Groups by the value of a named field. A row missing the field ends its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKey {
    field: String,
}

impl FieldKey {
    pub fn new(field: impl Into<String>) -> Self {
        FieldKey { field: field.into() }
    }
}

impl KeyExtractor for FieldKey {
    fn extract(&self, row: &DataRow) -> Option<GroupValue> {
        row.get(&self.field).map(GroupValue::from)
    }

    fn field(&self) -> &str {
        &self.field
    }
}

impl<F> KeyExtractor for F
where
    F: Fn(&DataRow) -> Option<GroupValue>,
{
    fn extract(&self, row: &DataRow) -> Option<GroupValue> {
        self(row)
    }
}

/// Computes a row's group path. Extraction stops at the first level without
/// a key, so malformed rows simply get a shorter path.
pub fn group_path<K: KeyExtractor>(row: &DataRow, keys: &[K]) -> GroupPath {
    keys.iter().map_while(|key| key.extract(row)).collect()
}

// ============================================================================
// OPTIONS & OUTPUT
// ============================================================================

/// Expansion hints for newly created headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Remembered state by group value; takes precedence over everything else.
    pub previous_expansion: ExpansionMemory,
    /// State of headers with no remembered state.
    pub default_expanded: bool,
    /// Labels of groups that start collapsed when nothing is remembered.
    pub collapsed_labels: Vec<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            previous_expansion: ExpansionMemory::new(),
            default_expanded: true,
            collapsed_labels: Vec::new(),
        }
    }
}

impl BuildOptions {
    pub fn with_memory(mut self, memory: ExpansionMemory) -> Self {
        self.previous_expansion = memory;
        self
    }

    /// Initial expanded state of a new header with the given key.
    pub fn initial_state(&self, value: &GroupValue) -> bool {
        if let Some(expanded) = self.previous_expansion.get(value) {
            return expanded;
        }
        if !self.collapsed_labels.is_empty() {
            let label = value.label();
            if self.collapsed_labels.iter().any(|l| *l == label) {
                return false;
            }
        }
        self.default_expanded
    }
}

/// Result of a full build.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSequence {
    /// Data rows interleaved with group headers.
    pub records: Vec<Record>,
    /// Length of the longest group path observed.
    pub depth: usize,
    /// Rows hidden because an enclosing header is collapsed.
    pub hidden: TrimmedMap,
}

// ============================================================================
// BUILD
// ============================================================================

/// A header that can still receive rows.
#[derive(Debug)]
struct OpenGroup {
    index: usize,
    value: GroupValue,
}

/// Builds the grouped sequence for `rows`.
pub fn build<K: KeyExtractor>(
    rows: Vec<DataRow>,
    keys: &[K],
    options: &BuildOptions,
) -> GroupedSequence {
    let mut records: Vec<Record> = Vec::with_capacity(rows.len());
    let mut open: SmallVec<[OpenGroup; 4]> = SmallVec::new();
    let mut depth = 0;

    for row in rows {
        let path = group_path(&row, keys);
        depth = depth.max(path.len());

        // Levels are compared top-down: once a level differs, every deeper
        // level belongs to a new group even if its key repeats.
        let shared = open
            .iter()
            .zip(path.iter())
            .take_while(|(group, value)| group.value == **value)
            .count();

        while open.len() > shared {
            if let Some(group) = open.pop() {
                close_group(&mut records, group.index);
            }
        }

        for (level, value) in path.iter().enumerate().skip(shared) {
            let index = records.len();
            let parent = open.last().map(|group| group.index);
            if let Some(parent) = parent {
                attach_child(&mut records, parent, index);
            }
            records.push(Record::Group(GroupHeader {
                group_value: value.clone(),
                field: keys
                    .get(level)
                    .map(|key| key.field().to_string())
                    .unwrap_or_default(),
                depth: level,
                expanded: options.initial_state(value),
                children: Vec::new(),
                parent,
                end: index + 1,
            }));
            open.push(OpenGroup {
                index,
                value: value.clone(),
            });
        }

        let index = records.len();
        if let Some(group) = open.last() {
            attach_child(&mut records, group.index, index);
        }
        records.push(Record::Data(row));
    }

    while let Some(group) = open.pop() {
        close_group(&mut records, group.index);
    }

    let hidden = hidden_rows(&records);
    GroupedSequence {
        records,
        depth,
        hidden,
    }
}

/// Recomputes the grouping hidden map of an existing sequence from its
/// headers' expanded flags.
pub fn hidden_rows(records: &[Record]) -> TrimmedMap {
    let mut hidden = TrimmedMap::new();
    for (index, record) in records.iter().enumerate() {
        if let Record::Group(header) = record {
            if !header.expanded {
                for physical in index + 1..header.end.min(records.len()) {
                    hidden.insert(physical, true);
                }
            }
        }
    }
    hidden
}

fn attach_child(records: &mut [Record], parent: usize, child: usize) {
    if let Some(header) = records.get_mut(parent).and_then(Record::as_group_mut) {
        header.children.push(child);
    }
}

fn close_group(records: &mut [Record], index: usize) {
    let end = records.len();
    if let Some(header) = records.get_mut(index).and_then(Record::as_group_mut) {
        header.end = end;
    }
}
