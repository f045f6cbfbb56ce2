//! FILENAME: core/grouping-engine/src/memory.rs
//! PURPOSE: Expansion memory carried across full rebuilds.
//! CONTEXT: Physical indices change on every rebuild (new data, sort), so the
//! user's expand/collapse choices are remembered by group key value. The
//! snapshot is taken explicitly from the current headers before a rebuild.
//! Memory is keyed by value only: equal values under different parents share
//! one entry.

use rustc_hash::FxHashMap;

use row_store::{GroupValue, Record};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionMemory {
    states: FxHashMap<GroupValue, bool>,
}

impl ExpansionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture `{group value -> expanded}` from every header in `records`.
    /// When the same value occurs more than once, the last header wins.
    pub fn snapshot(records: &[Record]) -> Self {
        let mut memory = Self::new();
        for header in records.iter().filter_map(Record::as_group) {
            memory.remember(header.group_value.clone(), header.expanded);
        }
        memory
    }

    pub fn remember(&mut self, value: GroupValue, expanded: bool) {
        self.states.insert(value, expanded);
    }

    pub fn get(&self, value: &GroupValue) -> Option<bool> {
        self.states.get(value).copied()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl FromIterator<(GroupValue, bool)> for ExpansionMemory {
    fn from_iter<T: IntoIterator<Item = (GroupValue, bool)>>(iter: T) -> Self {
        ExpansionMemory {
            states: iter.into_iter().collect(),
        }
    }
}
