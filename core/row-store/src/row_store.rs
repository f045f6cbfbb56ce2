//! FILENAME: core/row-store/src/row_store.rs
//! PURPOSE: Holds the source sequence, the virtual order and the trimmed maps.
//! CONTEXT: This is the external row store the grouping engine is handed on
//! every call. Several subsystems hide rows through it (grouping, filtering,
//! manual trimming); each one writes its own named trimmed map so their
//! decisions coexist. A row is hidden if any namespace marks it hidden.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;

use crate::record::Record;

/// Physical index -> hidden flag, for a single namespace.
/// In a patch, `false` means "remove the entry".
pub type TrimmedMap = BTreeMap<usize, bool>;

/// The row store state.
/// `items` holds the display order as physical indices of the rows currently
/// shown; rows hidden in any namespace are dropped from it whenever a trimmed
/// map changes.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    source: Vec<Record>,
    items: Vec<usize>,
    trimmed: BTreeMap<String, TrimmedMap>,
    /// Physical index of the focused row, if any.
    focused: Option<usize>,
}

impl RowStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store showing every record in source order.
    pub fn with_records(records: Vec<Record>) -> Self {
        let mut store = Self::new();
        store.replace_source(records);
        store
    }

    // ========================================================================
    // SOURCE
    // ========================================================================

    pub fn source(&self) -> &[Record] {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn record(&self, physical: usize) -> Option<&Record> {
        self.source.get(physical)
    }

    /// Takes the source out of the store, leaving it empty.
    pub fn take_source(&mut self) -> Vec<Record> {
        self.items.clear();
        self.focused = None;
        std::mem::take(&mut self.source)
    }

    /// Replaces the source sequence. Physical indices change, so focus is
    /// dropped and the virtual order is rebuilt from the trimmed maps.
    pub fn replace_source(&mut self, records: Vec<Record>) {
        self.source = records;
        self.focused = None;
        self.reset_items();
    }

    /// Sets the expanded flag of the group header at `physical`.
    /// Returns false if that record is not a group header.
    pub fn set_group_expanded(&mut self, physical: usize, expanded: bool) -> bool {
        match self.source.get_mut(physical).and_then(Record::as_group_mut) {
            Some(header) => {
                header.expanded = expanded;
                true
            }
            None => false,
        }
    }

    /// Sets the expanded flag on every group header. Returns how many changed.
    pub fn set_all_groups_expanded(&mut self, expanded: bool) -> usize {
        let mut changed = 0;
        for header in self.source.iter_mut().filter_map(Record::as_group_mut) {
            if header.expanded != expanded {
                header.expanded = expanded;
                changed += 1;
            }
        }
        changed
    }

    // ========================================================================
    // VIRTUAL ORDER
    // ========================================================================

    pub fn items(&self) -> &[usize] {
        &self.items
    }

    pub fn set_items(&mut self, items: Vec<usize>) {
        self.items = items;
    }

    /// Rebuilds the virtual order as every non-hidden row in physical order.
    pub fn reset_items(&mut self) {
        self.items = (0..self.source.len())
            .filter(|&physical| !self.is_hidden(physical))
            .collect();
    }

    /// Resolves a display position to a physical index.
    pub fn physical_index(&self, position: usize) -> Option<usize> {
        self.items.get(position).copied()
    }

    /// Finds the display position of a physical index, if it is displayed.
    pub fn display_position(&self, physical: usize) -> Option<usize> {
        self.items.iter().position(|&item| item == physical)
    }

    /// Inserts `physicals` right after the display position of `anchor`, in
    /// the given order. Rows already displayed or hidden by any namespace are
    /// skipped. Returns the number of inserted rows.
    pub fn insert_items_after(&mut self, anchor: usize, physicals: &[usize]) -> usize {
        let Some(position) = self.display_position(anchor) else {
            return 0;
        };
        let present: FxHashSet<usize> = self.items.iter().copied().collect();
        let inserted: Vec<usize> = physicals
            .iter()
            .copied()
            .filter(|p| *p < self.source.len() && !present.contains(p) && !self.is_hidden(*p))
            .collect();
        let count = inserted.len();
        self.items.splice(position + 1..position + 1, inserted);
        count
    }

    /// Moves the item at display position `from` to display position `to`.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from >= self.items.len() || to >= self.items.len() {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }

    // ========================================================================
    // TRIMMED MAPS
    // ========================================================================

    pub fn trimmed(&self, namespace: &str) -> Option<&TrimmedMap> {
        self.trimmed.get(namespace)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.trimmed.keys().map(String::as_str)
    }

    /// Replaces a whole namespace.
    pub fn set_trimmed(&mut self, namespace: &str, map: TrimmedMap) {
        self.trimmed.insert(namespace.to_string(), map);
        self.drop_hidden_items();
    }

    /// Applies a patch to one namespace: `true` hides, `false` removes the entry.
    pub fn apply_trim_patch(&mut self, namespace: &str, patch: &TrimmedMap) {
        let map = self.trimmed.entry(namespace.to_string()).or_default();
        for (&physical, &hidden) in patch {
            if hidden {
                map.insert(physical, true);
            } else {
                map.remove(&physical);
            }
        }
        self.drop_hidden_items();
    }

    /// Removes a namespace entirely. The virtual order is left as is; callers
    /// that need the rows back call `reset_items`.
    pub fn clear_trimmed(&mut self, namespace: &str) -> Option<TrimmedMap> {
        self.trimmed.remove(namespace)
    }

    /// A row is hidden if any namespace marks it hidden.
    pub fn is_hidden(&self, physical: usize) -> bool {
        self.trimmed
            .values()
            .any(|map| map.get(&physical).copied().unwrap_or(false))
    }

    fn drop_hidden_items(&mut self) {
        let items = std::mem::take(&mut self.items);
        self.items = items
            .into_iter()
            .filter(|&physical| !self.is_hidden(physical))
            .collect();
    }

    // ========================================================================
    // FOCUS
    // ========================================================================

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn set_focus(&mut self, physical: Option<usize>) {
        self.focused = physical;
    }

    pub fn clear_focus(&mut self) {
        self.focused = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DataRow;

    fn store_of(count: usize) -> RowStore {
        let records = (0..count)
            .map(|i| Record::Data(DataRow::new().with("v", i as f64)))
            .collect();
        RowStore::with_records(records)
    }

    #[test]
    fn test_namespaces_coexist() {
        let mut store = store_of(5);
        store.set_trimmed("filter", TrimmedMap::from([(1, true)]));
        store.apply_trim_patch("grouping", &TrimmedMap::from([(1, true), (3, true)]));

        assert_eq!(store.items(), &[0, 2, 4]);

        // Unhiding in grouping keeps the filter's decision
        store.apply_trim_patch("grouping", &TrimmedMap::from([(1, false), (3, false)]));
        assert!(store.is_hidden(1));
        assert!(!store.is_hidden(3));
        assert!(store.trimmed("grouping").map_or(false, |m| m.is_empty()));
    }

    #[test]
    fn test_insert_items_after_skips_present_and_hidden() {
        let mut store = store_of(5);
        store.set_items(vec![0, 4]);
        store.set_trimmed("filter", TrimmedMap::from([(2, true)]));

        let inserted = store.insert_items_after(0, &[1, 2, 3, 4]);

        assert_eq!(inserted, 2);
        assert_eq!(store.items(), &[0, 1, 3, 4]);
    }

    #[test]
    fn test_insert_after_undisplayed_anchor_is_noop() {
        let mut store = store_of(3);
        store.set_items(vec![1]);
        assert_eq!(store.insert_items_after(0, &[2]), 0);
        assert_eq!(store.items(), &[1]);
    }

    #[test]
    fn test_move_item() {
        let mut store = store_of(4);
        assert!(store.move_item(0, 2));
        assert_eq!(store.items(), &[1, 2, 0, 3]);
        assert!(!store.move_item(0, 9));
        assert_eq!(store.items(), &[1, 2, 0, 3]);
    }

    #[test]
    fn test_physical_index_resolution() {
        let mut store = store_of(4);
        store.set_items(vec![3, 1]);
        assert_eq!(store.physical_index(0), Some(3));
        assert_eq!(store.physical_index(2), None);
        assert_eq!(store.display_position(1), Some(1));
    }
}
