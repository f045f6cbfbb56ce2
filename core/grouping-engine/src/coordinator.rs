//! FILENAME: core/grouping-engine/src/coordinator.rs
//! Grouping Coordinator - decides when to rebuild and when to patch.
//!
//! Full rebuilds happen on new data, after a sort and when grouping keys are
//! (re-)applied. Expand/collapse, focus, reorder and filter triggers are handled
//! incrementally. Every call receives the store handle explicitly; the
//! coordinator writes only the `"grouping"` trimmed namespace, the group
//! headers' expanded flags, the virtual order and the indicator column flag.
//!
//! While disabled, trigger calls are ignored (host API calls still work and
//! run with triggers disabled while they reconfigure).

use serde::Serialize;

use row_store::{
    strip_group_headers, ColumnArea, DataRow, GridStore, Record, TrimmedMap,
};

use crate::builder::{self, BuildOptions};
use crate::controller::{self, ToggleOutcome};
use crate::definition::GroupingConfig;
use crate::error::{GroupingError, GroupingResult};
use crate::events::{EventBus, GroupingEvent, SubscriptionId};
use crate::memory::ExpansionMemory;
use crate::GROUPING_NAMESPACE;

/// Log category for the grouping engine.
const CAT: &str = "GROUP";

/// Per displayed row information a renderer needs for indentation and toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineRow {
    pub position: usize,
    pub physical: usize,
    /// Header depth, or the enclosing header's depth + 1 for data rows.
    pub depth: usize,
    pub is_group: bool,
    pub expanded: bool,
}

#[derive(Debug)]
pub struct GroupingCoordinator {
    config: GroupingConfig,
    enabled: bool,
    depth: usize,
    events: EventBus,
}

impl Default for GroupingCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupingCoordinator {
    pub fn new() -> Self {
        GroupingCoordinator {
            config: GroupingConfig::default(),
            enabled: true,
            depth: 0,
            events: EventBus::new(),
        }
    }

    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    /// Grouping keys are configured.
    pub fn is_active(&self) -> bool {
        self.config.is_active()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable trigger handling.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Depth of the current grouping (0 when inactive).
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GroupingEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    fn triggers_live(&self) -> bool {
        self.enabled && self.config.is_active()
    }

    // ========================================================================
    // HOST API
    // ========================================================================

    /// Apply a grouping configuration. Empty keys clear grouping.
    pub fn apply_grouping(&mut self, store: &mut GridStore, config: GroupingConfig) {
        crate::log_enter_info!(CAT, "apply_grouping", "keys={:?}", config.grouping_key_fields);

        if !config.is_active() {
            self.clear_grouping(store);
            crate::log_exit_info!(CAT, "apply_grouping", "cleared");
            return;
        }

        let was_enabled = std::mem::replace(&mut self.enabled, false);

        self.config = config;
        let rows = strip_group_headers(store.rows.take_source());
        let options = self.config.build_options();
        self.rebuild(store, rows, &options);
        self.mark_indicator_column(store, true);

        self.enabled = was_enabled;
        crate::log_exit_info!(CAT, "apply_grouping", "depth={}", self.depth);
    }

    /// Turn grouping off: drop headers, the grouping namespace and the
    /// indicator flag.
    pub fn clear_grouping(&mut self, store: &mut GridStore) {
        crate::log_enter_info!(CAT, "clear_grouping");
        let was_enabled = std::mem::replace(&mut self.enabled, false);

        self.config = GroupingConfig::default();

        let had_headers = store.rows.source().iter().any(Record::is_group);
        let had_namespace = store.rows.clear_trimmed(GROUPING_NAMESPACE).is_some();
        if had_headers {
            let rows = strip_group_headers(store.rows.take_source());
            store.rows.replace_source(into_records(rows));
        } else if had_namespace {
            store.rows.reset_items();
        }

        self.mark_indicator_column(store, false);
        self.depth = 0;
        self.events.publish(&GroupingEvent::DepthChanged { depth: 0 });
        self.publish_trimmed();

        self.enabled = was_enabled;
        crate::log_exit_info!(CAT, "clear_grouping");
    }

    /// Toggle the header at a physical index.
    pub fn toggle_group(&mut self, store: &mut GridStore, physical: usize) -> GroupingResult<()> {
        let expanded = match store.rows.record(physical) {
            Some(Record::Group(header)) => header.expanded,
            _ => return Err(GroupingError::NotAGroupHeader(physical)),
        };

        let outcome = if expanded {
            controller::collapse(physical, store.rows.source(), store.rows.focused())?
        } else {
            controller::expand(physical, store.rows.source(), store.rows.items())?
        };

        crate::log_debug!(
            CAT,
            "toggle row={} expanded={} patch={} inserted={}",
            physical,
            outcome.expanded,
            outcome.hidden_patch.len(),
            outcome.inserted_items.len()
        );
        self.apply_outcome(store, outcome);
        Ok(())
    }

    pub fn expand_all(&mut self, store: &mut GridStore) {
        self.set_all_expanded(store, true);
    }

    pub fn collapse_all(&mut self, store: &mut GridStore) {
        self.set_all_expanded(store, false);
    }

    /// Current `{group value -> expanded}` state of the store's headers.
    pub fn expansion_memory(&self, store: &GridStore) -> ExpansionMemory {
        ExpansionMemory::snapshot(store.rows.source())
    }

    /// Outline information for every displayed row, in display order.
    pub fn outline(&self, store: &GridStore) -> Vec<OutlineRow> {
        let source = store.rows.source();
        let mut row_depth = vec![0usize; source.len()];
        for header in source.iter().filter_map(Record::as_group) {
            for &child in &header.children {
                if let Some(depth) = row_depth.get_mut(child) {
                    *depth = header.depth + 1;
                }
            }
        }

        store
            .rows
            .items()
            .iter()
            .enumerate()
            .filter_map(|(position, &physical)| {
                let row = match source.get(physical)? {
                    Record::Group(header) => OutlineRow {
                        position,
                        physical,
                        depth: header.depth,
                        is_group: true,
                        expanded: header.expanded,
                    },
                    Record::Data(_) => OutlineRow {
                        position,
                        physical,
                        depth: row_depth[physical],
                        is_group: false,
                        expanded: false,
                    },
                };
                Some(row)
            })
            .collect()
    }

    // ========================================================================
    // TRIGGERS
    // ========================================================================

    /// New data source accepted by the host.
    /// While disabled the records are installed unchanged; hidden flags and
    /// depth from the previous data are dropped since their indices no longer
    /// apply.
    pub fn on_data_source(&mut self, store: &mut GridStore, records: Vec<Record>) {
        if !self.enabled {
            store.rows.clear_trimmed(GROUPING_NAMESPACE);
            self.depth = 0;
            self.events.publish(&GroupingEvent::DepthChanged { depth: 0 });
            self.publish_trimmed();
            store.rows.replace_source(records);
            return;
        }

        let rows = strip_group_headers(records);
        if !self.config.is_active() {
            store.rows.replace_source(into_records(rows));
            return;
        }

        let options = self.config.build_options();
        self.rebuild(store, rows, &options);
    }

    /// The host finished sorting the data rows of the source.
    pub fn on_after_sort(&mut self, store: &mut GridStore) {
        if !self.triggers_live() {
            return;
        }

        // Snapshot before the headers are dropped
        let memory = ExpansionMemory::snapshot(store.rows.source());
        let rows = strip_group_headers(store.rows.take_source());
        let options = self.config.build_options().with_memory(memory);
        self.rebuild(store, rows, &options);
    }

    /// The host replaced the column definitions.
    pub fn on_columns_replaced(&mut self, store: &mut GridStore) {
        if self.triggers_live() {
            self.mark_indicator_column(store, true);
        }
    }

    /// Expand/collapse toggle clicked at a display position.
    /// Returns whether anything changed.
    pub fn on_expand_toggle(&mut self, store: &mut GridStore, position: usize) -> bool {
        if !self.triggers_live() {
            return false;
        }

        let result = store
            .rows
            .physical_index(position)
            .ok_or(GroupingError::PositionOutOfRange(position))
            .and_then(|physical| self.toggle_group(store, physical));

        match result {
            Ok(()) => true,
            Err(e) => {
                crate::log_warn!(CAT, "expand toggle ignored: {}", e);
                false
            }
        }
    }

    /// Returns false when the focus must be prevented.
    pub fn on_before_cell_focus(&self, store: &GridStore, position: usize) -> bool {
        if !self.enabled {
            return true;
        }

        let is_group = store
            .rows
            .physical_index(position)
            .and_then(|physical| store.rows.record(physical))
            .is_some_and(Record::is_group);
        if is_group {
            crate::log_debug!(CAT, "focus rejected on group header at position {}", position);
        }
        !is_group
    }

    /// Move the row at display position `from` to `to`. The whole move is
    /// rejected if any row of the span between them, ends included, is a
    /// group header. Returns whether the move happened.
    ///
    /// While disabled only the header check is skipped: the move belongs to
    /// the host, so it still goes through like an ungrouped grid.
    pub fn on_row_reorder(&self, store: &mut GridStore, from: usize, to: usize) -> bool {
        let (start, end) = (from.min(to), from.max(to));
        if end >= store.rows.items().len() {
            crate::log_warn!(CAT, "reorder ignored: {}", GroupingError::PositionOutOfRange(end));
            return false;
        }

        if self.enabled {
            let spans_header = (start..=end)
                .filter_map(|position| store.rows.physical_index(position))
                .any(|physical| store.rows.record(physical).is_some_and(Record::is_group));
            if spans_header {
                crate::log_debug!(CAT, "reorder {}->{} rejected: spans a group header", from, to);
                return false;
            }
        }

        store.rows.move_item(from, to)
    }

    /// A filter is about to publish its trimmed map: group headers always stay
    /// visible to filters.
    pub fn on_before_filter_apply(&self, store: &GridStore, pending: &mut TrimmedMap) {
        if !self.enabled {
            return;
        }
        for (physical, record) in store.rows.source().iter().enumerate() {
            if record.is_group() {
                pending.insert(physical, false);
            }
        }
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn rebuild(&mut self, store: &mut GridStore, rows: Vec<DataRow>, options: &BuildOptions) {
        crate::log_enter!(CAT, "rebuild", "rows={}", rows.len());

        let keys = self.config.key_extractors();
        let grouped = builder::build(rows, &keys, options);
        let record_count = grouped.records.len();
        let hidden_count = grouped.hidden.len();
        let depth = grouped.depth;

        store.rows.set_trimmed(GROUPING_NAMESPACE, grouped.hidden);
        store.rows.replace_source(grouped.records);

        self.depth = depth;
        self.events.publish(&GroupingEvent::DepthChanged { depth });
        self.publish_trimmed();

        crate::log_exit!(
            CAT,
            "rebuild",
            "records={} depth={} hidden={}",
            record_count,
            depth,
            hidden_count
        );
    }

    fn apply_outcome(&mut self, store: &mut GridStore, outcome: ToggleOutcome) {
        store.rows.set_group_expanded(outcome.header, outcome.expanded);
        store.rows.apply_trim_patch(GROUPING_NAMESPACE, &outcome.hidden_patch);
        if !outcome.inserted_items.is_empty() {
            store.rows.insert_items_after(outcome.header, &outcome.inserted_items);
        }
        if outcome.clear_focus {
            store.rows.clear_focus();
        }
        self.publish_trimmed();
    }

    fn set_all_expanded(&mut self, store: &mut GridStore, expanded: bool) {
        if !self.config.is_active() {
            return;
        }

        let changed = store.rows.set_all_groups_expanded(expanded);
        store
            .rows
            .set_trimmed(GROUPING_NAMESPACE, builder::hidden_rows(store.rows.source()));
        store.rows.reset_items();
        if let Some(focused) = store.rows.focused() {
            if store.rows.is_hidden(focused) {
                store.rows.clear_focus();
            }
        }

        crate::log_info!(CAT, "set all groups expanded={} changed={}", expanded, changed);
        self.publish_trimmed();
    }

    /// Flag the first column of the first non-empty area (or none when
    /// `flag` is false) and clear the flag everywhere else.
    fn mark_indicator_column(&self, store: &mut GridStore, flag: bool) {
        let target = if flag {
            ColumnArea::PRIORITY
                .into_iter()
                .find(|area| !store.columns.columns(*area).is_empty())
        } else {
            None
        };

        for area in ColumnArea::PRIORITY {
            let mut touched = false;
            for (index, column) in store.columns.columns_mut(area).iter_mut().enumerate() {
                let indicator = target == Some(area) && index == 0;
                if column.grouping_indicator != indicator {
                    column.grouping_indicator = indicator;
                    touched = true;
                }
            }
            if touched {
                store.columns.refresh(area);
            }
        }
    }

    fn publish_trimmed(&mut self) {
        self.events.publish(&GroupingEvent::TrimmedChanged {
            namespace: GROUPING_NAMESPACE.to_string(),
        });
    }
}

fn into_records(rows: Vec<DataRow>) -> Vec<Record> {
    rows.into_iter().map(Record::Data).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use row_store::{Column, GroupValue};

    fn grid() -> GridStore {
        let rows = [("E", 1.0), ("E", 2.0), ("W", 3.0)]
            .into_iter()
            .map(|(region, v)| Record::Data(DataRow::new().with("region", region).with("v", v)))
            .collect();
        GridStore::with_records(rows)
    }

    #[test]
    fn test_toggle_twice_round_trips() {
        let mut store = grid();
        let mut coordinator = GroupingCoordinator::new();
        coordinator.apply_grouping(&mut store, GroupingConfig::new(["region"]));

        assert!(coordinator.on_expand_toggle(&mut store, 0));
        assert_eq!(store.rows.items(), &[0, 3, 4]);
        assert!(coordinator.on_expand_toggle(&mut store, 0));
        assert_eq!(store.rows.items(), &[0, 1, 2, 3, 4]);
        assert!(store.rows.trimmed(GROUPING_NAMESPACE).map_or(true, |m| m.is_empty()));
    }

    #[test]
    fn test_toggle_on_data_row_is_noop() {
        let mut store = grid();
        let mut coordinator = GroupingCoordinator::new();
        coordinator.apply_grouping(&mut store, GroupingConfig::new(["region"]));
        let before = store.rows.source().to_vec();

        assert!(!coordinator.on_expand_toggle(&mut store, 1));
        assert!(!coordinator.on_expand_toggle(&mut store, 42));
        assert_eq!(store.rows.source(), before.as_slice());
    }

    #[test]
    fn test_disabled_coordinator_ignores_triggers() {
        let mut store = grid();
        let mut coordinator = GroupingCoordinator::new();
        coordinator.apply_grouping(&mut store, GroupingConfig::new(["region"]));
        coordinator.set_enabled(false);

        assert!(!coordinator.on_expand_toggle(&mut store, 0));
        assert!(coordinator.on_before_cell_focus(&store, 0));
        assert!(coordinator.is_active());
    }

    #[test]
    fn test_outline_depths() {
        let mut store = grid();
        let mut coordinator = GroupingCoordinator::new();
        coordinator.apply_grouping(&mut store, GroupingConfig::new(["region"]));

        let outline = coordinator.outline(&store);
        let depths: Vec<(usize, bool)> = outline.iter().map(|r| (r.depth, r.is_group)).collect();
        assert_eq!(
            depths,
            vec![(0, true), (1, false), (1, false), (0, true), (1, false)]
        );
    }

    #[test]
    fn test_indicator_moves_to_first_non_empty_area() {
        let mut store = grid();
        store.columns.set_columns(ColumnArea::Data, vec![Column::new("region", "Region")]);
        let mut coordinator = GroupingCoordinator::new();
        coordinator.apply_grouping(&mut store, GroupingConfig::new(["region"]));
        assert!(store.columns.columns(ColumnArea::Data)[0].grouping_indicator);

        store.columns.set_columns(ColumnArea::RowHeaders, vec![Column::new("id", "#")]);
        coordinator.on_columns_replaced(&mut store);

        assert!(store.columns.columns(ColumnArea::RowHeaders)[0].grouping_indicator);
        assert!(!store.columns.columns(ColumnArea::Data)[0].grouping_indicator);
    }

    #[test]
    fn test_expansion_memory_reflects_toggles() {
        let mut store = grid();
        let mut coordinator = GroupingCoordinator::new();
        coordinator.apply_grouping(&mut store, GroupingConfig::new(["region"]));
        coordinator.toggle_group(&mut store, 3).unwrap();

        let memory = coordinator.expansion_memory(&store);
        assert_eq!(memory.get(&GroupValue::text("W")), Some(false));
        assert_eq!(memory.get(&GroupValue::text("E")), Some(true));
    }
}
