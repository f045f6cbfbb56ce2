//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for grouping engine integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use grouping_engine::{GroupingConfig, GroupingCoordinator, GroupingEvent, GROUPING_NAMESPACE};
use row_store::{Column, ColumnArea, DataRow, FieldValue, GridStore, GroupHeader, Record};

/// Test harness owning a store, a coordinator and the events it emitted.
pub struct TestHarness {
    pub store: GridStore,
    pub coordinator: GroupingCoordinator,
    pub events: Rc<RefCell<Vec<GroupingEvent>>>,
}

impl TestHarness {
    /// Create a harness with an empty store and the default data columns.
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Create a harness whose store holds `rows` in order.
    pub fn with_rows(rows: Vec<DataRow>) -> Self {
        let mut store = GridStore::with_records(rows.into_iter().map(Record::Data).collect());
        store.columns.set_columns(
            ColumnArea::Data,
            vec![Column::new("region", "Region"), Column::new("v", "Value")],
        );

        let mut coordinator = GroupingCoordinator::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        coordinator.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        TestHarness {
            store,
            coordinator,
            events,
        }
    }

    /// The three-row region dataset, not grouped yet.
    pub fn with_region_rows() -> Self {
        Self::with_rows(region_rows())
    }

    /// The three-row region dataset grouped by region.
    pub fn grouped_by_region() -> Self {
        let mut harness = Self::with_region_rows();
        harness.apply(&["region"]);
        harness
    }

    /// The nested sales dataset grouped by region, then city.
    pub fn grouped_by_region_and_city() -> Self {
        let mut harness = Self::with_rows(sales_rows());
        harness.apply(&["region", "city"]);
        harness
    }

    pub fn apply(&mut self, fields: &[&str]) {
        self.coordinator
            .apply_grouping(&mut self.store, GroupingConfig::new(fields.iter().copied()));
    }

    /// Toggle the header at a physical index through its display position.
    pub fn toggle_physical(&mut self, physical: usize) -> bool {
        let position = self
            .store
            .rows
            .display_position(physical)
            .expect("row is displayed");
        self.coordinator.on_expand_toggle(&mut self.store, position)
    }

    /// Host-side sort of the data rows by a numeric field, followed by the
    /// after-sort trigger. Stale headers are left in front for the engine
    /// to snapshot and drop.
    pub fn sort_by_number(&mut self, field: &str, descending: bool) {
        let records = self.store.rows.take_source();
        let (headers, mut rows): (Vec<Record>, Vec<Record>) =
            records.into_iter().partition(Record::is_group);

        rows.sort_by(|a, b| {
            let order = number(a, field)
                .partial_cmp(&number(b, field))
                .unwrap_or(Ordering::Equal);
            if descending {
                order.reverse()
            } else {
                order
            }
        });

        let mut sorted = headers;
        sorted.extend(rows);
        self.store.rows.replace_source(sorted);
        self.coordinator.on_after_sort(&mut self.store);
    }

    pub fn header(&self, physical: usize) -> &GroupHeader {
        self.store
            .rows
            .record(physical)
            .and_then(Record::as_group)
            .unwrap_or_else(|| panic!("record {} is not a group header", physical))
    }

    /// Physical indices hidden under the grouping namespace.
    pub fn hidden(&self) -> Vec<usize> {
        self.store
            .rows
            .trimmed(GROUPING_NAMESPACE)
            .map(|map| map.iter().filter(|(_, h)| **h).map(|(i, _)| *i).collect())
            .unwrap_or_default()
    }

    pub fn items(&self) -> Vec<usize> {
        self.store.rows.items().to_vec()
    }

    pub fn take_events(&self) -> Vec<GroupingEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Every column flagged as grouping indicator, across all areas.
    pub fn indicator_columns(&self) -> Vec<(ColumnArea, String)> {
        self.store
            .columns
            .all_columns()
            .filter(|(_, column)| column.grouping_indicator)
            .map(|(area, column)| (area, column.prop.clone()))
            .collect()
    }
}

pub fn region_row(region: &str, v: f64) -> DataRow {
    DataRow::new().with("region", region).with("v", v)
}

/// `[{region:E,v:1},{region:E,v:2},{region:W,v:3}]`
pub fn region_rows() -> Vec<DataRow> {
    vec![region_row("E", 1.0), region_row("E", 2.0), region_row("W", 3.0)]
}

/// Grouped by region, city this becomes
/// `[E(0), a(1), r(2), r(3), b(4), r(5), W(6), a(7), r(8)]`.
pub fn sales_rows() -> Vec<DataRow> {
    vec![
        DataRow::new().with("region", "E").with("city", "a").with("v", 1.0),
        DataRow::new().with("region", "E").with("city", "a").with("v", 2.0),
        DataRow::new().with("region", "E").with("city", "b").with("v", 3.0),
        DataRow::new().with("region", "W").with("city", "a").with("v", 4.0),
    ]
}

fn number(record: &Record, field: &str) -> f64 {
    match record.as_data().and_then(|row| row.get(field)) {
        Some(FieldValue::Number(n)) => *n,
        _ => f64::NAN,
    }
}
