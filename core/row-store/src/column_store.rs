//! FILENAME: core/row-store/src/column_store.rs
//! PURPOSE: Column definitions split by pinning area.
//! CONTEXT: The grouping engine flags one column as the grouping indicator
//! (where the renderer draws expand/collapse toggles). Every mutation of an
//! area's columns must be followed by `refresh(area)` so the host re-renders it.

use serde::{Deserialize, Serialize};

/// Column areas, in the priority order used to pick the grouping indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnArea {
    /// Row headers / columns pinned at the start.
    RowHeaders,
    /// Regular scrolling data columns.
    Data,
    /// Columns pinned at the end.
    PinnedEnd,
}

impl ColumnArea {
    /// All areas, in indicator priority order.
    pub const PRIORITY: [ColumnArea; 3] =
        [ColumnArea::RowHeaders, ColumnArea::Data, ColumnArea::PinnedEnd];

    fn slot(self) -> usize {
        match self {
            ColumnArea::RowHeaders => 0,
            ColumnArea::Data => 1,
            ColumnArea::PinnedEnd => 2,
        }
    }
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Field of the data row rendered in this column.
    pub prop: String,
    /// Header label.
    pub name: String,
    /// Whether this column renders the group expand/collapse toggle.
    #[serde(default)]
    pub grouping_indicator: bool,
}

impl Column {
    pub fn new(prop: impl Into<String>, name: impl Into<String>) -> Self {
        Column {
            prop: prop.into(),
            name: name.into(),
            grouping_indicator: false,
        }
    }
}

/// Column store: one column list per area plus a refresh revision per area.
#[derive(Debug, Clone, Default)]
pub struct ColumnStore {
    areas: [Vec<Column>; 3],
    revisions: [u64; 3],
}

impl ColumnStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self, area: ColumnArea) -> &[Column] {
        &self.areas[area.slot()]
    }

    pub fn columns_mut(&mut self, area: ColumnArea) -> &mut Vec<Column> {
        &mut self.areas[area.slot()]
    }

    /// Replaces the columns of one area and refreshes it.
    pub fn set_columns(&mut self, area: ColumnArea, columns: Vec<Column>) {
        self.areas[area.slot()] = columns;
        self.refresh(area);
    }

    /// Notifies the host that an area's columns changed.
    pub fn refresh(&mut self, area: ColumnArea) {
        self.revisions[area.slot()] += 1;
    }

    /// Number of refreshes an area has received.
    pub fn revision(&self, area: ColumnArea) -> u64 {
        self.revisions[area.slot()]
    }

    /// Iterates every column of every area, in priority order.
    pub fn all_columns(&self) -> impl Iterator<Item = (ColumnArea, &Column)> {
        ColumnArea::PRIORITY
            .into_iter()
            .flat_map(move |area| self.columns(area).iter().map(move |c| (area, c)))
    }
}
