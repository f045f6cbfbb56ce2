//! FILENAME: core/row-store/src/lib.rs
//! PURPOSE: Main library entry point for the row and column stores.
//! CONTEXT: Re-exports public types and modules for use by the grouping engine
//! and by hosts embedding it.

pub mod column_store;
pub mod group_value;
pub mod record;
pub mod row_store;

// Re-export commonly used types at the crate root
pub use column_store::{Column, ColumnArea, ColumnStore};
pub use group_value::{GroupValue, OrderedFloat};
pub use record::{strip_group_headers, DataRow, FieldValue, GroupHeader, Record};
pub use row_store::{RowStore, TrimmedMap};

/// The store handle passed into every grouping engine call.
#[derive(Debug, Clone, Default)]
pub struct GridStore {
    pub rows: RowStore,
    pub columns: ColumnStore,
}

impl GridStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        GridStore {
            rows: RowStore::with_records(records),
            columns: ColumnStore::new(),
        }
    }
}
