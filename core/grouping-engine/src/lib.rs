//! FILENAME: core/grouping-engine/src/lib.rs
//! Row grouping engine.
//!
//! Turns a flat sequence of data rows into a sequence interleaved with
//! synthetic group headers, tracks which rows are hidden because their group
//! is collapsed, and expands/collapses groups incrementally. It depends on
//! `row-store` for the records and the store handle it is given on every call.
//!
//! Layers:
//! - `definition`: Serializable configuration (what grouping the host asked for)
//! - `builder`: Full rebuild of the grouped sequence (pure)
//! - `controller`: Incremental expand/collapse of one header (pure)
//! - `coordinator`: Decides rebuild vs. patch and applies results to the store

pub mod builder;
pub mod controller;
pub mod coordinator;
pub mod definition;
pub mod error;
pub mod events;
pub mod logging;
pub mod memory;

/// Trimmed-map namespace owned by the grouping engine.
pub const GROUPING_NAMESPACE: &str = "grouping";

pub use builder::{
    build, group_path, hidden_rows, BuildOptions, FieldKey, GroupPath, GroupedSequence,
    KeyExtractor,
};
pub use controller::{collapse, expand, ToggleOutcome};
pub use coordinator::{GroupingCoordinator, OutlineRow};
pub use definition::GroupingConfig;
pub use error::{GroupingError, GroupingResult};
pub use events::{EventBus, GroupingEvent, SubscriptionId};
pub use memory::ExpansionMemory;
