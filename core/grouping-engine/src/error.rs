//! FILENAME: core/grouping-engine/src/error.rs
//! PURPOSE: Error type shared by the grouping engine.
//! CONTEXT: Triggers log and drop these; only the host API returns them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GroupingError {
    #[error("Invalid grouping configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Row {0} is not a group header")]
    NotAGroupHeader(usize),

    #[error("Display position {0} is out of range")]
    PositionOutOfRange(usize),
}

pub type GroupingResult<T> = Result<T, GroupingError>;
