//! FILENAME: core/grouping-engine/src/controller.rs
//! PURPOSE: Incremental expand/collapse of a single group header.
//! CONTEXT: Both transitions are pure. They read the source sequence and
//! return a `ToggleOutcome` (new flag, hidden-map patch, rows to re-insert into
//! the virtual order, focus signal); the coordinator applies it to the store.

use std::ops::Range;

use rustc_hash::FxHashSet;

use row_store::{GroupHeader, Record, TrimmedMap};

use crate::error::{GroupingError, GroupingResult};

/// Changes produced by one expand or collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// Physical index of the toggled header.
    pub header: usize,
    /// New expanded flag of the header.
    pub expanded: bool,
    /// Grouping namespace patch: `true` hides, `false` unhides.
    pub hidden_patch: TrimmedMap,
    /// Revealed rows missing from the virtual order, in physical order.
    /// They go right after the header's display position.
    pub inserted_items: Vec<usize>,
    /// The focused row is being hidden and focus must be cleared.
    pub clear_focus: bool,
}

fn group_at(source: &[Record], index: usize) -> GroupingResult<&GroupHeader> {
    source
        .get(index)
        .and_then(Record::as_group)
        .ok_or(GroupingError::NotAGroupHeader(index))
}

/// Physical range of every row beneath the header at `index`.
pub fn descendants(index: usize, header: &GroupHeader, len: usize) -> Range<usize> {
    let start = index + 1;
    start..header.end.min(len).max(start)
}

/// Whether some enclosing header is collapsed.
pub fn is_concealed(header: &GroupHeader, source: &[Record]) -> bool {
    let mut current = header.parent;
    let mut bound = source.len();
    while let Some(index) = current {
        // Parents always precede their children
        if index >= bound {
            break;
        }
        match source.get(index).and_then(Record::as_group) {
            Some(parent) if !parent.expanded => return true,
            Some(parent) => {
                bound = index;
                current = parent.parent;
            }
            None => break,
        }
    }
    false
}

/// Collapse the header at `index`: hide every descendant regardless of the
/// descendants' own flags.
pub fn collapse(
    index: usize,
    source: &[Record],
    focused: Option<usize>,
) -> GroupingResult<ToggleOutcome> {
    let header = group_at(source, index)?;
    let span = descendants(index, header, source.len());

    Ok(ToggleOutcome {
        header: index,
        expanded: false,
        hidden_patch: span.clone().map(|physical| (physical, true)).collect(),
        inserted_items: Vec::new(),
        clear_focus: focused.is_some_and(|f| span.contains(&f)),
    })
}

/// Expand the header at `index`: unhide its direct children. Below them,
/// collapsed subgroups keep their rows hidden while expanded subgroups show
/// theirs again. A header concealed by a collapsed ancestor only flips its flag.
pub fn expand(index: usize, source: &[Record], items: &[usize]) -> GroupingResult<ToggleOutcome> {
    let header = group_at(source, index)?;
    let mut outcome = ToggleOutcome {
        header: index,
        expanded: true,
        ..ToggleOutcome::default()
    };

    if is_concealed(header, source) {
        return Ok(outcome);
    }

    let mut revealed = Vec::new();
    reveal(source, header, &mut revealed);

    let present: FxHashSet<usize> = items.iter().copied().collect();
    for physical in revealed {
        outcome.hidden_patch.insert(physical, false);
        if !present.contains(&physical) {
            outcome.inserted_items.push(physical);
        }
    }

    Ok(outcome)
}

fn reveal(source: &[Record], header: &GroupHeader, revealed: &mut Vec<usize>) {
    for &child in &header.children {
        revealed.push(child);
        if let Some(Record::Group(subgroup)) = source.get(child) {
            if subgroup.expanded {
                reveal(source, subgroup, revealed);
            }
        }
    }
}
