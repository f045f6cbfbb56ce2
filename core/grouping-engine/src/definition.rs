//! FILENAME: core/grouping-engine/src/definition.rs
//! Grouping Definition - The serializable configuration.
//!
//! This module describes WHAT grouping the host asked for. It is designed to be:
//! - Serializable (sent over the host bridge as JSON)
//! - An immutable snapshot of user intent; runtime state lives in the store

use serde::{Deserialize, Serialize};

use crate::builder::{BuildOptions, FieldKey};
use crate::error::GroupingError;
use crate::memory::ExpansionMemory;

fn default_expanded() -> bool {
    true
}

/// Grouping configuration passed to `apply_grouping`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingConfig {
    /// Ordered grouping fields, most significant first.
    /// Empty means grouping is disabled.
    #[serde(default)]
    pub grouping_key_fields: Vec<String>,

    /// Initial state of newly created group headers.
    #[serde(default = "default_expanded")]
    pub expanded_by_default: bool,

    /// Labels of groups that start collapsed even when `expanded_by_default`
    /// is true.
    #[serde(default)]
    pub collapsed_items: Vec<String>,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        GroupingConfig {
            grouping_key_fields: Vec::new(),
            expanded_by_default: true,
            collapsed_items: Vec::new(),
        }
    }
}

impl GroupingConfig {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GroupingConfig {
            grouping_key_fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Parse a configuration sent by the host.
    pub fn from_json(json: &str) -> Result<Self, GroupingError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Grouping is active only when at least one non-blank key field is set.
    pub fn is_active(&self) -> bool {
        self.grouping_key_fields.iter().any(|f| !f.trim().is_empty())
    }

    /// One extractor per configured field, blank fields skipped.
    pub fn key_extractors(&self) -> Vec<FieldKey> {
        self.grouping_key_fields
            .iter()
            .filter(|f| !f.trim().is_empty())
            .map(|f| FieldKey::new(f.clone()))
            .collect()
    }

    /// Builder options seeded from this configuration's expansion policy.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            previous_expansion: ExpansionMemory::new(),
            default_expanded: self.expanded_by_default,
            collapsed_labels: self.collapsed_items.clone(),
        }
    }
}
