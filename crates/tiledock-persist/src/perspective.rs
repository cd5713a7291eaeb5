//! Persisted perspective schema v1.
//!
//! # Schema Versioning Policy
//!
//! - Breaking field or semantic changes bump [`PERSPECTIVE_SCHEMA_VERSION`]
//!   and require a migration path.
//! - Every serialized perspective carries its version; loaders reject
//!   unknown versions instead of guessing.
//!
//! Selection fields (which stack tab is front-most) legitimately differ
//! across a save/restore cycle: comparisons that decide dirtiness go
//! through [`WorkbenchSnapshot::equals_ignoring_selection`], never `==`.

use serde::{Deserialize, Serialize};
use tiledock_layout::config::{ConfigNode, are_states_equal_ignoring_selection, state_fingerprint};

/// Current perspective schema version.
pub const PERSPECTIVE_SCHEMA_VERSION: u16 = 1;

/// Serializable capture of the workbench content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkbenchSnapshot {
    /// Root content list of the layout tree.
    pub content: Vec<ConfigNode>,
    /// Whether panels restored from this snapshot may be closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_closable: Option<bool>,
}

impl WorkbenchSnapshot {
    /// Wrap a content list.
    #[must_use]
    pub fn new(content: Vec<ConfigNode>) -> Self {
        Self {
            content,
            is_closable: None,
        }
    }

    /// Structural equality that ignores which stack tab is active at every
    /// depth. Any non-selection difference compares unequal.
    #[must_use]
    pub fn equals_ignoring_selection(&self, other: &Self) -> bool {
        self.is_closable == other.is_closable
            && are_states_equal_ignoring_selection(&self.content, &other.content)
    }

    /// Selection-insensitive fingerprint; agrees with
    /// [`Self::equals_ignoring_selection`].
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        state_fingerprint(&self.content)
    }
}

/// A named, persisted panel arrangement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perspective {
    /// Schema version for migration detection.
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    /// Stable identifier, unique within a store.
    pub id: String,
    /// Display name shown on the perspective bar.
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// The captured arrangement.
    pub state: WorkbenchSnapshot,
}

fn default_schema_version() -> u16 {
    PERSPECTIVE_SCHEMA_VERSION
}

impl Perspective {
    /// Build a v1 perspective.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, state: WorkbenchSnapshot) -> Self {
        Self {
            schema_version: PERSPECTIVE_SCHEMA_VERSION,
            id: id.into(),
            label: label.into(),
            icon: None,
            color: None,
            state,
        }
    }
}
