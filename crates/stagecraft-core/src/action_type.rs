//! Action-type identifiers and the registry that maps stage types onto them.
//!
//! The deployment engine resolves the integration behind an action from a
//! four-field identifier (category, owner, version, provider). Users write a
//! short stage type such as `CodeCommit`; the registry turns it into the full
//! identifier.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category of an action as understood by the deployment engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionCategory {
    Source,
    Build,
    Test,
    Deploy,
    Approval,
    Invoke,
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionCategory::Source => write!(f, "Source"),
            ActionCategory::Build => write!(f, "Build"),
            ActionCategory::Test => write!(f, "Test"),
            ActionCategory::Deploy => write!(f, "Deploy"),
            ActionCategory::Approval => write!(f, "Approval"),
            ActionCategory::Invoke => write!(f, "Invoke"),
        }
    }
}

/// Who provides the integration behind an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionOwner {
    #[serde(rename = "AWS")]
    Aws,
    ThirdParty,
    Custom,
}

/// Fully-qualified action type identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionTypeId {
    pub category: ActionCategory,
    pub owner: ActionOwner,
    pub version: u32,
    pub provider: String,
}

impl ActionTypeId {
    pub fn new(
        category: ActionCategory,
        owner: ActionOwner,
        version: u32,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            owner,
            version,
            provider: provider.into(),
        }
    }

    /// Create an identifier for a first-party (AWS-owned) provider.
    pub fn aws(category: ActionCategory, version: u32, provider: impl Into<String>) -> Self {
        Self::new(category, ActionOwner::Aws, version, provider)
    }
}

/// Read-only mapping from stage type name to [`ActionTypeId`].
///
/// The key set is the closed set of stage types the pipeline schema accepts.
/// The registry is built once per process and shared by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTypeRegistry {
    entries: BTreeMap<String, ActionTypeId>,
}

impl ActionTypeRegistry {
    /// Create an empty registry.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The stage types supported out of the box.
    pub fn builtin() -> Self {
        Self::empty()
            .with_entry(
                "CodeCommit",
                ActionTypeId::aws(ActionCategory::Source, 1, "CodeCommit"),
            )
            .with_entry("S3", ActionTypeId::aws(ActionCategory::Source, 1, "S3"))
            .with_entry(
                "Lambda",
                ActionTypeId::aws(ActionCategory::Invoke, 1, "Lambda"),
            )
    }

    /// Add (or replace) an entry.
    pub fn with_entry(mut self, stage_type: impl Into<String>, id: ActionTypeId) -> Self {
        self.entries.insert(stage_type.into(), id);
        self
    }

    /// Remove an entry, if present.
    pub fn without_entry(mut self, stage_type: &str) -> Self {
        self.entries.remove(stage_type);
        self
    }

    /// Look up the identifier for a stage type.
    pub fn get(&self, stage_type: &str) -> Option<&ActionTypeId> {
        self.entries.get(stage_type)
    }

    pub fn contains(&self, stage_type: &str) -> bool {
        self.entries.contains_key(stage_type)
    }

    /// Stage type names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ActionTypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
