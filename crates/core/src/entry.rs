//! Copy-values entries: one `from_key -> to_key` mapping rule each.

use serde::{Deserialize, Serialize};

use crate::validation::FieldViolation;

/// One field-mapping rule owned by a copy-values processor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub from_key: String,
    pub to_key: String,
    #[serde(default)]
    pub overwrite_if_exists: bool,
    /// Optional conditional expression. Empty means "always copy".
    #[serde(default)]
    pub copy_when: String,
}

/// A single-field edit applied to an [`Entry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum EntryUpdate {
    FromKey(String),
    ToKey(String),
    OverwriteIfExists(bool),
    CopyWhen(String),
}

impl EntryUpdate {
    /// Wire name of the field this update touches.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::FromKey(_) => "from_key",
            Self::ToKey(_) => "to_key",
            Self::OverwriteIfExists(_) => "overwrite_if_exists",
            Self::CopyWhen(_) => "copy_when",
        }
    }
}

impl Entry {
    /// Return a copy of this entry with exactly one field replaced.
    pub fn with_update(&self, update: EntryUpdate) -> Self {
        let mut next = self.clone();
        match update {
            EntryUpdate::FromKey(v) => next.from_key = v,
            EntryUpdate::ToKey(v) => next.to_key = v,
            EntryUpdate::OverwriteIfExists(v) => next.overwrite_if_exists = v,
            EntryUpdate::CopyWhen(v) => next.copy_when = v,
        }
        next
    }

    /// Collect the structural problems of this entry.
    ///
    /// `prefix` locates the entry in the enclosing document, e.g.
    /// `p1.entries[0]`.
    pub fn violations(&self, prefix: &str) -> Vec<FieldViolation> {
        let mut out = Vec::new();
        if self.from_key.trim().is_empty() {
            out.push(FieldViolation::new(
                format!("{prefix}.from_key"),
                "required",
                "From key must not be empty",
            ));
        }
        if self.to_key.trim().is_empty() {
            out.push(FieldViolation::new(
                format!("{prefix}.to_key"),
                "required",
                "To key must not be empty",
            ));
        }
        out
    }
}
