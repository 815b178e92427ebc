//! Shared value types: agents and contacts

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque agent identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AgentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An outbound-calling agent as seen by the planner
///
/// Only `id` takes part in planning; the other fields are carried for
/// presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRef {
    /// Unique agent identifier, the partition key
    pub id: AgentId,
    /// Name shown to supervisors
    pub display_name: String,
    /// Short operator identifier (extension number)
    pub extension: String,
}

impl AgentRef {
    pub fn new(
        id: impl Into<AgentId>,
        display_name: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            extension: extension.into(),
        }
    }
}

/// Free-form extra columns a contact can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraField {
    Extra1,
    Extra2,
    Extra3,
}

impl ExtraField {
    pub const ALL: [ExtraField; 3] = [ExtraField::Extra1, ExtraField::Extra2, ExtraField::Extra3];

    /// Logical key used when storing the value
    pub fn key(&self) -> &'static str {
        match self {
            ExtraField::Extra1 => "extra1",
            ExtraField::Extra2 => "extra2",
            ExtraField::Extra3 => "extra3",
        }
    }
}

impl fmt::Display for ExtraField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A normalized lead produced from one uploaded row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Position of the originating row in the table body
    pub row_index: usize,
    /// Trimmed name, absent when unmapped or blank
    pub name: Option<String>,
    /// Digits-only phone, absent when unmapped or without digits
    pub phone: Option<String>,
    /// Mapped extra values keyed by logical field
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<ExtraField, String>,
}

impl Contact {
    /// Whether the contact can be dialed at all
    pub fn has_phone(&self) -> bool {
        self.phone.is_some()
    }

    pub fn extra(&self, field: ExtraField) -> Option<&str> {
        self.extras.get(&field).map(String::as_str)
    }
}
