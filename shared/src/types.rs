use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostType {
    Host,
    Guest,
}

impl HostType {
    pub fn invert(self) -> Self {
        match self {
            HostType::Host => HostType::Guest,
            HostType::Guest => HostType::Host,
        }
    }

    fn id_prefix(self) -> &'static str {
        match self {
            HostType::Host => "h",
            HostType::Guest => "g",
        }
    }
}

/// Opaque identifier for a registered container, shared by both mirrors.
///
/// Generated identifiers carry the minting side's prefix, so a host and a
/// guest can never hand out the same one.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(String);

impl ContextId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate(host_type: HostType) -> Self {
        Self(format!("{}-{}", host_type.id_prefix(), Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContextId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ContextId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
