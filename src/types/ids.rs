use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier shared by tabs and groups.
///
/// Tabs and groups live in one namespace, so a `TabId` handed out for a group
/// never collides with any tab id (and vice versa).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(String);

impl TabId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TabId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TabId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for TabId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Source of fresh node ids.
///
/// The engine asks for an id every time it creates a tab or group. An
/// implementation must never return the same value twice.
pub trait IdGenerator: Send + Sync {
    fn next_id(&mut self) -> TabId;
}

/// Random UUID v4 ids. The default generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> TabId {
        TabId(Uuid::new_v4().to_string())
    }
}

/// Deterministic `<prefix>-<n>` ids, handy for tests and scripted sessions.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("node")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> TabId {
        let id = TabId(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}
