use thiserror::Error;

use super::ids::TabId;

// === TabError ===

/// Errors returned by tab and group operations.
///
/// A failed operation leaves the structure exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TabError {
    /// No tab or group with the given id exists (in the expected place).
    #[error("Tab or group not found: {0}")]
    NotFound(TabId),
    /// A caller-supplied id is already in use by another tab or group.
    #[error("Id already in use: {0}")]
    DuplicateId(TabId),
    /// A tab would end up in a group with tabs of the other incognito status.
    #[error("Incognito mismatch: tab {tab} cannot join group {group}")]
    IncognitoMismatch { tab: TabId, group: TabId },
    /// A position is outside the valid range of its sequence.
    #[error("Invalid position {position} for a sequence of length {len}")]
    InvalidPosition { position: usize, len: usize },
    /// A group cannot be merged into itself.
    #[error("Cannot merge group {0} into itself")]
    SelfMerge(TabId),
    /// The structure breaks one of its consistency rules.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

// === SessionError ===

/// Errors related to exporting and importing the tab tree.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Failed to serialize or deserialize session data.
    #[error("Session serialization error: {0}")]
    Serialization(String),
    /// The session parsed, but was written with a layout version this build
    /// does not read.
    #[error("Unsupported session version {0}")]
    UnsupportedVersion(u32),
    /// Reading or writing the session file failed.
    #[error("Session I/O error: {0}")]
    Io(String),
    /// The session data does not describe a consistent tab tree.
    #[error("Invalid session data: {0}")]
    Invalid(#[from] TabError),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    Io(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    Serialization(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
