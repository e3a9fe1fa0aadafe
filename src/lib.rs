//! tabtree: the in-memory tab model of a browser.
//!
//! Tabs live either in the top-level sequence or inside a named, colored,
//! collapsible group. Every mutation leaves the structure consistent.
//! This library crate exposes all modules for use by the demo binary and integration tests.

pub mod managers;
pub mod platform;
pub mod services;
pub mod types;
