// tabtree shared type definitions
// Each submodule defines types used across the engine, manager and services.

pub mod command;
pub mod errors;
pub mod event;
pub mod group;
pub mod ids;
pub mod image;
pub mod node;
pub mod session;
pub mod settings;
pub mod tab;
