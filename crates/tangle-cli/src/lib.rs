//! Tangle CLI library components.
//!
//! Command implementations live here so integration tests can drive them
//! without spawning the binary. The argument parser is in `main.rs`.

pub mod commands;
pub mod context;
pub mod summary;

pub use context::ProjectContext;
