// siftlock/src/commands/mod.rs
//! Command implementations for the siftlock CLI.

pub mod scan;
pub mod vault;
