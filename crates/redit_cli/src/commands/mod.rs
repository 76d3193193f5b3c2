//! Command implementations for the redit CLI.

pub mod diff;
pub mod edit;
pub mod log;
