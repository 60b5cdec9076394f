//! CLI command handlers.

pub mod config;
pub mod convert;
pub mod process;
pub mod split;
