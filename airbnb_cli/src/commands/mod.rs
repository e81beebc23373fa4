//! CLI subcommand implementations.

pub mod listing;
pub mod search;
