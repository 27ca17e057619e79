//! CLI subcommand implementations.

pub mod repository;
