//! Subcommand handlers. Each takes its own config struct built from the CLI flags.

pub mod add;
pub mod delete;
pub mod manage;
pub mod report;
pub mod service;
pub mod update;

pub type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;
