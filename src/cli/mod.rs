//! CLI argument parsing and command dispatch.

pub mod args;
pub mod authorize;
pub mod run;

pub use args::Cli;
