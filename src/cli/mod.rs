//! Command-line interface: argument parsing and the search command.

pub mod args;
pub mod commands;
