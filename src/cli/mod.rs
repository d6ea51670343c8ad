//! CLI module - argument parsing and interactive prompts

mod args;
mod prompts;

pub use args::{CategoryFilter, Cli, Commands, RangeFilter};
pub use prompts::*;
