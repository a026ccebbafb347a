//! Command-line interface

mod args;
mod inputs;

pub use args::Cli;
pub use inputs::execute;
