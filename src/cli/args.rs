//! CLI argument definitions using clap derive

use crate::graph::EvalId;
use crate::report::OutputFormat;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// hydra-inputs - Show what a Hydra evaluation was built from
///
/// Resolves every input of an evaluation, following build-typed inputs
/// through the evaluations of the builds they point at.
#[derive(Parser, Debug)]
#[command(name = "hydra-inputs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the Hydra server
    pub url: String,

    /// Evaluation id to resolve
    pub eval: EvalId,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "HYDRA_INPUTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (overrides config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Most evaluations allowed on one dependency path
    #[arg(long, value_parser = parse_depth)]
    pub max_depth: Option<usize>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Resolve dependency builds one at a time
    #[arg(long)]
    pub no_prefetch: bool,
}

fn parse_depth(s: &str) -> Result<usize, String> {
    let depth: usize = s
        .parse()
        .map_err(|e| format!("invalid depth '{}': {}", s, e))?;
    if depth == 0 {
        return Err("depth must be at least 1".to_string());
    }
    Ok(depth)
}
