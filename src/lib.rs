//! hydra-inputs - Effective inputs of a Hydra evaluation
//!
//! Fetches an evaluation from a Hydra server's JSON API and resolves each
//! of its inputs to a concrete value, following build-typed inputs into
//! the evaluations of the builds they reference.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod graph;
pub mod report;
pub mod resolve;
pub mod ui;

pub use error::{HydraError, HydraResult};
