//! Terminal presentation helpers
//!
//! Uses `cliclack` for spinners and banners on an interactive terminal,
//! with plain lines on stderr in CI and when stdout is redirected. Stdout
//! is left to the report.
//!
//! # Example
//!
//! ```rust,ignore
//! use hydra_inputs::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect();
//! ui::intro(&ctx, "Evaluation 123");
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Resolving inputs...");
//! spinner.stop("Resolved 4 inputs");
//! ```

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{intro, remark};
pub use progress::TaskSpinner;
