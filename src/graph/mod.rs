//! Entity graph over the Hydra read API
//!
//! Four record types, each constructed from identifiers alone and
//! populated by a single fetch on first access:
//!
//! | Entity       | Endpoint                    | Derived state                         |
//! |--------------|-----------------------------|---------------------------------------|
//! | `Project`    | none                        | none                                  |
//! | `Jobset`     | `jobset/{project}/{jobset}` | input name -> reference string        |
//! | `Evaluation` | `eval/{id}`                 | builds, raw inputs, resolved inputs   |
//! | `Build`      | `build/{id}`                | project, jobset, latest eval, outputs |

mod build;
mod evaluation;
mod ids;
mod jobset;
pub(crate) mod records;
mod session;

pub use build::Build;
pub use evaluation::Evaluation;
pub(crate) use evaluation::EvalContents;
pub use ids::{BuildId, EvalId};
pub use jobset::{Jobset, Project};
pub use records::BuildOutput;
pub use session::{ResolveOptions, Session, DEFAULT_MAX_DEPTH};
