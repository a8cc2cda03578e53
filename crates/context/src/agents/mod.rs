//! Agent roles in the revision loop
//!
//! Each agent pairs a shared `TextGenerator` with its own provider, model and
//! temperature, and owns the prompt and parsing for its role.

mod drafter;
mod reviewer;
mod supervisor;

pub use drafter::{Drafter, RevisionRequest};
pub use reviewer::{parse_review, Reviewer};
pub use supervisor::{apply_guards, parse_decision, GuardOverride, Supervisor, PREMATURE_ACCEPT_THRESHOLD};
