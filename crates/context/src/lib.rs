//! ResumeForge Context
//!
//! Turns retrieved candidate evidence into a tailored résumé:
//! - Prompt construction for the drafting, reviewing and supervising agents
//! - Tolerant parsing of model judgments into typed records
//! - A bounded draft, review and revise loop with an auditable state log

pub mod agents;
pub mod judgment;
pub mod prompts;
pub mod revision_loop;
pub mod state_machine;

pub use agents::{Drafter, GuardOverride, RevisionRequest, Reviewer, Supervisor, PREMATURE_ACCEPT_THRESHOLD};
pub use revision_loop::{RevisionLoop, RunResult};
pub use state_machine::{IllegalTransition, LoopState, StateMachine, TransitionRecord};
