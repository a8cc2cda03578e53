//! Revision loop state machine
//!
//! Every run starts in `Retrieving` and ends in `Done` or `Failed`. The loop
//! calls [`StateMachine::advance`] between phases; illegal edges are rejected
//! and every accepted edge is kept in an ordered transition log.
//!
//! ```text
//! Retrieving  → Drafting
//! Drafting    → Reviewing
//! Reviewing   → Arbitrating
//! Arbitrating → Revising | Done
//! Revising    → Reviewing
//! any non-terminal state → Failed
//! ```

use resumeforge_common::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    /// Searching the index for evidence
    Retrieving,
    /// Writing the first draft
    Drafting,
    /// Waiting on the reviewer
    Reviewing,
    /// Waiting on the supervisor
    Arbitrating,
    /// Rewriting the draft from feedback
    Revising,
    Done,
    Failed,
}

impl LoopState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Retrieving => "Retrieving",
            Self::Drafting => "Drafting",
            Self::Reviewing => "Reviewing",
            Self::Arbitrating => "Arbitrating",
            Self::Revising => "Revising",
            Self::Done => "Done",
            Self::Failed => "Failed",
        };
        f.write_str(name)
    }
}

fn is_legal_transition(from: LoopState, to: LoopState) -> bool {
    use LoopState::*;

    if to == Failed && !from.is_terminal() {
        return true;
    }

    matches!(
        (from, to),
        (Retrieving, Drafting)
            | (Drafting, Reviewing)
            | (Reviewing, Arbitrating)
            | (Arbitrating, Revising)
            | (Arbitrating, Done)
            | (Revising, Reviewing)
    )
}

/// One accepted state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: LoopState,
    pub to: LoopState,
    /// Revision round at the time of the transition, 0 before the first review
    pub round: u32,
    /// Milliseconds since the machine was created
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Error)]
#[error("Illegal state transition: {from} -> {to}")]
pub struct IllegalTransition {
    pub from: LoopState,
    pub to: LoopState,
}

impl From<IllegalTransition> for AppError {
    fn from(err: IllegalTransition) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

pub struct StateMachine {
    current: LoopState,
    round: u32,
    created_at: Instant,
    transitions: Vec<TransitionRecord>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Start in `Retrieving` with an empty log
    pub fn new() -> Self {
        Self {
            current: LoopState::Retrieving,
            round: 0,
            created_at: Instant::now(),
            transitions: Vec::new(),
        }
    }

    pub fn current(&self) -> LoopState {
        self.current
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn set_round(&mut self, round: u32) {
        self.round = round;
    }

    /// Move to `to` if the edge is legal, recording it
    pub fn advance(&mut self, to: LoopState, reason: Option<&str>) -> Result<(), IllegalTransition> {
        if !is_legal_transition(self.current, to) {
            return Err(IllegalTransition {
                from: self.current,
                to,
            });
        }

        let record = TransitionRecord {
            from: self.current,
            to,
            round: self.round,
            elapsed_ms: self.created_at.elapsed().as_millis() as u64,
            reason: reason.map(str::to_string),
        };
        debug!(
            from = %record.from,
            to = %record.to,
            round = record.round,
            elapsed_ms = record.elapsed_ms,
            reason = record.reason.as_deref().unwrap_or(""),
            "State transition"
        );

        self.current = to;
        self.transitions.push(record);
        Ok(())
    }

    /// Record a failure from whatever state the loop is in. No-op once terminal.
    pub fn fail(&mut self, reason: &str) {
        if !self.current.is_terminal() {
            let _ = self.advance(LoopState::Failed, Some(reason));
        }
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    pub fn into_transitions(self) -> Vec<TransitionRecord> {
        self.transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_with_one_revision() {
        let mut sm = StateMachine::new();
        sm.advance(LoopState::Drafting, None).unwrap();
        sm.advance(LoopState::Reviewing, None).unwrap();
        sm.set_round(1);
        sm.advance(LoopState::Arbitrating, None).unwrap();
        sm.advance(LoopState::Revising, Some("needs metrics")).unwrap();
        sm.advance(LoopState::Reviewing, None).unwrap();
        sm.set_round(2);
        sm.advance(LoopState::Arbitrating, None).unwrap();
        sm.advance(LoopState::Done, Some("accepted")).unwrap();

        assert_eq!(sm.current(), LoopState::Done);
        let log = sm.transitions();
        assert_eq!(log.len(), 7);
        assert_eq!(log[0].from, LoopState::Retrieving);
        assert_eq!(log[3].reason.as_deref(), Some("needs metrics"));
        assert_eq!(log[6].round, 2);
        assert!(log.windows(2).all(|w| w[0].to == w[1].from));
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        let mut sm = StateMachine::new();
        let err = sm.advance(LoopState::Reviewing, None).unwrap_err();
        assert_eq!(err.from, LoopState::Retrieving);
        assert_eq!(err.to, LoopState::Reviewing);
        assert_eq!(sm.current(), LoopState::Retrieving);
        assert!(sm.transitions().is_empty());

        sm.advance(LoopState::Drafting, None).unwrap();
        assert!(sm.advance(LoopState::Done, None).is_err());
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut sm = StateMachine::new();
        sm.advance(LoopState::Failed, Some("search failed")).unwrap();
        assert!(sm.advance(LoopState::Failed, None).is_err());
        assert!(sm.advance(LoopState::Drafting, None).is_err());

        sm.fail("again");
        assert_eq!(sm.transitions().len(), 1);
    }

    #[test]
    fn test_fail_from_any_active_state() {
        let mut sm = StateMachine::new();
        sm.advance(LoopState::Drafting, None).unwrap();
        sm.fail("generation error");
        assert_eq!(sm.current(), LoopState::Failed);
        assert_eq!(sm.transitions()[1].reason.as_deref(), Some("generation error"));
    }

    #[test]
    fn test_record_serializes_snake_case() {
        let mut sm = StateMachine::new();
        sm.advance(LoopState::Drafting, None).unwrap();
        let json = serde_json::to_value(&sm.transitions()[0]).unwrap();
        assert_eq!(json["from"], "retrieving");
        assert_eq!(json["to"], "drafting");
        assert!(json.get("reason").is_none());
    }

    #[test]
    fn test_illegal_transition_maps_to_internal_error() {
        let err: AppError = IllegalTransition {
            from: LoopState::Done,
            to: LoopState::Drafting,
        }
        .into();
        assert!(matches!(err, AppError::Internal { .. }));
        assert!(err.to_string().contains("Done -> Drafting"));
    }
}
