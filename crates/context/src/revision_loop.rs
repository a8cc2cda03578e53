//! Bounded draft, review and revise loop
//!
//! One retrieval and one draft, then up to `max_rounds` rounds of review and
//! supervision. The supervisor's budget guard accepts on the last round, so a
//! run performs at most `max_rounds` reviews and `max_rounds - 1` revisions.

use crate::agents::{Drafter, RevisionRequest, Reviewer, Supervisor};
use crate::state_machine::{LoopState, StateMachine, TransitionRecord};
use resumeforge_common::config::Settings;
use resumeforge_common::errors::{AppError, Result};
use resumeforge_common::llm::TextGenerator;
use resumeforge_common::metrics;
use resumeforge_common::types::{RetrievalHit, ReviewFeedback, SupervisorDecision};
use resumeforge_search::{format_retrieval_context, EmbeddingIndex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome and audit trail of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub final_resume: String,
    /// First draft, before any revision
    pub draft_resume: String,
    /// One entry per round, in order
    pub review_rounds: Vec<ReviewFeedback>,
    /// One entry per round, in order; same length as `review_rounds`
    pub supervisor_rounds: Vec<SupervisorDecision>,
    pub retrieval_hits: Vec<RetrievalHit>,
    pub transitions: Vec<TransitionRecord>,
}

pub struct RevisionLoop {
    drafter: Drafter,
    reviewer: Reviewer,
    supervisor: Supervisor,
    top_k: usize,
    max_rounds: u32,
}

impl RevisionLoop {
    /// Wire the three agents to one generator using the per-role settings
    pub fn new(generator: Arc<dyn TextGenerator>, settings: &Settings) -> Self {
        Self {
            drafter: Drafter::new(generator.clone(), settings.intern.clone()),
            reviewer: Reviewer::new(generator.clone(), settings.reviewer.clone()),
            supervisor: Supervisor::new(generator, settings.supervisor.clone()),
            top_k: settings.top_k,
            max_rounds: settings.max_revision_rounds,
        }
    }

    /// Run the loop for `job_description` against a built or loaded index.
    ///
    /// Any collaborator failure moves the machine to `Failed` and is returned as is.
    pub async fn run(&self, index: &EmbeddingIndex, job_description: &str) -> Result<RunResult> {
        if self.max_rounds == 0 {
            return Err(AppError::InvalidInput {
                message: "max_revision_rounds must be greater than 0".to_string(),
            });
        }

        let mut machine = StateMachine::new();
        match self.execute(index, job_description, &mut machine).await {
            Ok(outcome) => {
                info!(
                    rounds = outcome.review_rounds.len(),
                    transitions = machine.transitions().len(),
                    "Revision loop finished"
                );
                Ok(RunResult {
                    transitions: machine.into_transitions(),
                    ..outcome
                })
            }
            Err(e) => {
                let state = machine.current();
                machine.fail(&e.to_string());
                warn!(state = %state, round = machine.round(), error = %e, "Revision loop failed");
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        index: &EmbeddingIndex,
        job_description: &str,
        machine: &mut StateMachine,
    ) -> Result<RunResult> {
        let hits = index.search(job_description, self.top_k).await?;
        let context = format_retrieval_context(&hits);
        machine.advance(
            LoopState::Drafting,
            Some(&format!("retrieved {} chunks", hits.len())),
        )?;

        let draft = self.drafter.draft(job_description, &context).await?;
        let mut current = draft.clone();
        machine.advance(LoopState::Reviewing, None)?;

        let mut review_rounds = Vec::new();
        let mut supervisor_rounds = Vec::new();

        for round in 1..=self.max_rounds {
            machine.set_round(round);

            let review = self.reviewer.review(job_description, &current).await?;
            metrics::record_round(review.decision.as_str());
            machine.advance(
                LoopState::Arbitrating,
                Some(&format!("reviewer {} at {:.1}", review.decision, review.score)),
            )?;

            let decision = self.supervisor.decide(&review, round, self.max_rounds).await?;
            info!(
                round = round,
                score = review.score,
                review = %review.decision,
                action = %decision.action,
                "Round complete"
            );

            if decision.action.is_accept() {
                machine.advance(LoopState::Done, Some(&decision.reason))?;
                review_rounds.push(review);
                supervisor_rounds.push(decision);
                break;
            }

            machine.advance(LoopState::Revising, Some(&decision.reason))?;
            let feedback = serde_json::to_string_pretty(&review)?;
            let revised = self
                .drafter
                .revise(&RevisionRequest {
                    job_description,
                    current_resume: &current,
                    review_feedback: &feedback,
                    focus: &decision.focus,
                    context: &context,
                })
                .await?;

            review_rounds.push(review);
            supervisor_rounds.push(decision);
            current = revised;
            machine.advance(LoopState::Reviewing, None)?;
        }

        if machine.current() != LoopState::Done {
            return Err(AppError::Internal {
                message: format!("revision loop stopped in state {}", machine.current()),
            });
        }

        Ok(RunResult {
            final_resume: current,
            draft_resume: draft,
            review_rounds,
            supervisor_rounds,
            retrieval_hits: hits,
            transitions: Vec::new(),
        })
    }
}
