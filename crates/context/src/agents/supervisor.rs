use crate::judgment::{extract_json_object, string_field, string_list_field, verdict_field};
use crate::prompts;
use resumeforge_common::errors::Result;
use resumeforge_common::llm::{GenerationConfig, TextGenerator};
use resumeforge_common::metrics;
use resumeforge_common::types::{ReviewFeedback, SupervisorDecision, Verdict};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Reviewer score below which an early `accept` is overruled
pub const PREMATURE_ACCEPT_THRESHOLD: f64 = 7.5;

const PREMATURE_FOCUS_ITEMS: usize = 3;
const ACCEPT_REASON: &str = "Reviewer signaled sufficient quality.";
const REVISE_REASON: &str = "Reviewer requested targeted edits.";
const BUDGET_REASON: &str = "Max rounds reached; finishing with current best draft.";

/// Deterministic rule that replaced the model's chosen action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOverride {
    /// Accept with a low score while rounds remain
    PrematureAccept,
    /// Revise requested on the last permitted round
    BudgetExhausted,
}

impl GuardOverride {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardOverride::PrematureAccept => "premature_accept",
            GuardOverride::BudgetExhausted => "budget_exhausted",
        }
    }
}

impl fmt::Display for GuardOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides after each review whether the loop stops or revises again
pub struct Supervisor {
    generator: Arc<dyn TextGenerator>,
    config: GenerationConfig,
}

impl Supervisor {
    pub fn new(generator: Arc<dyn TextGenerator>, config: GenerationConfig) -> Self {
        Self { generator, config }
    }

    /// Ask the model for a ruling, then apply the round guards.
    ///
    /// The returned action is always `accept` once `round_number >= max_rounds`.
    pub async fn decide(
        &self,
        feedback: &ReviewFeedback,
        round_number: u32,
        max_rounds: u32,
    ) -> Result<SupervisorDecision> {
        let prompt = prompts::supervisor_prompt(round_number, max_rounds, &feedback.raw_text);
        let raw = self
            .generator
            .generate(prompts::SUPERVISOR_SYSTEM, &prompt, &self.config)
            .await?;

        let parsed = parse_decision(&raw, feedback);
        let (decision, guard) = apply_guards(parsed, feedback, round_number, max_rounds);

        if let Some(guard) = guard {
            metrics::record_guard_override(guard.as_str());
            warn!(
                guard = %guard,
                round = round_number,
                max_rounds = max_rounds,
                score = feedback.score,
                "Supervisor action overridden"
            );
        }
        info!(
            round = round_number,
            action = %decision.action,
            focus_items = decision.focus.len(),
            reason = %decision.reason,
            "Supervisor decided"
        );
        Ok(decision)
    }
}

/// Normalize raw supervisor output. A missing action inherits the reviewer's decision.
pub fn parse_decision(raw: &str, feedback: &ReviewFeedback) -> SupervisorDecision {
    let payload = extract_json_object(raw);
    let action = verdict_field(&payload, "action", feedback.decision);

    let mut reason = string_field(&payload, "reason");
    if reason.is_empty() {
        reason = match action {
            Verdict::Accept => ACCEPT_REASON,
            Verdict::Revise => REVISE_REASON,
        }
        .to_string();
    }

    SupervisorDecision {
        action,
        reason,
        focus: string_list_field(&payload, "focus"),
        raw_text: raw.to_string(),
    }
}

/// Apply the premature-accept guard, then the budget guard.
///
/// The two guards cannot both fire: the first needs `round_number < max_rounds`,
/// the second `round_number >= max_rounds`.
pub fn apply_guards(
    mut decision: SupervisorDecision,
    feedback: &ReviewFeedback,
    round_number: u32,
    max_rounds: u32,
) -> (SupervisorDecision, Option<GuardOverride>) {
    let mut guard = None;

    if decision.action == Verdict::Accept
        && feedback.score < PREMATURE_ACCEPT_THRESHOLD
        && round_number < max_rounds
    {
        decision.action = Verdict::Revise;
        if decision.focus.is_empty() {
            decision.focus = feedback.edits.iter().take(PREMATURE_FOCUS_ITEMS).cloned().collect();
        }
        guard = Some(GuardOverride::PrematureAccept);
    }

    if decision.action == Verdict::Revise && round_number >= max_rounds {
        decision.action = Verdict::Accept;
        decision.reason = BUDGET_REASON.to_string();
        guard = Some(GuardOverride::BudgetExhausted);
    }

    (decision, guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback(decision: Verdict, score: f64, edits: &[&str]) -> ReviewFeedback {
        ReviewFeedback {
            decision,
            score,
            strengths: Vec::new(),
            risks: Vec::new(),
            edits: edits.iter().map(|e| e.to_string()).collect(),
            summary: String::new(),
            raw_text: "{}".to_string(),
        }
    }

    #[test]
    fn test_missing_action_inherits_review_decision() {
        let review = feedback(Verdict::Accept, 9.0, &[]);
        let decision = parse_decision("{}", &review);
        assert_eq!(decision.action, Verdict::Accept);
        assert_eq!(decision.reason, ACCEPT_REASON);

        let review = feedback(Verdict::Revise, 4.0, &[]);
        let decision = parse_decision("not json", &review);
        assert_eq!(decision.action, Verdict::Revise);
        assert_eq!(decision.reason, REVISE_REASON);
    }

    #[test]
    fn test_explicit_reason_and_focus_kept() {
        let review = feedback(Verdict::Revise, 5.0, &[]);
        let raw = r#"{"action": "REVISE", "reason": " Needs metrics ", "focus": ["Quantify impact"]}"#;
        let decision = parse_decision(raw, &review);
        assert_eq!(decision.action, Verdict::Revise);
        assert_eq!(decision.reason, "Needs metrics");
        assert_eq!(decision.focus, vec!["Quantify impact".to_string()]);
        assert_eq!(decision.raw_text, raw);
    }

    #[test]
    fn test_premature_accept_overruled_with_edit_focus() {
        let review = feedback(Verdict::Accept, 6.0, &["a", "b", "c", "d"]);
        let parsed = parse_decision(r#"{"action": "accept"}"#, &review);
        let (decision, guard) = apply_guards(parsed, &review, 1, 3);
        assert_eq!(decision.action, Verdict::Revise);
        assert_eq!(decision.focus, vec!["a", "b", "c"]);
        assert_eq!(guard, Some(GuardOverride::PrematureAccept));
    }

    #[test]
    fn test_premature_accept_keeps_supervisor_focus() {
        let review = feedback(Verdict::Accept, 7.4, &["a"]);
        let parsed = parse_decision(r#"{"action": "accept", "focus": ["own"]}"#, &review);
        let (decision, _) = apply_guards(parsed, &review, 1, 2);
        assert_eq!(decision.action, Verdict::Revise);
        assert_eq!(decision.focus, vec!["own"]);
    }

    #[test]
    fn test_accept_at_threshold_stands() {
        let review = feedback(Verdict::Accept, PREMATURE_ACCEPT_THRESHOLD, &["a"]);
        let parsed = parse_decision(r#"{"action": "accept"}"#, &review);
        let (decision, guard) = apply_guards(parsed, &review, 1, 3);
        assert_eq!(decision.action, Verdict::Accept);
        assert_eq!(guard, None);
    }

    #[test]
    fn test_low_score_accept_on_last_round_stands() {
        let review = feedback(Verdict::Accept, 2.0, &["a"]);
        let parsed = parse_decision(r#"{"action": "accept", "reason": "Good enough"}"#, &review);
        let (decision, guard) = apply_guards(parsed, &review, 2, 2);
        assert_eq!(decision.action, Verdict::Accept);
        assert_eq!(decision.reason, "Good enough");
        assert_eq!(guard, None);
    }

    #[test]
    fn test_budget_exhaustion_forces_accept() {
        let review = feedback(Verdict::Revise, 3.0, &["a"]);
        let parsed = parse_decision(r#"{"action": "revise", "reason": "More work"}"#, &review);
        let (decision, guard) = apply_guards(parsed, &review, 3, 3);
        assert_eq!(decision.action, Verdict::Accept);
        assert_eq!(decision.reason, BUDGET_REASON);
        assert_eq!(guard, Some(GuardOverride::BudgetExhausted));
    }

    #[test]
    fn test_revise_with_rounds_left_untouched() {
        let review = feedback(Verdict::Revise, 3.0, &[]);
        let parsed = parse_decision(r#"{"action": "revise"}"#, &review);
        let (decision, guard) = apply_guards(parsed, &review, 1, 3);
        assert_eq!(decision.action, Verdict::Revise);
        assert_eq!(guard, None);
    }
}
