use crate::judgment::{extract_json_object, score_field, string_field, string_list_field, verdict_field};
use crate::prompts;
use resumeforge_common::errors::Result;
use resumeforge_common::llm::{GenerationConfig, TextGenerator};
use resumeforge_common::types::{ReviewFeedback, Verdict};
use std::sync::Arc;
use tracing::info;

/// Critiques a draft against the job description
pub struct Reviewer {
    generator: Arc<dyn TextGenerator>,
    config: GenerationConfig,
}

impl Reviewer {
    pub fn new(generator: Arc<dyn TextGenerator>, config: GenerationConfig) -> Self {
        Self { generator, config }
    }

    /// Generation errors propagate; unparseable output becomes a zero-score `revise`
    pub async fn review(&self, job_description: &str, resume: &str) -> Result<ReviewFeedback> {
        let prompt = prompts::review_prompt(job_description, resume);
        let raw = self
            .generator
            .generate(prompts::REVIEWER_SYSTEM, &prompt, &self.config)
            .await?;

        let feedback = parse_review(&raw);
        info!(
            decision = %feedback.decision,
            score = feedback.score,
            edits = feedback.edits.len(),
            risks = feedback.risks.len(),
            "Review parsed"
        );
        Ok(feedback)
    }
}

/// Normalize raw reviewer output into a feedback record
pub fn parse_review(raw: &str) -> ReviewFeedback {
    let payload = extract_json_object(raw);
    ReviewFeedback {
        decision: verdict_field(&payload, "decision", Verdict::Revise),
        score: score_field(&payload, "score"),
        strengths: string_list_field(&payload, "strengths"),
        risks: string_list_field(&payload, "risks"),
        edits: string_list_field(&payload, "edits"),
        summary: string_field(&payload, "summary"),
        raw_text: raw.to_string(),
    }
}
