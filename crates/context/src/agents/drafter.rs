use crate::prompts;
use resumeforge_common::errors::Result;
use resumeforge_common::llm::{GenerationConfig, TextGenerator};
use std::sync::Arc;
use tracing::info;

/// Inputs for one revision of the current résumé
#[derive(Debug, Clone, Copy)]
pub struct RevisionRequest<'a> {
    pub job_description: &'a str,
    pub current_resume: &'a str,
    /// Pretty-printed reviewer record for the round
    pub review_feedback: &'a str,
    pub focus: &'a [String],
    pub context: &'a str,
}

/// Writes the first draft and every revision
pub struct Drafter {
    generator: Arc<dyn TextGenerator>,
    config: GenerationConfig,
}

impl Drafter {
    pub fn new(generator: Arc<dyn TextGenerator>, config: GenerationConfig) -> Self {
        Self { generator, config }
    }

    pub async fn draft(&self, job_description: &str, context: &str) -> Result<String> {
        let prompt = prompts::draft_prompt(job_description, context);
        let resume = self
            .generator
            .generate(prompts::DRAFTER_SYSTEM, &prompt, &self.config)
            .await?;
        info!(model = %self.config.model, chars = resume.len(), "Draft written");
        Ok(resume)
    }

    pub async fn revise(&self, request: &RevisionRequest<'_>) -> Result<String> {
        let prompt = prompts::revision_prompt(
            request.job_description,
            request.current_resume,
            request.review_feedback,
            request.focus,
            request.context,
        );
        let resume = self
            .generator
            .generate(prompts::DRAFTER_SYSTEM, &prompt, &self.config)
            .await?;
        info!(
            model = %self.config.model,
            focus_items = request.focus.len(),
            chars = resume.len(),
            "Revision written"
        );
        Ok(resume)
    }
}
