//! Prompt templates for the three agent roles
//!
//! System prompts are fixed; user prompts are assembled from the job
//! description, the current draft and the retrieved evidence block.

pub const DRAFTER_SYSTEM: &str = "You are an intern résumé writer.
Stay faithful to the evidence: never invent skills, dates, titles or achievements.
Write concise US résumé prose with strong action verbs, quantifying impact only where the evidence supports it.
Respond with Markdown only.
";

pub const REVIEWER_SYSTEM: &str = "You are a senior résumé reviewer at a top-tier technology company.
Judge job alignment, clarity, impact and factual consistency strictly.
Respond with JSON only.
";

pub const SUPERVISOR_SYSTEM: &str = "You supervise a multi-agent résumé writing workflow.
From the latest reviewer JSON, decide whether the intern revises again or the run stops.
Respond with JSON only.
";

const DEFAULT_FOCUS: &str = "- Improve overall alignment";

pub fn draft_prompt(job_description: &str, context: &str) -> String {
    format!(
        "Write a tailored one-page résumé in Markdown for the job description below.
Optimise for relevance and ATS-friendly wording without going beyond the supplied evidence.

Job description:
{job_description}

Candidate evidence (retrieved context):
{context}

Output structure:
1. # Candidate Name (placeholder if unknown)
2. ## Summary
3. ## Skills
4. ## Experience
5. ## Projects (only with evidence)
6. ## Education (only with evidence)

Rules:
- Never fabricate details.
- Without concrete metrics, describe impact without numbers.
- Keep bullets short.
"
    )
}

/// User prompt for a revision round.
///
/// `review_feedback` is the pretty-printed reviewer record. An empty focus list
/// falls back to a generic alignment instruction.
pub fn revision_prompt(
    job_description: &str,
    current_resume: &str,
    review_feedback: &str,
    focus: &[String],
    context: &str,
) -> String {
    let focus_text = if focus.is_empty() {
        DEFAULT_FOCUS.to_string()
    } else {
        focus.iter().map(|item| format!("- {}", item)).collect::<Vec<_>>().join("\n")
    };

    format!(
        "Revise the résumé using the reviewer feedback and the supervisor's priorities.
Keep only facts that the evidence below supports.

Job description:
{job_description}

Current résumé:
{current_resume}

Reviewer feedback:
{review_feedback}

Supervisor focus areas:
{focus_text}

Candidate evidence (retrieved context):
{context}

Respond with the updated Markdown résumé only.
"
    )
}

pub fn review_prompt(job_description: &str, resume: &str) -> String {
    format!(
        r#"Review the résumé against the job description and answer with JSON matching this schema:
{{
  "decision": "accept" | "revise",
  "score": 0-10,
  "summary": "short paragraph",
  "strengths": ["..."],
  "risks": ["..."],
  "edits": ["concrete change the intern should make"]
}}

Job description:
{job_description}

Résumé draft:
{resume}
"#
    )
}

/// User prompt for the supervisor; `reviewer_output` is the reviewer's verbatim reply
pub fn supervisor_prompt(round_number: u32, max_rounds: u32, reviewer_output: &str) -> String {
    format!(
        r#"This is revision round {round_number} of {max_rounds}.

Answer with JSON matching this schema:
{{
  "action": "accept" | "revise",
  "reason": "one sentence",
  "focus": ["short, actionable direction for the intern"]
}}

Rules:
- Prefer accept when the reviewer score is at least 8 and no critical risks remain.
- When the round budget is spent, accept unless severe factual problems remain.
- Keep focus items specific and brief.

Reviewer feedback JSON:
{reviewer_output}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_prompt_lists_focus() {
        let focus = vec!["Lead with Rust".to_string(), "Cut hobbies".to_string()];
        let prompt = revision_prompt("JD", "CV", "{}", &focus, "ctx");
        assert!(prompt.contains("Supervisor focus areas:\n- Lead with Rust\n- Cut hobbies\n"));
    }

    #[test]
    fn test_revision_prompt_default_focus() {
        let prompt = revision_prompt("JD", "CV", "{}", &[], "ctx");
        assert!(prompt.contains("Supervisor focus areas:\n- Improve overall alignment\n"));
    }

    #[test]
    fn test_review_prompt_embeds_schema_and_inputs() {
        let prompt = review_prompt("Staff Rust engineer", "# Jane");
        assert!(prompt.contains("\"decision\": \"accept\" | \"revise\""));
        assert!(prompt.contains("Job description:\nStaff Rust engineer"));
        assert!(prompt.ends_with("Résumé draft:\n# Jane\n"));
    }

    #[test]
    fn test_supervisor_prompt_states_round_budget() {
        let prompt = supervisor_prompt(2, 3, "{\"score\": 6}");
        assert!(prompt.starts_with("This is revision round 2 of 3."));
        assert!(prompt.contains("{\"score\": 6}"));
    }
}
