//! Run outputs: the final résumé and the JSON audit report

use chrono::{DateTime, Utc};
use resumeforge_common::types::{ReviewFeedback, SupervisorDecision};
use resumeforge_context::{RunResult, TransitionRecord};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use uuid::Uuid;

/// Retrieval hit flattened for the report
#[derive(Debug, Serialize)]
pub struct HitEntry<'a> {
    pub score: f32,
    pub chunk_id: &'a str,
    pub source: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub embedding_model: &'a str,
    pub draft_resume: &'a str,
    pub final_resume: &'a str,
    pub review_rounds: &'a [ReviewFeedback],
    pub supervisor_rounds: &'a [SupervisorDecision],
    pub retrieval_hits: Vec<HitEntry<'a>>,
    pub transitions: &'a [TransitionRecord],
}

impl<'a> RunReport<'a> {
    pub fn new(
        run_id: Uuid,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        embedding_model: &'a str,
        result: &'a RunResult,
    ) -> Self {
        Self {
            run_id,
            started_at,
            finished_at,
            embedding_model,
            draft_resume: &result.draft_resume,
            final_resume: &result.final_resume,
            review_rounds: &result.review_rounds,
            supervisor_rounds: &result.supervisor_rounds,
            retrieval_hits: result
                .retrieval_hits
                .iter()
                .map(|hit| HitEntry {
                    score: hit.score,
                    chunk_id: &hit.chunk.chunk_id,
                    source: &hit.chunk.source,
                    text: &hit.chunk.text,
                })
                .collect(),
            transitions: &result.transitions,
        }
    }
}

/// Write the résumé and the report, creating parent directories
pub fn write_outputs(
    resume_path: &Path,
    report_path: &Path,
    final_resume: &str,
    report: &RunReport<'_>,
) -> anyhow::Result<()> {
    write_text(resume_path, &format!("{}\n", final_resume.trim_end()))?;
    write_text(report_path, &serde_json::to_string_pretty(report)?)?;
    Ok(())
}

pub fn write_text(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use resumeforge_common::types::{Chunk, RetrievalHit, Verdict};

    fn result() -> RunResult {
        RunResult {
            final_resume: "# Final\n\n".to_string(),
            draft_resume: "# Draft".to_string(),
            review_rounds: vec![ReviewFeedback {
                decision: Verdict::Accept,
                score: 8.0,
                strengths: vec!["Clear".to_string()],
                risks: Vec::new(),
                edits: Vec::new(),
                summary: "Good".to_string(),
                raw_text: "{}".to_string(),
            }],
            supervisor_rounds: vec![SupervisorDecision {
                action: Verdict::Accept,
                reason: "Done".to_string(),
                focus: Vec::new(),
                raw_text: "{}".to_string(),
            }],
            retrieval_hits: vec![RetrievalHit {
                chunk: Chunk::new("cv.md", 2, "Rust"),
                score: 0.5,
            }],
            transitions: Vec::new(),
        }
    }

    #[test]
    fn test_write_outputs_creates_dirs_and_flattens_hits() {
        let dir = tempfile::tempdir().unwrap();
        let resume_path = dir.path().join("out/nested/resume.md");
        let report_path = dir.path().join("reports/run.json");
        let result = result();
        let report = RunReport::new(Uuid::new_v4(), Utc::now(), Utc::now(), "bge-small", &result);

        write_outputs(&resume_path, &report_path, &result.final_resume, &report).unwrap();

        assert_eq!(fs::read_to_string(&resume_path).unwrap(), "# Final\n");

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(json["embedding_model"], "bge-small");
        assert_eq!(json["draft_resume"], "# Draft");
        assert_eq!(json["review_rounds"][0]["decision"], "accept");
        assert_eq!(json["supervisor_rounds"][0]["reason"], "Done");
        assert_eq!(json["retrieval_hits"][0]["chunk_id"], "cv.md::chunk::2");
        assert_eq!(json["retrieval_hits"][0]["source"], "cv.md");
        assert_eq!(json["retrieval_hits"][0]["score"], 0.5);
        assert!(json["run_id"].is_string());
        assert!(json["transitions"].as_array().unwrap().is_empty());
    }
}
