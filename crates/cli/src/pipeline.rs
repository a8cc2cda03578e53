//! End-to-end run: settings, documents, index, revision loop, outputs

use crate::report::{self, RunReport};
use crate::Args;
use anyhow::Context;
use chrono::Utc;
use resumeforge_common::config::Settings;
use resumeforge_common::embeddings::create_embedder;
use resumeforge_common::errors::AppError;
use resumeforge_common::llm::{ProviderRegistry, TextGenerator};
use resumeforge_common::types::Chunk;
use resumeforge_context::RevisionLoop;
use resumeforge_ingestion::{build_chunks, load_documents, read_job_description, ChunkingConfig};
use resumeforge_search::retrieval::corpus_fingerprint;
use resumeforge_search::EmbeddingIndex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// What a successful run produced
#[derive(Debug)]
pub struct RunSummary {
    pub resume_path: PathBuf,
    pub report_path: PathBuf,
    pub review_rounds: usize,
}

/// Replace per-role models with the ones given on the command line
pub fn apply_overrides(settings: &mut Settings, args: &Args) {
    if let Some(model) = &args.supervisor_model {
        settings.supervisor.model = model.clone();
    }
    if let Some(model) = &args.intern_model {
        settings.intern.model = model.clone();
    }
    if let Some(model) = &args.reviewer_model {
        settings.reviewer.model = model.clone();
    }
}

pub async fn run(args: &Args, mut settings: Settings) -> anyhow::Result<RunSummary> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();

    apply_overrides(&mut settings, args);
    settings.validate()?;

    let registry = ProviderRegistry::from_settings(&settings)?;
    registry.ensure_supports(&settings)?;

    let job_description = read_job_description(&args.job_description_file).map_err(AppError::from)?;
    let documents = load_documents(&args.documents).map_err(AppError::from)?;
    let chunking = ChunkingConfig::new(settings.chunk_size, settings.chunk_overlap).map_err(AppError::from)?;
    let chunks = build_chunks(&documents, &chunking).map_err(AppError::from)?;
    if chunks.is_empty() {
        return Err(AppError::InvalidInput {
            message: "No chunks produced from input documents.".to_string(),
        }
        .into());
    }
    info!(
        %run_id,
        documents = documents.len(),
        chunks = chunks.len(),
        "Documents chunked"
    );

    let embedder = create_embedder(&settings)?;
    let mut index = EmbeddingIndex::new(embedder);
    prepare_index(&mut index, chunks, &args.index_path, args.reuse_index).await?;

    let generator: Arc<dyn TextGenerator> = Arc::new(registry);
    let revision_loop = RevisionLoop::new(generator, &settings);
    let result = revision_loop.run(&index, &job_description).await?;
    let finished_at = Utc::now();

    let report = RunReport::new(
        run_id,
        started_at,
        finished_at,
        index.embedding_model(),
        &result,
    );
    report::write_outputs(&args.output, &args.report_output, &result.final_resume, &report)
        .context("writing run outputs")?;

    info!(
        %run_id,
        rounds = result.review_rounds.len(),
        elapsed_ms = (finished_at - started_at).num_milliseconds(),
        "Run complete"
    );

    Ok(RunSummary {
        resume_path: args.output.clone(),
        report_path: args.report_output.clone(),
        review_rounds: result.review_rounds.len(),
    })
}

/// Load the persisted index when asked and still current, otherwise build and save it.
///
/// A persisted index is current when its corpus fingerprint equals that of the
/// freshly chunked documents. Any load failure falls back to a rebuild.
pub async fn prepare_index(
    index: &mut EmbeddingIndex,
    chunks: Vec<Chunk>,
    base: &Path,
    reuse: bool,
) -> resumeforge_common::Result<()> {
    if reuse {
        let expected = corpus_fingerprint(&chunks);
        match index.load(base) {
            Ok(()) if index.fingerprint().as_deref() == Some(expected.as_str()) => {
                info!(path = %base.display(), chunks = index.len(), "Reusing persisted index");
                return Ok(());
            }
            Ok(()) => {
                info!(path = %base.display(), "Persisted index is stale, rebuilding");
            }
            Err(e) => {
                warn!(path = %base.display(), code = e.code().as_code(), error = %e, "Persisted index unusable, rebuilding");
            }
        }
    }

    index.build(chunks).await?;
    index.save(base)?;
    Ok(())
}
