//! ResumeForge CLI
//!
//! Builds (or reuses) a local embedding index over candidate documents, drafts a
//! résumé for a job description and refines it through bounded review rounds.

mod pipeline;
mod report;

use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use resumeforge_common::config::{ObservabilityConfig, Settings, DEFAULT_CONFIG_PATH};
use resumeforge_common::errors::AppError;
use resumeforge_common::metrics::{self, MODEL_LATENCY_BUCKETS};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "resumeforge",
    version,
    about = "Tailor a résumé to a job description using retrieved evidence and a review loop"
)]
pub struct Args {
    /// YAML settings file. Defaults to configs/default.yaml when present.
    #[arg(long, env = "RESUMEFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// File holding the target job description
    #[arg(long)]
    pub job_description_file: PathBuf,

    /// Résumé, notes or project files and directories to draw evidence from
    #[arg(long, num_args = 1.., required = true)]
    pub documents: Vec<PathBuf>,

    /// Where the final Markdown résumé is written
    #[arg(long, default_value = "outputs/resume.md")]
    pub output: PathBuf,

    /// Where the JSON run report is written
    #[arg(long, default_value = "outputs/run_report.json")]
    pub report_output: PathBuf,

    /// Base path of the persisted index (`.bin` and `.json` are appended)
    #[arg(long, default_value = ".cache/resume_index")]
    pub index_path: PathBuf,

    /// Reuse the persisted index when it matches the current documents
    #[arg(long, default_value_t = false)]
    pub reuse_index: bool,

    #[arg(long)]
    pub supervisor_model: Option<String>,

    #[arg(long)]
    pub intern_model: Option<String>,

    #[arg(long)]
    pub reviewer_model: Option<String>,

    /// Write a Prometheus text snapshot of run metrics to this file
    #[arg(long)]
    pub metrics_output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let (config_path, required) = match &args.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };
    let settings = Settings::load(&config_path, required);

    let observability = settings
        .as_ref()
        .map(|s| s.observability.clone())
        .unwrap_or_default();
    init_tracing(&observability);

    info!("Starting ResumeForge v{}", resumeforge_common::VERSION);

    let outcome = match settings {
        Ok(settings) => run(&args, settings).await,
        Err(e) => Err(anyhow::Error::new(e).context(format!("loading {}", config_path.display()))),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let app_error = e.downcast_ref::<AppError>();
            match app_error {
                Some(app_error) => error!(code = app_error.code().as_code(), error = %format!("{:#}", e), "Run failed"),
                None => error!(error = %format!("{:#}", e), "Run failed"),
            }
            eprintln!("Error: {:#}", e);
            if let Some(hint) = app_error.and_then(failure_hint) {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args, settings: Settings) -> anyhow::Result<()> {
    let prometheus = match &args.metrics_output {
        Some(_) => Some(install_metrics_recorder()?),
        None => None,
    };
    metrics::register_metrics();

    let summary = pipeline::run(args, settings).await?;
    println!("Final résumé: {}", summary.resume_path.display());
    println!("Run report:   {}", summary.report_path.display());
    println!("Review rounds: {}", summary.review_rounds);

    if let (Some(handle), Some(path)) = (prometheus, &args.metrics_output) {
        report::write_text(path, &handle.render())
            .with_context(|| format!("writing metrics snapshot {}", path.display()))?;
        info!(path = %path.display(), "Metrics snapshot written");
    }
    Ok(())
}

/// Next step to suggest for failures the user can act on
fn failure_hint(error: &AppError) -> Option<&'static str> {
    if error.is_upstream_error() {
        Some("check that the model provider is reachable and the configured models are available")
    } else if error.is_retrieval_error() {
        Some("rerun without --reuse-index to rebuild the persisted index")
    } else {
        None
    }
}

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&observability.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn install_metrics_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            MODEL_LATENCY_BUCKETS,
        )?
        .install_recorder()?;
    Ok(handle)
}
