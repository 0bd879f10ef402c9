use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use job_pipeline::{
    AppConfig, ApplicationTracker, BrowserAgentApplier, CandidateProfile, ConsoleGate,
    ContentTailoringPipeline, DocumentCompiler, GenerativeInvoker, HttpChatProvider, LlmAnalyst,
    ReviewSession, SearchApiScout, TemplateStore, WorkflowOrchestrator,
};

#[derive(Parser)]
#[command(name = "jobvenom")]
#[command(about = "Automated job search and application pipeline")]
struct Cli {
    /// Search query
    #[arg(default_value = "Software Engineer")]
    query: String,

    /// Search location
    #[arg(default_value = "Remote")]
    location: String,

    /// Minimum match score required to apply
    #[arg(long)]
    min_score: Option<u8>,

    /// Resume template type used for tailored documents
    #[arg(long)]
    template: Option<String>,

    /// Skip the human review session and apply directly
    #[arg(long)]
    no_review: bool,

    /// Path to the candidate profile YAML
    #[arg(long)]
    profile: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(min_score) = cli.min_score {
        config.workflow.min_match_score = min_score;
    }
    if let Some(template) = &cli.template {
        config.workflow.template_type = template.clone();
    }
    if cli.no_review {
        config.workflow.review_enabled = false;
    }
    if let Some(profile_path) = &cli.profile {
        config.paths.profile_path = profile_path.clone();
    }

    // profile load failure is fatal before any posting is processed
    let profile = CandidateProfile::load(&config.paths.profile_path)
        .context("Failed to load user profile")?;

    info!(
        candidate = %profile.personal_information.full_name,
        query = %cli.query,
        location = %cli.location,
        min_score = config.workflow.min_match_score,
        "starting jobvenom"
    );

    let invoker = Arc::new(build_invoker(&config)?);

    let scout = SearchApiScout::new(&config.search)?;
    let analyst = LlmAnalyst::new(Arc::clone(&invoker))?;
    let applier = BrowserAgentApplier::new(&config.applier)?;

    let mut orchestrator = WorkflowOrchestrator::new(
        Box::new(scout),
        Box::new(analyst),
        Box::new(applier),
        profile,
        config.workflow.clone(),
    );

    if config.workflow.review_enabled {
        let templates = TemplateStore::new(config.paths.templates_dir.clone())?;
        orchestrator = orchestrator.with_review(ReviewSession {
            pipeline: ContentTailoringPipeline::new(Arc::clone(&invoker), templates),
            gate: Box::new(ConsoleGate),
            compiler: Some(DocumentCompiler::new(config.paths.output_dir.clone())),
        });
    }

    if let Some(database_path) = &config.paths.database_path {
        match ApplicationTracker::new(database_path).await {
            Ok(tracker) => orchestrator = orchestrator.with_tracker(tracker),
            Err(err) => warn!(error = %err, "application tracker disabled"),
        }
    }

    let stats = orchestrator.run(&cli.query, &cli.location).await?;

    println!("\n================ RUN SUMMARY ================");
    println!("  Total jobs found:  {}", stats.total_jobs);
    println!("  Analyzed:          {}", stats.analyzed);
    println!("  Applied:           {}", stats.applied);
    println!("  Skipped:           {}", stats.skipped);
    println!("=============================================");

    Ok(())
}

/// Build the provider fallback chain in configured order: the mandatory
/// primary Groq credential, the optional fallback Groq credential, then
/// OpenRouter.
fn build_invoker(config: &AppConfig) -> Result<GenerativeInvoker> {
    let providers = &config.providers;

    let mut invoker = GenerativeInvoker::new(Box::new(HttpChatProvider::groq(
        "groq-primary",
        &providers.groq_api_key,
        &providers.groq_model,
    )?));

    if let Some(fallback_key) = &providers.groq_api_key_fallback {
        invoker = invoker.with_fallback(Box::new(HttpChatProvider::groq(
            "groq-fallback",
            fallback_key,
            &providers.groq_model,
        )?));
    }

    if let Some(openrouter_key) = &providers.openrouter_api_key {
        invoker = invoker.with_fallback(Box::new(HttpChatProvider::openrouter(
            "openrouter",
            openrouter_key,
            &providers.openrouter_model,
        )?));
    }

    info!(providers = ?invoker.provider_names(), "generative fallback chain ready");
    Ok(invoker)
}
