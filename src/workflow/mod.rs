// src/workflow/mod.rs
//! End-to-end orchestration of the job application workflow

pub mod analyst;
pub mod applier;
pub mod scout;

pub use analyst::{JobAnalyst, LlmAnalyst};
pub use applier::{BrowserAgentApplier, JobApplier};
pub use scout::{JobScout, SearchApiScout};

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::approval::ApprovalGate;
use crate::config::WorkflowConfig;
use crate::pipeline::{ContentTailoringPipeline, DocumentCompiler};
use crate::session::{ResumeAgentSession, SessionOutcome};
use crate::tracker::ApplicationTracker;
use crate::types::{CandidateProfile, JobAnalysis, JobPosting, RunStatistics};

/// Everything needed to run the optional human review step per posting.
pub struct ReviewSession {
    pub pipeline: ContentTailoringPipeline,
    pub gate: Box<dyn ApprovalGate>,
    pub compiler: Option<DocumentCompiler>,
}

/// Drives the whole run: discovery once, then a strictly sequential pass over
/// the postings with per-job failure isolation. The only state shared across
/// iterations is the statistics and the read-only profile.
pub struct WorkflowOrchestrator {
    scout: Box<dyn JobScout>,
    analyst: Box<dyn JobAnalyst>,
    applier: Box<dyn JobApplier>,
    review: Option<ReviewSession>,
    tracker: Option<ApplicationTracker>,
    profile: CandidateProfile,
    config: WorkflowConfig,
    stats: RunStatistics,
}

impl WorkflowOrchestrator {
    pub fn new(
        scout: Box<dyn JobScout>,
        analyst: Box<dyn JobAnalyst>,
        applier: Box<dyn JobApplier>,
        profile: CandidateProfile,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            scout,
            analyst,
            applier,
            review: None,
            tracker: None,
            profile,
            config,
            stats: RunStatistics::default(),
        }
    }

    pub fn with_review(mut self, review: ReviewSession) -> Self {
        self.review = Some(review);
        self
    }

    pub fn with_tracker(mut self, tracker: ApplicationTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    pub async fn run(&mut self, query: &str, location: &str) -> Result<RunStatistics> {
        info!(query, location, "starting job application workflow");

        let postings = self
            .scout
            .discover(query, location)
            .await
            .context("Job discovery failed")?;

        self.stats = RunStatistics {
            total_jobs: postings.len() as u32,
            ..Default::default()
        };

        if postings.is_empty() {
            info!("No jobs found");
            return Ok(self.stats.clone());
        }

        let resume_text = self.profile.to_resume_text();
        let total = postings.len();

        for (index, posting) in postings.iter().enumerate() {
            info!(job = index + 1, total, url = %posting.url, "processing job");
            self.record_posting(posting).await;

            let analysis = match self.analyst.analyze(&posting.url, &resume_text).await {
                Ok(analysis) => analysis,
                Err(err) => {
                    error!(url = %posting.url, error = %err, "analysis failed");
                    continue;
                }
            };
            self.stats.analyzed += 1;
            self.record_analysis(posting, &analysis).await;

            if analysis.match_score < self.config.min_match_score {
                info!(
                    score = analysis.match_score,
                    threshold = self.config.min_match_score,
                    company = %analysis.company,
                    role = %analysis.role,
                    "skipping low-score posting"
                );
                self.stats.skipped += 1;
                continue;
            }

            info!(
                score = analysis.match_score,
                company = %analysis.company,
                role = %analysis.role,
                "match found, preparing application"
            );

            if !self.run_review(&analysis).await {
                continue;
            }

            match self.applier.apply(&posting.url, &self.profile).await {
                Ok(()) => {
                    info!(url = %posting.url, "application completed");
                    self.stats.applied += 1;
                    self.record_application(posting, "applied").await;
                }
                Err(err) => {
                    error!(url = %posting.url, error = %err, "application failed");
                    self.record_application(posting, "failed").await;
                }
            }

            // spacing between submissions so back-to-back automation does not
            // get rate limited or flagged
            self.pause().await;
        }

        info!(
            total_jobs = self.stats.total_jobs,
            analyzed = self.stats.analyzed,
            applied = self.stats.applied,
            skipped = self.stats.skipped,
            "workflow finished"
        );
        Ok(self.stats.clone())
    }

    /// Run the review session when one is configured. Returns whether the
    /// workflow should proceed to the applier for this posting.
    async fn run_review(&mut self, analysis: &JobAnalysis) -> bool {
        let Some(review) = self.review.as_mut() else {
            return true;
        };

        let mut session = ResumeAgentSession::new(
            &review.pipeline,
            review.gate.as_mut(),
            review.compiler.as_ref(),
            &self.config.template_type,
            self.config.max_revisions,
        );

        let outcome = match session.run(&self.profile, analysis).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "tailoring session failed");
                return false;
            }
        };

        match outcome {
            SessionOutcome::Approved { document, .. } => {
                if let Some(document) = &document {
                    if let Some(artifact) = &document.artifact {
                        info!(artifact = %artifact.display(), "tailored document ready");
                    }
                }
                true
            }
            SessionOutcome::Cancelled => {
                warn!("tailoring cancelled by reviewer, skipping application");
                false
            }
            SessionOutcome::RevisionLimit { .. } => {
                warn!("revision limit reached without approval, skipping application");
                false
            }
        }
    }

    async fn pause(&self) {
        if self.config.pause_secs > 0 {
            tokio::time::sleep(std::time::Duration::from_secs(self.config.pause_secs)).await;
        }
    }

    // Tracker writes are best effort and never abort the run.

    async fn record_posting(&self, posting: &JobPosting) {
        if let Some(tracker) = &self.tracker {
            if let Err(err) = tracker.record_job(posting).await {
                warn!(error = %err, "failed to record discovered job");
            }
        }
    }

    async fn record_analysis(&self, posting: &JobPosting, analysis: &JobAnalysis) {
        if let Some(tracker) = &self.tracker {
            if let Err(err) = tracker.record_analysis(&posting.url, analysis).await {
                warn!(error = %err, "failed to record job analysis");
            }
        }
    }

    async fn record_application(&self, posting: &JobPosting, status: &str) {
        if let Some(tracker) = &self.tracker {
            if let Err(err) = tracker.record_application(&posting.url, status).await {
                warn!(error = %err, "failed to record application outcome");
            }
        }
    }
}
