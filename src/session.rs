// src/session.rs
//! Per-job resume tailoring session
//!
//! An explicit state machine over the fixed operation set
//! {ExtractRequirements, Tailor, Score, RequestApproval, Render}; step
//! sequencing is deterministic, never delegated to a planner.

use anyhow::Result;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::approval::{ApprovalGate, ReviewRequest};
use crate::pipeline::{ContentTailoringPipeline, DocumentCompiler};
use crate::types::{CandidateProfile, JobAnalysis, TailoredContent};
use crate::utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Draft,
    Tailored,
    Scored,
    PendingApproval,
    Approved,
    Revise,
    Cancelled,
}

#[derive(Debug)]
pub struct RenderedDocument {
    pub source: String,
    pub artifact: Option<PathBuf>,
}

#[derive(Debug)]
pub enum SessionOutcome {
    Approved {
        content: TailoredContent,
        score: u8,
        document: Option<RenderedDocument>,
    },
    Cancelled,
    /// The configured revision cap was reached without approval; carries the
    /// last draft for inspection.
    RevisionLimit { content: TailoredContent, score: u8 },
}

/// `Draft -> Tailored -> Scored -> PendingApproval -> {Approved | Revise |
/// Cancelled}`; `Revise` loops back to `Tailored` carrying the reviewer's
/// feedback into the next tailoring pass.
pub struct ResumeAgentSession<'a> {
    pipeline: &'a ContentTailoringPipeline,
    gate: &'a mut dyn ApprovalGate,
    compiler: Option<&'a DocumentCompiler>,
    template_type: String,
    max_revisions: u32,
    state: SessionState,
}

impl<'a> ResumeAgentSession<'a> {
    pub fn new(
        pipeline: &'a ContentTailoringPipeline,
        gate: &'a mut dyn ApprovalGate,
        compiler: Option<&'a DocumentCompiler>,
        template_type: &str,
        max_revisions: u32,
    ) -> Self {
        Self {
            pipeline,
            gate,
            compiler,
            template_type: template_type.to_string(),
            max_revisions,
            state: SessionState::Draft,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub async fn run(
        &mut self,
        profile: &CandidateProfile,
        analysis: &JobAnalysis,
    ) -> Result<SessionOutcome> {
        let base_request = self.pipeline.extract_requirements(analysis);
        let mut feedback: Option<String> = None;
        let mut revisions: u32 = 0;

        loop {
            let mut request = base_request.clone();
            request.feedback = feedback.take();

            let content = self.pipeline.tailor(profile, &request).await?;
            self.state = SessionState::Tailored;

            let score = self.pipeline.score(&content, &request);
            self.state = SessionState::Scored;

            self.state = SessionState::PendingApproval;
            let decision = self.gate.review(&ReviewRequest {
                role: base_request.role.clone(),
                company: base_request.company.clone(),
                score,
                summary: content.summary.clone(),
                tailoring_notes: content.tailoring_notes.clone(),
            })?;

            if decision.cancelled {
                self.state = SessionState::Cancelled;
                info!(
                    role = %base_request.role,
                    company = %base_request.company,
                    "tailoring session cancelled by reviewer"
                );
                return Ok(SessionOutcome::Cancelled);
            }

            if decision.approved {
                self.state = SessionState::Approved;
                let document = self.render_document(&content, analysis);
                return Ok(SessionOutcome::Approved {
                    content,
                    score,
                    document,
                });
            }

            revisions += 1;
            if revisions > self.max_revisions {
                warn!(
                    max_revisions = self.max_revisions,
                    "revision limit reached without approval"
                );
                self.state = SessionState::Cancelled;
                return Ok(SessionOutcome::RevisionLimit { content, score });
            }

            self.state = SessionState::Revise;
            feedback = Some(decision.feedback);
        }
    }

    fn render_document(
        &self,
        content: &TailoredContent,
        analysis: &JobAnalysis,
    ) -> Option<RenderedDocument> {
        let source = match self.pipeline.render(content, &self.template_type) {
            Ok(Some(source)) => source,
            Ok(None) => {
                warn!(
                    template = %self.template_type,
                    "no renderable template, skipping document generation"
                );
                return None;
            }
            Err(err) => {
                warn!(error = %err, "render failed, skipping document generation");
                return None;
            }
        };

        let artifact = self.compiler.and_then(|compiler| {
            let stem = utils::output_stem(&analysis.company, &analysis.role);
            match compiler.compile(&source, &stem) {
                Ok(artifact) => artifact,
                Err(err) => {
                    warn!(error = %err, "document compilation failed");
                    None
                }
            }
        });

        Some(RenderedDocument { source, artifact })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::invoker::testing::ScriptedProvider;
    use crate::llm::GenerativeInvoker;
    use crate::pipeline::TemplateStore;
    use crate::types::{ApprovalDecision, PersonalInfo};
    use std::sync::Arc;

    struct ScriptedGate {
        decisions: Vec<ApprovalDecision>,
        reviews_seen: Vec<ReviewRequest>,
    }

    impl ScriptedGate {
        fn new(mut decisions: Vec<ApprovalDecision>) -> Self {
            decisions.reverse();
            Self {
                decisions,
                reviews_seen: Vec::new(),
            }
        }
    }

    impl ApprovalGate for ScriptedGate {
        fn review(&mut self, request: &ReviewRequest) -> Result<ApprovalDecision> {
            self.reviews_seen.push(request.clone());
            Ok(self
                .decisions
                .pop()
                .unwrap_or_else(ApprovalDecision::cancel))
        }
    }

    fn analysis() -> JobAnalysis {
        serde_json::from_value(serde_json::json!({
            "role": "Senior Rust Developer",
            "company": "TechCorp",
            "tech_stack": ["Rust"],
            "match_score": 85
        }))
        .unwrap()
    }

    fn profile() -> CandidateProfile {
        CandidateProfile {
            personal_information: PersonalInfo {
                full_name: "Jane Doe".to_string(),
                ..Default::default()
            },
            summary: "Backend engineer".to_string(),
            ..Default::default()
        }
    }

    fn pipeline_with(provider: ScriptedProvider) -> ContentTailoringPipeline {
        let invoker = Arc::new(GenerativeInvoker::new(Box::new(provider)));
        let templates = TemplateStore::new(std::path::PathBuf::from("/nonexistent")).unwrap();
        ContentTailoringPipeline::new(invoker, templates)
    }

    const TAILORED_JSON: &str = r#"{"summary": "Rust expert summary", "tailoring_notes": "notes"}"#;

    #[tokio::test]
    async fn test_reject_then_approve_tailors_twice_with_feedback() {
        let provider = ScriptedProvider::new(
            "p",
            vec![Ok(TAILORED_JSON.to_string()), Ok(TAILORED_JSON.to_string())],
        );
        let calls = provider.call_counter();
        let prompts = provider.prompt_log();
        let pipeline = pipeline_with(provider);

        let mut gate = ScriptedGate::new(vec![
            ApprovalDecision::edit("emphasize leadership"),
            ApprovalDecision::approve(),
        ]);

        let mut session = ResumeAgentSession::new(&pipeline, &mut gate, None, "ats", 3);
        let outcome = session.run(&profile(), &analysis()).await.unwrap();

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
        let recorded = prompts.lock().unwrap();
        assert!(!recorded[0].contains("emphasize leadership"));
        assert!(recorded[1].contains("emphasize leadership"));
        assert!(matches!(outcome, SessionOutcome::Approved { .. }));
        assert_eq!(session.state(), SessionState::Approved);
    }

    #[tokio::test]
    async fn test_quit_cancels_session_after_one_tailor() {
        let provider = ScriptedProvider::new("p", vec![Ok(TAILORED_JSON.to_string())]);
        let calls = provider.call_counter();
        let pipeline = pipeline_with(provider);

        let mut gate = ScriptedGate::new(vec![ApprovalDecision::cancel()]);
        let mut session = ResumeAgentSession::new(&pipeline, &mut gate, None, "ats", 3);
        let outcome = session.run(&profile(), &analysis()).await.unwrap();

        assert!(matches!(outcome, SessionOutcome::Cancelled));
        assert_eq!(session.state(), SessionState::Cancelled);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_revision_limit_terminates_session() {
        let provider = ScriptedProvider::new(
            "p",
            vec![Ok(TAILORED_JSON.to_string()), Ok(TAILORED_JSON.to_string())],
        );
        let calls = provider.call_counter();
        let pipeline = pipeline_with(provider);

        let mut gate = ScriptedGate::new(vec![
            ApprovalDecision::reject(),
            ApprovalDecision::reject(),
            ApprovalDecision::reject(),
        ]);

        let mut session = ResumeAgentSession::new(&pipeline, &mut gate, None, "ats", 1);
        let outcome = session.run(&profile(), &analysis()).await.unwrap();

        assert!(matches!(outcome, SessionOutcome::RevisionLimit { .. }));
        // initial pass plus exactly one revision
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_review_presents_score_and_summary() {
        let provider = ScriptedProvider::new("p", vec![Ok(TAILORED_JSON.to_string())]);
        let pipeline = pipeline_with(provider);

        let mut gate = ScriptedGate::new(vec![ApprovalDecision::approve()]);
        let mut session = ResumeAgentSession::new(&pipeline, &mut gate, None, "ats", 3);
        session.run(&profile(), &analysis()).await.unwrap();

        assert_eq!(gate.reviews_seen.len(), 1);
        let review = &gate.reviews_seen[0];
        assert_eq!(review.role, "Senior Rust Developer");
        assert_eq!(review.company, "TechCorp");
        assert_eq!(review.summary, "Rust expert summary");
    }
}
