//! Automated job-search pipeline: discover postings, score them against a
//! candidate profile, tailor application material behind a human approval
//! gate, and submit applications through a browser automation agent.

pub mod approval;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod session;
pub mod tracker;
pub mod types;
pub mod utils;
pub mod workflow;

pub use approval::{ApprovalGate, ConsoleGate, ReviewRequest};
pub use config::{AppConfig, WorkflowConfig};
pub use llm::{ChatProvider, GenerationRequest, GenerativeInvoker, HttpChatProvider, ProviderError};
pub use pipeline::{ContentTailoringPipeline, DocumentCompiler, TemplateStore};
pub use session::{ResumeAgentSession, SessionOutcome, SessionState};
pub use tracker::ApplicationTracker;
pub use types::{
    ApprovalDecision, CandidateProfile, JobAnalysis, JobPosting, RunStatistics, TailoredContent,
    TailoringRequest,
};
pub use workflow::{
    BrowserAgentApplier, JobAnalyst, JobApplier, JobScout, LlmAnalyst, ReviewSession,
    SearchApiScout, WorkflowOrchestrator,
};
