// src/workflow/applier.rs
//! Application submission through the browser automation agent

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::config::ApplierConfig;
use crate::types::CandidateProfile;

const APPLY_ENDPOINT: &str = "/apply";
const APPLY_TIMEOUT_SECS: u64 = 600;

// The automation agent fills the form from the profile and escalates to its
// human channel for anything the profile cannot answer.
const APPLY_INSTRUCTIONS: &str = "\
Navigate to the job URL and apply using the candidate profile data. \
Map name, email, phone and links from the profile onto the form fields. \
Upload the resume file when an upload field is present. \
Answer work-authorization questions as authorized, no sponsorship required. \
Never invent information: escalate to the human channel for any field the \
profile does not cover, and for login walls.";

/// Applier collaborator: owns a stateful automation session; a failure
/// isolates to one posting and is not retried within the run.
#[async_trait]
pub trait JobApplier: Send + Sync {
    async fn apply(&self, url: &str, profile: &CandidateProfile) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct ApplyResponse {
    status: String,
    #[serde(default)]
    detail: Option<String>,
}

/// Default applier: hands the submission task to an external browser agent
/// service over HTTP and waits for its verdict.
pub struct BrowserAgentApplier {
    client: reqwest::Client,
    base_url: String,
}

impl BrowserAgentApplier {
    pub fn new(config: &ApplierConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(APPLY_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.agent_url.clone(),
        })
    }
}

#[async_trait]
impl JobApplier for BrowserAgentApplier {
    async fn apply(&self, url: &str, profile: &CandidateProfile) -> Result<()> {
        let endpoint = format!("{}{}", self.base_url, APPLY_ENDPOINT);

        // the agent service consumes the profile as YAML
        let profile_yaml =
            serde_yaml::to_string(profile).context("Failed to serialize profile")?;

        let payload = serde_json::json!({
            "job_url": url,
            "profile": profile_yaml,
            "resume_path": profile.files.resume,
            "instructions": APPLY_INSTRUCTIONS,
        });

        info!(url, "starting application through browser agent");

        let response = self
            .client
            .post(&endpoint)
            .json(&payload)
            .send()
            .await
            .context("Failed to call browser agent service")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Browser agent returned status {}: {}", status, body);
        }

        let apply_response: ApplyResponse = response
            .json()
            .await
            .context("Failed to parse browser agent response")?;

        if apply_response.status == "success" {
            info!(url, "application sequence completed");
            Ok(())
        } else {
            anyhow::bail!(
                "Application failed: {}",
                apply_response
                    .detail
                    .unwrap_or(apply_response.status)
            )
        }
    }
}
