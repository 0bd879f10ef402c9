// src/workflow/scout.rs
//! Job discovery over an external search API

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::SearchConfig;
use crate::types::JobPosting;

/// Discovery collaborator: produces a finite, ordered posting sequence once
/// per run.
#[async_trait]
pub trait JobScout: Send + Sync {
    async fn discover(&self, query: &str, location: &str) -> Result<Vec<JobPosting>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    jobs_results: Vec<SearchJob>,
}

#[derive(Debug, Deserialize)]
struct SearchJob {
    #[serde(default)]
    title: String,
    #[serde(default)]
    company_name: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    share_link: Option<String>,
    #[serde(default)]
    apply_options: Vec<ApplyOption>,
}

#[derive(Debug, Deserialize)]
struct ApplyOption {
    link: String,
}

/// Queries a SerpApi-compatible job search endpoint and maps the results to
/// postings. Results without any usable link are dropped.
pub struct SearchApiScout {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    max_results: usize,
}

impl SearchApiScout {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            max_results: config.max_results,
        })
    }
}

#[async_trait]
impl JobScout for SearchApiScout {
    async fn discover(&self, query: &str, location: &str) -> Result<Vec<JobPosting>> {
        let url = format!("{}/search", self.base_url);

        info!(query, location, "searching for job postings");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("engine", "google_jobs"),
                ("q", query),
                ("location", location),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("Failed to call job search API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Job search failed with status {}: {}", status, body);
        }

        let search: SearchResponse = response
            .json()
            .await
            .context("Failed to parse job search response")?;

        let mut postings = Vec::new();
        for job in search.jobs_results {
            let link = job
                .apply_options
                .first()
                .map(|option| option.link.clone())
                .or(job.share_link);

            match link {
                Some(url) => postings.push(JobPosting::new(
                    &url,
                    &job.title,
                    &job.company_name,
                    &job.location,
                )),
                None => warn!(
                    title = %job.title,
                    company = %job.company_name,
                    "dropping search result without a link"
                ),
            }

            if postings.len() >= self.max_results {
                break;
            }
        }

        info!("Discovered {} job postings", postings.len());
        Ok(postings)
    }
}
