// src/workflow/analyst.rs
//! Posting analysis: fetch the page, extract the text, score the fit

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::info;

use crate::llm::{GenerationRequest, GenerativeInvoker};
use crate::types::JobAnalysis;
use crate::utils;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const ANALYST_SYSTEM_PROMPT: &str =
    "You are a job-fit analyst. Compare a job posting with a candidate resume. Output only valid JSON.";
const ANALYST_TEMPERATURE: f32 = 0.2;

// Page text bound for the analysis prompt.
const MAX_POSTING_CHARS: usize = 6000;

/// Analyst collaborator: may fail, and a failure isolates to one posting.
#[async_trait]
pub trait JobAnalyst: Send + Sync {
    async fn analyze(&self, url: &str, resume_text: &str) -> Result<JobAnalysis>;
}

/// Default analyst: extracts the posting text from the page HTML and asks the
/// generative chain for a structured fit analysis.
pub struct LlmAnalyst {
    client: reqwest::Client,
    invoker: Arc<GenerativeInvoker>,
}

impl LlmAnalyst {
    pub fn new(invoker: Arc<GenerativeInvoker>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, invoker })
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch job posting")?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP error fetching job posting: {}", response.status());
        }

        response
            .text()
            .await
            .context("Failed to read job posting body")
    }
}

#[async_trait]
impl JobAnalyst for LlmAnalyst {
    async fn analyze(&self, url: &str, resume_text: &str) -> Result<JobAnalysis> {
        info!(url, "analyzing job posting");

        let html = self.fetch_page(url).await?;
        let posting_text = extract_posting_text(&html);

        if posting_text.trim().is_empty() {
            anyhow::bail!("No readable content extracted from {}", url);
        }

        let generation = GenerationRequest {
            system: ANALYST_SYSTEM_PROMPT.to_string(),
            prompt: build_analysis_prompt(url, &posting_text, resume_text),
            temperature: ANALYST_TEMPERATURE,
        };

        let value = self
            .invoker
            .invoke(&generation)
            .await
            .map_err(|err| anyhow!("Job analysis generation failed: {}", err))?;

        let analysis: JobAnalysis =
            serde_json::from_value(value).context("Analyst returned unexpected JSON shape")?;

        info!(
            role = %analysis.role,
            company = %analysis.company,
            score = analysis.match_score,
            "job analysis completed"
        );
        Ok(analysis)
    }
}

/// Pull title and description text out of the page. Tries job-board specific
/// selectors first, then generic containers, then the whole body.
fn extract_posting_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut sections = Vec::new();

    let title_selectors = [
        "h1.top-card-layout__title",
        "h1[data-test-id='job-title']",
        ".jobs-unified-top-card__job-title",
        "h1",
    ];
    if let Some(title) = select_first_text(&document, &title_selectors) {
        sections.push(title);
    }

    let body_selectors = [
        ".description__text",
        ".jobs-description-content",
        ".job-description",
        "article",
        "main",
        "body",
    ];
    if let Some(body) = select_first_text(&document, &body_selectors) {
        sections.push(body);
    }

    let text = sections.join("\n");
    utils::truncate_chars(&text, MAX_POSTING_CHARS).to_string()
}

fn select_first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    for css in selectors {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = element
                .text()
                .map(str::trim)
                .filter(|chunk| !chunk.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn build_analysis_prompt(url: &str, posting_text: &str, resume_text: &str) -> String {
    format!(
        r#"Analyze how well this candidate fits the job posting.

JOB POSTING ({url}):
{posting_text}

CANDIDATE RESUME:
{resume_text}

Return ONLY valid JSON with this structure:
{{
    "role": "job title",
    "company": "company name",
    "salary": "salary range or null",
    "tech_stack": ["required technologies"],
    "matching_skills": ["skills the candidate has"],
    "missing_skills": ["skills the candidate lacks"],
    "match_score": 0,
    "analysis": "2-3 sentence fit assessment"
}}

The match_score is an integer between 0 and 100."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_posting_text_prefers_specific_selectors() {
        let html = r#"
            <html><body>
                <h1>Senior Rust Developer</h1>
                <article>Build services in Rust and Tokio.</article>
            </body></html>
        "#;
        let text = extract_posting_text(html);
        assert!(text.contains("Senior Rust Developer"));
        assert!(text.contains("Build services in Rust and Tokio."));
    }

    #[test]
    fn test_extract_posting_text_empty_document() {
        assert_eq!(extract_posting_text("<html><body></body></html>"), "");
    }

    #[test]
    fn test_analysis_prompt_embeds_resume_and_posting() {
        let prompt = build_analysis_prompt("https://jobs.example/1", "posting", "resume");
        assert!(prompt.contains("https://jobs.example/1"));
        assert!(prompt.contains("posting"));
        assert!(prompt.contains("resume"));
        assert!(prompt.contains("match_score"));
    }
}
