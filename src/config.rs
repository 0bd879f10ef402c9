// src/config.rs
//! Explicit application configuration, constructed once at startup
//!
//! Loaded from environment variables in `main` and passed into constructors;
//! nothing reads ambient process-wide state after startup.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

const DEFAULT_SEARCH_BASE_URL: &str = "https://serpapi.com";
const DEFAULT_BROWSER_AGENT_URL: &str = "http://127.0.0.1:7788";
const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_OPENROUTER_MODEL: &str = "qwen/qwen3-coder:free";

pub const DEFAULT_MIN_MATCH_SCORE: u8 = 70;
const DEFAULT_PAUSE_SECS: u64 = 2;
const DEFAULT_MAX_REVISIONS: u32 = 3;
const DEFAULT_MAX_SEARCH_RESULTS: usize = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub providers: ProviderConfig,
    pub search: SearchConfig,
    pub applier: ApplierConfig,
    pub paths: PathsConfig,
    pub workflow: WorkflowConfig,
}

/// Ordered generative credentials. The primary key is mandatory; the others
/// extend the fallback chain.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub groq_api_key: String,
    pub groq_api_key_fallback: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub groq_model: String,
    pub openrouter_model: String,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub base_url: String,
    pub api_key: String,
    pub max_results: usize,
}

#[derive(Debug, Clone)]
pub struct ApplierConfig {
    pub agent_url: String,
}

#[derive(Debug, Clone)]
pub struct PathsConfig {
    pub profile_path: PathBuf,
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub min_match_score: u8,
    pub pause_secs: u64,
    pub max_revisions: u32,
    pub template_type: String,
    pub review_enabled: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            min_match_score: DEFAULT_MIN_MATCH_SCORE,
            pause_secs: DEFAULT_PAUSE_SECS,
            max_revisions: DEFAULT_MAX_REVISIONS,
            template_type: "ats".to_string(),
            review_enabled: true,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let base_dir = std::env::current_dir().context("Failed to get current directory")?;

        let providers = ProviderConfig {
            groq_api_key: required_env("GROQ_API_KEY")?,
            groq_api_key_fallback: optional_env("GROQ_API_KEY_FALLBACK"),
            openrouter_api_key: optional_env("OPENROUTER_API_KEY"),
            groq_model: env_or("GROQ_MODEL", DEFAULT_GROQ_MODEL),
            openrouter_model: env_or("OPENROUTER_MODEL", DEFAULT_OPENROUTER_MODEL),
        };

        let search = SearchConfig {
            base_url: env_or("SEARCH_API_URL", DEFAULT_SEARCH_BASE_URL),
            api_key: required_env("SERPAPI_API_KEY")?,
            max_results: DEFAULT_MAX_SEARCH_RESULTS,
        };

        let applier = ApplierConfig {
            agent_url: env_or("BROWSER_AGENT_URL", DEFAULT_BROWSER_AGENT_URL),
        };

        let paths = PathsConfig {
            profile_path: base_dir.join("data").join("user_profile.yaml"),
            templates_dir: base_dir.join("templates"),
            output_dir: base_dir.join("output"),
            database_path: Some(base_dir.join("data").join("applications.db")),
        };

        info!("Configuration loaded");

        Ok(Self {
            providers,
            search,
            applier,
            paths,
            workflow: WorkflowConfig::default(),
        })
    }
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| anyhow::anyhow!("{} environment variable not set", name))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
