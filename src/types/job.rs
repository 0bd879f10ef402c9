// src/types/job.rs
//! Job postings, analyst output and per-run counters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// A discovered job posting. Created once by the discovery collaborator and
/// consumed within a single workflow iteration; the URL is the unique key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub url: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub discovered_at: DateTime<Utc>,
}

impl JobPosting {
    pub fn new(url: &str, title: &str, company: &str, location: &str) -> Self {
        Self {
            url: url.to_string(),
            title: title.to_string(),
            company: company.to_string(),
            location: location.to_string(),
            discovered_at: Utc::now(),
        }
    }
}

/// Structured fit analysis produced once per posting by the analyst.
///
/// `match_score` is clamped to [0, 100] at the deserialization boundary so an
/// out-of-range value from the analyst never propagates raw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAnalysis {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub tech_stack: BTreeSet<String>,
    #[serde(default)]
    pub matching_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default, deserialize_with = "clamped_score")]
    pub match_score: u8,
    #[serde(default)]
    pub analysis: String,
}

fn clamped_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(raw.clamp(0.0, 100.0).round() as u8)
}

/// Aggregate counters for one workflow run. Owned and mutated exclusively by
/// the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    pub total_jobs: u32,
    pub analyzed: u32,
    pub applied: u32,
    pub skipped: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_score_clamped_high() {
        let analysis: JobAnalysis = serde_json::from_str(r#"{"match_score": 150}"#).unwrap();
        assert_eq!(analysis.match_score, 100);
    }

    #[test]
    fn test_match_score_clamped_low() {
        let analysis: JobAnalysis = serde_json::from_str(r#"{"match_score": -5}"#).unwrap();
        assert_eq!(analysis.match_score, 0);
    }

    #[test]
    fn test_match_score_accepts_fractional_values() {
        let analysis: JobAnalysis = serde_json::from_str(r#"{"match_score": 84.6}"#).unwrap();
        assert_eq!(analysis.match_score, 85);
    }

    #[test]
    fn test_tech_stack_deduplicates() {
        let analysis: JobAnalysis =
            serde_json::from_str(r#"{"match_score": 80, "tech_stack": ["Rust", "Rust", "SQL"]}"#)
                .unwrap();
        assert_eq!(analysis.tech_stack.len(), 2);
    }
}
