// src/pipeline/tailoring.rs
//! Turns (profile, job analysis, optional feedback) into tailored content

use anyhow::{Context, Result};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::warn;

use crate::llm::{GenerationRequest, GenerativeInvoker};
use crate::types::{
    CandidateProfile, EducationEntry, ExperienceEntry, JobAnalysis, ProjectEntry, TailoredContent,
    TailoringRequest,
};
use crate::utils;

use super::template_store::TemplateStore;

const TAILOR_SYSTEM_PROMPT: &str = "You are an ATS resume expert. Output only valid JSON.";
const DEFAULT_EXPERIENCE_LEVEL: &str = "mid-senior";
const TAILOR_TEMPERATURE: f32 = 0.3;

// Provider payload bound for the embedded profile.
const MAX_PROFILE_PROMPT_CHARS: usize = 3000;

/// Advisory score returned when scoring cannot be computed.
const NEUTRAL_SCORE: u8 = 50;

pub struct ContentTailoringPipeline {
    invoker: Arc<GenerativeInvoker>,
    templates: TemplateStore,
}

impl ContentTailoringPipeline {
    pub fn new(invoker: Arc<GenerativeInvoker>, templates: TemplateStore) -> Self {
        Self { invoker, templates }
    }

    /// Deterministic projection of the analysis; no generative call.
    /// `must_have` and `keywords` both default to the analysed tech stack.
    pub fn extract_requirements(&self, analysis: &JobAnalysis) -> TailoringRequest {
        TailoringRequest {
            role: analysis.role.clone(),
            company: analysis.company.clone(),
            must_have: analysis.tech_stack.clone(),
            keywords: analysis.tech_stack.clone(),
            matching_skills: analysis.matching_skills.clone(),
            missing_skills: analysis.missing_skills.clone(),
            experience_level: DEFAULT_EXPERIENCE_LEVEL.to_string(),
            feedback: None,
        }
    }

    /// Generate tailored content for one request. Degrades to the base
    /// profile content when every provider fails; identity and education are
    /// back-filled from the profile when the generator omits them.
    pub async fn tailor(
        &self,
        profile: &CandidateProfile,
        request: &TailoringRequest,
    ) -> Result<TailoredContent> {
        let profile_json =
            serde_json::to_string_pretty(profile).context("Failed to serialize profile")?;
        let profile_text = utils::truncate_chars(&profile_json, MAX_PROFILE_PROMPT_CHARS);

        let fallback = serde_json::to_value(TailoredContent::from_profile(profile))
            .context("Failed to build fallback payload")?;

        let generation = GenerationRequest {
            system: TAILOR_SYSTEM_PROMPT.to_string(),
            prompt: build_tailor_prompt(profile_text, request),
            temperature: TAILOR_TEMPERATURE,
        };

        let generated = self.invoker.generate_json(&generation, fallback).await;

        let mut content = match serde_json::from_value::<TailoredContent>(generated) {
            Ok(content) => content,
            Err(err) => {
                warn!(error = %err, "generated content had unexpected shape, keeping base profile content");
                let mut base = TailoredContent::from_profile(profile);
                base.tailoring_notes = format!("Generated content had unexpected shape: {}", err);
                base
            }
        };

        content.backfill_from(profile);
        Ok(content)
    }

    /// Fill the named template with the content fields. `None` means there is
    /// no renderable output; callers must check before compiling.
    pub fn render(&self, content: &TailoredContent, template_type: &str) -> Result<Option<String>> {
        let Some(template) = self.templates.get_template_by_type(template_type) else {
            warn!(
                template_type,
                available = ?self.templates.list_templates(),
                "no template found, skipping render"
            );
            return Ok(None);
        };

        let source = template.source()?;
        let values = placeholder_values(content);
        Ok(Some(TemplateStore::fill_placeholders(&source, &values)))
    }

    /// Keyword-coverage compatibility score against the required terms.
    /// Scoring is advisory and never fails the pipeline.
    pub fn score(&self, content: &TailoredContent, request: &TailoringRequest) -> u8 {
        match keyword_coverage(content, &request.must_have) {
            Ok(score) => score,
            Err(err) => {
                warn!(error = %err, "scoring failed, returning neutral default");
                NEUTRAL_SCORE
            }
        }
    }
}

fn keyword_coverage(content: &TailoredContent, required: &BTreeSet<String>) -> Result<u8> {
    if required.is_empty() {
        return Ok(NEUTRAL_SCORE);
    }

    let haystack = serde_json::to_string(content)
        .context("Failed to serialize content for scoring")?
        .to_lowercase();

    let hits = required
        .iter()
        .filter(|term| haystack.contains(&term.to_lowercase()))
        .count();

    Ok(((hits * 100) / required.len()).min(100) as u8)
}

fn join_terms(terms: &BTreeSet<String>) -> String {
    terms.iter().cloned().collect::<Vec<_>>().join(", ")
}

fn build_tailor_prompt(profile_text: &str, request: &TailoringRequest) -> String {
    let feedback_instruction = match request.feedback.as_deref() {
        Some(feedback) if !feedback.trim().is_empty() => {
            format!("\nADDRESS THIS FEEDBACK:\n{}\n", feedback)
        }
        _ => String::new(),
    };

    format!(
        r#"Tailor this resume for the job. Make it ATS-optimized.

JOB:
- Role: {role}
- Company: {company}
- Keywords: {keywords}
- Must Have: {must_have}
- Experience Level: {experience_level}

PROFILE:
{profile}
{feedback}
INSTRUCTIONS:
1. Write a compelling 2-3 sentence summary targeting this role
2. Rewrite experience bullets to highlight relevant achievements
3. Prioritize matching skills at the top
4. Use action verbs and quantified results
5. Include keywords naturally throughout

Return ONLY valid JSON with this structure:
{{
    "personal_information": {{"full_name": "...", "email": "...", "phone": "...", "location": "...", "linkedin": "...", "github": "..."}},
    "summary": "Tailored professional summary",
    "skills": {{
        "primary": ["most relevant skills"],
        "secondary": ["other skills"],
        "tools": ["relevant tools/tech"]
    }},
    "experience": [
        {{
            "company": "...",
            "title": "...",
            "dates": "...",
            "location": "...",
            "highlights": ["Tailored bullet 1", "Tailored bullet 2"]
        }}
    ],
    "projects": [{{"name": "...", "description": "...", "technologies": ["..."]}}],
    "education": [{{"institution": "...", "degree": "...", "field": "...", "dates": "..."}}],
    "tailoring_notes": "Key changes made for this role"
}}"#,
        role = request.role,
        company = request.company,
        keywords = join_terms(&request.keywords),
        must_have = join_terms(&request.must_have),
        experience_level = request.experience_level,
        profile = profile_text,
        feedback = feedback_instruction,
    )
}

// ===== Placeholder Values =====

fn placeholder_values(content: &TailoredContent) -> HashMap<String, String> {
    let info = &content.personal_information;
    let mut values = HashMap::new();

    values.insert("full_name".to_string(), info.full_name.clone());
    values.insert("email".to_string(), info.email.clone());
    values.insert("phone".to_string(), info.phone.clone());
    values.insert("location".to_string(), info.location.clone());
    values.insert("linkedin".to_string(), info.linkedin.clone());
    values.insert("github".to_string(), info.github.clone());
    values.insert("summary".to_string(), content.summary.clone());
    values.insert(
        "skills_primary".to_string(),
        content.skills.primary.join(", "),
    );
    values.insert(
        "skills_secondary".to_string(),
        content.skills.secondary.join(", "),
    );
    values.insert("skills_tools".to_string(), content.skills.tools.join(", "));
    values.insert(
        "experience".to_string(),
        format_experience(&content.experience),
    );
    values.insert("projects".to_string(), format_projects(&content.projects));
    values.insert(
        "education".to_string(),
        format_education(&content.education),
    );
    values.insert(
        "tailoring_notes".to_string(),
        content.tailoring_notes.clone(),
    );

    values
}

fn format_experience(entries: &[ExperienceEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!(
            "== {}, {} ({})\n",
            entry.title, entry.company, entry.dates
        ));
        for highlight in &entry.highlights {
            out.push_str(&format!("- {}\n", highlight));
        }
        out.push('\n');
    }
    out
}

fn format_projects(entries: &[ProjectEntry]) -> String {
    entries
        .iter()
        .map(|p| format!("- {}: {}", p.name, p.description))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_education(entries: &[EducationEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("- {}, {} ({})", e.degree, e.institution, e.dates))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::invoker::testing::ScriptedProvider;
    use crate::llm::ProviderError;
    use crate::types::{PersonalInfo, SkillGroups};
    use std::path::PathBuf;

    fn analysis() -> JobAnalysis {
        serde_json::from_value(serde_json::json!({
            "role": "Senior Rust Developer",
            "company": "TechCorp",
            "tech_stack": ["Rust", "Tokio", "PostgreSQL"],
            "matching_skills": ["Rust"],
            "missing_skills": ["Tokio"],
            "match_score": 85,
            "analysis": "Strong match"
        }))
        .unwrap()
    }

    fn profile() -> CandidateProfile {
        CandidateProfile {
            personal_information: PersonalInfo {
                full_name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                ..Default::default()
            },
            summary: "Backend engineer".to_string(),
            skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            education: vec![EducationEntry {
                institution: "MIT".to_string(),
                degree: "BSc".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn pipeline_with(provider: ScriptedProvider) -> ContentTailoringPipeline {
        let invoker = Arc::new(GenerativeInvoker::new(Box::new(provider)));
        let templates = TemplateStore::new(PathBuf::from("/nonexistent/templates")).unwrap();
        ContentTailoringPipeline::new(invoker, templates)
    }

    #[test]
    fn test_extract_requirements_defaults_to_tech_stack() {
        let provider = ScriptedProvider::new("p", vec![]);
        let pipeline = pipeline_with(provider);

        let request = pipeline.extract_requirements(&analysis());

        assert_eq!(request.must_have, analysis().tech_stack);
        assert_eq!(request.keywords, analysis().tech_stack);
        assert_eq!(request.experience_level, "mid-senior");
        assert!(request.feedback.is_none());
    }

    #[tokio::test]
    async fn test_tailor_backfills_identity_and_education() {
        let generated = r#"```json
{"summary": "Rust expert", "skills": {"primary": ["Rust"]}, "tailoring_notes": "Focused on Rust"}
```"#;
        let pipeline = pipeline_with(ScriptedProvider::new("p", vec![Ok(generated.to_string())]));

        let request = pipeline.extract_requirements(&analysis());
        let content = pipeline.tailor(&profile(), &request).await.unwrap();

        assert_eq!(content.summary, "Rust expert");
        assert_eq!(content.personal_information.full_name, "Jane Doe");
        assert_eq!(content.education[0].institution, "MIT");
    }

    #[tokio::test]
    async fn test_tailor_degrades_to_profile_on_provider_failure() {
        let pipeline = pipeline_with(ScriptedProvider::new(
            "p",
            vec![Err(ProviderError::Unavailable("down".into()))],
        ));

        let request = pipeline.extract_requirements(&analysis());
        let content = pipeline.tailor(&profile(), &request).await.unwrap();

        assert_eq!(content.summary, "Backend engineer");
        assert!(content.tailoring_notes.starts_with("Tailoring failed:"));
        assert_eq!(content.personal_information.full_name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_tailor_prompt_carries_feedback() {
        let provider = ScriptedProvider::new("p", vec![Ok("{}".to_string())]);
        let prompts = provider.prompt_log();
        let pipeline = pipeline_with(provider);

        let mut request = pipeline.extract_requirements(&analysis());
        request.feedback = Some("emphasize leadership".to_string());
        pipeline.tailor(&profile(), &request).await.unwrap();

        let recorded = prompts.lock().unwrap();
        assert!(recorded[0].contains("ADDRESS THIS FEEDBACK"));
        assert!(recorded[0].contains("emphasize leadership"));
    }

    #[test]
    fn test_score_counts_keyword_coverage() {
        let provider = ScriptedProvider::new("p", vec![]);
        let pipeline = pipeline_with(provider);
        let request = pipeline.extract_requirements(&analysis());

        let content = TailoredContent {
            summary: "Rust and Tokio services backed by PostgreSQL".to_string(),
            ..Default::default()
        };
        assert_eq!(pipeline.score(&content, &request), 100);

        let partial = TailoredContent {
            skills: SkillGroups {
                primary: vec!["Rust".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(pipeline.score(&partial, &request), 33);
    }

    #[test]
    fn test_score_neutral_when_no_requirements() {
        let provider = ScriptedProvider::new("p", vec![]);
        let pipeline = pipeline_with(provider);
        let request = TailoringRequest::default();

        assert_eq!(pipeline.score(&TailoredContent::default(), &request), 50);
    }

    #[test]
    fn test_render_returns_sentinel_without_template() {
        let provider = ScriptedProvider::new("p", vec![]);
        let pipeline = pipeline_with(provider);

        let rendered = pipeline
            .render(&TailoredContent::default(), "ats")
            .unwrap();
        assert!(rendered.is_none());
    }
}
