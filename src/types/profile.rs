// src/types/profile.rs
//! Candidate profile loaded once at startup and treated as read-only

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub github: String,
}

impl PersonalInfo {
    pub fn is_empty(&self) -> bool {
        self.full_name.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub dates: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub dates: String,
}

/// External file references, e.g. the resume artifact handed to the applier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileReferences {
    #[serde(default)]
    pub resume: String,
}

/// The candidate's base profile. Loaded from YAML once at startup; the
/// pipeline only ever reads it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub personal_information: PersonalInfo,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub files: FileReferences,
}

impl CandidateProfile {
    /// Load the profile from a YAML file. Absence or malformation is fatal
    /// before any posting is processed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile file: {}", path.display()))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse profile file: {}", path.display()))
    }

    /// Flatten the profile into plain text for the analyst prompt.
    pub fn to_resume_text(&self) -> String {
        let mut lines = Vec::new();

        if !self.personal_information.full_name.is_empty() {
            lines.push(self.personal_information.full_name.clone());
        }
        if !self.summary.is_empty() {
            lines.push(self.summary.clone());
        }
        if !self.skills.is_empty() {
            lines.push(format!("Skills: {}", self.skills.join(", ")));
        }

        for entry in &self.experience {
            lines.push(format!(
                "{} at {} ({})",
                entry.title, entry.company, entry.dates
            ));
            for highlight in &entry.highlights {
                lines.push(format!("- {}", highlight));
            }
        }

        for entry in &self.education {
            lines.push(format!(
                "{} - {} ({})",
                entry.degree, entry.institution, entry.dates
            ));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> CandidateProfile {
        CandidateProfile {
            personal_information: PersonalInfo {
                full_name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                ..Default::default()
            },
            summary: "Backend engineer".to_string(),
            skills: vec!["Rust".to_string(), "SQL".to_string()],
            experience: vec![ExperienceEntry {
                company: "Acme".to_string(),
                title: "Engineer".to_string(),
                dates: "2020 - Present".to_string(),
                highlights: vec!["Shipped the billing service".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_resume_text_contains_profile_sections() {
        let text = sample_profile().to_resume_text();
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("Skills: Rust, SQL"));
        assert!(text.contains("Engineer at Acme"));
        assert!(text.contains("- Shipped the billing service"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = CandidateProfile::load(Path::new("/nonexistent/profile.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_personal_info_empty_check() {
        assert!(PersonalInfo::default().is_empty());
        assert!(!sample_profile().personal_information.is_empty());
    }
}
