// src/types/content.rs
//! Tailoring requests, generated content and review decisions

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::profile::{
    CandidateProfile, EducationEntry, ExperienceEntry, PersonalInfo, ProjectEntry,
};

/// Derived view of a [`super::JobAnalysis`] handed to the tailoring step.
/// Recomputed per tailoring attempt; `feedback` is set on revision passes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TailoringRequest {
    pub role: String,
    pub company: String,
    pub must_have: BTreeSet<String>,
    pub keywords: BTreeSet<String>,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub experience_level: String,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillGroups {
    #[serde(default)]
    pub primary: Vec<String>,
    #[serde(default)]
    pub secondary: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
}

/// Generated application content. Every field defaults so a sparse generator
/// response still parses; identity and education are back-filled from the
/// profile when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TailoredContent {
    #[serde(default)]
    pub personal_information: PersonalInfo,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub skills: SkillGroups,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub tailoring_notes: String,
}

impl TailoredContent {
    /// Untailored content built straight from the profile. Used as the
    /// degradation payload when every generative provider fails.
    pub fn from_profile(profile: &CandidateProfile) -> Self {
        Self {
            personal_information: profile.personal_information.clone(),
            summary: profile.summary.clone(),
            skills: SkillGroups {
                primary: profile.skills.clone(),
                ..Default::default()
            },
            experience: profile.experience.clone(),
            projects: profile.projects.clone(),
            education: profile.education.clone(),
            tailoring_notes: String::new(),
        }
    }

    /// The tailored document must never lose the candidate's factual identity
    /// or education data, even when the generator omits both fields.
    pub fn backfill_from(&mut self, profile: &CandidateProfile) {
        if self.personal_information.is_empty() {
            self.personal_information = profile.personal_information.clone();
        }
        if self.education.is_empty() {
            self.education = profile.education.clone();
        }
    }
}

/// Outcome of one human review. Terminal once `approved` or `cancelled`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    pub approved: bool,
    pub feedback: String,
    pub cancelled: bool,
}

/// Fixed feedback attached to a plain rejection.
pub const GENERIC_REVISE_FEEDBACK: &str = "Please revise the resume";

impl ApprovalDecision {
    pub fn approve() -> Self {
        Self {
            approved: true,
            feedback: String::new(),
            cancelled: false,
        }
    }

    pub fn reject() -> Self {
        Self {
            approved: false,
            feedback: GENERIC_REVISE_FEEDBACK.to_string(),
            cancelled: false,
        }
    }

    pub fn edit(feedback: &str) -> Self {
        Self {
            approved: false,
            feedback: feedback.to_string(),
            cancelled: false,
        }
    }

    pub fn cancel() -> Self {
        Self {
            approved: false,
            feedback: String::new(),
            cancelled: true,
        }
    }
}
