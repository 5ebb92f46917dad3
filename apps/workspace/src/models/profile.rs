//! Serde mirrors of the backend profile schema.
//!
//! The backend owns these entities; the workspace only reads them, filters
//! `projects` through the active pipeline, and sends them back on compile.
//! Every field is defaulted so partial payloads from the backend (or an
//! empty fallback profile) deserialize without error.

use serde::{Deserialize, Serialize};

/// A single project from the user's profile. Tags for pipeline filtering
/// are derived from `tech_stack`, case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub stars: u32,
    /// Raw description as ingested from the GitHub API.
    #[serde(default)]
    pub description_raw: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    /// Raw "interview" notes captured during refinement.
    #[serde(default)]
    pub metrics_raw: Option<String>,
    /// AI-polished bullet points, ready for typesetting.
    #[serde(default)]
    pub refined_bullets: Vec<String>,
    #[serde(default)]
    pub impact_metrics: Vec<String>,
    #[serde(default)]
    pub is_refined: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub company: String,
    pub role: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default = "default_end_date")]
    pub end_date: String,
    #[serde(default)]
    pub raw_responsibilities: String,
    #[serde(default)]
    pub metrics_raw: Option<String>,
    #[serde(default)]
    pub refined_bullets: Vec<String>,
    #[serde(default)]
    pub is_refined: bool,
}

fn default_end_date() -> String {
    "Present".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGap {
    pub missing_skill: String,
    /// e.g. "Build a small project using Terraform"
    pub recommendation: String,
}

/// Result of the backend's profile-vs-JD comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    /// 0–100.
    #[serde(default)]
    pub match_score: u8,
    #[serde(default)]
    pub missing_critical_skills: Vec<String>,
    /// Project names in order of relevance to the target job.
    #[serde(default)]
    pub suggested_project_order: Vec<String>,
    #[serde(default)]
    pub critique: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub github_username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub experience: Vec<WorkExperience>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub known_gaps: Vec<SkillGap>,
    /// Analysis for the current target job, if one has been run.
    #[serde(default)]
    pub job_match_analysis: Option<GapAnalysis>,
}

impl UserProfile {
    /// Fallback profile used when the backend cannot resolve a username:
    /// the workspace still opens with an empty, named template.
    pub fn empty(username: &str) -> Self {
        UserProfile {
            full_name: username.to_string(),
            github_username: username.to_string(),
            ..Default::default()
        }
    }
}
