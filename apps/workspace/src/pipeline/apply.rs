//! Pipeline application — the pure filter that turns a preset plus a
//! profile's project list into the project set sent to the compiler.
//!
//! This is a preview optimization, not a correctness boundary: the
//! backend receives the active `PipelineConfig` alongside the filtered
//! list and remains the authority.

use std::collections::HashSet;

use crate::models::profile::Project;

use super::presets::PipelineConfig;

/// Tag set of a project: its tech stack, lowercased.
pub fn project_tags(project: &Project) -> HashSet<String> {
    project
        .tech_stack
        .iter()
        .map(|t| t.to_lowercase())
        .collect()
}

/// Applies a preset to a project list.
///
/// A project survives when `include_tags` is empty (open filter) or
/// intersects its tag set, and is then dropped unconditionally if
/// `exclude_tags` intersects — exclusion always wins. The filter is
/// stable: survivors keep their original relative order.
pub fn apply(config: &PipelineConfig, projects: &[Project]) -> Vec<Project> {
    projects
        .iter()
        .filter(|project| {
            let tags = project_tags(project);

            let included = config.include_tags.is_empty()
                || config.include_tags.iter().any(|t| tags.contains(t));
            if !included {
                return false;
            }

            !config.exclude_tags.iter().any(|t| tags.contains(t))
        })
        .cloned()
        .collect()
}
