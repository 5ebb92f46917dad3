use serde::{Deserialize, Serialize};

/// Resume section identifiers. `section_order` dictates section-level
/// placement downstream; it never reorders projects within a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Summary,
    Skills,
    Experience,
    Projects,
    Education,
}

impl Section {
    /// The fixed canonical order every newly created preset starts with.
    pub fn canonical_order() -> Vec<Section> {
        vec![
            Section::Summary,
            Section::Skills,
            Section::Experience,
            Section::Projects,
            Section::Education,
        ]
    }
}

/// Default visual template on the backend side.
pub const DEFAULT_TEMPLATE_ID: &str = "modern";

/// A named, user-defined transformation rule over the project list.
///
/// Tag semantics: a project is eligible if it carries at least one
/// `include_tags` entry OR the set is empty (open filter). A project
/// carrying any `exclude_tags` entry is dropped regardless — exclusion
/// always wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Display identifier, e.g. "SRE Agent", "Frontend Specialist".
    pub name: String,
    #[serde(default)]
    pub include_tags: Vec<String>,
    #[serde(default)]
    pub exclude_tags: Vec<String>,
    #[serde(default = "Section::canonical_order")]
    pub section_order: Vec<Section>,
    /// Opaque identifier naming a backend-side visual template.
    #[serde(default = "default_template_id")]
    pub template_id: String,
}

fn default_template_id() -> String {
    DEFAULT_TEMPLATE_ID.to_string()
}

impl PipelineConfig {
    /// Lowercases all tags. Matching against project tech stacks is
    /// case-insensitive, so tags must be held in lowercase form.
    pub fn normalize_tags(&mut self) {
        for tag in self
            .include_tags
            .iter_mut()
            .chain(self.exclude_tags.iter_mut())
        {
            *tag = tag.to_lowercase();
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            name: String::new(),
            include_tags: Vec::new(),
            exclude_tags: Vec::new(),
            section_order: Section::canonical_order(),
            template_id: default_template_id(),
        }
    }
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|t| t.to_string()).collect()
}

/// The three presets seeded into a fresh store.
pub fn default_presets() -> Vec<PipelineConfig> {
    vec![
        PipelineConfig {
            name: "Full Stack Developer".to_string(),
            ..Default::default()
        },
        PipelineConfig {
            name: "Backend Specialist".to_string(),
            include_tags: tags(&["python", "java", "sql", "api", "docker"]),
            exclude_tags: tags(&["css", "react", "frontend", "figma"]),
            ..Default::default()
        },
        PipelineConfig {
            name: "SRE / DevOps".to_string(),
            include_tags: tags(&["docker", "kubernetes", "linux", "ci/cd", "terraform"]),
            exclude_tags: tags(&["react", "css", "ui", "frontend"]),
            section_order: vec![
                Section::Summary,
                Section::Skills,
                Section::Projects,
                Section::Experience,
                Section::Education,
            ],
            template_id: "classic".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_serde_snake_case() {
        let json = serde_json::to_string(&Section::Experience).unwrap();
        assert_eq!(json, r#""experience""#);
        let back: Section = serde_json::from_str(r#""summary""#).unwrap();
        assert_eq!(back, Section::Summary);
    }

    #[test]
    fn test_default_config_uses_canonical_order_and_modern_template() {
        let config = PipelineConfig::default();
        assert_eq!(config.section_order, Section::canonical_order());
        assert_eq!(config.template_id, "modern");
        assert!(config.include_tags.is_empty());
        assert!(config.exclude_tags.is_empty());
    }

    #[test]
    fn test_default_presets_names_and_count() {
        let presets = default_presets();
        let names: Vec<&str> = presets.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Full Stack Developer", "Backend Specialist", "SRE / DevOps"]
        );
    }

    #[test]
    fn test_sre_preset_reorders_sections_and_uses_classic() {
        let presets = default_presets();
        let sre = &presets[2];
        assert_eq!(sre.template_id, "classic");
        assert_eq!(sre.section_order[2], Section::Projects);
        assert_eq!(sre.section_order[3], Section::Experience);
    }

    #[test]
    fn test_normalize_tags_lowercases_both_lists() {
        let mut config = PipelineConfig {
            name: "Mixed".to_string(),
            include_tags: vec!["Python".to_string(), "SQL".to_string()],
            exclude_tags: vec!["React".to_string()],
            ..Default::default()
        };
        config.normalize_tags();
        assert_eq!(config.include_tags, vec!["python", "sql"]);
        assert_eq!(config.exclude_tags, vec!["react"]);
    }

    #[test]
    fn test_config_deserializes_without_optional_fields() {
        // Legacy payloads may carry only name + tags.
        let json = r#"{"name": "Minimal", "include_tags": ["rust"]}"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.section_order, Section::canonical_order());
        assert_eq!(config.template_id, "modern");
        assert!(config.exclude_tags.is_empty());
    }
}
