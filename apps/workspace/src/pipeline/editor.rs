//! Preset editor — creation and deletion of pipeline presets from form
//! input. Callers persist the resulting list through the store.

use crate::errors::AppError;

use super::presets::PipelineConfig;

/// Splits a comma-separated tag string into lowercase tokens.
/// Tokens are trimmed and empties dropped: `"React, , css "` → `["react", "css"]`.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Builds a new preset from raw form fields.
///
/// Section order and template always start from the canonical defaults;
/// there is no update-in-place, so editing a preset is delete + recreate.
pub fn create(name: &str, include_raw: &str, exclude_raw: &str) -> Result<PipelineConfig, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(
            "Preset name cannot be empty".to_string(),
        ));
    }

    Ok(PipelineConfig {
        name: name.to_string(),
        include_tags: parse_tags(include_raw),
        exclude_tags: parse_tags(exclude_raw),
        ..Default::default()
    })
}

/// Removes the preset at `index`, returning it. Survivors keep their
/// relative order and reindex from zero.
pub fn delete_at(
    presets: &mut Vec<PipelineConfig>,
    index: usize,
) -> Result<PipelineConfig, AppError> {
    if index >= presets.len() {
        return Err(AppError::NotFound(format!(
            "No preset at index {index} (have {})",
            presets.len()
        )));
    }
    Ok(presets.remove(index))
}
