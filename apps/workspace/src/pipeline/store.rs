//! Persisted preset store — client-local JSON file holding the user's
//! pipeline presets, seeded with defaults on first load.
//!
//! Persisted payloads carry an explicit `schema_version` so a future
//! shape change has a migration path. The original localStorage format
//! was a bare array; `load` still accepts it and migrates on the spot.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::presets::{default_presets, PipelineConfig};

/// Fixed storage file name inside the data directory — the namespace key.
const STORE_FILE: &str = "pipelines.json";

/// Current persisted schema version.
const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed preset data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported preset schema version {found} (this build understands up to {SCHEMA_VERSION})")]
    UnsupportedSchema { found: u32 },
}

/// Versioned on-disk envelope.
#[derive(Debug, Serialize, Deserialize)]
struct StoredPresets {
    schema_version: u32,
    presets: Vec<PipelineConfig>,
}

/// File-backed preset store. Reads and writes are whole-file and
/// last-writer-wins; there is no cross-process coordination.
#[derive(Debug, Clone)]
pub struct PresetStore {
    path: PathBuf,
}

impl PresetStore {
    /// Store rooted at `<data_dir>/pipelines.json`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        PresetStore {
            path: data_dir.as_ref().join(STORE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads all presets.
    ///
    /// First run (no file) seeds the three defaults and writes them back,
    /// so a second `load` returns the same three. Corrupt content falls
    /// back to the defaults with a warning rather than failing the load;
    /// an envelope from a *newer* build is a hard error so we never
    /// clobber data we do not understand.
    pub fn load(&self) -> Result<Vec<PipelineConfig>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No preset store found, seeding defaults");
                let presets = default_presets();
                self.save(&presets)?;
                return Ok(presets);
            }
            Err(e) => return Err(e.into()),
        };

        match parse_stored(&raw)? {
            Parsed::Current(mut presets) => {
                // Stored tags may predate lowercase-on-save; matching is
                // case-insensitive, so restore the lowercase form here.
                presets.iter_mut().for_each(PipelineConfig::normalize_tags);
                Ok(presets)
            }
            Parsed::Legacy(mut presets) => {
                info!("Migrating version-less preset store to v{SCHEMA_VERSION}");
                presets.iter_mut().for_each(PipelineConfig::normalize_tags);
                self.save(&presets)?;
                Ok(presets)
            }
            Parsed::Corrupt(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Preset store is corrupt, falling back to defaults"
                );
                let presets = default_presets();
                self.save(&presets)?;
                Ok(presets)
            }
        }
    }

    /// Persists the full preset list, replacing whatever is on disk.
    pub fn save(&self, presets: &[PipelineConfig]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let envelope = StoredPresets {
            schema_version: SCHEMA_VERSION,
            presets: presets.to_vec(),
        };
        let body = serde_json::to_string_pretty(&envelope)?;
        fs::write(&self.path, body)?;
        Ok(())
    }
}

enum Parsed {
    Current(Vec<PipelineConfig>),
    Legacy(Vec<PipelineConfig>),
    Corrupt(serde_json::Error),
}

fn parse_stored(raw: &str) -> Result<Parsed, StoreError> {
    // Peek at the version before committing to a shape. A future version
    // must surface as its own error, not as a corruption fallback.
    #[derive(Deserialize)]
    struct VersionTag {
        schema_version: u32,
    }

    if let Ok(tag) = serde_json::from_str::<VersionTag>(raw) {
        if tag.schema_version > SCHEMA_VERSION {
            return Err(StoreError::UnsupportedSchema {
                found: tag.schema_version,
            });
        }
        return match serde_json::from_str::<StoredPresets>(raw) {
            Ok(stored) => Ok(Parsed::Current(stored.presets)),
            Err(e) => Ok(Parsed::Corrupt(e)),
        };
    }

    // Pre-versioning payload: a bare JSON array of presets.
    match serde_json::from_str::<Vec<PipelineConfig>>(raw) {
        Ok(presets) => Ok(Parsed::Legacy(presets)),
        Err(e) => Ok(Parsed::Corrupt(e)),
    }
}
