use thiserror::Error;

use crate::backend::BackendError;
use crate::pipeline::store::StoreError;

/// Application-level error type.
/// Workspace operations return `Result<T, AppError>`; the UI host maps
/// variants onto its own notification surface.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Preset store error: {0}")]
    Store(#[from] StoreError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
