//! Backend relay — the single point of entry for all compile-backend
//! HTTP calls in the workspace.
//!
//! The backend owns profile ingestion, AI rewriting, gap analysis, and
//! PDF generation; this module only shapes payloads and reconciles
//! responses. Compile calls are fired once per user action with no retry
//! and no debounce — stale-response handling lives in the workspace
//! tracker, not here.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::profile::{GapAnalysis, UserProfile};
use crate::pipeline::{apply, PipelineConfig};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

/// Body of `POST /generate`.
#[derive(Debug, Clone, Serialize)]
pub struct CompileRequest {
    pub username: String,
    pub profile_data: UserProfile,
    pub jd_text: Option<String>,
    /// The active preset, passed through unmodified so the backend can
    /// re-validate the filtering it describes.
    pub pipeline: Option<PipelineConfig>,
}

impl CompileRequest {
    /// Resolves the payload for a compile: when a pipeline is active, the
    /// profile's project list is replaced by the filtered set and the
    /// config rides along unchanged.
    pub fn resolve(
        username: &str,
        profile: &UserProfile,
        jd_text: &str,
        pipeline: Option<&PipelineConfig>,
    ) -> Self {
        let mut profile_data = profile.clone();
        if let Some(config) = pipeline {
            profile_data.projects = apply(config, &profile.projects);
        }
        CompileRequest {
            username: username.to_string(),
            profile_data,
            jd_text: if jd_text.trim().is_empty() {
                None
            } else {
                Some(jd_text.to_string())
            },
            pipeline: pipeline.cloned(),
        }
    }
}

/// Response of `POST /generate`.
#[derive(Debug, Clone, Deserialize)]
pub struct CompileResponse {
    #[serde(default)]
    pub status: String,
    /// Server-side path of the rendered PDF resource.
    #[serde(default)]
    pub pdf_path: String,
    /// Generated document source, shown in the code tab.
    pub typst_code: String,
    #[serde(default)]
    pub analysis: Option<GapAnalysis>,
}

#[derive(Debug, Deserialize)]
struct RewriteResponse {
    refined_text: String,
}

/// FastAPI-style error body: `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    detail: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The relay surface the workspace session depends on, as a trait so
/// orchestration can be exercised against a stub backend in tests.
#[async_trait]
pub trait CompileBackend: Send + Sync {
    /// Fetches a profile, triggering the backend's GitHub auto-fetch on
    /// cache miss.
    async fn fetch_profile(&self, username: &str) -> Result<UserProfile, BackendError>;

    /// Submits a compile payload and returns the generated document state.
    async fn compile(&self, request: &CompileRequest) -> Result<CompileResponse, BackendError>;

    /// Rewrites raw project notes into professional bullets.
    async fn rewrite(&self, text: &str) -> Result<String, BackendError>;

    /// URL of the rendered PDF, cache-busted so the preview pane reloads
    /// after every compile.
    fn document_url(&self, cache_bust_millis: i64) -> String;
}

/// HTTP client for the compile backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// `GET /` — backend liveness check.
    pub async fn health(&self) -> Result<(), BackendError> {
        let response = self.client.get(&self.base_url).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl CompileBackend for BackendClient {
    /// `GET /profile/{username}`.
    async fn fetch_profile(&self, username: &str) -> Result<UserProfile, BackendError> {
        let url = format!("{}/profile/{username}", self.base_url);
        let response = self.client.get(&url).send().await?;
        let response = check_status(response).await?;
        Ok(response.json::<UserProfile>().await?)
    }

    /// `POST /generate` — submits the resolved payload. A single attempt:
    /// failures surface directly to the initiating action.
    async fn compile(&self, request: &CompileRequest) -> Result<CompileResponse, BackendError> {
        let url = format!("{}/generate", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;
        let response = check_status(response).await?;
        let compiled: CompileResponse = response.json().await?;

        debug!(
            status = %compiled.status,
            analyzed = compiled.analysis.is_some(),
            "Compile request completed"
        );
        Ok(compiled)
    }

    /// `POST /rewrite`.
    async fn rewrite(&self, text: &str) -> Result<String, BackendError> {
        let url = format!("{}/rewrite", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json::<RewriteResponse>().await?.refined_text)
    }

    fn document_url(&self, cache_bust_millis: i64) -> String {
        format!("{}/static/resume.pdf?t={cache_bust_millis}", self.base_url)
    }
}

/// Maps non-2xx responses onto `BackendError::Api`, extracting the
/// backend's `detail` message when the body parses.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|e| e.detail)
        .unwrap_or(body);

    Err(BackendError::Api {
        status: status.as_u16(),
        message,
    })
}
