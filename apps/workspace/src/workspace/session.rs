//! Workspace session — the async orchestrator behind the builder UI.
//!
//! Owns the preset store, the backend relay, the compile tracker, and the
//! workspace state. Every user action the builder page exposes (load
//! profile, edit, run agent, analyze match) maps to a method here; all
//! state changes flow through the reducer.

use std::mem;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::backend::{BackendClient, BackendError, CompileBackend, CompileRequest, CompileResponse};
use crate::config::Config;
use crate::errors::AppError;
use crate::pipeline::{editor, PresetStore};
use crate::workspace::state::{reduce, Action, WorkspaceState};
use crate::workspace::tracker::{CompileTracker, RequestId};

pub struct WorkspaceSession {
    state: WorkspaceState,
    store: PresetStore,
    backend: Arc<dyn CompileBackend>,
    tracker: CompileTracker,
}

impl WorkspaceSession {
    /// Opens a session against the configured backend, loading (and on
    /// first run, seeding) the persisted presets.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let backend = Arc::new(BackendClient::new(
            config.api_base_url.clone(),
            config.request_timeout_secs,
        ));
        Self::with_backend(PresetStore::new(&config.data_dir), backend)
    }

    /// Session over an explicit store and backend. Tests inject a stub
    /// backend here.
    pub fn with_backend(
        store: PresetStore,
        backend: Arc<dyn CompileBackend>,
    ) -> Result<Self, AppError> {
        let presets = store.load()?;
        let mut session = WorkspaceSession {
            state: WorkspaceState::default(),
            store,
            backend,
            tracker: CompileTracker::new(),
        };
        session.dispatch(Action::PresetsLoaded(presets));
        Ok(session)
    }

    pub fn state(&self) -> &WorkspaceState {
        &self.state
    }

    /// Applies a state transition. Pure UI concerns (tabs, theme, form
    /// fields) go straight through; effectful operations have dedicated
    /// methods below.
    pub fn dispatch(&mut self, action: Action) {
        self.state = reduce(mem::take(&mut self.state), action);
    }

    // ────────────────────────────────────────────────────────────────────
    // Profile
    // ────────────────────────────────────────────────────────────────────

    /// Loads the profile for the current username and compiles it.
    /// A backend miss falls back to an empty named template so the
    /// workspace still opens.
    pub async fn load_profile(&mut self) -> Result<(), AppError> {
        let username = self.state.username.clone();
        if username.is_empty() {
            return Ok(());
        }

        let profile = match self.backend.fetch_profile(&username).await {
            Ok(profile) => {
                info!(%username, "Profile loaded");
                profile
            }
            Err(e) => {
                warn!(%username, error = %e, "Profile fetch failed, using empty template");
                crate::models::profile::UserProfile::empty(&username)
            }
        };

        self.dispatch(Action::ProfileLoaded(profile));
        self.compile().await
    }

    /// Replaces the in-memory profile (editor form sync) and recompiles.
    pub async fn update_profile(
        &mut self,
        profile: crate::models::profile::UserProfile,
    ) -> Result<(), AppError> {
        self.dispatch(Action::ProfileLoaded(profile));
        self.compile().await
    }

    /// Sends a project's raw description through the AI rewrite endpoint,
    /// stores the refined text, and recompiles.
    pub async fn rewrite_project(&mut self, index: usize) -> Result<(), AppError> {
        let Some(profile) = self.state.profile.as_ref() else {
            return Err(AppError::Validation("No profile loaded".to_string()));
        };
        let project = profile.projects.get(index).ok_or_else(|| {
            AppError::NotFound(format!("No project at index {index}"))
        })?;
        if project.description_raw.is_empty() {
            return Ok(());
        }

        let refined = self.backend.rewrite(&project.description_raw).await?;

        let mut updated = profile.clone();
        updated.projects[index].description_raw = refined;
        self.update_profile(updated).await
    }

    // ────────────────────────────────────────────────────────────────────
    // Compile
    // ────────────────────────────────────────────────────────────────────

    /// Starts a compile for the current workspace contents. Returns the
    /// request id and resolved payload, or `None` when no profile is
    /// loaded (nothing to compile).
    ///
    /// Hosts that run compiles as background tasks pair this with
    /// `finish_compile`; `compile` does the round trip inline.
    pub fn begin_compile(&mut self) -> Option<(RequestId, CompileRequest)> {
        let profile = self.state.profile.as_ref()?;
        let request = CompileRequest::resolve(
            &self.state.username,
            profile,
            &self.state.jd_text,
            self.state.active_pipeline.as_ref(),
        );
        let id = self.tracker.begin();
        self.dispatch(Action::CompileStarted);
        Some((id, request))
    }

    /// Commits a compile outcome. Responses whose id is no longer the
    /// latest issued are discarded — a newer compile owns the screen.
    pub fn finish_compile(
        &mut self,
        id: RequestId,
        outcome: Result<CompileResponse, BackendError>,
    ) -> Result<(), AppError> {
        if !self.tracker.try_complete(id) {
            debug!(request_id = id, "Discarding stale compile response");
            return Ok(());
        }

        match outcome {
            Ok(response) => {
                let document_url = self.backend.document_url(Utc::now().timestamp_millis());
                self.dispatch(Action::CompileFinished {
                    typst_code: response.typst_code,
                    document_url,
                    analysis: response.analysis,
                });
                Ok(())
            }
            Err(e) => {
                self.dispatch(Action::CompileFailed);
                Err(e.into())
            }
        }
    }

    /// One-shot compile: resolve, submit, commit.
    pub async fn compile(&mut self) -> Result<(), AppError> {
        let Some((id, request)) = self.begin_compile() else {
            return Ok(());
        };
        let backend = Arc::clone(&self.backend);
        let outcome = backend.compile(&request).await;
        self.finish_compile(id, outcome)
    }

    /// Recompiles with the current job description — the "Analyze Match"
    /// action. The resulting analysis lands in state via the reducer.
    pub async fn analyze_match(&mut self) -> Result<(), AppError> {
        self.compile().await
    }

    // ────────────────────────────────────────────────────────────────────
    // Pipelines
    // ────────────────────────────────────────────────────────────────────

    /// Activates the preset at `index` and compiles through it.
    pub async fn run_pipeline(&mut self, index: usize) -> Result<(), AppError> {
        let preset = self
            .state
            .presets
            .get(index)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No preset at index {index}")))?;

        info!(preset = %preset.name, "Running pipeline");
        self.dispatch(Action::ActivatePipeline(preset));
        self.compile().await
    }

    /// Deactivates the pipeline and recompiles unfiltered.
    pub async fn clear_pipeline(&mut self) -> Result<(), AppError> {
        self.dispatch(Action::ClearPipeline);
        self.compile().await
    }

    /// Creates a preset from form input and persists the list immediately.
    pub fn create_preset(
        &mut self,
        name: &str,
        include_raw: &str,
        exclude_raw: &str,
    ) -> Result<(), AppError> {
        let preset = editor::create(name, include_raw, exclude_raw)?;
        let mut presets = self.state.presets.clone();
        presets.push(preset);
        self.store.save(&presets)?;
        self.dispatch(Action::PresetsLoaded(presets));
        Ok(())
    }

    /// Deletes the preset at `index` and persists the survivors.
    pub fn delete_preset(&mut self, index: usize) -> Result<(), AppError> {
        let mut presets = self.state.presets.clone();
        editor::delete_at(&mut presets, index)?;
        self.store.save(&presets)?;
        self.dispatch(Action::PresetsLoaded(presets));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::models::profile::{Project, UserProfile};
    use crate::workspace::state::Tab;

    /// Stub backend: records compile payloads, echoes surviving project
    /// names into the generated source.
    #[derive(Default)]
    struct StubBackend {
        profile: Option<UserProfile>,
        last_request: Mutex<Option<CompileRequest>>,
        compiles: Mutex<u32>,
    }

    #[async_trait]
    impl CompileBackend for StubBackend {
        async fn fetch_profile(&self, username: &str) -> Result<UserProfile, BackendError> {
            self.profile.clone().ok_or(BackendError::Api {
                status: 404,
                message: format!("User {username} not found on GitHub"),
            })
        }

        async fn compile(&self, request: &CompileRequest) -> Result<CompileResponse, BackendError> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            *self.compiles.lock().unwrap() += 1;
            let names: Vec<&str> = request
                .profile_data
                .projects
                .iter()
                .map(|p| p.name.as_str())
                .collect();
            Ok(CompileResponse {
                status: "success".to_string(),
                pdf_path: "output/resume.pdf".to_string(),
                typst_code: format!("== Projects: {}", names.join(", ")),
                analysis: None,
            })
        }

        async fn rewrite(&self, text: &str) -> Result<String, BackendError> {
            Ok(format!("Refined: {text}"))
        }

        fn document_url(&self, cache_bust_millis: i64) -> String {
            format!("stub://resume.pdf?t={cache_bust_millis}")
        }
    }

    fn profile_with_projects() -> UserProfile {
        let mut profile = UserProfile::empty("techieshreya");
        profile.projects = vec![
            Project {
                name: "api-gateway".to_string(),
                tech_stack: vec!["Python".to_string(), "Docker".to_string()],
                description_raw: "built a gateway".to_string(),
                ..Default::default()
            },
            Project {
                name: "portfolio".to_string(),
                tech_stack: vec!["React".to_string(), "CSS".to_string()],
                ..Default::default()
            },
        ];
        profile
    }

    fn session_with(stub: StubBackend) -> (TempDir, Arc<StubBackend>, WorkspaceSession) {
        let dir = TempDir::new().unwrap();
        let store = PresetStore::new(dir.path());
        let stub = Arc::new(stub);
        let session = WorkspaceSession::with_backend(store, stub.clone()).unwrap();
        (dir, stub, session)
    }

    #[tokio::test]
    async fn test_session_opens_with_seeded_presets_and_no_pipeline() {
        let (_dir, _stub, session) = session_with(StubBackend::default());
        assert_eq!(session.state().presets.len(), 3);
        assert!(session.state().active_pipeline.is_none());
    }

    #[tokio::test]
    async fn test_load_profile_fetches_and_compiles() {
        let stub = StubBackend {
            profile: Some(profile_with_projects()),
            ..Default::default()
        };
        let (_dir, _stub, mut session) = session_with(stub);
        session.dispatch(Action::SetUsername("techieshreya".to_string()));

        session.load_profile().await.unwrap();

        let state = session.state();
        assert_eq!(state.profile.as_ref().unwrap().projects.len(), 2);
        assert_eq!(state.typst_code, "== Projects: api-gateway, portfolio");
        assert!(state.document_url.as_deref().unwrap().starts_with("stub://"));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_load_profile_falls_back_to_empty_template_on_miss() {
        let (_dir, _stub, mut session) = session_with(StubBackend::default());
        session.dispatch(Action::SetUsername("ghost".to_string()));

        session.load_profile().await.unwrap();

        let profile = session.state().profile.as_ref().unwrap();
        assert_eq!(profile.github_username, "ghost");
        assert!(profile.projects.is_empty());
    }

    #[tokio::test]
    async fn test_run_pipeline_sends_filtered_projects_and_config() {
        let stub = StubBackend {
            profile: Some(profile_with_projects()),
            ..Default::default()
        };
        let (_dir, stub, mut session) = session_with(stub);
        session.dispatch(Action::SetUsername("techieshreya".to_string()));
        session.load_profile().await.unwrap();

        // Seeded index 1 is "Backend Specialist": include python/docker,
        // exclude css/react — only api-gateway survives.
        session.run_pipeline(1).await.unwrap();

        let state = session.state();
        assert_eq!(
            state.active_pipeline.as_ref().unwrap().name,
            "Backend Specialist"
        );
        assert_eq!(state.typst_code, "== Projects: api-gateway");

        // The wire payload carried the filtered list plus the unmodified config.
        let sent = stub.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(sent.profile_data.projects.len(), 1);
        assert_eq!(sent.pipeline.unwrap().include_tags[0], "python");
    }

    #[tokio::test]
    async fn test_clear_pipeline_recompiles_unfiltered() {
        let stub = StubBackend {
            profile: Some(profile_with_projects()),
            ..Default::default()
        };
        let (_dir, stub, mut session) = session_with(stub);
        session.dispatch(Action::SetUsername("techieshreya".to_string()));
        session.load_profile().await.unwrap();
        session.run_pipeline(1).await.unwrap();

        session.clear_pipeline().await.unwrap();

        let state = session.state();
        assert!(state.active_pipeline.is_none());
        assert_eq!(state.typst_code, "== Projects: api-gateway, portfolio");
        assert_eq!(*stub.compiles.lock().unwrap(), 3, "load + run + clear");
    }

    #[tokio::test]
    async fn test_run_pipeline_out_of_range_is_not_found() {
        let (_dir, _stub, mut session) = session_with(StubBackend::default());
        assert!(matches!(
            session.run_pipeline(9).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_stale_compile_response_is_discarded() {
        let stub = StubBackend {
            profile: Some(profile_with_projects()),
            ..Default::default()
        };
        let (_dir, _stub, mut session) = session_with(stub);
        session.dispatch(Action::SetUsername("techieshreya".to_string()));
        session.dispatch(Action::ProfileLoaded(profile_with_projects()));

        let (first, _) = session.begin_compile().unwrap();
        let (second, _) = session.begin_compile().unwrap();

        let stale = CompileResponse {
            status: "success".to_string(),
            pdf_path: String::new(),
            typst_code: "STALE".to_string(),
            analysis: None,
        };
        session.finish_compile(first, Ok(stale)).unwrap();
        assert_ne!(session.state().typst_code, "STALE");
        assert!(session.state().loading, "Still waiting on the newer request");

        let fresh = CompileResponse {
            status: "success".to_string(),
            pdf_path: String::new(),
            typst_code: "FRESH".to_string(),
            analysis: None,
        };
        session.finish_compile(second, Ok(fresh)).unwrap();
        assert_eq!(session.state().typst_code, "FRESH");
        assert!(!session.state().loading);
    }

    #[tokio::test]
    async fn test_compile_failure_surfaces_and_clears_loading() {
        let stub = StubBackend {
            profile: Some(profile_with_projects()),
            ..Default::default()
        };
        let (_dir, _stub, mut session) = session_with(stub);
        session.dispatch(Action::ProfileLoaded(profile_with_projects()));

        let (id, _) = session.begin_compile().unwrap();
        let outcome = Err(BackendError::Api {
            status: 500,
            message: "typst blew up".to_string(),
        });
        let err = session.finish_compile(id, outcome).unwrap_err();
        assert!(matches!(err, AppError::Backend(_)));
        assert!(!session.state().loading);
    }

    #[tokio::test]
    async fn test_compile_without_profile_is_a_no_op() {
        let (_dir, _stub, mut session) = session_with(StubBackend::default());
        session.compile().await.unwrap();
        assert!(session.state().typst_code.is_empty());
    }

    #[tokio::test]
    async fn test_create_preset_persists_immediately() {
        let (dir, _stub, mut session) = session_with(StubBackend::default());
        session
            .create_preset("Frontend Specialist", "React, css", "java")
            .unwrap();

        assert_eq!(session.state().presets.len(), 4);
        assert_eq!(session.state().presets[3].include_tags, vec!["react", "css"]);

        // Fresh store sees the write.
        let reloaded = PresetStore::new(dir.path()).load().unwrap();
        assert_eq!(reloaded.len(), 4);
    }

    #[tokio::test]
    async fn test_create_preset_rejects_empty_name_without_persisting() {
        let (dir, _stub, mut session) = session_with(StubBackend::default());
        assert!(matches!(
            session.create_preset("", "react", ""),
            Err(AppError::Validation(_))
        ));
        assert_eq!(session.state().presets.len(), 3);
        assert_eq!(PresetStore::new(dir.path()).load().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_preset_persists_reindexed_survivors() {
        let (dir, _stub, mut session) = session_with(StubBackend::default());
        session.delete_preset(1).unwrap();

        let names: Vec<&str> = session
            .state()
            .presets
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Full Stack Developer", "SRE / DevOps"]);

        let reloaded = PresetStore::new(dir.path()).load().unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded[1].name, "SRE / DevOps");
    }

    #[tokio::test]
    async fn test_rewrite_project_updates_description_and_recompiles() {
        let stub = StubBackend {
            profile: Some(profile_with_projects()),
            ..Default::default()
        };
        let (_dir, _stub, mut session) = session_with(stub);
        session.dispatch(Action::SetUsername("techieshreya".to_string()));
        session.dispatch(Action::ProfileLoaded(profile_with_projects()));

        session.rewrite_project(0).await.unwrap();

        let profile = session.state().profile.as_ref().unwrap();
        assert_eq!(profile.projects[0].description_raw, "Refined: built a gateway");
        assert!(!session.state().typst_code.is_empty(), "Recompiled after rewrite");
    }

    #[tokio::test]
    async fn test_ui_actions_flow_through_the_reducer() {
        let (_dir, _stub, mut session) = session_with(StubBackend::default());
        session.dispatch(Action::SwitchTab(Tab::Workflows));
        session.dispatch(Action::SetJdText("We need a Rust engineer".to_string()));
        assert_eq!(session.state().active_tab, Tab::Workflows);
        assert_eq!(session.state().jd_text, "We need a Rust engineer");
    }
}
