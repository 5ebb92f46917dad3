//! Explicit workspace state with pure reducer-style transitions.
//!
//! Replaces ad hoc mutable UI fields: every change to what the workspace
//! shows goes through `reduce`, which is side-effect free. Persistence
//! and network effects live in the session, never here.

use serde::{Deserialize, Serialize};

use crate::models::profile::{GapAnalysis, UserProfile};
use crate::pipeline::PipelineConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Editor,
    Job,
    Workflows,
    Code,
    Templates,
    Settings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// The full visible state of the builder workspace.
///
/// `active_pipeline` is transient: it is never persisted, so a reloaded
/// workspace always starts with no pipeline active.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceState {
    pub active_tab: Tab,
    pub theme: Theme,
    pub username: String,
    pub profile: Option<UserProfile>,
    pub jd_text: String,
    pub analysis: Option<GapAnalysis>,
    /// Generated document source shown in the code tab.
    pub typst_code: String,
    /// Cache-busted URL of the rendered PDF, once a compile has landed.
    pub document_url: Option<String>,
    pub active_pipeline: Option<PipelineConfig>,
    pub presets: Vec<PipelineConfig>,
    pub loading: bool,
}

/// State transitions. Mutation-free by construction: the reducer consumes
/// the old state and returns the next one.
#[derive(Debug, Clone)]
pub enum Action {
    SwitchTab(Tab),
    ToggleTheme,
    SetUsername(String),
    SetJdText(String),
    ProfileLoaded(UserProfile),
    /// Wholesale replacement after any store operation (seed, create,
    /// delete) — the store is the source of truth for the list.
    PresetsLoaded(Vec<PipelineConfig>),
    ActivatePipeline(PipelineConfig),
    ClearPipeline,
    CompileStarted,
    CompileFinished {
        typst_code: String,
        document_url: String,
        analysis: Option<GapAnalysis>,
    },
    CompileFailed,
}

pub fn reduce(mut state: WorkspaceState, action: Action) -> WorkspaceState {
    match action {
        Action::SwitchTab(tab) => state.active_tab = tab,
        Action::ToggleTheme => state.theme = state.theme.toggled(),
        Action::SetUsername(username) => state.username = username,
        Action::SetJdText(jd_text) => state.jd_text = jd_text,
        Action::ProfileLoaded(profile) => state.profile = Some(profile),
        Action::PresetsLoaded(presets) => state.presets = presets,
        Action::ActivatePipeline(config) => state.active_pipeline = Some(config),
        Action::ClearPipeline => state.active_pipeline = None,
        Action::CompileStarted => state.loading = true,
        Action::CompileFinished {
            typst_code,
            document_url,
            analysis,
        } => {
            state.loading = false;
            state.typst_code = typst_code;
            state.document_url = Some(document_url);
            // A compile without analysis keeps the last one on screen,
            // matching the original behavior.
            if analysis.is_some() {
                state.analysis = analysis;
            }
        }
        Action::CompileFailed => state.loading = false,
    }
    state
}
