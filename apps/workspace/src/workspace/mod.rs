//! Workspace state and orchestration — explicit application state with
//! pure reducer transitions, compile request sequencing, and the async
//! session that ties the preset store and the backend relay together.

pub mod session;
pub mod state;
pub mod tracker;

pub use session::WorkspaceSession;
pub use state::{reduce, Action, Tab, Theme, WorkspaceState};
pub use tracker::CompileTracker;
