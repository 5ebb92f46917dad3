//! Atelier workspace core — the client-side engine behind the resume
//! builder workspace.
//!
//! The heavy lifting (profile ingestion, AI rewriting, gap analysis, PDF
//! typesetting) lives in the backend service; this crate owns what the
//! workspace itself is responsible for: pipeline presets and their
//! persistence, applying a preset to a profile's project list, workspace
//! state transitions, and the HTTP relay that submits compile requests.

pub mod backend;
pub mod config;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod workspace;
