//! Pipeline presets — named filter/order rules applied to a profile's
//! project list before a compile request is sent.

pub mod apply;
pub mod editor;
pub mod presets;
pub mod store;

pub use apply::apply;
pub use presets::{default_presets, PipelineConfig, Section};
pub use store::PresetStore;
