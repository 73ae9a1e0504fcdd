//! Agent module.
//!
//! This module contains the [`Agent`] tool-calling loop, its configuration,
//! and the preset registry that builds ready-made agents.

mod config;
mod presets;
pub mod prompts;
mod session;
mod state;

pub use config::{AgentConfig, DEFAULT_MAX_STEPS};
pub use presets::{AgentPreset, PresetRegistry};
pub use session::Agent;
pub use state::SessionState;
