//! Model backend seam.
//!
//! The agent loop talks to a model only through the [`LLMClient`] trait.
//! Transport is left to implementors; [`ScriptedClient`] replays prepared
//! responses for tests and offline runs.

mod client;
mod config;
mod error;
mod scripted;

pub use client::{Capability, ChatRequest, LLMClient, ModelCapabilities};
pub use config::SamplingParams;
pub use error::{LLMError, LLMErrorKind};
pub use scripted::{RecordedRequest, ScriptedClient};
