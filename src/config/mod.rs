//! Configuration management for toolstep.
//!
//! Configuration is stored in TOML. The search order is:
//! 1. `./toolstep.toml` (project-local)
//! 2. `~/.config/toolstep/config.toml` (user config)
//!
//! # Usage
//!
//! ```rust,no_run
//! use toolstep::config;
//!
//! let config = config::load()?;
//! let agent_config = config.agent_config("You are a helpful assistant.");
//! let sandbox = config.sandbox();
//! # Ok::<(), toolstep::config::ConfigError>(())
//! ```

mod file;
mod types;

pub use file::{config_dir, from_path, from_str, load, search_paths};
pub use types::{AgentSection, ConfigError, ConfigErrorKind, ToolstepConfig};
