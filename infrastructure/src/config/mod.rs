//! Configuration file loading for agent-desk
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `AGENT_DESK_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./agent-desk.toml` or `./.agent-desk.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/agent-desk/config.toml`
//! 5. Fallback: `~/.config/agent-desk/config.toml`
//! 6. Default values

mod file_config;
mod loader;

pub use file_config::{ConfigValidationError, FileAuthConfig, FileConfig, FileServerConfig};
pub use loader::ConfigLoader;
