//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::PathBuf;

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `AGENT_DESK_*` environment variables (`AGENT_DESK_SERVER__BASE_URL`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./agent-desk.toml` or `./.agent-desk.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/agent-desk/config.toml`
    /// 5. Fallback: `~/.config/agent-desk/config.toml`
    /// 6. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        // Add global config (XDG or fallback)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(&global_path));
            }
        }

        // Add project-level config files (check both names)
        for filename in &["agent-desk.toml", ".agent-desk.toml"] {
            let path = PathBuf::from(filename);
            if path.exists() {
                figment = figment.merge(Toml::file(&path));
                break;
            }
        }

        // Add explicit config path (highest priority for files)
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("AGENT_DESK_").split("__"));

        figment.extract().map_err(Box::new)
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/agent-desk/config.toml if set,
    /// otherwise falls back to ~/.config/agent-desk/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("agent-desk").join("config.toml"))
    }
}
