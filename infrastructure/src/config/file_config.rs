//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly; resolution of the credential named by
//! `[auth]` happens at the composition root, not here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("server.base_url cannot be empty")]
    EmptyBaseUrl,
}

/// Raw server configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Base URL of the agent service
    pub base_url: String,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

/// Raw auth configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAuthConfig {
    /// API key written directly into the file. Takes the lowest priority
    /// of the credential sources.
    pub api_key: Option<String>,
    /// Name of the environment variable the API key is read from
    pub api_key_env: String,
}

impl Default for FileAuthConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: "AGENT_DESK_API_KEY".to_string(),
        }
    }
}

/// Complete raw configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: FileServerConfig,
    pub auth: FileAuthConfig,
}

impl FileConfig {
    /// Validate the configuration for semantic correctness
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.server.base_url.trim().is_empty() {
            return Err(ConfigValidationError::EmptyBaseUrl);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[server]
base_url = "https://agent.example.com"

[auth]
api_key = "sk-inline-key"
api_key_env = "SUPPORT_AGENT_KEY"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.base_url, "https://agent.example.com");
        assert_eq!(config.auth.api_key.as_deref(), Some("sk-inline-key"));
        assert_eq!(config.auth.api_key_env, "SUPPORT_AGENT_KEY");
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[server]
base_url = "http://10.0.0.5:9000"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.base_url, "http://10.0.0.5:9000");
        // Defaults should apply
        assert_eq!(config.auth.api_key, None);
        assert_eq!(config.auth.api_key_env, "AGENT_DESK_API_KEY");
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.server.base_url, "http://localhost:8000");
        assert_eq!(config.auth.api_key, None);
        assert_eq!(config.auth.api_key_env, "AGENT_DESK_API_KEY");
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_base_url() {
        let toml_str = r#"
[server]
base_url = ""
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::EmptyBaseUrl)
        ));
    }
}
