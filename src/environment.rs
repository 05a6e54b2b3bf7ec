// src/environment.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Non-secret settings for one deployment, as written in `config.yaml`.
///
/// Every field is optional; environment variables override whatever is set here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub port: Option<u16>,
    pub llm_provider: Option<String>,
    pub public_base_url: Option<String>,
    pub http_timeout_secs: Option<u64>,
    pub france_travail_client_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: EnvironmentConfig,
    #[serde(default)]
    production: EnvironmentConfig,
}

impl EnvironmentConfig {
    /// Name of the active section, from `ASSIGNME_ENV` or `ENVIRONMENT`.
    pub fn environment_name() -> String {
        std::env::var("ASSIGNME_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    /// Load the section for `environment`. A missing file is not an error.
    pub fn load(path: &Path, environment: &str) -> Result<Option<Self>> {
        if !path.exists() {
            info!("{} not found, using environment variables only", path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content, environment)
            .with_context(|| format!("Failed to parse {}", path.display()))
            .map(Some)
    }

    pub fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile = serde_yaml::from_str(content)?;

        info!("Loading configuration for environment: {}", environment);
        Ok(match environment {
            "production" => config_file.production,
            _ => config_file.local,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
local:
  port: 8000
  llm_provider: openai
production:
  port: 8080
  public_base_url: https://assignme.fr
  http_timeout_secs: 20
"#;

    #[test]
    fn test_sections_are_selected_by_environment() {
        let local = EnvironmentConfig::from_yaml(SAMPLE, "local").unwrap();
        assert_eq!(local.port, Some(8000));
        assert_eq!(local.llm_provider.as_deref(), Some("openai"));
        assert!(local.public_base_url.is_none());

        let production = EnvironmentConfig::from_yaml(SAMPLE, "production").unwrap();
        assert_eq!(production.port, Some(8080));
        assert_eq!(production.http_timeout_secs, Some(20));
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let loaded = EnvironmentConfig::load(Path::new("/nonexistent/config.yaml"), "local").unwrap();
        assert!(loaded.is_none());
    }
}
