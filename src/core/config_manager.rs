// src/core/config_manager.rs
//! Unified configuration: `config.yaml` section overlaid by environment variables.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::environment::EnvironmentConfig;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_PROVIDER: &str = "mistral";
const DEFAULT_PUBLIC_BASE_URL: &str = "https://assignme.fr";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HASH_SALT: &str = "assignme-salt";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub port: u16,
    pub llm: LlmConfig,
    pub france_travail: FranceTravailConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub provider: String,
    pub openai_api_key: Option<String>,
    pub mistral_api_key: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FranceTravailConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl FranceTravailConfig {
    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Where the reference PDF is served from.
    pub public_base_url: String,
    pub timeout_seconds: u64,
    pub hash_salt: String,
}

impl ConfigManager {
    /// Load `.env`, then `config.yaml` (optional), then the process environment.
    pub fn load(config_path: &Path) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            info!("Loaded environment from {}", path.display());
        }

        let environment = EnvironmentConfig::environment_name();
        let file = EnvironmentConfig::load(config_path, &environment)?;

        Self::from_sources(environment, file, |key| std::env::var(key).ok())
    }

    /// Build from an optional file section and an environment lookup.
    pub fn from_sources<F>(environment: String, file: Option<EnvironmentConfig>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file.unwrap_or_default();
        let var = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("PORT").or_else(|| var("ROCKET_PORT")) {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got '{}'", raw))?,
            None => file.port.unwrap_or(DEFAULT_PORT),
        };

        let timeout_seconds = match var("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("HTTP_TIMEOUT_SECS must be a number, got '{}'", raw))?,
            None => file.http_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        let llm = LlmConfig {
            provider: var("LLM_PROVIDER")
                .or(file.llm_provider)
                .unwrap_or_else(|| DEFAULT_PROVIDER.to_string())
                .to_lowercase(),
            openai_api_key: var("OPENAI_API_KEY"),
            mistral_api_key: var("MISTRAL_API_KEY"),
        };

        let france_travail = FranceTravailConfig {
            client_id: var("FRANCE_TRAVAIL_CLIENT_ID").or(file.france_travail_client_id),
            client_secret: var("FRANCE_TRAVAIL_SECRET"),
        };

        let public_base_url = var("PUBLIC_BASE_URL")
            .or_else(|| var("URL"))
            .or(file.public_base_url)
            .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let service = ServiceConfig {
            public_base_url,
            timeout_seconds,
            hash_salt: var("HASH_SALT").unwrap_or_else(|| DEFAULT_HASH_SALT.to_string()),
        };

        let config = Self {
            environment,
            port,
            llm,
            france_travail,
            service,
        };
        config.log_missing_secrets();
        Ok(config)
    }

    fn log_missing_secrets(&self) {
        if self.llm.openai_api_key.is_none() && self.llm.mistral_api_key.is_none() {
            warn!("No LLM API key configured, LLM-backed routes will answer with a configuration error");
        }
        if !self.france_travail.is_configured() {
            warn!("France Travail credentials missing, job and formation search will be unavailable");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn build(vars: &[(&str, &str)], file: Option<EnvironmentConfig>) -> Result<ConfigManager> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConfigManager::from_sources("local".to_string(), file, |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = build(&[], None).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.llm.provider, "mistral");
        assert!(config.llm.openai_api_key.is_none());
        assert!(!config.france_travail.is_configured());
        assert_eq!(config.service.public_base_url, "https://assignme.fr");
        assert_eq!(config.service.timeout_seconds, 30);
        assert_eq!(config.service.hash_salt, "assignme-salt");
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = EnvironmentConfig {
            port: Some(9000),
            llm_provider: Some("openai".into()),
            public_base_url: Some("https://staging.assignme.fr/".into()),
            ..Default::default()
        };

        let config = build(&[("ROCKET_PORT", "8123"), ("OPENAI_API_KEY", " sk-test ")], Some(file.clone())).unwrap();
        assert_eq!(config.port, 8123);
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.service.public_base_url, "https://staging.assignme.fr");

        let config = build(&[("LLM_PROVIDER", "Mistral"), ("URL", "http://localhost:8888")], Some(file)).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.llm.provider, "mistral");
        assert_eq!(config.service.public_base_url, "http://localhost:8888");
    }

    #[test]
    fn test_empty_secrets_count_as_missing() {
        let config = build(&[("FRANCE_TRAVAIL_CLIENT_ID", "id"), ("FRANCE_TRAVAIL_SECRET", "  ")], None).unwrap();
        assert!(!config.france_travail.is_configured());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(build(&[("PORT", "eighty")], None).is_err());
    }
}
