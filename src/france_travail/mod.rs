// src/france_travail/mod.rs
//! France Travail partner APIs: OAuth2 client credentials, offers search,
//! formations search, ROMEO suggestions and ROME occupation sheets.

pub mod formations;
pub mod offers;
pub mod rome;
pub mod romeo;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::config_manager::FranceTravailConfig;
use crate::core::service_client::{ServiceClient, ServiceError};

pub use formations::FormationSearch;
pub use offers::{recommend_jobs, OfferSearch};
pub use rome::{CompatibilityAnalysis, MetierSheet};
pub use romeo::{enrich_profile, RomeoResponse};

const TOKEN_URL: &str =
    "https://entreprise.francetravail.fr/connexion/oauth2/access_token?realm=%2Fpartenaire";
const API_BASE: &str = "https://api.francetravail.io/partenaire";

/// OAuth2 scope set requested for each family of calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Offers,
    Formations,
    Romeo,
    Rome,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Offers => "api_offresdemploiv2 o2dsoffre",
            Scope::Formations => "api_formations api_offresdemploiv2",
            Scope::Romeo => "api_romeov2",
            Scope::Rome => "api_rome-metiersv1 api_offresdemploiv2",
        }
    }
}

#[derive(Debug, Error)]
pub enum FranceTravailError {
    #[error("France Travail credentials are not configured")]
    NotConfigured,
    #[error("Authentification échouée: {0}")]
    Auth(ServiceError),
    #[error("Token d'accès non reçu")]
    NoToken,
    #[error(transparent)]
    Request(#[from] ServiceError),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Clone)]
pub struct FranceTravailClient {
    http: ServiceClient,
    client_id: Option<String>,
    client_secret: Option<String>,
    token_url: String,
    api_base: String,
}

impl FranceTravailClient {
    pub fn new(config: &FranceTravailConfig, http: ServiceClient) -> Self {
        Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token_url: TOKEN_URL.to_string(),
            api_base: API_BASE.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    pub(crate) fn http(&self) -> &ServiceClient {
        &self.http
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Exchange the client credentials for a bearer token limited to `scope`.
    pub async fn access_token(&self, scope: Scope) -> Result<String, FranceTravailError> {
        let (Some(client_id), Some(client_secret)) = (&self.client_id, &self.client_secret) else {
            return Err(FranceTravailError::NotConfigured);
        };

        debug!("Requesting France Travail token for scope '{}'", scope.as_str());

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("scope", scope.as_str()),
        ];

        let token: TokenResponse = self
            .http
            .post_form(&self.token_url, &form)
            .await
            .map_err(FranceTravailError::Auth)?;

        let token = token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(FranceTravailError::NoToken)?;

        info!("France Travail authentication succeeded for {:?}", scope);
        Ok(token)
    }
}
