// src/web/types.rs
//! Request bodies, response envelopes and shared state of the HTTP layer.

use rocket::form::FromForm;
use rocket::fs::TempFile;
use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::Request;
use serde_json::Value;
use std::sync::Arc;
use tracing::error;

use crate::applications::{ApplicationDraft, BatchSummary};
use crate::core::config_manager::ConfigManager;
use crate::core::service_client::ServiceClient;
use crate::france_travail::{FranceTravailClient, MetierSheet, RomeoResponse};
use crate::knowledge::KnowledgeBase;
use crate::llm::{optional_provider, LlmProvider};
use crate::types::{AnalysisReport, CandidateProfile, FormationRecommendation, JobRecommendation, SourceMetadata};

/// Shared, immutable per process.
pub struct AppState {
    pub config: ConfigManager,
    pub llm: Option<Arc<dyn LlmProvider>>,
    pub france_travail: FranceTravailClient,
    pub knowledge: KnowledgeBase,
}

impl AppState {
    pub fn from_config(config: ConfigManager) -> anyhow::Result<Self> {
        let http = ServiceClient::new(config.service.timeout_seconds)?;
        let llm = optional_provider(&config.llm, config.service.timeout_seconds)?;
        let france_travail = FranceTravailClient::new(&config.france_travail, http.clone());
        let knowledge = KnowledgeBase::new(http, &config.service.public_base_url);

        Ok(Self {
            config,
            llm,
            france_travail,
            knowledge,
        })
    }

    /// The configured model, or the configuration error the LLM routes answer with.
    pub fn llm(&self) -> Result<Arc<dyn LlmProvider>, ApiError> {
        self.llm.clone().ok_or_else(|| {
            error!("LLM route called without an API key for '{}'", self.config.llm.provider);
            ApiError::configuration("Clé API du modèle de langage non configurée")
        })
    }

    pub fn france_travail(&self) -> Result<&FranceTravailClient, ApiError> {
        if self.france_travail.is_configured() {
            Ok(&self.france_travail)
        } else {
            error!("France Travail route called without credentials");
            Err(ApiError::configuration("Secret API manquant"))
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
        }
    }
}

/// An error body with the status it is sent with.
pub struct ApiError {
    pub status: Status,
    pub body: StandardErrorResponse,
}

impl ApiError {
    pub fn bad_request(error: &str, error_code: &str, suggestions: &[&str]) -> Self {
        Self {
            status: Status::BadRequest,
            body: StandardErrorResponse::new(
                error.to_string(),
                error_code.to_string(),
                suggestions.iter().map(|s| s.to_string()).collect(),
            ),
        }
    }

    pub fn configuration(error: &str) -> Self {
        Self {
            status: Status::InternalServerError,
            body: StandardErrorResponse::new(
                error.to_string(),
                "CONFIGURATION_ERROR".to_string(),
                vec!["Vérifiez la configuration du serveur".to_string()],
            ),
        }
    }

    pub fn invalid_json(details: &str) -> Self {
        let mut error = Self::bad_request(
            "Format de requête invalide",
            "INVALID_JSON",
            &["Vérifiez le format JSON de la requête"],
        );
        error.body.suggestions.push(details.to_string());
        error
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let mut response = Json(self.body).respond_to(request)?;
        response.set_status(self.status);
        Ok(response)
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

// Requests

#[derive(Deserialize, Default)]
#[serde(crate = "rocket::serde", rename_all = "camelCase", default)]
pub struct AnalyzeCvRequest {
    pub cv_text: Option<String>,
    pub file_name: Option<String>,
}

#[derive(FromForm)]
pub struct CvUploadForm<'f> {
    pub file: TempFile<'f>,
}

#[derive(Deserialize, Default)]
#[serde(crate = "rocket::serde", rename_all = "camelCase", default)]
pub struct ProfileRequest {
    pub candidate_profile: Option<CandidateProfile>,
}

#[derive(Deserialize, Default)]
#[serde(crate = "rocket::serde", rename_all = "camelCase", default)]
pub struct RomeoRequest {
    pub cv_text: Option<String>,
    pub candidate_profile: Option<CandidateProfile>,
}

#[derive(Deserialize, Default)]
#[serde(crate = "rocket::serde", rename_all = "camelCase", default)]
pub struct RomeRequest {
    pub job_title: Option<String>,
    pub candidate_profile: Option<CandidateProfile>,
}

#[derive(Deserialize, Default)]
#[serde(crate = "rocket::serde", default)]
pub struct AskRequest {
    pub question: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(crate = "rocket::serde", rename_all = "camelCase", default)]
pub struct AutoApplyRequest {
    pub candidate_profile: Option<CandidateProfile>,
    pub selected_jobs: Vec<JobRecommendation>,
}

#[derive(Deserialize, Default)]
#[serde(crate = "rocket::serde", rename_all = "camelCase", default)]
pub struct FeedbackRequest {
    pub candidate_id: Option<String>,
    pub job_id: Option<String>,
    pub feedback_type: Option<String>,
    pub data: Option<Value>,
}

#[derive(Deserialize, Default)]
#[serde(crate = "rocket::serde", default)]
pub struct SendEmailRequest {
    pub email: Option<String>,
}

// Responses

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct AnalyzeCvResponse {
    pub success: bool,
    pub filename: Option<String>,
    pub analysis: AnalysisReport,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct JobsResponse {
    pub success: bool,
    pub jobs: Vec<JobRecommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SourceMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct FormationsResponse {
    pub success: bool,
    pub formations: Vec<FormationRecommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SourceMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct RomeoMetadata {
    pub source: String,
    pub timestamp: String,
    pub cv_length: usize,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct RomeoAnalysisResponse {
    pub success: bool,
    pub enriched_profile: Option<CandidateProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub romeo_analysis: Option<RomeoResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RomeoMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct RomeMetiersResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rome_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metier: Option<MetierSheet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SourceMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RomeMetiersResponse {
    pub fn failure(error: String, fallback: bool) -> Self {
        Self {
            success: false,
            rome_code: None,
            metier: None,
            metadata: None,
            fallback: fallback.then_some(true),
            error: Some(error),
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct AskResponse {
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct AutoApplyResponse {
    pub success: bool,
    pub applications: Vec<ApplicationDraft>,
    pub summary: BatchSummary,
    pub message: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn success(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct MethodNotAllowed {
    pub error: String,
}
