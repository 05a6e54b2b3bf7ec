use serde::{Deserialize, Serialize};

use crate::types::{
    formation::{FormationRecommendation, ReconversionPath},
    job::JobRecommendation,
    profile::CandidateProfile,
};

/// What the LLM is asked to produce for a résumé.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CvAnalysis {
    pub candidate_analysis: CandidateProfile,
    pub training_suggestions: Vec<FormationRecommendation>,
    pub reconversion_paths: Vec<ReconversionPath>,
}

/// Final payload of the résumé analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub candidate_analysis: CandidateProfile,
    pub recommendations: Vec<JobRecommendation>,
    pub training_suggestions: Vec<FormationRecommendation>,
    pub reconversion_paths: Vec<ReconversionPath>,
    pub ai_metadata: AiMetadata,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AiMetadata {
    pub provider: String,
    pub model: String,
    pub tokens_used: Option<u32>,
    pub cost: String,
    pub confidence: String,
    pub real_jobs_count: usize,
    pub france_travail_error: Option<String>,
    pub candidate_abroad: bool,
    pub romeo_enrichment: bool,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// Source + timing block attached to France Travail backed responses.
#[derive(Debug, Clone, Serialize)]
pub struct SourceMetadata {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_found: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_used: Option<String>,
    pub timestamp: String,
}

impl SourceMetadata {
    pub fn now(source: &str) -> Self {
        Self {
            source: source.to_string(),
            total_found: None,
            query_used: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_total(mut self, total: usize) -> Self {
        self.total_found = Some(total);
        self
    }

    pub fn with_query(mut self, query: String) -> Self {
        self.query_used = Some(query);
        self
    }
}
