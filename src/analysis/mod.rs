// src/analysis/mod.rs
//! Résumé analysis pipeline: LLM profile extraction, ROMEO enrichment,
//! live job search and training suggestions.

pub mod prompts;

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};

use crate::france_travail::{
    enrich_profile, recommend_jobs, FranceTravailClient, FranceTravailError, RomeoResponse, Scope,
};
use crate::llm::{estimate_cost, parse_structured, ChatRequest, LlmProvider};
use crate::matching::recommend_formations;
use crate::types::{AiMetadata, AnalysisReport, CandidateProfile, CvAnalysis, JobRecommendation};

/// Shortest résumé worth sending to the model, counted after trimming.
pub const MIN_CV_CHARS: usize = 50;

const MAX_RECOMMENDATIONS: usize = 8;
const ANALYSIS_MAX_TOKENS: u32 = 2000;
const ANALYSIS_TEMPERATURE: f32 = 0.2;

static ABROAD_MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(canada|usa|australie|toronto|lisbonne|miami|rio|new york|sydney)\b")
        .expect("valid abroad markers regex")
});

/// Outcome of the extraction call. `fallback_reason` is set when the
/// default analysis stands in for the model's answer.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub analysis: CvAnalysis,
    pub tokens_used: Option<u32>,
    pub fallback_reason: Option<String>,
}

impl Extraction {
    fn fallback(tokens_used: Option<u32>, reason: String) -> Self {
        Self {
            analysis: default_analysis(),
            tokens_used,
            fallback_reason: Some(reason),
        }
    }
}

/// Neutral analysis used when the model is unreachable or answers garbage.
pub fn default_analysis() -> CvAnalysis {
    CvAnalysis {
        candidate_analysis: CandidateProfile {
            location_message: Some(String::new()),
            jobs_available_in_france: Some(true),
            ..Default::default()
        },
        training_suggestions: Vec::new(),
        reconversion_paths: Vec::new(),
    }
}

pub fn is_abroad(profile: &CandidateProfile) -> bool {
    let location = profile.location.as_deref().unwrap_or_default().to_lowercase();
    if location.contains("paris") || location.contains("france") {
        return false;
    }
    ABROAD_MARKERS.is_match(&location)
        || profile.jobs_available_in_france == Some(false)
}

pub struct ProfileExtractor {
    llm: Arc<dyn LlmProvider>,
}

impl ProfileExtractor {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    pub async fn extract(&self, cv_text: &str) -> Extraction {
        let request = ChatRequest::new(prompts::CV_ANALYSIS_SYSTEM, prompts::cv_analysis_user(cv_text))
            .max_tokens(ANALYSIS_MAX_TOKENS)
            .temperature(ANALYSIS_TEMPERATURE);

        let completion = match self.llm.complete(request).await {
            Ok(completion) => completion,
            Err(e) => {
                error!("{} analysis failed: {}", self.llm.name(), e);
                return Extraction::fallback(None, e.to_string());
            }
        };

        let tokens_used = completion.total_tokens();
        match parse_structured::<CvAnalysis>(&completion.content) {
            Ok(analysis) => {
                info!(
                    "Profile extracted ({} technical skills, {} training suggestions)",
                    analysis.candidate_analysis.technical_skills.len(),
                    analysis.training_suggestions.len()
                );
                Extraction {
                    analysis,
                    tokens_used,
                    fallback_reason: None,
                }
            }
            Err(e) => {
                warn!("Unusable analysis from {}: {}", self.llm.name(), e);
                Extraction::fallback(tokens_used, e.to_string())
            }
        }
    }
}

pub struct CvAnalyzer {
    llm: Arc<dyn LlmProvider>,
    france_travail: FranceTravailClient,
}

impl CvAnalyzer {
    pub fn new(llm: Arc<dyn LlmProvider>, france_travail: FranceTravailClient) -> Self {
        Self { llm, france_travail }
    }

    pub async fn analyze(&self, cv_text: &str) -> AnalysisReport {
        let span = info_span!("analyze_cv", chars = cv_text.chars().count());
        self.run(cv_text).instrument(span).await
    }

    async fn run(&self, cv_text: &str) -> AnalysisReport {
        let extraction = ProfileExtractor::new(self.llm.clone()).extract(cv_text).await;
        let CvAnalysis {
            candidate_analysis,
            training_suggestions,
            reconversion_paths,
        } = extraction.analysis;

        let profile = self.enrich(cv_text, candidate_analysis).await;

        let abroad = is_abroad(&profile);
        info!(
            "Location: {}, abroad: {}",
            profile.location.as_deref().unwrap_or("inconnue"),
            abroad
        );

        let (jobs, france_travail_error) = if abroad {
            info!("Candidate abroad, skipping France Travail search");
            (Vec::new(), None)
        } else {
            match self.search_jobs(&profile).await {
                Ok(jobs) => (jobs, None),
                Err(e) => {
                    warn!("France Travail search failed: {}", e);
                    (Vec::new(), Some(e.to_string()))
                }
            }
        };

        let real_jobs_count = jobs.len();
        let recommendations: Vec<JobRecommendation> = jobs.into_iter().take(MAX_RECOMMENDATIONS).collect();

        let training_suggestions = if training_suggestions.is_empty() {
            recommend_formations(&profile)
        } else {
            training_suggestions
        };

        let fallback = extraction.fallback_reason.is_some();
        let ai_metadata = AiMetadata {
            provider: format!("ASSIGNME IA ({}) + France Travail", self.llm.name()),
            model: self.llm.model().to_string(),
            tokens_used: extraction.tokens_used,
            cost: estimate_cost(extraction.tokens_used, self.llm.cost_per_token()),
            confidence: if fallback { "Faible" } else { "Élevée" }.to_string(),
            real_jobs_count,
            france_travail_error,
            candidate_abroad: abroad,
            romeo_enrichment: profile.romeo_analysis.is_some(),
            fallback,
            fallback_reason: extraction.fallback_reason,
        };

        info!("Analysis done with {} job recommendations", recommendations.len());

        AnalysisReport {
            candidate_analysis: profile,
            recommendations,
            training_suggestions,
            reconversion_paths,
            ai_metadata,
        }
    }

    /// Best effort: any ROMEO failure leaves the profile as extracted.
    async fn enrich(&self, cv_text: &str, profile: CandidateProfile) -> CandidateProfile {
        if !self.france_travail.is_configured() {
            return profile;
        }
        match self.romeo(cv_text).await {
            Ok(romeo) => enrich_profile(profile, &romeo),
            Err(e) => {
                warn!("ROMEO enrichment skipped: {}", e);
                profile
            }
        }
    }

    async fn romeo(&self, cv_text: &str) -> Result<RomeoResponse, FranceTravailError> {
        let token = self.france_travail.access_token(Scope::Romeo).await?;
        self.france_travail.romeo_suggest(&token, cv_text).await
    }

    async fn search_jobs(&self, profile: &CandidateProfile) -> Result<Vec<JobRecommendation>, FranceTravailError> {
        let token = self.france_travail.access_token(Scope::Offers).await?;
        let search = self.france_travail.search_offers(&token, profile).await?;
        Ok(recommend_jobs(&search.jobs, profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config_manager::FranceTravailConfig;
    use crate::core::service_client::ServiceClient;
    use crate::llm::testing::ScriptedProvider;

    const MODEL_REPLY: &str = r#"Voici l'analyse :
```json
{
  "candidate_analysis": {
    "name": "Karim B.",
    "location": "Lyon",
    "total_experience_years": "4",
    "current_position": "Préparateur de commandes",
    "technical_skills": ["CACES 1", "Gestion de stock"],
    "jobs_available_in_france": true
  },
  "training_suggestions": [
    { "title": "CACES R489", "immediate_employment": "true" }
  ]
}
```"#;

    fn unconfigured_france_travail() -> FranceTravailClient {
        FranceTravailClient::new(&FranceTravailConfig::default(), ServiceClient::new(5).unwrap())
    }

    fn profile_at(location: &str) -> CandidateProfile {
        CandidateProfile {
            location: Some(location.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_abroad() {
        assert!(is_abroad(&profile_at("Toronto, Canada")));
        assert!(is_abroad(&profile_at("Lisbonne")));
        assert!(!is_abroad(&profile_at("Paris, France")));
        assert!(!is_abroad(&profile_at("Lyon")));
        assert!(!is_abroad(&CandidateProfile::default()));

        // markers only count as whole words
        assert!(!is_abroad(&profile_at("Loriol-sur-Drôme")));
        assert!(!is_abroad(&profile_at("Lusanger")));
        assert!(!is_abroad(&profile_at("Brioude")));
        assert!(is_abroad(&profile_at("Rio de Janeiro")));
        assert!(is_abroad(&profile_at("Austin, USA")));

        let declared = CandidateProfile {
            location: Some("Dakar".into()),
            jobs_available_in_france: Some(false),
            ..Default::default()
        };
        assert!(is_abroad(&declared));

        // France wins over the declared flag
        let french = CandidateProfile {
            location: Some("Nantes, France".into()),
            jobs_available_in_france: Some(false),
            ..Default::default()
        };
        assert!(!is_abroad(&french));
    }

    #[tokio::test]
    async fn test_extract_parses_fenced_reply() {
        let extractor = ProfileExtractor::new(ScriptedProvider::replying(MODEL_REPLY));
        let extraction = extractor.extract("CV de Karim").await;

        assert!(extraction.fallback_reason.is_none());
        assert_eq!(extraction.tokens_used, Some(1500));
        let profile = &extraction.analysis.candidate_analysis;
        assert_eq!(profile.name.as_deref(), Some("Karim B."));
        assert_eq!(profile.total_experience_years, Some(4.0));
        assert!(extraction.analysis.training_suggestions[0].immediate_employment);
    }

    #[tokio::test]
    async fn test_extract_falls_back_on_garbage() {
        let extractor = ProfileExtractor::new(ScriptedProvider::replying("Désolé, je ne peux pas."));
        let extraction = extractor.extract("CV").await;

        assert!(extraction.fallback_reason.is_some());
        assert_eq!(extraction.analysis.candidate_analysis.jobs_available_in_france, Some(true));
        assert!(extraction.analysis.training_suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_without_france_travail() {
        let analyzer = CvAnalyzer::new(ScriptedProvider::replying(MODEL_REPLY), unconfigured_france_travail());
        let report = analyzer.analyze("CV de Karim").await;
        let metadata = &report.ai_metadata;

        assert_eq!(metadata.provider, "ASSIGNME IA (Mistral AI) + France Travail");
        assert_eq!(metadata.cost, "0.004500");
        assert_eq!(metadata.confidence, "Élevée");
        assert!(!metadata.fallback);
        assert!(!metadata.candidate_abroad);
        assert!(!metadata.romeo_enrichment);
        assert_eq!(metadata.real_jobs_count, 0);
        assert!(metadata.france_travail_error.is_some());
        assert!(report.recommendations.is_empty());
        assert_eq!(report.training_suggestions[0].title, "CACES R489");
    }

    #[tokio::test]
    async fn test_analyze_when_model_fails() {
        let analyzer = CvAnalyzer::new(ScriptedProvider::failing(), unconfigured_france_travail());
        let report = analyzer.analyze("CV").await;

        assert!(report.ai_metadata.fallback);
        assert!(report.ai_metadata.fallback_reason.as_deref().unwrap().contains("503"));
        assert_eq!(report.ai_metadata.cost, "0.003000");
        // empty model suggestions are replaced by the catalog
        assert!(!report.training_suggestions.is_empty());
    }
}
