// src/france_travail/offers.rs
//! Offers search (`offresdemploi/v2`) and reshaping of raw postings into
//! scored recommendations.

use reqwest::Url;
use serde::Deserialize;
use tracing::info;

use super::{FranceTravailClient, FranceTravailError};
use crate::matching::{
    build_keywords, evaluate, rank, resolve_location,
    text::{clean_description, contract_label, extract_job_skills, extract_salary_max, extract_salary_min},
    CodeKind,
};
use crate::types::{CandidateProfile, JobRecommendation, RawJobPosting};

const OFFERS_PATH: &str = "/offresdemploi/v2/offres/search";
const PUBLIC_OFFER_URL: &str = "https://candidat.pole-emploi.fr/offres/recherche/detail";
const SEARCH_RADIUS_KM: &str = "50";
const RESULT_RANGE: &str = "0-19";
const DESCRIPTION_CHARS: usize = 500;

#[derive(Debug, Default, Deserialize)]
struct OffersPage {
    #[serde(default)]
    resultats: Vec<RawJobPosting>,
}

#[derive(Debug)]
pub struct OfferSearch {
    pub jobs: Vec<RawJobPosting>,
    /// Encoded query string, echoed back in the response metadata.
    pub query: String,
}

/// Query parameters for the offers search.
pub fn offer_search_params(profile: &CandidateProfile) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("motsCles", build_keywords(profile)),
        ("commune", resolve_location(profile.location.as_deref(), CodeKind::Insee)),
        ("distance", SEARCH_RADIUS_KM.to_string()),
        ("sort", "0".to_string()),
        ("range", RESULT_RANGE.to_string()),
    ];

    let years = profile.years();
    if years >= 5.0 {
        params.push(("experience", "2".to_string()));
    } else if years >= 2.0 {
        params.push(("experience", "1".to_string()));
    }

    params
}

fn encode_query(base: &str, params: &[(&str, String)]) -> String {
    Url::parse_with_params(base, params.iter().map(|(k, v)| (*k, v.as_str())))
        .ok()
        .and_then(|url| url.query().map(str::to_string))
        .unwrap_or_default()
}

impl FranceTravailClient {
    pub async fn search_offers(
        &self,
        token: &str,
        profile: &CandidateProfile,
    ) -> Result<OfferSearch, FranceTravailError> {
        let url = self.endpoint(OFFERS_PATH);
        let params = offer_search_params(profile);
        let query = encode_query(&url, &params);

        info!("Searching France Travail offers: {}", query);

        let page: Option<OffersPage> = self.http().get_json(&url, token, &params).await?;
        let jobs = page.unwrap_or_default().resultats;

        info!("{} offers found", jobs.len());
        Ok(OfferSearch { jobs, query })
    }
}

pub fn offer_url(id: &str) -> String {
    format!("{}/{}", PUBLIC_OFFER_URL, id)
}

/// Reshape one posting for the frontend, with its score and justification.
pub fn to_recommendation(job: &RawJobPosting, profile: &CandidateProfile) -> JobRecommendation {
    let outcome = evaluate(job, profile);
    let salary_label = job.salary_label();
    let entreprise = job.entreprise.as_ref();

    JobRecommendation {
        id: job.id.clone(),
        source: "France Travail".to_string(),
        is_real_offer: true,
        job_title: job
            .intitule
            .clone()
            .unwrap_or_else(|| "Poste non spécifié".to_string()),
        company: entreprise
            .and_then(|e| e.nom.clone())
            .unwrap_or_else(|| "Entreprise non communiquée".to_string()),
        location: job
            .location()
            .map(str::to_string)
            .unwrap_or_else(|| "Lieu non spécifié".to_string()),
        description: clean_description(
            job.description.as_deref(),
            DESCRIPTION_CHARS,
            "Description non disponible",
        ),
        contract_type: contract_label(job.type_contrat.as_deref()),
        sector: job
            .sector()
            .map(str::to_string)
            .unwrap_or_else(|| "Secteur non spécifié".to_string()),
        salary_display: salary_label
            .map(str::to_string)
            .unwrap_or_else(|| "Salaire non communiqué".to_string()),
        salary_min: extract_salary_min(salary_label),
        salary_max: extract_salary_max(salary_label),
        experience_required: job
            .tier()
            .map(|t| t.label().to_string())
            .unwrap_or_else(|| "Non spécifié".to_string()),
        qualification_required: job
            .qualification_libelle
            .clone()
            .unwrap_or_else(|| "Non spécifié".to_string()),
        date_creation: job.date_creation.clone(),
        date_actualisation: job.date_actualisation.clone(),
        match_score: outcome.score,
        match_justification: outcome.justification(),
        france_travail_url: job.id.as_deref().map(offer_url),
        required_skills: extract_job_skills(&job.searchable_text()),
        company_types: vec![if entreprise.and_then(|e| e.adaptee).unwrap_or(false) {
            "Entreprise adaptée".to_string()
        } else {
            "Standard".to_string()
        }],
        evolution_potential: "À définir avec l'employeur".to_string(),
        screening_questions: Vec::new(),
    }
}

/// Score every posting and sort best first.
pub fn recommend_jobs(jobs: &[RawJobPosting], profile: &CandidateProfile) -> Vec<JobRecommendation> {
    let mut recommendations: Vec<JobRecommendation> =
        jobs.iter().map(|job| to_recommendation(job, profile)).collect();
    rank(&mut recommendations, |r| r.match_score);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::job::{Entreprise, Salaire};

    fn profile() -> CandidateProfile {
        CandidateProfile {
            location: Some("Lyon".into()),
            total_experience_years: Some(3.0),
            technical_skills: vec!["Excel".into(), "SQL".into()],
            current_position: Some("Comptable".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_search_params() {
        let params = offer_search_params(&profile());
        let get = |key: &str| params.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str());

        assert_eq!(get("motsCles"), Some("Excel SQL Comptable"));
        assert_eq!(get("commune"), Some("69123"));
        assert_eq!(get("distance"), Some("50"));
        assert_eq!(get("range"), Some("0-19"));
        assert_eq!(get("experience"), Some("1"));

        let params = offer_search_params(&CandidateProfile::default());
        assert!(params.iter().all(|(k, _)| *k != "experience"));
        assert!(params.contains(&("commune", "75056".to_string())));
    }

    #[test]
    fn test_encode_query() {
        let query = encode_query(
            "https://api.francetravail.io/partenaire/offresdemploi/v2/offres/search",
            &[("motsCles", "Excel SQL".to_string()), ("commune", "69123".to_string())],
        );
        assert_eq!(query, "motsCles=Excel+SQL&commune=69123");
    }

    #[test]
    fn test_recommendation_defaults() {
        let job = RawJobPosting {
            id: Some("123ABC".into()),
            ..Default::default()
        };
        let rec = to_recommendation(&job, &CandidateProfile::default());

        assert_eq!(rec.job_title, "Poste non spécifié");
        assert_eq!(rec.company, "Entreprise non communiquée");
        assert_eq!(rec.location, "Lieu non spécifié");
        assert_eq!(rec.description, "Description non disponible");
        assert_eq!(rec.contract_type, "Type non spécifié");
        assert_eq!(rec.salary_display, "Salaire non communiqué");
        assert_eq!(rec.experience_required, "Non spécifié");
        assert_eq!(rec.company_types, vec!["Standard"]);
        assert_eq!(
            rec.france_travail_url.as_deref(),
            Some("https://candidat.pole-emploi.fr/offres/recherche/detail/123ABC")
        );
        assert!((25..=95).contains(&rec.match_score));
    }

    #[test]
    fn test_recommendation_fields() {
        let job = RawJobPosting {
            id: Some("1".into()),
            intitule: Some("Comptable H/F".into()),
            description: Some("Maîtrise d'<b>Excel</b> et SQL".into()),
            entreprise: Some(Entreprise {
                nom: Some("ACME".into()),
                adaptee: Some(true),
            }),
            type_contrat: Some("CDD".into()),
            salaire: Some(Salaire {
                libelle: Some("Annuel de 30 000 € à 36 000 €".into()),
            }),
            experience_exige: Some("S".into()),
            ..Default::default()
        };
        let rec = to_recommendation(&job, &profile());

        assert_eq!(rec.description, "Maîtrise d'Excel et SQL");
        assert_eq!(rec.salary_min, Some(30000));
        assert_eq!(rec.salary_max, Some(36000));
        assert_eq!(rec.experience_required, "Expérience souhaitée");
        assert_eq!(rec.company_types, vec!["Entreprise adaptée"]);
        assert_eq!(rec.required_skills, vec!["Excel", "Sql"]);
        // 40 + 2 skills + tier
        assert_eq!(rec.match_score, 71);
    }

    #[test]
    fn test_recommend_jobs_sorted() {
        let weak = RawJobPosting {
            id: Some("weak".into()),
            intitule: Some("Chauffeur".into()),
            ..Default::default()
        };
        let strong = RawJobPosting {
            id: Some("strong".into()),
            intitule: Some("Comptable Excel SQL".into()),
            ..Default::default()
        };
        let ranked = recommend_jobs(&[weak, strong], &profile());
        assert_eq!(ranked[0].id.as_deref(), Some("strong"));
    }
}
