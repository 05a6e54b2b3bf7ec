// src/france_travail/formations.rs
//! Formations search (`formations/v1`).

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{FranceTravailClient, FranceTravailError};
use crate::matching::{
    formation_keywords, formation_level,
    formations::{format_duration, immediate_employment, relevance},
    resolve_location,
    text::clean_description,
    CodeKind,
};
use crate::types::{CandidateProfile, FormationRecommendation};

const FORMATIONS_PATH: &str = "/formations/v1/search";
const MAX_LIVE_FORMATIONS: usize = 5;
const DESCRIPTION_CHARS: usize = 200;
const FUNDING: &str = "CPF, Pôle Emploi, Région selon éligibilité";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFormation {
    pub intitule_formation: Option<String>,
    pub objectif_formation: Option<String>,
    pub contenu_formation: Option<String>,
    pub duree_formation: Option<Value>,
    pub url_formation: Option<String>,
    pub organisme_formateur: Option<Organisme>,
    pub lieu: Option<Lieu>,
    pub certification: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Organisme {
    pub denomination: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Lieu {
    pub libelle: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FormationsPage {
    #[serde(default)]
    resultats: Vec<RawFormation>,
}

#[derive(Debug)]
pub struct FormationSearch {
    pub formations: Vec<RawFormation>,
    pub keywords: String,
}

pub fn formation_search_params(profile: &CandidateProfile) -> Vec<(&'static str, String)> {
    vec![
        ("motsCles", formation_keywords(profile).to_string()),
        ("codePostal", resolve_location(profile.location.as_deref(), CodeKind::Postal)),
        ("distance", "50".to_string()),
        ("typeFormation", "all".to_string()),
        ("niveauFormation", formation_level(profile).to_string()),
        ("sort", "0".to_string()),
        ("range", "0-19".to_string()),
    ]
}

impl FranceTravailClient {
    pub async fn search_formations(
        &self,
        token: &str,
        profile: &CandidateProfile,
    ) -> Result<FormationSearch, FranceTravailError> {
        let url = self.endpoint(FORMATIONS_PATH);
        let params = formation_search_params(profile);
        let keywords = formation_keywords(profile).to_string();

        info!("Searching formations with keywords '{}'", keywords);

        let page: Option<FormationsPage> = self.http().get_json(&url, token, &params).await?;
        let formations = page.unwrap_or_default().resultats;

        info!("{} formations found", formations.len());
        Ok(FormationSearch { formations, keywords })
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

pub fn to_recommendation(formation: &RawFormation, profile: &CandidateProfile) -> FormationRecommendation {
    let title = non_empty(formation.intitule_formation.as_ref())
        .unwrap_or_else(|| "Formation professionnelle".to_string());
    let description = non_empty(formation.objectif_formation.as_ref())
        .or_else(|| non_empty(formation.contenu_formation.as_ref()));

    FormationRecommendation {
        immediate_employment: immediate_employment(&title),
        description: clean_description(
            description.as_deref(),
            DESCRIPTION_CHARS,
            "Formation adaptée à votre profil",
        ),
        duration: format_duration(formation.duree_formation.as_ref()),
        relevance: relevance(profile).to_string(),
        funding: FUNDING.to_string(),
        url: Some(non_empty(formation.url_formation.as_ref()).unwrap_or_else(|| "#".to_string())),
        organisme: Some(
            formation
                .organisme_formateur
                .as_ref()
                .and_then(|o| non_empty(o.denomination.as_ref()))
                .unwrap_or_else(|| "Organisme de formation".to_string()),
        ),
        lieu: Some(
            formation
                .lieu
                .as_ref()
                .and_then(|l| non_empty(l.libelle.as_ref()))
                .or_else(|| non_empty(profile.location.as_ref()))
                .unwrap_or_else(|| "Lieu à définir".to_string()),
        ),
        certification: Some(match &formation.certification {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            _ => "Attestation de formation".to_string(),
        }),
        title,
    }
}

/// First five live results, reshaped.
pub fn recommend_live_formations(
    formations: &[RawFormation],
    profile: &CandidateProfile,
) -> Vec<FormationRecommendation> {
    formations
        .iter()
        .take(MAX_LIVE_FORMATIONS)
        .map(|f| to_recommendation(f, profile))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params_for_entry_level_profile() {
        let profile = CandidateProfile {
            education_level: Some("Aucune qualification".into()),
            career_aspirations: Some("gagner du fric".into()),
            location: Some("Marseille".into()),
            ..Default::default()
        };
        let params = formation_search_params(&profile);
        assert!(params.contains(&("motsCles", "logistique cariste".to_string())));
        assert!(params.contains(&("codePostal", "13001".to_string())));
        assert!(params.contains(&("niveauFormation", "1".to_string())));
    }

    #[test]
    fn test_live_formation_mapping() {
        let raw: RawFormation = serde_json::from_value(json!({
            "intituleFormation": "CACES R489 cariste",
            "objectifFormation": "<p>Conduire   des chariots</p>",
            "dureeFormation": 35,
            "organismeFormateur": { "denomination": "AFPA" },
            "certification": "CACES"
        }))
        .unwrap();
        let profile = CandidateProfile {
            location: Some("Lille".into()),
            ..Default::default()
        };
        let rec = to_recommendation(&raw, &profile);

        assert_eq!(rec.title, "CACES R489 cariste");
        assert_eq!(rec.description, "Conduire des chariots");
        assert_eq!(rec.duration, "35 heures");
        assert!(rec.immediate_employment);
        assert_eq!(rec.organisme.as_deref(), Some("AFPA"));
        assert_eq!(rec.lieu.as_deref(), Some("Lille"));
        assert_eq!(rec.url.as_deref(), Some("#"));
        assert_eq!(rec.certification.as_deref(), Some("CACES"));
    }

    #[test]
    fn test_at_most_five_live_formations() {
        let many = vec![RawFormation::default(); 8];
        let recs = recommend_live_formations(&many, &CandidateProfile::default());
        assert_eq!(recs.len(), 5);
        assert_eq!(recs[0].title, "Formation professionnelle");
        assert_eq!(recs[0].duration, "Durée à définir");
    }
}
