// src/france_travail/rome.rs
//! ROME occupation sheets and their compatibility with a candidate.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::{FranceTravailClient, FranceTravailError};
use crate::matching::text::clean_description;
use crate::types::CandidateProfile;

const SEARCH_PATH: &str = "/rome/v1/metier/recherche";
const METIER_PATH: &str = "/rome/v1/metier";
const SNIPPET_CHARS: usize = 300;

const BASE_COMPATIBILITY: i32 = 50;
const NO_QUALIFICATION_BONUS: i32 = 20;
const SKILLS_BONUS: i32 = 15;
const RELATIONAL_PENALTY: i32 = 15;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    #[serde(default)]
    code_rome: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMetier {
    pub code_rome: Option<String>,
    pub libelle_rome: Option<String>,
    pub definition: Option<String>,
    pub competences: Vec<RawCompetence>,
    pub conditions_exercice: Vec<RawCondition>,
    pub formations_associees: Vec<RawFormationAssociee>,
    pub mobilites: Vec<RawMobilite>,
    pub environnements_travail: Vec<RawLibelle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCompetence {
    pub libelle: Option<String>,
    pub nom: Option<String>,
    pub niveau_maitrise: Option<Value>,
    pub type_competence: Option<String>,
}

impl RawCompetence {
    fn label(&self) -> Option<&str> {
        self.libelle.as_deref().or(self.nom.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCondition {
    pub libelle: Option<String>,
    pub definition: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFormationAssociee {
    pub libelle: Option<String>,
    pub niveau_formation: Option<Value>,
    pub commentaire: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMobilite {
    pub code_rome: Option<String>,
    pub libelle_metier: Option<String>,
    pub type_mobilite: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLibelle {
    pub libelle: Option<String>,
}

/// Occupation sheet as returned to the frontend.
#[derive(Debug, Clone, Serialize)]
pub struct MetierSheet {
    pub code_rome: Option<String>,
    pub libelle: Option<String>,
    pub definition: String,
    pub competences_requises: Vec<CompetenceRequise>,
    pub conditions_exercice: Vec<ConditionExercice>,
    pub formations_recommandees: Vec<FormationAssociee>,
    pub evolutions_metier: Vec<EvolutionMetier>,
    pub environnements: Vec<String>,
    pub compatibilite_profil: CompatibilityAnalysis,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompetenceRequise {
    pub libelle: Option<String>,
    pub niveau_requis: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConditionExercice {
    pub libelle: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormationAssociee {
    pub libelle: Option<String>,
    pub niveau: String,
    pub commentaire: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvolutionMetier {
    pub code_rome: Option<String>,
    pub libelle_metier: Option<String>,
    pub type_evolution: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibilityAnalysis {
    pub score_compatibilite: i32,
    pub points_forts: Vec<String>,
    pub points_attention: Vec<String>,
    pub recommandations: Vec<String>,
}

impl FranceTravailClient {
    /// First ROME code matching a job title, if any.
    pub async fn rome_search(&self, token: &str, job_title: &str) -> Result<Option<String>, FranceTravailError> {
        let params = [
            ("motsCles", job_title.to_lowercase()),
            ("champs", "codeRome,libelleRome,definition".to_string()),
        ];
        let hits: Option<Vec<SearchHit>> = self
            .http()
            .get_json(&self.endpoint(SEARCH_PATH), token, &params)
            .await?;

        let code = hits
            .unwrap_or_default()
            .into_iter()
            .find_map(|hit| hit.code_rome);
        match &code {
            Some(code) => info!("ROME code {} found for '{}'", code, job_title),
            None => warn!("No ROME code found for '{}'", job_title),
        }
        Ok(code)
    }

    pub async fn rome_metier(&self, token: &str, code: &str) -> Result<Option<RawMetier>, FranceTravailError> {
        let url = format!("{}/{}", self.endpoint(METIER_PATH), code);
        let metier: Option<RawMetier> = self.http().get_json(&url, token, &[]).await?;
        Ok(metier)
    }
}

fn snippet(text: Option<&str>) -> String {
    clean_description(text, usize::MAX, "")
        .chars()
        .take(SNIPPET_CHARS)
        .collect()
}

fn value_label(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn build_sheet(metier: &RawMetier, profile: &CandidateProfile) -> MetierSheet {
    MetierSheet {
        code_rome: metier.code_rome.clone(),
        libelle: metier.libelle_rome.clone(),
        definition: snippet(metier.definition.as_deref()),
        competences_requises: metier
            .competences
            .iter()
            .take(8)
            .map(|c| CompetenceRequise {
                libelle: c.label().map(str::to_string),
                niveau_requis: value_label(c.niveau_maitrise.as_ref())
                    .unwrap_or_else(|| "Non spécifié".to_string()),
                kind: c
                    .type_competence
                    .clone()
                    .unwrap_or_else(|| "Compétence professionnelle".to_string()),
            })
            .collect(),
        conditions_exercice: metier
            .conditions_exercice
            .iter()
            .take(5)
            .map(|c| ConditionExercice {
                libelle: c.libelle.clone(),
                description: snippet(c.definition.as_deref()),
            })
            .collect(),
        formations_recommandees: metier
            .formations_associees
            .iter()
            .take(5)
            .map(|f| FormationAssociee {
                libelle: f.libelle.clone(),
                niveau: value_label(f.niveau_formation.as_ref())
                    .unwrap_or_else(|| "Tout niveau".to_string()),
                commentaire: snippet(f.commentaire.as_deref()),
            })
            .collect(),
        evolutions_metier: metier
            .mobilites
            .iter()
            .take(5)
            .map(|m| EvolutionMetier {
                code_rome: m.code_rome.clone(),
                libelle_metier: m.libelle_metier.clone(),
                type_evolution: m
                    .type_mobilite
                    .clone()
                    .unwrap_or_else(|| "Évolution".to_string()),
            })
            .collect(),
        environnements: metier
            .environnements_travail
            .iter()
            .take(6)
            .filter_map(|e| e.libelle.clone())
            .collect(),
        compatibilite_profil: analyze_compatibility(metier, profile),
    }
}

pub fn analyze_compatibility(metier: &RawMetier, profile: &CandidateProfile) -> CompatibilityAnalysis {
    let mut analysis = CompatibilityAnalysis {
        score_compatibilite: BASE_COMPATIBILITY,
        points_forts: Vec::new(),
        points_attention: Vec::new(),
        recommandations: Vec::new(),
    };

    if profile.has_no_qualification() {
        let accessible = metier.formations_associees.iter().any(|f| {
            let label = f.libelle.as_deref().unwrap_or_default().to_lowercase();
            label.contains("sans diplôme")
                || label.contains("cqp")
                || value_label(f.niveau_formation.as_ref()).as_deref() == Some("V")
        });

        if accessible {
            analysis.score_compatibilite += NO_QUALIFICATION_BONUS;
            analysis
                .points_forts
                .push("Métier accessible sans qualification préalable".to_string());
        } else {
            analysis
                .points_attention
                .push("Formation préalable recommandée".to_string());
            analysis
                .recommandations
                .push("Envisager une formation courte avant candidature".to_string());
        }
    }

    let candidate_skills: Vec<String> = profile
        .technical_skills
        .iter()
        .map(|s| s.to_lowercase())
        .collect();
    let matched = metier
        .competences
        .iter()
        .filter_map(|c| c.label())
        .map(|label| label.to_lowercase().chars().take(6).collect::<String>())
        .filter(|prefix| !prefix.is_empty())
        .filter(|prefix| candidate_skills.iter().any(|s| s.contains(prefix.as_str())))
        .count();
    if matched > 0 {
        analysis.score_compatibilite += SKILLS_BONUS;
        analysis
            .points_forts
            .push(format!("{} compétence(s) déjà acquise(s)", matched));
    }

    let relational = metier.environnements_travail.iter().any(|e| {
        let label = e.libelle.as_deref().unwrap_or_default().to_lowercase();
        label.contains("client") || label.contains("équipe") || label.contains("public")
    });
    let psychological = profile
        .psychological_profile
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    if relational && psychological.contains("peu relationnel") {
        analysis.score_compatibilite -= RELATIONAL_PENALTY;
        analysis
            .points_attention
            .push("Métier nécessitant des compétences relationnelles".to_string());
    }

    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metier() -> RawMetier {
        serde_json::from_value(json!({
            "codeRome": "N1103",
            "libelleRome": "Magasinage et préparation de commandes",
            "definition": "<p>Réceptionne, stocke et prépare   les commandes.</p>",
            "competences": [
                { "libelle": "Conduite de chariot élévateur", "niveauMaitrise": 2 },
                { "nom": "Gestion des stocks", "typeCompetence": "Savoir-faire" }
            ],
            "formationsAssociees": [{ "libelle": "CQP Agent logistique", "niveauFormation": "V" }],
            "environnementsTravail": [{ "libelle": "Entrepôt" }, { "libelle": "Relation client" }]
        }))
        .unwrap()
    }

    #[test]
    fn test_sheet_extraction() {
        let sheet = build_sheet(&metier(), &CandidateProfile::default());
        assert_eq!(sheet.definition, "Réceptionne, stocke et prépare les commandes.");
        assert_eq!(sheet.competences_requises.len(), 2);
        assert_eq!(sheet.competences_requises[0].niveau_requis, "2");
        assert_eq!(sheet.competences_requises[1].libelle.as_deref(), Some("Gestion des stocks"));
        assert_eq!(sheet.competences_requises[1].kind, "Savoir-faire");
        assert_eq!(sheet.formations_recommandees[0].niveau, "V");
        assert_eq!(sheet.environnements, vec!["Entrepôt", "Relation client"]);
        assert_eq!(sheet.compatibilite_profil.score_compatibilite, 50);
    }

    #[test]
    fn test_compatibility_deltas() {
        let profile = CandidateProfile {
            education_level: Some("Aucune qualification".into()),
            technical_skills: vec!["Conduite chariot CACES".into()],
            psychological_profile: Some("Plutôt peu relationnel, aime le travail seul".into()),
            ..Default::default()
        };
        let analysis = analyze_compatibility(&metier(), &profile);

        // 50 + 20 (accessible) + 15 (skills) - 15 (relational)
        assert_eq!(analysis.score_compatibilite, 70);
        assert_eq!(
            analysis.points_forts,
            vec![
                "Métier accessible sans qualification préalable",
                "1 compétence(s) déjà acquise(s)"
            ]
        );
        assert_eq!(
            analysis.points_attention,
            vec!["Métier nécessitant des compétences relationnelles"]
        );
    }

    #[test]
    fn test_unqualified_candidate_without_accessible_training() {
        let mut metier = metier();
        metier.formations_associees.clear();
        let profile = CandidateProfile {
            education_level: Some("Aucune qualification".into()),
            ..Default::default()
        };
        let analysis = analyze_compatibility(&metier, &profile);
        assert_eq!(analysis.score_compatibilite, 50);
        assert_eq!(analysis.points_attention, vec!["Formation préalable recommandée"]);
        assert_eq!(
            analysis.recommandations,
            vec!["Envisager une formation courte avant candidature"]
        );
    }
}
