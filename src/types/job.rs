// src/types/job.rs
//! Job postings as returned by the offers search, and the reshaped
//! recommendation sent to the frontend.

use serde::{Deserialize, Serialize};

/// One offer from the France Travail `offres/search` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawJobPosting {
    pub id: Option<String>,
    pub intitule: Option<String>,
    pub description: Option<String>,
    pub entreprise: Option<Entreprise>,
    pub lieu_travail: Option<LieuTravail>,
    pub type_contrat: Option<String>,
    pub secteur_activite: Option<String>,
    pub secteur_activite_libelle: Option<String>,
    pub salaire: Option<Salaire>,
    pub experience_exige: Option<String>,
    pub qualification_libelle: Option<String>,
    pub date_creation: Option<String>,
    pub date_actualisation: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Entreprise {
    pub nom: Option<String>,
    pub adaptee: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LieuTravail {
    pub libelle: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Salaire {
    pub libelle: Option<String>,
}

/// Experience tier declared by a posting (`experienceExige`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceTier {
    Beginner,
    Some,
    Senior,
}

impl ExperienceTier {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "D" => Some(Self::Beginner),
            "S" => Some(Self::Some),
            "E" => Some(Self::Senior),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Beginner => "Débutant accepté",
            Self::Some => "Expérience souhaitée",
            Self::Senior => "Expérience exigée",
        }
    }
}

impl RawJobPosting {
    pub fn title(&self) -> &str {
        self.intitule.as_deref().unwrap_or_default()
    }

    /// Lowercased `title description`, the text skills are matched against.
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {}",
            self.title(),
            self.description.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }

    pub fn sector(&self) -> Option<&str> {
        self.secteur_activite_libelle
            .as_deref()
            .or(self.secteur_activite.as_deref())
    }

    pub fn location(&self) -> Option<&str> {
        self.lieu_travail.as_ref().and_then(|l| l.libelle.as_deref())
    }

    pub fn tier(&self) -> Option<ExperienceTier> {
        self.experience_exige
            .as_deref()
            .and_then(ExperienceTier::from_code)
    }

    pub fn salary_label(&self) -> Option<&str> {
        self.salaire.as_ref().and_then(|s| s.libelle.as_deref())
    }
}

/// A posting reshaped for the product, with its match score.
///
/// Also the shape the frontend sends back when the candidate selects jobs
/// for automatic applications, hence the lenient defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRecommendation {
    pub id: Option<String>,
    pub source: String,
    pub is_real_offer: bool,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub contract_type: String,
    pub sector: String,
    pub salary_display: String,
    pub salary_min: Option<u32>,
    pub salary_max: Option<u32>,
    pub experience_required: String,
    pub qualification_required: String,
    pub date_creation: Option<String>,
    pub date_actualisation: Option<String>,
    pub match_score: u8,
    pub match_justification: String,
    pub france_travail_url: Option<String>,
    pub required_skills: Vec<String>,
    pub company_types: Vec<String>,
    pub evolution_potential: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub screening_questions: Vec<String>,
}
