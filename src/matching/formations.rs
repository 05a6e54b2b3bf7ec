// src/matching/formations.rs
//! Static training catalog and the rules that pick from it, plus the small
//! helpers used to reshape live formation results.

use serde_json::Value;

use crate::types::{CandidateProfile, FormationRecommendation};

const MAX_FORMATIONS: usize = 6;
const FINANCIAL_KEYWORDS: &[&str] = &["fric", "argent", "salaire", "gagner"];
const QUICK_FORMATIONS: &[&str] = &["cariste", "securite", "sécurité", "cqp", "habilitation", "permis"];

struct CatalogEntry {
    title: &'static str,
    description: &'static str,
    duration: &'static str,
    relevance: &'static str,
    funding: &'static str,
    immediate_employment: bool,
    organisme: &'static str,
    certification: &'static str,
}

impl CatalogEntry {
    fn recommend(&self, profile: &CandidateProfile) -> FormationRecommendation {
        FormationRecommendation {
            title: self.title.to_string(),
            description: self.description.to_string(),
            duration: self.duration.to_string(),
            relevance: self.relevance.to_string(),
            funding: self.funding.to_string(),
            immediate_employment: self.immediate_employment,
            url: Some("#".to_string()),
            organisme: Some(self.organisme.to_string()),
            lieu: Some(
                profile
                    .location
                    .clone()
                    .filter(|l| !l.trim().is_empty())
                    .unwrap_or_else(|| "France".to_string()),
            ),
            certification: Some(self.certification.to_string()),
        }
    }
}

static ENTRY_LEVEL: &[CatalogEntry] = &[
    CatalogEntry {
        title: "CQP Agent de propreté et d'hygiène",
        description: "Formation pour devenir agent de propreté, débouchant sur des postes dans le nettoyage industriel ou commercial.",
        duration: "3 mois",
        relevance: "Adaptée au profil car elle ne nécessite pas de qualifications préalables et offre des débouchés rapides.",
        funding: "CPF, Pôle Emploi, financement possible",
        immediate_employment: true,
        organisme: "Organisme de formation",
        certification: "CQP reconnu",
    },
    CatalogEntry {
        title: "Permis de conduire cariste",
        description: "Formation pour obtenir le permis de conduire des chariots élévateurs, permettant de travailler dans des entrepôts.",
        duration: "1 mois",
        relevance: "Formation courte et pratique, avec une forte demande sur le marché du travail.",
        funding: "CPF, Pôle Emploi selon éligibilité",
        immediate_employment: true,
        organisme: "Centre de formation agréé",
        certification: "CACES R489",
    },
    CatalogEntry {
        title: "Formation en sécurité incendie",
        description: "Formation pour devenir agent de sécurité incendie, avec des débouchés dans divers secteurs.",
        duration: "2 mois",
        relevance: "Permet d'accéder à des postes dans la sécurité, secteur en constante demande.",
        funding: "CPF, Région, Pôle Emploi",
        immediate_employment: true,
        organisme: "Organisme de formation sécurité",
        certification: "SSIAP 1",
    },
];

static TECHNICAL: &[CatalogEntry] = &[
    CatalogEntry {
        title: "Formation CQP Technicien de Maintenance",
        description: "Formation pour approfondir les compétences en maintenance industrielle, avec un accent sur les nouvelles technologies.",
        duration: "6 mois",
        relevance: "Permet d'acquérir des compétences supplémentaires et d'augmenter l'employabilité dans le secteur.",
        funding: "CPF, OPCO, entreprise",
        immediate_employment: false,
        organisme: "Centre de formation technique",
        certification: "CQP Maintenance",
    },
    CatalogEntry {
        title: "Formation en Automatisme et Régulation",
        description: "Formation axée sur les systèmes automatisés et la régulation, très demandée dans le secteur industriel.",
        duration: "1 an",
        relevance: "Complète les compétences en électrotechnique et ouvre des opportunités dans des secteurs en pleine croissance.",
        funding: "CPF, Région, OPCO",
        immediate_employment: false,
        organisme: "Institut technique",
        certification: "Titre professionnel",
    },
];

static SOCIAL: &[CatalogEntry] = &[
    CatalogEntry {
        title: "Titre professionnel Conseiller en insertion professionnelle",
        description: "Formation pour accompagner des publics en parcours d'insertion sociale et professionnelle.",
        duration: "7 mois",
        relevance: "Valorise une expérience du secteur social et ouvre les métiers de l'accompagnement vers l'emploi.",
        funding: "CPF, Région, Pôle Emploi",
        immediate_employment: false,
        organisme: "Organisme de formation",
        certification: "Titre professionnel CIP",
    },
    CatalogEntry {
        title: "Formation Accompagnement social et médiation",
        description: "Formation aux techniques d'écoute, de médiation et d'accompagnement des publics fragiles.",
        duration: "3 mois",
        relevance: "Renforce les compétences relationnelles attendues dans les structures sociales.",
        funding: "CPF, OPCO selon statut",
        immediate_employment: false,
        organisme: "Organisme de formation",
        certification: "Attestation de formation",
    },
];

static TERTIARY: &[CatalogEntry] = &[CatalogEntry {
    title: "Formation en gestion de projet",
    description: "Formation axée sur la gestion de projets complexes, avec un accent sur les outils numériques.",
    duration: "3 mois",
    relevance: "Adaptée à votre expérience et améliore vos perspectives d'évolution.",
    funding: "CPF, employeur selon statut",
    immediate_employment: false,
    organisme: "Organisme de formation",
    certification: "Certification gestion de projet",
}];

static MANAGEMENT: &[CatalogEntry] = &[CatalogEntry {
    title: "Management et Leadership",
    description: "Formation au pilotage d'équipe, à la délégation et à la conduite du changement.",
    duration: "2 mois",
    relevance: "Capitalise sur une expérience confirmée pour évoluer vers un poste d'encadrement.",
    funding: "CPF, employeur selon statut",
    immediate_employment: false,
    organisme: "Organisme de formation",
    certification: "Certification management",
}];

pub(crate) fn mentions_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

pub fn has_financial_motivation(profile: &CandidateProfile) -> bool {
    mentions_any(&profile.aspirations_lower(), FINANCIAL_KEYWORDS)
}

/// No qualification (or no job) and money as the main driver.
pub fn is_entry_level(profile: &CandidateProfile) -> bool {
    (profile.has_no_qualification() || profile.is_unemployed()) && has_financial_motivation(profile)
}

fn is_technical(profile: &CandidateProfile) -> bool {
    mentions_any(
        &profile.education_level_lower(),
        &["electrotechnique", "électrotechnique"],
    ) || profile.current_position_lower().contains("technicien")
}

fn is_social(profile: &CandidateProfile) -> bool {
    profile.education_level_lower().contains("service social")
        || profile.current_position_lower().contains("social")
}

/// Canned suggestions used when no live formation data is available.
pub fn recommend_formations(profile: &CandidateProfile) -> Vec<FormationRecommendation> {
    let mut selected: Vec<&CatalogEntry> = Vec::new();

    if is_entry_level(profile) {
        selected.extend(ENTRY_LEVEL);
    } else if is_technical(profile) {
        selected.extend(TECHNICAL);
    } else if is_social(profile) {
        selected.extend(SOCIAL);
    } else {
        selected.extend(TERTIARY);
        if profile.years() >= 5.0 {
            selected.extend(MANAGEMENT);
        }
    }

    selected
        .into_iter()
        .take(MAX_FORMATIONS)
        .map(|entry| entry.recommend(profile))
        .collect()
}

/// Why a live formation fits this candidate.
pub fn relevance(profile: &CandidateProfile) -> &'static str {
    if profile.has_no_qualification() {
        "Adaptée à votre profil pour acquérir des compétences de base et accéder rapidement à l'emploi"
    } else if has_financial_motivation(profile) {
        "Formation pratique orientée vers l'emploi immédiat et la rémunération"
    } else {
        "Complète vos compétences actuelles et améliore votre employabilité"
    }
}

/// Short certifying courses usually lead straight to a job.
pub fn immediate_employment(title: &str) -> bool {
    mentions_any(&title.to_lowercase(), QUICK_FORMATIONS)
}

/// Hours become hours, days, weeks or months; strings pass through.
pub fn format_duration(duration: Option<&Value>) -> String {
    match duration {
        Some(Value::Number(n)) => match n.as_f64() {
            Some(hours) if hours < 40.0 => format!("{} heures", hours.round() as i64),
            Some(hours) if hours < 160.0 => format!("{} jours", (hours / 7.0).round() as i64),
            Some(hours) if hours < 600.0 => format!("{} semaines", (hours / 35.0).round() as i64),
            Some(hours) => format!("{} mois", (hours / 140.0).round() as i64),
            None => "Durée à définir".to_string(),
        },
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => "Durée à définir".to_string(),
    }
}
