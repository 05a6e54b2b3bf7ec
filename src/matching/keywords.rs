// src/matching/keywords.rs
//! Search terms sent to the offers and formations endpoints.

use crate::types::CandidateProfile;

use super::formations::{is_entry_level, mentions_any};

const MAX_OFFER_TERMS: usize = 5;

/// `motsCles` for the offers search: a few skills, the current job unless
/// unemployed, the aspirations and the main sectors.
pub fn build_keywords(profile: &CandidateProfile) -> String {
    let mut terms: Vec<&str> = Vec::new();

    terms.extend(profile.technical_skills.iter().take(3).map(String::as_str));

    if let Some(position) = profile.current_position.as_deref() {
        if !position.trim().is_empty() && !profile.is_unemployed() {
            terms.push(position);
        }
    }

    if let Some(aspirations) = profile.career_aspirations.as_deref() {
        if !aspirations.trim().is_empty() {
            terms.push(aspirations);
        }
    }

    terms.extend(profile.key_sectors.iter().take(2).map(String::as_str));

    terms
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .take(MAX_OFFER_TERMS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `motsCles` for the formations search, one rule per profile family.
pub fn formation_keywords(profile: &CandidateProfile) -> &'static str {
    let education = profile.education_level_lower();
    let position = profile.current_position_lower();
    let aspirations = profile.aspirations_lower();

    if is_entry_level(profile) {
        "logistique cariste"
    } else if mentions_any(&education, &["electrotechnique", "électrotechnique"])
        || position.contains("technicien")
    {
        "maintenance automatisme"
    } else if position.contains("communication") || aspirations.contains("culture") {
        "communication digitale"
    } else if position.contains("commercial") || position.contains("adv") {
        "gestion commercial"
    } else if education.contains("service social") || position.contains("social") {
        "accompagnement social"
    } else if profile.total_experience_years == Some(0.0) || profile.has_no_qualification() {
        "qualification professionnelle"
    } else {
        "competences professionnelles"
    }
}

/// `niveauFormation` filter derived from the education level.
pub fn formation_level(profile: &CandidateProfile) -> &'static str {
    let education = profile.education_level_lower();

    if profile.has_no_qualification() || education.contains("sans") {
        "1"
    } else if mentions_any(&education, &["cap", "bep"]) {
        "2"
    } else if education.contains("bac") {
        "3"
    } else if mentions_any(&education, &["licence", "bts"]) {
        "4"
    } else if mentions_any(&education, &["master", "ingenieur", "ingénieur"]) {
        "5"
    } else {
        "all"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_keywords_order_and_limit() {
        let profile = CandidateProfile {
            technical_skills: vec!["Excel".into(), "SAP".into(), "SQL".into(), "Python".into()],
            current_position: Some("Comptable".into()),
            career_aspirations: Some("contrôle de gestion".into()),
            key_sectors: vec!["Finance".into(), "Industrie".into()],
            ..Default::default()
        };
        assert_eq!(build_keywords(&profile), "Excel SAP SQL Comptable contrôle de gestion");
    }

    #[test]
    fn test_build_keywords_skips_unemployed_position() {
        let profile = CandidateProfile {
            technical_skills: vec!["Cariste".into()],
            current_position: Some("Sans emploi".into()),
            key_sectors: vec!["Logistique".into()],
            ..Default::default()
        };
        assert_eq!(build_keywords(&profile), "Cariste Logistique");
        assert_eq!(build_keywords(&CandidateProfile::default()), "");
    }

    #[test]
    fn test_formation_keywords_rules() {
        let entry = CandidateProfile {
            education_level: Some("Aucune qualification".into()),
            career_aspirations: Some("Faire du fric rapidement".into()),
            ..Default::default()
        };
        assert_eq!(formation_keywords(&entry), "logistique cariste");

        let technician = CandidateProfile {
            current_position: Some("Technicien de maintenance".into()),
            ..Default::default()
        };
        assert_eq!(formation_keywords(&technician), "maintenance automatisme");

        let beginner = CandidateProfile {
            total_experience_years: Some(0.0),
            ..Default::default()
        };
        assert_eq!(formation_keywords(&beginner), "qualification professionnelle");
        assert_eq!(
            formation_keywords(&CandidateProfile::default()),
            "competences professionnelles"
        );
    }

    #[test]
    fn test_formation_level() {
        let level = |education: &str| {
            formation_level(&CandidateProfile {
                education_level: Some(education.into()),
                ..Default::default()
            })
        };
        assert_eq!(level("Aucune qualification"), "1");
        assert_eq!(level("CAP cuisine"), "2");
        assert_eq!(level("Bac pro"), "3");
        assert_eq!(level("BTS MUC"), "4");
        assert_eq!(level("Master RH"), "5");
        assert_eq!(level("Autodidacte"), "all");
    }
}
