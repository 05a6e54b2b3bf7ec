// src/matching/scoring.rs
//! Additive match score between a candidate and a job posting.

use crate::types::{CandidateProfile, ExperienceTier, RawJobPosting};

pub const BASE_SCORE: i32 = 40;
pub const MIN_SCORE: i32 = 25;
pub const MAX_SCORE: i32 = 95;

const POINTS_PER_SKILL: i32 = 8;
const SKILL_CAP: i32 = 32;
const EXPERIENCE_BONUS: i32 = 15;
const SECTOR_BONUS: i32 = 10;
const LOCATION_BONUS: i32 = 8;

const GENERIC_JUSTIFICATION: &str = "Offre à étudier selon vos critères";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub score: u8,
    pub reasons: Vec<String>,
}

impl MatchOutcome {
    pub fn justification(&self) -> String {
        if self.reasons.is_empty() {
            GENERIC_JUSTIFICATION.to_string()
        } else {
            self.reasons.join(" • ")
        }
    }
}

/// Candidate skills found in the posting's title or description, in profile order.
pub fn matching_skills<'a>(job: &RawJobPosting, profile: &'a CandidateProfile) -> Vec<&'a str> {
    let haystack = job.searchable_text();
    profile
        .technical_skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && haystack.contains(&s.to_lowercase()))
        .collect()
}

fn experience_fits(tier: Option<ExperienceTier>, years: Option<f64>) -> bool {
    match (tier, years) {
        (Some(ExperienceTier::Beginner), Some(y)) => y >= 0.0,
        (Some(ExperienceTier::Some), Some(y)) => y >= 2.0,
        (Some(ExperienceTier::Senior), Some(y)) => y >= 5.0,
        _ => false,
    }
}

fn sector_fits(job: &RawJobPosting, profile: &CandidateProfile) -> bool {
    let Some(sector) = job.sector().map(str::to_lowercase) else {
        return false;
    };
    profile
        .key_sectors
        .iter()
        .map(|s| s.trim().to_lowercase())
        .any(|s| !s.is_empty() && sector.contains(&s))
}

fn location_fits(job: &RawJobPosting, profile: &CandidateProfile) -> bool {
    let job_location = job.location().unwrap_or_default().trim().to_lowercase();
    let candidate = profile
        .location
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    if job_location.is_empty() || candidate.is_empty() {
        return false;
    }
    job_location.contains(&candidate) || candidate.contains(&job_location)
}

pub fn calculate_match_score(job: &RawJobPosting, profile: &CandidateProfile) -> u8 {
    let mut score = BASE_SCORE;

    let skills = matching_skills(job, profile).len() as i32;
    score += (skills * POINTS_PER_SKILL).min(SKILL_CAP);

    if experience_fits(job.tier(), profile.total_experience_years) {
        score += EXPERIENCE_BONUS;
    }
    if sector_fits(job, profile) {
        score += SECTOR_BONUS;
    }
    if location_fits(job, profile) {
        score += LOCATION_BONUS;
    }

    score.clamp(MIN_SCORE, MAX_SCORE) as u8
}

/// Human readable reasons, most important first.
pub fn match_reasons(job: &RawJobPosting, profile: &CandidateProfile, score: u8) -> Vec<String> {
    let mut reasons = Vec::new();

    match score {
        80..=u8::MAX => reasons.push("Excellente correspondance avec votre profil".to_string()),
        60..=79 => reasons.push("Bonne correspondance avec vos compétences".to_string()),
        40..=59 => reasons.push("Correspondance acceptable".to_string()),
        _ => {}
    }

    let shared = matching_skills(job, profile);
    if !shared.is_empty() {
        let top: Vec<&str> = shared.into_iter().take(3).collect();
        reasons.push(format!("Compétences en commun: {}", top.join(", ")));
    }

    match job.tier() {
        Some(ExperienceTier::Beginner) => reasons.push("Ouvert aux débutants".to_string()),
        Some(ExperienceTier::Some) if profile.years() >= 2.0 => {
            reasons.push("Expérience compatible".to_string())
        }
        _ => {}
    }

    reasons
}

pub fn evaluate(job: &RawJobPosting, profile: &CandidateProfile) -> MatchOutcome {
    let score = calculate_match_score(job, profile);
    MatchOutcome {
        score,
        reasons: match_reasons(job, profile, score),
    }
}

/// Highest score first; equal scores keep the order the API returned.
pub fn rank<T, F>(items: &mut [T], score: F)
where
    F: Fn(&T) -> u8,
{
    items.sort_by(|a, b| score(b).cmp(&score(a)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::job::{LieuTravail, RawJobPosting};

    fn posting(description: &str, tier: Option<&str>) -> RawJobPosting {
        RawJobPosting {
            intitule: Some("Assistant comptable".to_string()),
            description: Some(description.to_string()),
            experience_exige: tier.map(str::to_string),
            ..Default::default()
        }
    }

    fn candidate(skills: &[&str], years: Option<f64>) -> CandidateProfile {
        CandidateProfile {
            technical_skills: skills.iter().map(|s| s.to_string()).collect(),
            total_experience_years: years,
            ..Default::default()
        }
    }

    #[test]
    fn test_base_score_without_signals() {
        let outcome = evaluate(&posting("Rien de particulier", None), &candidate(&[], None));
        assert_eq!(outcome.score, 40);
        assert_eq!(outcome.justification(), "Correspondance acceptable");
    }

    #[test]
    fn test_skill_bonus_is_capped() {
        let profile = candidate(&["excel", "sage", "sql", "word", "anglais", "python"], None);
        let job = posting("excel sage sql word anglais python", None);
        assert_eq!(calculate_match_score(&job, &profile), 72);
    }

    #[test]
    fn test_experience_tiers() {
        let junior = candidate(&[], Some(1.0));
        let senior = candidate(&[], Some(6.0));

        assert_eq!(calculate_match_score(&posting("", Some("D")), &junior), 55);
        assert_eq!(calculate_match_score(&posting("", Some("S")), &junior), 40);
        assert_eq!(calculate_match_score(&posting("", Some("S")), &senior), 55);
        assert_eq!(calculate_match_score(&posting("", Some("E")), &senior), 55);
        assert_eq!(
            calculate_match_score(&posting("", Some("D")), &candidate(&[], None)),
            40
        );
    }

    #[test]
    fn test_sector_and_location_bonus() {
        let mut job = posting("", None);
        job.secteur_activite_libelle = Some("Transports routiers de fret".to_string());
        job.lieu_travail = Some(LieuTravail {
            libelle: Some("69 - Lyon".to_string()),
        });

        let profile = CandidateProfile {
            key_sectors: vec!["Transports".to_string()],
            location: Some("Lyon".to_string()),
            ..Default::default()
        };
        assert_eq!(calculate_match_score(&job, &profile), 58);
    }

    #[test]
    fn test_justification_order() {
        let profile = candidate(&["Excel", "SQL", "Sage", "Word"], Some(3.0));
        let job = posting("excel, sql, sage et word requis", Some("S"));
        let outcome = evaluate(&job, &profile);

        assert_eq!(outcome.score, 87);
        assert_eq!(
            outcome.justification(),
            "Excellente correspondance avec votre profil • Compétences en commun: Excel, SQL, Sage • Expérience compatible"
        );
    }

    #[test]
    fn test_rank_is_stable() {
        let mut items = vec![("a", 50u8), ("b", 70), ("c", 50), ("d", 70)];
        rank(&mut items, |i| i.1);
        let order: Vec<&str> = items.iter().map(|i| i.0).collect();
        assert_eq!(order, vec!["b", "d", "a", "c"]);
    }
}
