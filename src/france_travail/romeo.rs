// src/france_travail/romeo.rs
//! ROMEO v2: ROME occupations suggested from free text, merged into the profile.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

use super::{FranceTravailClient, FranceTravailError};
use crate::matching::text::collapse_whitespace;
use crate::types::{CandidateProfile, DetectedMetier, RomeoAnalysis};

const ROMEO_PATH: &str = "/romeo/v2/suggest";
const MAX_TEXT_CHARS: usize = 2000;
const KEPT_EDGE_CHARS: usize = 1000;
const MIN_KEPT_SCORE: f64 = 0.4;
const MAX_METIERS: usize = 3;
const MAX_SECTORS: usize = 4;
const MAX_ROMEO_SKILLS: usize = 5;
const MAX_SKILLS: usize = 8;

static UNUSEFUL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9_\sÀ-ÿ.,;:()\-]").expect("valid ROMEO cleanup regex"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RomeoResponse {
    pub suggestions: Vec<RomeoSuggestion>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RomeoSuggestion {
    pub code_rome: Option<String>,
    pub libelle_metier: Option<String>,
    pub score: f64,
    /// Plain labels or `{ "libelle": ... }` objects.
    pub competences: Vec<Value>,
}

impl RomeoSuggestion {
    fn competence_labels(&self) -> Vec<String> {
        self.competences
            .iter()
            .filter_map(|c| match c {
                Value::String(s) => Some(s.clone()),
                Value::Object(o) => o.get("libelle").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .filter(|s| !s.trim().is_empty())
            .collect()
    }
}

/// Whitespace normalised, restricted to useful characters, and at most about
/// 2000 characters (head and tail kept).
pub fn prepare_text(cv_text: &str) -> String {
    let normalized = collapse_whitespace(cv_text);
    let cleaned = UNUSEFUL_CHARS.replace_all(&normalized, "");
    let cleaned = cleaned.trim();

    let chars: Vec<char> = cleaned.chars().collect();
    if chars.len() <= MAX_TEXT_CHARS {
        return cleaned.to_string();
    }

    let head: String = chars[..KEPT_EDGE_CHARS].iter().collect();
    let tail: String = chars[chars.len() - KEPT_EDGE_CHARS..].iter().collect();
    format!("{} ... {}", head, tail)
}

impl FranceTravailClient {
    pub async fn romeo_suggest(&self, token: &str, cv_text: &str) -> Result<RomeoResponse, FranceTravailError> {
        let texte = prepare_text(cv_text);
        info!("Sending {} characters to ROMEO", texte.chars().count());

        let payload = json!({
            "texte": texte,
            "nb_suggestions": 5,
            "score_min": 0.3
        });

        let response: Option<RomeoResponse> = self
            .http()
            .post_json(&self.endpoint(ROMEO_PATH), token, &payload)
            .await?;
        let response = response.unwrap_or_default();

        info!("ROMEO returned {} suggestions", response.suggestions.len());
        Ok(response)
    }
}

/// Activity sector from the first letter of a ROME code.
pub fn sector_for_rome_code(code: &str) -> Option<&'static str> {
    let sector = match code.trim().chars().next()?.to_ascii_uppercase() {
        'A' => "Agriculture",
        'B' => "Arts et spectacles",
        'C' => "Banque et assurances",
        'D' => "Commerce",
        'E' => "Communication",
        'F' => "BTP et second œuvre",
        'G' => "Hôtellerie-restauration",
        'H' => "Industrie",
        'I' => "Installation et maintenance",
        'J' => "Santé",
        'K' => "Services aux entreprises",
        'L' => "Services aux particuliers",
        'M' => "Support à l'entreprise",
        'N' => "Transport et logistique",
        _ => return None,
    };
    Some(sector)
}

/// `first` then `rest`, duplicates removed, at most `limit` items.
fn merge_front(first: Vec<String>, rest: &[String], limit: usize) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for item in first.into_iter().chain(rest.iter().cloned()) {
        if !merged.contains(&item) {
            merged.push(item);
        }
    }
    merged.truncate(limit);
    merged
}

/// Merge the best ROMEO suggestions into the profile. No suggestions leaves
/// the profile untouched.
pub fn enrich_profile(mut profile: CandidateProfile, romeo: &RomeoResponse) -> CandidateProfile {
    if romeo.suggestions.is_empty() {
        return profile;
    }

    let top: Vec<&RomeoSuggestion> = romeo
        .suggestions
        .iter()
        .filter(|s| s.score >= MIN_KEPT_SCORE)
        .take(MAX_METIERS)
        .collect();

    let detected: Vec<DetectedMetier> = top
        .iter()
        .map(|s| DetectedMetier {
            rome_code: s.code_rome.clone(),
            metier_label: s.libelle_metier.clone(),
            score: s.score,
            competences: s.competence_labels(),
        })
        .collect();

    profile.romeo_analysis = Some(RomeoAnalysis {
        primary_rome_code: detected.first().and_then(|m| m.rome_code.clone()),
        primary_metier: detected.first().and_then(|m| m.metier_label.clone()),
        confidence_score: detected.first().map(|m| m.score).unwrap_or(0.0),
        total_suggestions: romeo.suggestions.len(),
        detected_metiers: detected.clone(),
    });

    let sectors: Vec<String> = detected
        .iter()
        .filter_map(|m| m.rome_code.as_deref().and_then(sector_for_rome_code))
        .map(str::to_string)
        .collect();
    if !sectors.is_empty() {
        profile.key_sectors = merge_front(sectors, &profile.key_sectors, MAX_SECTORS);
    }

    let skills: Vec<String> = detected
        .iter()
        .flat_map(|m| m.competences.iter().cloned())
        .take(MAX_ROMEO_SKILLS)
        .collect();
    if !skills.is_empty() {
        profile.technical_skills = merge_front(skills, &profile.technical_skills, MAX_SKILLS);
    }

    info!("Profile enriched with {} ROMEO occupations", detected.len());
    profile
}
