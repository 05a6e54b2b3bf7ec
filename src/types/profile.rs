// src/types/profile.rs
//! Candidate profile produced by the profile extractor and consumed by the
//! matcher, the formation recommender and the application drafts.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub name: Option<String>,
    pub location: Option<String>,
    pub mobility: Option<String>,
    pub education_level: Option<String>,
    pub education_details: Option<String>,
    #[serde(deserialize_with = "lenient_years")]
    pub total_experience_years: Option<f64>,
    pub current_position: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub key_sectors: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub technical_skills: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub soft_skills: Vec<String>,
    pub career_aspirations: Option<String>,
    pub constraints: Option<String>,
    pub psychological_profile: Option<String>,
    pub recommended_work_environment: Option<String>,
    pub supervision_needs: Option<String>,
    pub location_message: Option<String>,
    pub jobs_available_in_france: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub romeo_analysis: Option<RomeoAnalysis>,
    /// Fields the model or the frontend sent that we do not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// ROME occupations detected by ROMEO for this candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RomeoAnalysis {
    pub detected_metiers: Vec<DetectedMetier>,
    pub primary_rome_code: Option<String>,
    pub primary_metier: Option<String>,
    pub confidence_score: f64,
    pub total_suggestions: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectedMetier {
    pub rome_code: Option<String>,
    pub metier_label: Option<String>,
    pub score: f64,
    pub competences: Vec<String>,
}

impl CandidateProfile {
    /// Years of experience, zero when the model could not tell.
    pub fn years(&self) -> f64 {
        self.total_experience_years.unwrap_or(0.0)
    }

    pub fn education_level_lower(&self) -> String {
        lower(&self.education_level)
    }

    pub fn current_position_lower(&self) -> String {
        lower(&self.current_position)
    }

    pub fn aspirations_lower(&self) -> String {
        lower(&self.career_aspirations)
    }

    pub fn has_no_qualification(&self) -> bool {
        self.education_level_lower().trim() == "aucune qualification"
    }

    pub fn is_unemployed(&self) -> bool {
        self.current_position_lower().trim() == "sans emploi"
    }
}

fn lower(value: &Option<String>) -> String {
    value.as_deref().unwrap_or_default().to_lowercase()
}

/// Accepts `3`, `3.5`, `"3"`, `"5 ans"` or `null`.
fn lenient_years<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
                .map(|c| if c == ',' { '.' } else { c })
                .collect();
            digits.parse::<f64>().ok()
        }
        _ => None,
    })
}

/// Accepts a list of strings, a single string, or `null`. Non-string items are dropped.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_profile_fields() {
        let profile: CandidateProfile = serde_json::from_value(serde_json::json!({
            "name": "Jeanne Martin",
            "total_experience_years": "7 ans",
            "technical_skills": ["Excel", 3, "SQL"],
            "key_sectors": "Logistique",
            "soft_skills": null,
            "favourite_colour": "vert"
        }))
        .unwrap();

        assert_eq!(profile.total_experience_years, Some(7.0));
        assert_eq!(profile.technical_skills, vec!["Excel", "SQL"]);
        assert_eq!(profile.key_sectors, vec!["Logistique"]);
        assert!(profile.soft_skills.is_empty());
        assert_eq!(profile.extra.get("favourite_colour").unwrap(), "vert");
    }

    #[test]
    fn test_missing_fields_default() {
        let profile: CandidateProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile.years(), 0.0);
        assert!(profile.location.is_none());
        assert!(!profile.has_no_qualification());
    }

    #[test]
    fn test_romeo_analysis_is_omitted_when_absent() {
        let json = serde_json::to_value(CandidateProfile::default()).unwrap();
        assert!(json.get("romeo_analysis").is_none());
        assert!(json.get("technical_skills").unwrap().is_array());
    }
}
