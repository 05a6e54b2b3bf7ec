// src/types/formation.rs
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A training suggestion, either from the live formations search, the LLM,
/// or the static catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationRecommendation {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub relevance: String,
    pub funding: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub immediate_employment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organisme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lieu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certification: Option<String>,
}

/// A career change path proposed by the LLM.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconversionPath {
    pub target_field: String,
    pub feasibility: String,
    pub required_steps: Vec<String>,
    pub timeline: String,
    pub psychological_compatibility: String,
}

/// The model answers `true`, `"true"` or `"oui"` depending on its mood.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "oui" | "yes"),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_employment_accepts_strings() {
        let formation: FormationRecommendation = serde_json::from_value(serde_json::json!({
            "title": "CACES R489",
            "immediate_employment": "true"
        }))
        .unwrap();
        assert!(formation.immediate_employment);
        assert!(formation.url.is_none());

        let formation: FormationRecommendation =
            serde_json::from_value(serde_json::json!({ "immediate_employment": "false" })).unwrap();
        assert!(!formation.immediate_employment);
    }
}
