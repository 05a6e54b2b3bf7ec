// src/llm/structured.rs
//! Best-effort extraction of JSON from model replies.
//!
//! Models wrap JSON in markdown fences or add a sentence around it. We strip
//! fences, slice from the first opening bracket to the last closing one, and
//! hand the rest to serde.

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StructuredOutputError {
    #[error("The model returned an empty reply")]
    Empty,
    #[error("No JSON {0} found in the model reply")]
    NoJsonObject(&'static str),
    #[error("Invalid JSON in the model reply: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Remove ```json / ``` fences and surrounding whitespace.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.strip_prefix("json").or_else(|| rest.strip_prefix("JSON")).unwrap_or(rest);
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

fn slice_between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Parse a JSON object out of a model reply.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, StructuredOutputError> {
    let text = strip_fences(raw);
    if text.is_empty() {
        return Err(StructuredOutputError::Empty);
    }
    let object = slice_between(text, '{', '}').ok_or(StructuredOutputError::NoJsonObject("object"))?;
    Ok(serde_json::from_str(object)?)
}

/// Parse a JSON array out of a model reply.
pub fn parse_structured_list<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, StructuredOutputError> {
    let text = strip_fences(raw);
    if text.is_empty() {
        return Err(StructuredOutputError::Empty);
    }
    let array = slice_between(text, '[', ']').ok_or(StructuredOutputError::NoJsonObject("array"))?;
    Ok(serde_json::from_str(array)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Answer {
        question: String,
        answer: String,
    }

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("```\n[1]\n```  "), "[1]");
        assert_eq!(strip_fences("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_object_with_chatter() {
        let raw = "Voici l'analyse demandée :\n```json\n{\"question\": \"Q\", \"answer\": \"R\"}\n```\nBonne chance !";
        let parsed: Answer = parse_structured(raw).unwrap();
        assert_eq!(parsed.answer, "R");
    }

    #[test]
    fn test_parse_list() {
        let raw = "[{\"question\":\"Disponibilité ?\",\"answer\":\"Immédiate\"}]";
        let parsed: Vec<Answer> = parse_structured_list(raw).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].question, "Disponibilité ?");
    }

    #[test]
    fn test_garbage_is_an_error_not_a_panic() {
        assert!(matches!(
            parse_structured::<Answer>(""),
            Err(StructuredOutputError::Empty)
        ));
        assert!(matches!(
            parse_structured::<Answer>("Désolé, je ne peux pas répondre."),
            Err(StructuredOutputError::NoJsonObject(_))
        ));
        assert!(matches!(
            parse_structured::<Answer>("{\"question\": "),
            Err(StructuredOutputError::NoJsonObject(_))
        ));
        assert!(matches!(
            parse_structured::<Answer>("{\"question\": 1}"),
            Err(StructuredOutputError::Invalid(_))
        ));
        assert!(parse_structured_list::<Answer>("}{").is_err());
    }

    #[test]
    fn test_missing_json_names_the_expected_shape() {
        let err = parse_structured_list::<Answer>("Aucune question de présélection.").unwrap_err();
        assert!(matches!(err, StructuredOutputError::NoJsonObject("array")));
        assert_eq!(err.to_string(), "No JSON array found in the model reply");
    }
}
