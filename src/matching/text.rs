// src/matching/text.rs
//! Small text helpers shared by the matcher and the France Travail mappers.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

static AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\s?\d{3})*)(?:[.,]\d+)?\s*(?:€|euros?)").expect("valid amount regex")
});

const COMMON_JOB_SKILLS: &[&str] = &[
    "excel",
    "word",
    "powerpoint",
    "office",
    "javascript",
    "python",
    "java",
    "php",
    "sql",
    "marketing",
    "communication",
    "vente",
    "commerce",
    "gestion",
    "comptabilité",
    "finance",
    "anglais",
    "allemand",
    "espagnol",
];

/// Lowercase and strip French diacritics so "Besançon" matches "besancon".
pub fn fold_accents(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| match c {
            'à' | 'â' | 'ä' | 'á' | 'ã' => 'a',
            'ç' => 'c',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' | 'í' => 'i',
            'ô' | 'ö' | 'ó' => 'o',
            'ù' | 'û' | 'ü' | 'ú' => 'u',
            'ÿ' => 'y',
            other => other,
        })
        .collect()
}

/// Collapse runs of whitespace into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop markup, collapse whitespace, and cut at `max_chars` with an ellipsis.
pub fn clean_description(raw: Option<&str>, max_chars: usize, placeholder: &str) -> String {
    let raw = match raw.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => return placeholder.to_string(),
    };

    let fragment = Html::parse_fragment(raw);
    let text = collapse_whitespace(&fragment.root_element().text().collect::<String>());

    truncate_chars(&text, max_chars)
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

fn salary_amounts(label: &str) -> Vec<u32> {
    AMOUNT
        .captures_iter(label)
        .filter_map(|caps| {
            let digits: String = caps[1].chars().filter(|c| c.is_ascii_digit()).collect();
            digits.parse::<u32>().ok()
        })
        .collect()
}

/// First amount of a salary label such as "Annuel de 35 000 € à 42 000 €".
pub fn extract_salary_min(label: Option<&str>) -> Option<u32> {
    label.and_then(|l| salary_amounts(l).first().copied())
}

/// Second amount of a salary label, or the first one when there is only one.
pub fn extract_salary_max(label: Option<&str>) -> Option<u32> {
    let amounts = label.map(salary_amounts).unwrap_or_default();
    amounts.get(1).or_else(|| amounts.first()).copied()
}

/// Well-known skills mentioned in a posting, capitalised, at most five.
pub fn extract_job_skills(searchable_text: &str) -> Vec<String> {
    COMMON_JOB_SKILLS
        .iter()
        .filter(|skill| searchable_text.contains(*skill))
        .map(|skill| capitalize(skill))
        .take(5)
        .collect()
}

pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn contract_label(code: Option<&str>) -> String {
    match code {
        Some("CDI") => "CDI".to_string(),
        Some("CDD") => "CDD".to_string(),
        Some("MIS") => "Mission intérim".to_string(),
        Some("SAI") => "Saisonnier".to_string(),
        Some("IND") => "Indépendant".to_string(),
        Some(other) if !other.trim().is_empty() => other.to_string(),
        _ => "Type non spécifié".to_string(),
    }
}
