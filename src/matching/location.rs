// src/matching/location.rs
//! Free-text location to French commune code.
//!
//! The city table ships inside the binary as CSV and is parsed once.
//! A 5-digit number typed by the candidate always wins over the table.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, error};

use super::text::fold_accents;

const COMMUNES_CSV: &str = include_str!("../../data/communes.csv");

static FIVE_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{5})\b").expect("valid postal code regex"));

static RESOLVER: Lazy<LocationResolver> = Lazy::new(|| {
    LocationResolver::from_csv(COMMUNES_CSV).unwrap_or_else(|e| {
        error!("Commune table unreadable, every location will resolve to Paris: {:#}", e);
        LocationResolver::default()
    })
});

/// Which code the downstream search expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    /// Commune code used by the offers search (`commune`).
    Insee,
    /// Postal code used by the formations search (`codePostal`).
    Postal,
}

impl CodeKind {
    pub fn paris(&self) -> &'static str {
        match self {
            CodeKind::Insee => "75056",
            CodeKind::Postal => "75001",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Commune {
    city: String,
    insee: String,
    postal: String,
}

impl Commune {
    fn code(&self, kind: CodeKind) -> &str {
        match kind {
            CodeKind::Insee => &self.insee,
            CodeKind::Postal => &self.postal,
        }
    }
}

#[derive(Debug, Default)]
pub struct LocationResolver {
    communes: Vec<Commune>,
}

impl LocationResolver {
    fn from_csv(data: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let communes = reader
            .deserialize()
            .collect::<std::result::Result<Vec<Commune>, _>>()
            .context("Failed to parse commune table")?;
        Ok(Self { communes })
    }

    pub fn len(&self) -> usize {
        self.communes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.communes.is_empty()
    }

    pub fn resolve(&self, location: Option<&str>, kind: CodeKind) -> String {
        let Some(location) = location.map(str::trim).filter(|l| !l.is_empty()) else {
            return kind.paris().to_string();
        };

        if let Some(caps) = FIVE_DIGITS.captures(location) {
            return caps[1].to_string();
        }

        let folded = fold_accents(location);
        match self.communes.iter().find(|c| folded.contains(c.city.as_str())) {
            Some(commune) => commune.code(kind).to_string(),
            None => {
                debug!("No commune matched '{}', defaulting to Paris", location);
                kind.paris().to_string()
            }
        }
    }
}

/// Resolve against the embedded table.
pub fn resolve_location(location: Option<&str>, kind: CodeKind) -> String {
    RESOLVER.resolve(location, kind)
}

/// INSEE code for the offers search.
pub fn extract_location(location: &str) -> String {
    resolve_location(Some(location), CodeKind::Insee)
}
