//! Pure matching heuristics: scoring, location codes, keywords and the
//! formation catalog. Nothing here performs I/O.

pub mod formations;
pub mod keywords;
pub mod location;
pub mod scoring;
pub mod text;

pub use formations::recommend_formations;
pub use keywords::{build_keywords, formation_keywords, formation_level};
pub use location::{extract_location, resolve_location, CodeKind};
pub use scoring::{calculate_match_score, evaluate, rank, MatchOutcome};
