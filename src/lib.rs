//! ASSIGNME backend: résumé analysis with a language model, job matching
//! against France Travail offers, training suggestions, document Q&A and
//! application drafts, served over HTTP.

pub mod analysis;
pub mod applications;
pub mod core;
pub mod environment;
pub mod france_travail;
pub mod knowledge;
pub mod llm;
pub mod matching;
pub mod types;
pub mod utils;
pub mod web;

pub use web::start_web_server;
