// src/knowledge.rs
//! Questions answered from the reference PDF only: the document is split
//! into blocks, ranked with TF-IDF against the question, and the best
//! blocks are handed to the model as its sole context.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::core::service_client::{ServiceClient, ServiceError};
use crate::llm::{ChatRequest, LlmError, LlmProvider};
use crate::matching::text::{fold_accents, truncate_chars};
use crate::utils::extract_pdf_text;

pub const NOT_IN_DOCUMENT: &str = "Ce point n'est pas précisé dans le dossier.";

const DOCUMENT_NAME: &str = "assignme.pdf";
const MIN_BLOCK_CHARS: usize = 60;
const TOP_BLOCKS: usize = 6;
const MAX_CONTEXT_CHARS: usize = 8000;
/// Length of the marker `truncate_chars` appends.
const ELLIPSIS_CHARS: usize = 3;

const ASK_SYSTEM: &str = "Tu es une IA d'ASSIGNME. Réponds UNIQUEMENT à partir du CONTEXTE fourni.\nSi l'information n'y figure pas, réponds exactement : \"Ce point n'est pas précisé dans le dossier.\"";

static TRAILING_BLANKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+\n").expect("valid trailing blanks regex"));
static EXTRA_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));
static BLOCK_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").expect("valid block regex"));
static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("valid token regex"));

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Impossible de charger le PDF: {0}")]
    Fetch(#[from] ServiceError),
    #[error("Lecture du PDF impossible: {0}")]
    Extract(anyhow::Error),
    #[error(transparent)]
    Llm(#[from] LlmError),
}

pub fn normalize_text(text: &str) -> String {
    let text = text.replace('\r', "");
    let text = TRAILING_BLANKS.replace_all(&text, "\n");
    EXTRA_NEWLINES.replace_all(&text, "\n\n").trim().to_string()
}

/// Accent-folded lowercase alphanumeric runs.
pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN
        .find_iter(&fold_accents(text))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Paragraphs separated by blank lines; a short paragraph absorbs the next one.
pub fn split_blocks(text: &str) -> Vec<String> {
    let raw: Vec<&str> = BLOCK_SEPARATOR
        .split(text)
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .collect();

    let mut blocks = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i].chars().count() < MIN_BLOCK_CHARS && i + 1 < raw.len() {
            blocks.push(format!("{}\n{}", raw[i], raw[i + 1]));
            i += 2;
        } else {
            blocks.push(raw[i].to_string());
            i += 1;
        }
    }
    blocks
}

struct Block {
    text: String,
    tf: HashMap<String, usize>,
}

pub struct DocumentIndex {
    blocks: Vec<Block>,
    idf: HashMap<String, f64>,
}

impl DocumentIndex {
    pub fn build(text: &str) -> Self {
        let blocks: Vec<Block> = split_blocks(text)
            .into_iter()
            .map(|text| {
                let mut tf = HashMap::new();
                for token in tokenize(&text) {
                    *tf.entry(token).or_insert(0) += 1;
                }
                Block { text, tf }
            })
            .collect();

        let mut df: HashMap<&str, usize> = HashMap::new();
        for block in &blocks {
            for token in block.tf.keys() {
                *df.entry(token.as_str()).or_insert(0) += 1;
            }
        }

        let n = blocks.len() as f64;
        let idf = df
            .into_iter()
            .map(|(token, count)| (token.to_string(), ((n + 1.0) / (count as f64 + 1.0)).ln() + 1.0))
            .collect();

        Self { blocks, idf }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Best blocks for `question`, highest score first, zero scores dropped.
    pub fn search(&self, question: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        let query: Vec<String> = tokenize(question)
            .into_iter()
            .filter(|t| t.len() >= 2)
            .filter(|t| seen.insert(t.clone()))
            .collect();

        let mut scored: Vec<(f64, &Block)> = self
            .blocks
            .iter()
            .map(|block| {
                let score = query
                    .iter()
                    .map(|t| {
                        let tf = block.tf.get(t).copied().unwrap_or(0) as f64;
                        tf * self.idf.get(t).copied().unwrap_or(0.0)
                    })
                    .sum::<f64>();
                (score, block)
            })
            .filter(|(score, _)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored
            .into_iter()
            .take(TOP_BLOCKS)
            .map(|(_, block)| block.text.as_str())
            .collect()
    }

    /// Concatenated best blocks, bounded in size. `None` when nothing matches.
    pub fn context(&self, question: &str) -> Option<String> {
        let hits = self.search(question);
        if hits.is_empty() {
            return None;
        }

        let mut context = String::new();
        for hit in hits {
            let hit = hit.trim();
            if context.is_empty() {
                // the best block always goes in, cut to the budget if needed
                context = truncate_chars(hit, MAX_CONTEXT_CHARS - ELLIPSIS_CHARS);
                continue;
            }
            if context.chars().count() + hit.chars().count() + 2 > MAX_CONTEXT_CHARS {
                break;
            }
            context.push_str("\n\n");
            context.push_str(hit);
        }
        (!context.is_empty()).then_some(context)
    }
}

pub struct KnowledgeBase {
    http: ServiceClient,
    document_url: String,
    index: OnceCell<DocumentIndex>,
}

impl KnowledgeBase {
    pub fn new(http: ServiceClient, public_base_url: &str) -> Self {
        Self {
            http,
            document_url: format!("{}/{}", public_base_url.trim_end_matches('/'), DOCUMENT_NAME),
            index: OnceCell::new(),
        }
    }

    /// Knowledge base over an already extracted text, no download involved.
    pub fn from_text(http: ServiceClient, text: &str) -> Self {
        Self {
            http,
            document_url: String::new(),
            index: OnceCell::new_with(Some(DocumentIndex::build(&normalize_text(text)))),
        }
    }

    pub fn document_url(&self) -> &str {
        &self.document_url
    }

    async fn index(&self) -> Result<&DocumentIndex, KnowledgeError> {
        self.index.get_or_try_init(|| self.load()).await
    }

    async fn load(&self) -> Result<DocumentIndex, KnowledgeError> {
        info!("Loading reference document from {}", self.document_url);
        let bytes = self.http.get_bytes(&self.document_url).await?;
        let text = extract_pdf_text(bytes).await.map_err(KnowledgeError::Extract)?;
        let index = DocumentIndex::build(&normalize_text(&text));
        info!("Reference document indexed in {} blocks", index.len());
        Ok(index)
    }

    pub async fn answer(&self, llm: &dyn LlmProvider, question: &str) -> Result<String, KnowledgeError> {
        let index = self.index().await?;

        let Some(context) = index.context(question) else {
            debug!("No block matches the question");
            return Ok(NOT_IN_DOCUMENT.to_string());
        };

        let user = format!("CONTEXTE:\n\"\"\"\n{}\n\"\"\"\n\nQUESTION:\n{}", context, question);
        let completion = match llm.complete(ChatRequest::new(ASK_SYSTEM, user).temperature(0.2)).await {
            Ok(completion) => completion,
            Err(LlmError::EmptyCompletion) => return Ok(NOT_IN_DOCUMENT.to_string()),
            Err(e) => return Err(e.into()),
        };

        Ok(completion.content)
    }
}
