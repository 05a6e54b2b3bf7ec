// src/utils.rs
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Extensions accepted for résumé uploads.
pub const SUPPORTED_UPLOADS: &[&str] = &["pdf", "txt", "md"];

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Validate file extension against allowed types
pub fn validate_file_extension(filename: &str, allowed: &[&str]) -> Result<String> {
    let ext = get_file_extension(filename)
        .ok_or_else(|| anyhow::anyhow!("File has no extension: {}", filename))?;

    if !allowed.contains(&ext.as_str()) {
        anyhow::bail!("Unsupported file extension: {}. Allowed: {:?}", ext, allowed);
    }

    Ok(ext)
}

/// Text layer of a PDF. Extraction is CPU bound and runs off the async workers.
pub async fn extract_pdf_text(bytes: Vec<u8>) -> Result<String> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .context("PDF extraction task failed")?
        .context("Failed to extract text from PDF")
}

/// Text of an uploaded résumé, by extension.
pub async fn read_upload(path: &Path, filename: &str) -> Result<String> {
    let ext = validate_file_extension(filename, SUPPORTED_UPLOADS)?;

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    match ext.as_str() {
        "pdf" => extract_pdf_text(bytes).await,
        _ => String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", filename)),
    }
}

/// Pseudonymous identifier: first 16 hex chars of sha256(id + salt).
pub fn hash_id(id: Option<&str>, salt: &str) -> String {
    match id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => {
            let digest = Sha256::digest(format!("{}{}", id, salt).as_bytes());
            hex::encode(digest)[..16].to_string()
        }
        None => "anonymous".to_string(),
    }
}

/// Email safe to log: first character of the local part, then the domain.
pub fn mask_email(email: &str) -> String {
    match email.trim().split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) => format!("{}***@{}", first, domain),
            None => format!("***@{}", domain),
        },
        None => "***".to_string(),
    }
}
