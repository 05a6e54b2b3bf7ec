// src/web/handlers/analyze_handlers.rs
//! Résumé analysis from JSON text or from an uploaded file.

use rocket::form::Form;
use rocket::serde::json::Json;
use std::path::Path;
use tracing::{error, info, warn};

use crate::analysis::{CvAnalyzer, MIN_CV_CHARS};
use crate::utils::{read_upload, validate_file_extension, SUPPORTED_UPLOADS};
use crate::web::types::*;

const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Trimmed résumé text, or the 400 explaining what is wrong with it.
pub fn validated_cv_text(text: Option<&str>) -> Result<String, ApiError> {
    let text = text.map(str::trim).unwrap_or_default();

    if text.is_empty() {
        return Err(ApiError::bad_request(
            "Texte du CV requis",
            "MISSING_CV_TEXT",
            &["Envoyez le texte du CV dans le champ cvText", "Ou téléversez un fichier PDF, TXT ou MD"],
        ));
    }
    if text.chars().count() < MIN_CV_CHARS {
        return Err(ApiError::bad_request(
            "Le texte du CV est trop court (50 caractères minimum)",
            "CV_TEXT_TOO_SHORT",
            &["Collez le CV complet", "Vérifiez que le fichier contient du texte sélectionnable"],
        ));
    }

    Ok(text.to_string())
}

async fn run_analysis(state: &AppState, cv_text: String, filename: Option<String>) -> ApiResult<AnalyzeCvResponse> {
    let llm = state.llm()?;
    let analyzer = CvAnalyzer::new(llm, state.france_travail.clone());
    let analysis = analyzer.analyze(&cv_text).await;

    Ok(Json(AnalyzeCvResponse {
        success: true,
        filename,
        analysis,
    }))
}

pub async fn analyze_cv_json_handler(request: AnalyzeCvRequest, state: &AppState) -> ApiResult<AnalyzeCvResponse> {
    let cv_text = validated_cv_text(request.cv_text.as_deref())?;
    info!("Analyzing CV text ({} characters)", cv_text.chars().count());
    run_analysis(state, cv_text, request.file_name).await
}

fn unsupported_file(filename: &str) -> ApiError {
    ApiError::bad_request(
        &format!("Format de fichier non supporté: {}", filename),
        "UNSUPPORTED_FILE_TYPE",
        &["Téléversez un fichier PDF (.pdf)", "Ou un fichier texte (.txt, .md)"],
    )
}

pub async fn analyze_cv_upload_handler(
    mut upload: Form<CvUploadForm<'_>>,
    state: &AppState,
) -> ApiResult<AnalyzeCvResponse> {
    let content_type = upload.file.content_type().cloned();

    let filename = upload
        .file
        .raw_name()
        .map(|n| n.dangerous_unsafe_unsanitized_raw().as_str())
        .and_then(|raw| Path::new(raw).file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            if content_type.as_ref().map_or(false, |ct| ct.is_pdf()) {
                "cv.pdf".to_string()
            } else {
                "cv.txt".to_string()
            }
        });

    if validate_file_extension(&filename, SUPPORTED_UPLOADS).is_err() {
        return Err(unsupported_file(&filename));
    }

    if upload.file.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::bad_request(
            "Le fichier dépasse la limite de 10 Mo",
            "FILE_TOO_LARGE",
            &["Compressez le fichier", "Ou collez directement le texte du CV"],
        ));
    }

    let temp_path = std::env::temp_dir().join(format!("cv_upload_{}", uuid::Uuid::new_v4()));
    if let Err(e) = upload.file.persist_to(&temp_path).await {
        error!("Failed to save uploaded file: {}", e);
        return Err(ApiError::bad_request(
            "Impossible de lire le fichier téléversé",
            "FILE_READ_ERROR",
            &["Réessayez le téléversement"],
        ));
    }

    let text = read_upload(&temp_path, &filename).await;
    let _ = tokio::fs::remove_file(&temp_path).await;

    let text = match text {
        Ok(text) => text,
        Err(e) => {
            warn!("Unreadable upload {}: {:#}", filename, e);
            return Err(ApiError::bad_request(
                "Impossible d'extraire le texte du fichier",
                "FILE_READ_ERROR",
                &["Vérifiez que le PDF contient du texte sélectionnable", "Ou collez directement le texte du CV"],
            ));
        }
    };

    let cv_text = validated_cv_text(Some(&text))?;
    info!("Analyzing uploaded CV {} ({} characters)", filename, cv_text.chars().count());
    run_analysis(state, cv_text, Some(filename)).await
}
