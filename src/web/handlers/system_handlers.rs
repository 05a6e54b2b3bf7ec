// src/web/handlers/system_handlers.rs
use rocket::serde::json::Json;
use tracing::info;

use crate::utils::{hash_id, mask_email};
use crate::web::types::*;

pub async fn health_handler() -> &'static str {
    info!("Health check");
    "OK"
}

pub async fn feedback_handler(request: FeedbackRequest, state: &AppState) -> Json<MessageResponse> {
    info!(
        candidate = %hash_id(request.candidate_id.as_deref(), &state.config.service.hash_salt),
        job = request.job_id.as_deref().unwrap_or("-"),
        kind = request.feedback_type.as_deref().unwrap_or("-"),
        has_data = request.data.is_some(),
        "Feedback received"
    );

    Json(MessageResponse::success("Feedback enregistré"))
}

pub async fn send_email_handler(request: SendEmailRequest) -> ApiResult<MessageResponse> {
    let email = request
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| e.contains('@'))
        .ok_or_else(|| {
            ApiError::bad_request(
                "Adresse email requise",
                "INVALID_EMAIL",
                &["Renseignez une adresse email valide"],
            )
        })?;

    info!("New contact request from {}", mask_email(&email));

    Ok(Json(MessageResponse::success("Email envoyé avec succès")))
}

pub fn method_not_allowed_handler() -> Json<MethodNotAllowed> {
    Json(MethodNotAllowed {
        error: "Method Not Allowed".to_string(),
    })
}
