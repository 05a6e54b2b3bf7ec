// src/web/handlers/knowledge_handlers.rs
use rocket::serde::json::Json;
use tracing::warn;

use crate::knowledge::NOT_IN_DOCUMENT;
use crate::web::types::*;

pub async fn ask_handler(request: AskRequest, state: &AppState) -> ApiResult<AskResponse> {
    let question = request
        .question
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| {
            ApiError::bad_request(
                "Question requise",
                "MISSING_QUESTION",
                &["Envoyez la question dans le champ question"],
            )
        })?;
    let llm = state.llm()?;

    match state.knowledge.answer(llm.as_ref(), &question).await {
        Ok(answer) => Ok(Json(AskResponse {
            answer,
            fallback: None,
            error: None,
        })),
        Err(e) => {
            warn!("Question could not be answered: {}", e);
            Ok(Json(AskResponse {
                answer: NOT_IN_DOCUMENT.to_string(),
                fallback: Some(true),
                error: Some(e.to_string()),
            }))
        }
    }
}
