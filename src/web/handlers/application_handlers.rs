// src/web/handlers/application_handlers.rs
use rocket::serde::json::Json;
use tracing::info;

use crate::applications::draft_applications;
use crate::web::types::*;

pub async fn auto_apply_handler(request: AutoApplyRequest, state: &AppState) -> ApiResult<AutoApplyResponse> {
    let profile = match request.candidate_profile {
        Some(profile) if !request.selected_jobs.is_empty() => profile,
        _ => {
            return Err(ApiError::bad_request(
                "Profil candidat et jobs requis",
                "MISSING_PROFILE_OR_JOBS",
                &["Envoyez candidateProfile et au moins une offre dans selectedJobs"],
            ))
        }
    };
    let llm = state.llm()?;

    let batch = draft_applications(llm.as_ref(), &profile, &request.selected_jobs).await;
    info!(
        "{} of {} applications drafted",
        batch.summary.generated, batch.summary.total
    );

    Ok(Json(AutoApplyResponse {
        success: true,
        message: batch.message(),
        summary: batch.summary,
        applications: batch.applications,
    }))
}
