// src/web/handlers/france_travail_handlers.rs
//! Job offers, formations, ROMEO and ROME routes. Downstream failures answer
//! 200 with `success: false` and `fallback: true`.

use rocket::serde::json::Json;
use tracing::{info, warn};

use crate::france_travail::formations::recommend_live_formations;
use crate::france_travail::rome::{build_sheet, MetierSheet};
use crate::france_travail::{
    enrich_profile, recommend_jobs, FranceTravailClient, FranceTravailError, RomeoResponse, Scope,
};
use crate::matching::recommend_formations;
use crate::types::{CandidateProfile, FormationRecommendation, JobRecommendation, SourceMetadata};
use crate::web::types::*;

fn missing_profile() -> ApiError {
    ApiError::bad_request(
        "Profil candidat requis",
        "MISSING_PROFILE",
        &["Envoyez le profil dans le champ candidateProfile"],
    )
}

async fn search_jobs(
    client: &FranceTravailClient,
    profile: &CandidateProfile,
) -> Result<(Vec<JobRecommendation>, usize, String), FranceTravailError> {
    let token = client.access_token(Scope::Offers).await?;
    let search = client.search_offers(&token, profile).await?;
    Ok((recommend_jobs(&search.jobs, profile), search.jobs.len(), search.query))
}

pub async fn france_travail_jobs_handler(request: ProfileRequest, state: &AppState) -> ApiResult<JobsResponse> {
    let profile = request.candidate_profile.ok_or_else(missing_profile)?;
    let client = state.france_travail()?;

    match search_jobs(client, &profile).await {
        Ok((jobs, total_found, query)) => {
            info!("{} job recommendations ready", jobs.len());
            Ok(Json(JobsResponse {
                success: true,
                jobs,
                metadata: Some(
                    SourceMetadata::now("France Travail")
                        .with_total(total_found)
                        .with_query(query),
                ),
                fallback: None,
                error: None,
            }))
        }
        Err(e) => {
            warn!("France Travail job search failed: {}", e);
            Ok(Json(JobsResponse {
                success: false,
                jobs: Vec::new(),
                metadata: None,
                fallback: Some(true),
                error: Some(e.to_string()),
            }))
        }
    }
}

async fn search_formations(
    client: &FranceTravailClient,
    profile: &CandidateProfile,
) -> Result<(Vec<FormationRecommendation>, usize), FranceTravailError> {
    let token = client.access_token(Scope::Formations).await?;
    let search = client.search_formations(&token, profile).await?;
    Ok((recommend_live_formations(&search.formations, profile), search.formations.len()))
}

pub async fn france_travail_formations_handler(
    request: ProfileRequest,
    state: &AppState,
) -> ApiResult<FormationsResponse> {
    let profile = request.candidate_profile.ok_or_else(missing_profile)?;
    let client = state.france_travail()?;

    match search_formations(client, &profile).await {
        Ok((formations, total_found)) => Ok(Json(FormationsResponse {
            success: true,
            formations,
            metadata: Some(SourceMetadata::now("France Travail Formations").with_total(total_found)),
            fallback: None,
            error: None,
        })),
        Err(e) => {
            warn!("Formations search failed, using the catalog: {}", e);
            Ok(Json(FormationsResponse {
                success: false,
                formations: recommend_formations(&profile),
                metadata: None,
                fallback: Some(true),
                error: Some(e.to_string()),
            }))
        }
    }
}

async fn romeo(client: &FranceTravailClient, cv_text: &str) -> Result<RomeoResponse, FranceTravailError> {
    let token = client.access_token(Scope::Romeo).await?;
    client.romeo_suggest(&token, cv_text).await
}

pub async fn romeo_analysis_handler(request: RomeoRequest, state: &AppState) -> ApiResult<RomeoAnalysisResponse> {
    let cv_text = request
        .cv_text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            ApiError::bad_request(
                "Texte CV requis pour analyse ROMEO",
                "MISSING_CV_TEXT",
                &["Envoyez le texte du CV dans le champ cvText"],
            )
        })?;
    let client = state.france_travail()?;
    let profile = request.candidate_profile.unwrap_or_default();

    match romeo(client, &cv_text).await {
        Ok(romeo) => Ok(Json(RomeoAnalysisResponse {
            success: true,
            enriched_profile: Some(enrich_profile(profile, &romeo)),
            romeo_analysis: Some(romeo),
            metadata: Some(RomeoMetadata {
                source: "France Travail ROMEO v2".to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                cv_length: cv_text.chars().count(),
            }),
            fallback: None,
            error: None,
        })),
        Err(e) => {
            warn!("ROMEO analysis failed: {}", e);
            Ok(Json(RomeoAnalysisResponse {
                success: false,
                enriched_profile: Some(profile),
                romeo_analysis: None,
                metadata: None,
                fallback: Some(true),
                error: Some(e.to_string()),
            }))
        }
    }
}

enum RomeLookup {
    Found(String, MetierSheet),
    NoCode,
    NoSheet,
}

async fn rome_lookup(
    client: &FranceTravailClient,
    job_title: &str,
    profile: &CandidateProfile,
) -> Result<RomeLookup, FranceTravailError> {
    let token = client.access_token(Scope::Rome).await?;

    let Some(code) = client.rome_search(&token, job_title).await? else {
        return Ok(RomeLookup::NoCode);
    };
    let Some(metier) = client.rome_metier(&token, &code).await? else {
        return Ok(RomeLookup::NoSheet);
    };

    Ok(RomeLookup::Found(code, build_sheet(&metier, profile)))
}

pub async fn rome_metiers_handler(request: RomeRequest, state: &AppState) -> ApiResult<RomeMetiersResponse> {
    let job_title = request
        .job_title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            ApiError::bad_request(
                "Titre du poste requis",
                "MISSING_JOB_TITLE",
                &["Envoyez l'intitulé recherché dans le champ jobTitle"],
            )
        })?;
    let client = state.france_travail()?;
    let profile = request.candidate_profile.unwrap_or_default();

    let response = match rome_lookup(client, &job_title, &profile).await {
        Ok(RomeLookup::Found(code, metier)) => RomeMetiersResponse {
            success: true,
            rome_code: Some(code),
            metier: Some(metier),
            metadata: Some(SourceMetadata::now("ROME 4.0 Métiers")),
            fallback: None,
            error: None,
        },
        Ok(RomeLookup::NoCode) => RomeMetiersResponse::failure("Code ROME non trouvé".to_string(), false),
        Ok(RomeLookup::NoSheet) => RomeMetiersResponse::failure("Détails métier non trouvés".to_string(), false),
        Err(e) => {
            warn!("ROME lookup failed for '{}': {}", job_title, e);
            RomeMetiersResponse::failure(e.to_string(), true)
        }
    };

    Ok(Json(response))
}
