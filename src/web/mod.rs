// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use handlers::*;
pub use types::*;

use anyhow::Result;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::{Errors, Form};
use rocket::http::{Header, Status};
use rocket::serde::json::{Error as JsonError, Json};
use rocket::{catchers, delete, get, options, patch, post, put, routes, Build, Request, Response, Rocket, Route, State};
use tracing::{error, info, warn};

use crate::core::config_manager::ConfigManager;

const BODY_LIMIT_MIB: u64 = 10;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type"));
        response.set_header(Header::new("Access-Control-Allow-Methods", "POST, OPTIONS"));
    }
}

#[post("/analyze-cv", format = "multipart/form-data", data = "<upload>")]
pub async fn analyze_cv_upload(
    upload: Result<Form<CvUploadForm<'_>>, Errors<'_>>,
    state: &State<AppState>,
) -> ApiResult<AnalyzeCvResponse> {
    let upload = upload.map_err(|e| {
        warn!("Invalid upload form: {}", e);
        ApiError::bad_request(
            "Fichier manquant dans le formulaire",
            "MISSING_FILE",
            &["Envoyez le CV dans le champ file"],
        )
    })?;
    handlers::analyze_cv_upload_handler(upload, state).await
}

#[post("/analyze-cv", data = "<request>", rank = 2)]
pub async fn analyze_cv(
    request: Result<Json<AnalyzeCvRequest>, JsonError<'_>>,
    state: &State<AppState>,
) -> ApiResult<AnalyzeCvResponse> {
    handlers::analyze_cv_json_handler(parse_body(request)?, state).await
}

#[post("/france-travail-jobs", data = "<request>")]
pub async fn france_travail_jobs(
    request: Result<Json<ProfileRequest>, JsonError<'_>>,
    state: &State<AppState>,
) -> ApiResult<JobsResponse> {
    handlers::france_travail_jobs_handler(parse_body(request)?, state).await
}

#[post("/france-travail-formations", data = "<request>")]
pub async fn france_travail_formations(
    request: Result<Json<ProfileRequest>, JsonError<'_>>,
    state: &State<AppState>,
) -> ApiResult<FormationsResponse> {
    handlers::france_travail_formations_handler(parse_body(request)?, state).await
}

#[post("/romeo-analysis", data = "<request>")]
pub async fn romeo_analysis(
    request: Result<Json<RomeoRequest>, JsonError<'_>>,
    state: &State<AppState>,
) -> ApiResult<RomeoAnalysisResponse> {
    handlers::romeo_analysis_handler(parse_body(request)?, state).await
}

#[post("/rome-metiers", data = "<request>")]
pub async fn rome_metiers(
    request: Result<Json<RomeRequest>, JsonError<'_>>,
    state: &State<AppState>,
) -> ApiResult<RomeMetiersResponse> {
    handlers::rome_metiers_handler(parse_body(request)?, state).await
}

#[post("/ask", data = "<request>")]
pub async fn ask(request: Result<Json<AskRequest>, JsonError<'_>>, state: &State<AppState>) -> ApiResult<AskResponse> {
    handlers::ask_handler(parse_body(request)?, state).await
}

#[post("/auto-apply", data = "<request>")]
pub async fn auto_apply(
    request: Result<Json<AutoApplyRequest>, JsonError<'_>>,
    state: &State<AppState>,
) -> ApiResult<AutoApplyResponse> {
    handlers::auto_apply_handler(parse_body(request)?, state).await
}

#[post("/feedback", data = "<request>")]
pub async fn feedback(
    request: Result<Json<FeedbackRequest>, JsonError<'_>>,
    state: &State<AppState>,
) -> ApiResult<MessageResponse> {
    Ok(handlers::feedback_handler(parse_body(request)?, state).await)
}

#[post("/send-email", data = "<request>")]
pub async fn send_email(request: Result<Json<SendEmailRequest>, JsonError<'_>>) -> ApiResult<MessageResponse> {
    handlers::send_email_handler(parse_body(request)?).await
}

#[get("/health")]
pub async fn health() -> &'static str {
    handlers::health_handler().await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Every route is POST; other methods on a known prefix get a JSON 405.

#[get("/<_..>", rank = 50)]
pub fn get_not_allowed() -> (Status, Json<MethodNotAllowed>) {
    (Status::MethodNotAllowed, handlers::method_not_allowed_handler())
}

#[put("/<_..>", rank = 50)]
pub fn put_not_allowed() -> (Status, Json<MethodNotAllowed>) {
    (Status::MethodNotAllowed, handlers::method_not_allowed_handler())
}

#[delete("/<_..>", rank = 50)]
pub fn delete_not_allowed() -> (Status, Json<MethodNotAllowed>) {
    (Status::MethodNotAllowed, handlers::method_not_allowed_handler())
}

#[patch("/<_..>", rank = 50)]
pub fn patch_not_allowed() -> (Status, Json<MethodNotAllowed>) {
    (Status::MethodNotAllowed, handlers::method_not_allowed_handler())
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Format de requête invalide".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Vérifiez le format JSON de la requête".to_string(),
            "Vérifiez que tous les champs requis sont présents".to_string(),
        ],
    ))
}

#[rocket::catch(404)]
pub fn not_found(request: &Request) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        format!("Route inconnue: {}", request.uri().path()),
        "NOT_FOUND".to_string(),
        vec!["Les routes sont servies sous /api".to_string()],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Requête illisible".to_string(),
        "UNPROCESSABLE_ENTITY".to_string(),
        vec!["Vérifiez le type et le contenu de la requête".to_string()],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Erreur interne".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Réessayez dans quelques instants".to_string(),
            "Contactez le support si le problème persiste".to_string(),
        ],
    ))
}

fn api_routes() -> Vec<Route> {
    routes![
        analyze_cv_upload,
        analyze_cv,
        france_travail_jobs,
        france_travail_formations,
        romeo_analysis,
        rome_metiers,
        ask,
        auto_apply,
        feedback,
        send_email,
        health,
        options,
        get_not_allowed,
        put_not_allowed,
        delete_not_allowed,
        patch_not_allowed,
    ]
}

/// Rocket instance with every route mounted under `/api` and under the
/// legacy `/.netlify/functions` prefix.
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    let limits = Limits::default()
        .limit("file", BODY_LIMIT_MIB.mebibytes())
        .limit("data-form", BODY_LIMIT_MIB.mebibytes())
        .limit("json", BODY_LIMIT_MIB.mebibytes());

    let figment = rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", state.config.port))
        .merge(("limits", limits));

    rocket::custom(figment)
        .attach(Cors)
        .manage(state)
        .register("/", catchers![bad_request, not_found, unprocessable, internal_error])
        .mount("/api", api_routes())
        .mount("/.netlify/functions", api_routes())
}

// Main server start function
pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    info!("Starting ASSIGNME API server");
    info!("Environment: {}", config.environment);
    info!("LLM provider: {}", config.llm.provider);
    info!("Port: {}", config.port);

    let state = AppState::from_config(config)?;

    if let Err(e) = build_rocket(state).launch().await {
        error!("Server stopped with an error: {}", e);
        anyhow::bail!("Rocket failed: {}", e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client;
    use serde_json::{json, Value};

    const CV: &str = "Karim B., Lyon. Préparateur de commandes depuis 4 ans, CACES 1 et 3, gestion de stock.";

    async fn client_with(vars: &[(&str, &str)]) -> Client {
        let vars: Vec<(String, String)> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let config = ConfigManager::from_sources("test".to_string(), None, move |key| {
            vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
        .unwrap();
        let state = AppState::from_config(config).unwrap();
        Client::tracked(build_rocket(state)).await.unwrap()
    }

    async fn client() -> Client {
        client_with(&[]).await
    }

    async fn post_json(client: &Client, uri: &str, body: Value) -> (Status, Value) {
        let response = client
            .post(uri.to_string())
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;
        let status = response.status();
        (status, response.into_json::<Value>().await.unwrap_or(Value::Null))
    }

    #[rocket::async_test]
    async fn test_wrong_method_is_405_with_cors() {
        let client = client().await;
        let response = client.get("/api/analyze-cv").dispatch().await;

        assert_eq!(response.status(), Status::MethodNotAllowed);
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Origin"),
            Some("*")
        );
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "Method Not Allowed");
    }

    #[rocket::async_test]
    async fn test_options_preflight() {
        let client = client().await;
        let response = client.options("/.netlify/functions/auto-apply").dispatch().await;

        assert_eq!(response.status(), Status::Ok);
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Methods"),
            Some("POST, OPTIONS")
        );
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Headers"),
            Some("Content-Type")
        );
        assert!(response.into_string().await.unwrap_or_default().is_empty());
    }

    #[rocket::async_test]
    async fn test_health() {
        let client = client().await;
        let response = client.get("/api/health").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.as_deref(), Some("OK"));
    }

    #[rocket::async_test]
    async fn test_short_cv_is_rejected_before_configuration() {
        let client = client().await;
        let (status, body) = post_json(&client, "/api/analyze-cv", json!({ "cvText": "  trop court  " })).await;

        assert_eq!(status, Status::BadRequest);
        assert_eq!(body["error_code"], "CV_TEXT_TOO_SHORT");
        assert_eq!(body["success"], false);
        assert_eq!(body["type"], "error");
    }

    #[rocket::async_test]
    async fn test_missing_llm_key_is_configuration_error() {
        let client = client().await;
        let (status, body) = post_json(&client, "/api/analyze-cv", json!({ "cvText": CV })).await;

        assert_eq!(status, Status::InternalServerError);
        assert_eq!(body["error_code"], "CONFIGURATION_ERROR");

        let (status, _) = post_json(&client, "/api/ask", json!({ "question": "Quel tarif ?" })).await;
        assert_eq!(status, Status::InternalServerError);
    }

    #[rocket::async_test]
    async fn test_france_travail_routes_validate_then_require_secret() {
        let client = client_with(&[("FRANCE_TRAVAIL_CLIENT_ID", "PAR_test")]).await;

        let (status, body) = post_json(&client, "/api/france-travail-jobs", json!({})).await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body["error"], "Profil candidat requis");

        let (status, body) = post_json(
            &client,
            "/api/france-travail-formations",
            json!({ "candidateProfile": { "location": "Lyon" } }),
        )
        .await;
        assert_eq!(status, Status::InternalServerError);
        assert_eq!(body["error_code"], "CONFIGURATION_ERROR");

        let (status, body) = post_json(&client, "/api/rome-metiers", json!({ "jobTitle": "" })).await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body["error"], "Titre du poste requis");

        let (status, body) = post_json(&client, "/api/romeo-analysis", json!({})).await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body["error"], "Texte CV requis pour analyse ROMEO");
    }

    #[rocket::async_test]
    async fn test_invalid_json_is_400() {
        let client = client().await;
        let response = client
            .post("/api/ask")
            .header(ContentType::JSON)
            .body("{ question: ")
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "INVALID_JSON");
    }

    #[rocket::async_test]
    async fn test_auto_apply_requires_jobs() {
        let client = client().await;
        let (status, body) = post_json(
            &client,
            "/api/auto-apply",
            json!({ "candidateProfile": { "name": "Amina" }, "selectedJobs": [] }),
        )
        .await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body["error"], "Profil candidat et jobs requis");
    }

    #[rocket::async_test]
    async fn test_feedback_and_email() {
        let client = client().await;

        let (status, body) = post_json(
            &client,
            "/.netlify/functions/feedback",
            json!({ "candidateId": "c-1", "jobId": "j-1", "feedbackType": "like" }),
        )
        .await;
        assert_eq!(status, Status::Ok);
        assert_eq!(body["message"], "Feedback enregistré");

        let (status, body) = post_json(&client, "/api/send-email", json!({ "email": "karim@example.fr" })).await;
        assert_eq!(status, Status::Ok);
        assert_eq!(body["message"], "Email envoyé avec succès");

        let (status, _) = post_json(&client, "/api/send-email", json!({ "email": "pas-un-email" })).await;
        assert_eq!(status, Status::BadRequest);
    }

    #[rocket::async_test]
    async fn test_unsupported_upload_is_400() {
        let client = client().await;
        let boundary = "X-ASSIGNME-BOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cv.docx\"\r\nContent-Type: application/octet-stream\r\n\r\nbinary\r\n--{b}--\r\n",
            b = boundary
        );

        let response = client
            .post("/api/analyze-cv")
            .header(ContentType::new("multipart", "form-data").with_params(("boundary", boundary)))
            .body(body)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "UNSUPPORTED_FILE_TYPE");
    }

    #[rocket::async_test]
    async fn test_unknown_route_is_json_404() {
        let client = client().await;
        let (status, body) = post_json(&client, "/api/unknown", json!({})).await;
        assert_eq!(status, Status::NotFound);
        assert_eq!(body["error_code"], "NOT_FOUND");
    }
}
