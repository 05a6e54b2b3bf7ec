pub mod analyze_handlers;
pub mod application_handlers;
pub mod france_travail_handlers;
pub mod knowledge_handlers;
pub mod system_handlers;

pub use analyze_handlers::*;
pub use application_handlers::*;
pub use france_travail_handlers::*;
pub use knowledge_handlers::*;
pub use system_handlers::*;

use rocket::serde::json::{Error as JsonError, Json};
use tracing::warn;

use crate::web::types::ApiError;

/// Unwrap a JSON body, turning syntax and shape errors into a 400.
pub fn parse_body<T>(body: Result<Json<T>, JsonError<'_>>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(e) => {
            warn!("Rejected request body: {}", e);
            Err(ApiError::invalid_json(&e.to_string()))
        }
    }
}
