use crate::{app::AppState, error::Result, models::ApiResponse};
use actix_web::{get, web, HttpRequest, HttpResponse};

/// Models available from the configured LLM provider.
#[get("/models")]
pub async fn list_models(
    http_request: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    state.tokens.require_user_id(&http_request)?;

    let models = state.llm.list_models().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(models)))
}
