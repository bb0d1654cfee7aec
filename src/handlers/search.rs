use crate::{
    app::AppState,
    error::{ApiError, Result},
    models::{ApiResponse, SearchRequest},
};
use actix_web::{
    web::{self, Json},
    HttpRequest, HttpResponse,
};
use log::{info, warn};

pub fn search_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/search").route(web::post().to(search)));
}

/// Compile a free-text query into a catalog filter and return the matches.
///
/// A bearer token is optional. When it resolves to a user with a preferred
/// model, that model drives the extractors; any authentication problem falls
/// back to the default model.
pub async fn search(
    http_request: HttpRequest,
    request: Json<SearchRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    // Whitespace-only queries are accepted and compile to the unfiltered listing
    if request.query.is_empty() {
        return Err(ApiError::InvalidInput("query must not be empty".to_string()));
    }
    let query = request.query.as_str();

    let model = resolve_model(&http_request, &state).await;
    info!("Searching for {:?} with model {}", query, model);

    let compiled = state.compiler.compile(query, &model).await;
    let media = state.catalog.search_media(&compiled).await?;

    info!("Search returned {} media", media.len());
    Ok(HttpResponse::Ok().json(ApiResponse::ok(media)))
}

async fn resolve_model(http_request: &HttpRequest, state: &AppState) -> String {
    let user_id = match state.tokens.user_id(http_request) {
        Ok(Some(user_id)) => user_id,
        Ok(None) => return state.default_model.clone(),
        Err(e) => {
            warn!("Ignoring invalid token on search: {}", e);
            return state.default_model.clone();
        }
    };

    match state.users.get_user_by_id(&user_id).await {
        Ok(Some(profile)) => profile
            .preferred_model()
            .map(str::to_string)
            .unwrap_or_else(|| state.default_model.clone()),
        Ok(None) => state.default_model.clone(),
        Err(e) => {
            warn!("Failed to load user {} for search: {}", user_id, e);
            state.default_model.clone()
        }
    }
}
