use crate::{
    app::AppState,
    error::{ApiError, Result},
    models::ApiResponse,
};
use actix_web::{web, HttpRequest, HttpResponse};
use log::info;

pub fn recommend_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/recommend/{id}").route(web::get().to(recommend)));
}

pub fn parse_media_id(raw: &str) -> Result<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::InvalidInput(format!(
            "media id must be a positive integer, got {:?}",
            raw
        ))),
    }
}

/// Evaluate the catalog's recommendations for a title against the caller's
/// favorites.
pub async fn recommend(
    http_request: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let media_id = parse_media_id(&path)?;
    let user_id = state.tokens.require_user_id(&http_request)?;

    info!("Recommendations for media {} requested by {}", media_id, user_id);
    let recommendations = state.recommendations.recommend(&user_id, media_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(recommendations)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_media_id() {
        assert_eq!(parse_media_id("21").unwrap(), 21);
        assert!(parse_media_id("0").is_err());
        assert!(parse_media_id("-4").is_err());
        assert!(parse_media_id("abc").is_err());
    }
}
