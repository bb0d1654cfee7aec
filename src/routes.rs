use actix_web::{web, Scope};

use crate::handlers::{health_check, list_models, recommend_config, search_config};

/// Configure all routes for the API
pub fn api_routes() -> Scope {
    web::scope("/api")
        .service(health_check)
        .service(list_models)
        .configure(search_config)
        .configure(recommend_config)
}
